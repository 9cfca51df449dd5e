use crate::error::SyncError;

/// How far a piece of local state can be trusted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Freshness {
    /// Matches the last answer the remote service gave
    #[default]
    Fresh,
    /// A call that may change this state hasn't resolved yet
    InFlight,
    /// The last call failed, the state shown is what we had before it
    StaleAfterError(SyncError),
}

impl Freshness {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Freshness::Fresh)
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, Freshness::InFlight)
    }

    pub fn error(&self) -> Option<&SyncError> {
        match self {
            Freshness::StaleAfterError(err) => Some(err),
            Freshness::Fresh | Freshness::InFlight => None,
        }
    }
}
