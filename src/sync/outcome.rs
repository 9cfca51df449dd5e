use crate::error::SyncError;

/// What became of a user action.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The expected state transition happened
    Applied,
    /// The call succeeded but its answer was for a selection the user had
    /// already left, so it was dropped
    Superseded,
    /// Nothing changed. The error has already been logged.
    Failed(SyncError),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    pub fn error(&self) -> Option<&SyncError> {
        match self {
            Outcome::Failed(err) => Some(err),
            Outcome::Applied | Outcome::Superseded => None,
        }
    }
}
