use chrono::NaiveDate;
use std::time::Duration;
use thiserror::Error;

use crate::service_api::ServiceError;
use crate::sync::FlightKey;

/// Everything that can go wrong while reconciling with the remote service.
///
/// None of these are fatal. The orchestrator logs them, keeps its prior state
/// and hands them back inside an [`Outcome`](crate::sync::Outcome).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// No response arrived (connection refused, DNS, TLS, ...)
    #[error("Transport failure: {0}")]
    Transport(String),

    /// A response arrived but it signals failure or can't be used
    #[error("Remote service rejected the request: {0}")]
    Rejected(String),

    #[error("No response within {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Precondition(#[from] Precondition),

    /// Suppressed because an earlier call for the same key hasn't resolved yet
    #[error("An operation for {0} is already in flight")]
    InFlight(FlightKey),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    #[error("No day is selected")]
    NothingSelected,

    #[error("Day {0} is still loading")]
    SelectionPending(NaiveDate),

    #[error("Day {0} could not be loaded")]
    SelectionFailed(NaiveDate),

    #[error("Day {0} was already sent")]
    AlreadySent(NaiveDate),

    #[error("Day {0} is not in the open-day backlog")]
    NotInBacklog(NaiveDate),

    #[error("The historical collection has not run yet, nothing to send")]
    CollectionNotRun,
}

impl From<ServiceError> for SyncError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Transport(msg) => SyncError::Transport(msg),
            err @ (ServiceError::Status { .. } | ServiceError::InvalidResponse(_)) => {
                SyncError::Rejected(err.to_string())
            }
        }
    }
}
