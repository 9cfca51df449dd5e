mod backend;
mod client;
mod error;
mod wire;

pub use backend::SyncBackend;
pub use client::{SyncService, DEFAULT_API_BASE_URL};
pub use error::ServiceError;
pub use wire::{Ack, CollectionReport, DaySummary, OpenDayEntry};
