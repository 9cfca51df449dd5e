use chrono::NaiveDate;

use super::{Ack, CollectionReport, DaySummary, OpenDayEntry, ServiceError};

/// The remote reconciliation service. It collects orders, posts them to the
/// ledger and stores day records; this crate only drives it.
///
/// Every per-day operation is keyed by the date.
#[allow(async_fn_in_trait)]
pub trait SyncBackend {
    async fn day_summary(&self, date: NaiveDate) -> Result<DaySummary, ServiceError>;

    async fn open_days(&self) -> Result<Vec<OpenDayEntry>, ServiceError>;

    async fn send_day(&self, date: NaiveDate) -> Result<Ack, ServiceError>;

    /// Collect all orders of the historical range and aggregate them into daily
    /// totals. The remote side recomputes from scratch on every call.
    async fn run_collection(&self) -> Result<CollectionReport, ServiceError>;

    /// Post the collected daily totals of the historical range to the ledger
    async fn send_postings(&self) -> Result<Ack, ServiceError>;

    async fn set_live_mode(&self, enabled: bool) -> Result<Ack, ServiceError>;
}
