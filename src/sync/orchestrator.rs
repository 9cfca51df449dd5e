use chrono::{NaiveDate, Utc};
use std::cell::RefCell;
use std::future::Future;
use std::time::Duration;

use super::{FlightKey, InFlight, Outcome};
use crate::error::{Precondition, SyncError};
use crate::model::{import_range, Backlog, DayRecord, Freshness, ImportStatus, OpenDay};
use crate::service_api::{Ack, DaySummary, ServiceError, SyncBackend};
use crate::store::DayRecordStore;

#[derive(Debug)]
pub(super) struct LiveMode {
    pub enabled: bool,
    pub freshness: Freshness,
}

#[derive(Debug)]
pub(super) struct HistoricalImport {
    pub status: ImportStatus,
    pub freshness: Freshness,
}

/// Everything a front-end needs to draw the current state
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub selected_date: Option<NaiveDate>,
    pub selected: Option<DayRecord>,
    pub day_freshness: Freshness,
    pub backlog: Backlog,
    pub backlog_freshness: Freshness,
    pub live_mode: bool,
    pub live_mode_freshness: Freshness,
    pub import: ImportStatus,
    pub import_freshness: Freshness,
}

/// Turns user intents into remote calls and folds the answers back into
/// local state. It is the only writer of that state.
///
/// Methods take `&self` so that several calls can be outstanding at once on
/// a single-threaded runtime. No `RefCell` borrow is ever held across an
/// `.await`.
pub struct Orchestrator<B: SyncBackend> {
    backend: B,
    request_timeout: Duration,
    pub(super) in_flight: InFlight,
    store: RefCell<DayRecordStore>,
    pub(super) live: RefCell<LiveMode>,
    pub(super) import: RefCell<HistoricalImport>,
}

impl<B: SyncBackend> Orchestrator<B> {
    pub fn new(backend: B, request_timeout: Duration, live_mode: bool) -> Self {
        Self {
            backend,
            request_timeout,
            in_flight: InFlight::new(),
            store: RefCell::new(DayRecordStore::new()),
            live: RefCell::new(LiveMode {
                enabled: live_mode,
                freshness: Freshness::Fresh,
            }),
            import: RefCell::new(HistoricalImport {
                status: ImportStatus::not_run(import_range()),
                freshness: Freshness::Fresh,
            }),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn snapshot(&self) -> Snapshot {
        let store = self.store.borrow();
        let live = self.live.borrow();
        let import = self.import.borrow();
        Snapshot {
            selected_date: store.selected_date(),
            selected: store.selected().cloned(),
            day_freshness: store.day_freshness().clone(),
            backlog: store.backlog().clone(),
            backlog_freshness: store.backlog_freshness().clone(),
            live_mode: live.enabled,
            live_mode_freshness: live.freshness.clone(),
            import: import.status.clone(),
            import_freshness: import.freshness.clone(),
        }
    }

    pub fn selected_day(&self) -> Option<DayRecord> {
        self.store.borrow().selected().cloned()
    }

    pub fn backlog(&self) -> Backlog {
        self.store.borrow().backlog().clone()
    }

    pub fn live_mode(&self) -> bool {
        self.live.borrow().enabled
    }

    pub fn import_status(&self) -> ImportStatus {
        self.import.borrow().status.clone()
    }

    /// Run one remote call, bounded by the request timeout
    pub(super) async fn call<T>(
        &self,
        request: impl Future<Output = Result<T, ServiceError>>,
    ) -> Result<T, SyncError> {
        match tokio::time::timeout(self.request_timeout, request).await {
            Ok(result) => Ok(result?),
            Err(_elapsed) => Err(SyncError::Timeout(self.request_timeout)),
        }
    }

    pub(super) async fn call_acknowledged(
        &self,
        request: impl Future<Output = Result<Ack, ServiceError>>,
    ) -> Result<(), SyncError> {
        let ack = self.call(request).await?;
        if ack.ok {
            Ok(())
        } else {
            Err(SyncError::Rejected(
                "The service did not acknowledge the request".to_string(),
            ))
        }
    }

    pub(super) fn failed(&self, action: &str, err: SyncError) -> Outcome {
        log::warn!("{action} failed: {err}");
        Outcome::Failed(err)
    }

    /// Show `date`: fetch its summary and refresh the open-day backlog.
    ///
    /// If another day gets selected before the answer arrives, the answer is
    /// dropped and this returns [`Outcome::Superseded`].
    pub async fn select_day(&self, date: NaiveDate) -> Outcome {
        let ticket = self.store.borrow_mut().begin_selection(date);
        log::info!("Loading day {date}...");

        let (day, backlog) = futures::join!(self.fetch_day(date), self.refresh_backlog());
        if let Some(err) = backlog.error() {
            log::debug!("Open days stay as they were: {err}");
        }

        let applied = self
            .store
            .borrow_mut()
            .finish_selection(ticket, day.clone());
        match (applied, day) {
            (false, _) => {
                log::info!("Loading day {date}...superseded by a newer selection");
                Outcome::Superseded
            }
            (true, Ok(_)) => {
                log::info!("Loading day {date}...done");
                Outcome::Applied
            }
            (true, Err(err)) => self.failed(&format!("Loading day {date}"), err),
        }
    }

    async fn fetch_day(&self, date: NaiveDate) -> Result<DayRecord, SyncError> {
        let summary = self.call(self.backend.day_summary(date)).await?;
        record_from_summary(date, summary)
    }

    /// Replace the open-day backlog with what the remote service currently lists
    pub async fn refresh_backlog(&self) -> Outcome {
        let ticket = self.store.borrow_mut().begin_backlog_refresh();
        log::info!("Requesting open days...");

        let result = self
            .call(self.backend.open_days())
            .await
            .map(|days| {
                Backlog::from_remote(days.into_iter().map(|day| OpenDay {
                    date: day.date,
                    status: day.status,
                }))
            });
        let applied = self
            .store
            .borrow_mut()
            .finish_backlog_refresh(ticket, result.clone());
        match (applied, result) {
            (false, _) => Outcome::Superseded,
            (true, Ok(backlog)) => {
                log::info!("Requesting open days...done, {} open", backlog.len());
                Outcome::Applied
            }
            (true, Err(err)) => self.failed("Requesting open days", err),
        }
    }

    /// Send the selected day to the ledger. Only allowed while the selected
    /// day isn't sent yet and its data is loaded.
    pub async fn send_today(&self) -> Outcome {
        let date = match self.store.borrow().sendable_day() {
            Ok(date) => date,
            Err(precondition) => return self.failed("Sending day", precondition.into()),
        };
        let action = format!("Sending day {date}");
        let Some(_token) = self.in_flight.begin(FlightKey::Day(date)) else {
            return self.failed(&action, SyncError::InFlight(FlightKey::Day(date)));
        };

        log::info!("{action}...");
        self.store.borrow_mut().send_started(date);
        match self.call_acknowledged(self.backend.send_day(date)).await {
            Ok(()) => {
                self.store.borrow_mut().confirm_sent(date, Utc::now());
                log::info!("{action}...done");
                Outcome::Applied
            }
            Err(err) => {
                self.store.borrow_mut().send_failed(date, err.clone());
                self.failed(&action, err)
            }
        }
    }

    /// Send a day from the backlog again. On success the day leaves the
    /// backlog, on failure it stays and can be retried.
    pub async fn resend_day(&self, date: NaiveDate) -> Outcome {
        let action = format!("Resending day {date}");
        if !self.store.borrow().backlog().contains(date) {
            return self.failed(&action, Precondition::NotInBacklog(date).into());
        }
        let Some(_token) = self.in_flight.begin(FlightKey::Day(date)) else {
            return self.failed(&action, SyncError::InFlight(FlightKey::Day(date)));
        };

        log::info!("{action}...");
        match self.call_acknowledged(self.backend.send_day(date)).await {
            Ok(()) => {
                self.store.borrow_mut().confirm_sent(date, Utc::now());
                log::info!("{action}...done");
                Outcome::Applied
            }
            Err(err) => self.failed(&action, err),
        }
    }

    /// Stop tracking a day without telling the remote service. The day's
    /// discrepancy is accepted as is.
    pub fn ignore_day(&self, date: NaiveDate) -> Outcome {
        let action = format!("Ignoring day {date}");
        if self.in_flight.contains(FlightKey::Day(date)) {
            return self.failed(&action, SyncError::InFlight(FlightKey::Day(date)));
        }
        if self.store.borrow_mut().remove_from_backlog(date) {
            log::info!("Ignored open day {date}, it is no longer tracked");
            Outcome::Applied
        } else {
            self.failed(&action, Precondition::NotInBacklog(date).into())
        }
    }
}

fn record_from_summary(
    requested: NaiveDate,
    summary: DaySummary,
) -> Result<DayRecord, SyncError> {
    if summary.date != requested {
        return Err(SyncError::Rejected(format!(
            "Asked for {requested} but got {}",
            summary.date
        )));
    }
    let record = DayRecord::new(
        summary.date,
        summary.status,
        summary.gross_revenue,
        summary.tax,
        summary.voucher_revenue,
    )
    .map_err(|err| SyncError::Rejected(err.to_string()))?;
    Ok(record.with_remote_sync_time(summary.last_sync_time, Utc::now()))
}
