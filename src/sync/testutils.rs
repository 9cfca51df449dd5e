use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use crate::model::DayStatus;
use crate::service_api::{
    Ack, CollectionReport, DaySummary, OpenDayEntry, ServiceError, SyncBackend,
};

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// Amounts are in Rappen, i.e. `78000` is CHF 780.00
pub fn summary(day: &str, status: DayStatus, gross: i64, tax: i64, vouchers: i64) -> DaySummary {
    DaySummary {
        date: date(day),
        status,
        gross_revenue: Decimal::new(gross, 2),
        tax: Decimal::new(tax, 2),
        voucher_revenue: Decimal::new(vouchers, 2),
        last_sync_time: None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCall {
    DaySummary(NaiveDate),
    OpenDays,
    SendDay(NaiveDate),
    RunCollection,
    SendPostings,
    SetLiveMode(bool),
}

struct Reply<T> {
    result: Result<T, ServiceError>,
    delay: Duration,
}

/// Scripted stand-in for the remote service. Every call is recorded.
/// Unknown days answer with HTTP 404, everything else succeeds by default.
pub struct FakeBackend {
    days: HashMap<NaiveDate, Reply<DaySummary>>,
    open_days: RefCell<Result<Vec<OpenDayEntry>, ServiceError>>,
    open_days_delay: Cell<Duration>,
    send_replies: HashMap<NaiveDate, Result<Ack, ServiceError>>,
    send_delay: Duration,
    collection: RefCell<Result<CollectionReport, ServiceError>>,
    collection_delay: Cell<Duration>,
    postings: RefCell<Result<Ack, ServiceError>>,
    live: RefCell<Result<Ack, ServiceError>>,
    live_delay: Duration,
    calls: RefCell<Vec<RemoteCall>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            days: HashMap::new(),
            open_days: RefCell::new(Ok(vec![])),
            open_days_delay: Cell::new(Duration::ZERO),
            send_replies: HashMap::new(),
            send_delay: Duration::ZERO,
            collection: RefCell::new(Ok(CollectionReport {
                days_total: 365,
                days_with_revenue: 241,
                days_without_revenue: 124,
                last_run: None,
            })),
            collection_delay: Cell::new(Duration::ZERO),
            postings: RefCell::new(Ok(Ack::ok())),
            live: RefCell::new(Ok(Ack::ok())),
            live_delay: Duration::ZERO,
            calls: RefCell::new(vec![]),
        }
    }

    pub fn with_day(self, summary: DaySummary) -> Self {
        self.with_day_delayed(summary, Duration::ZERO)
    }

    pub fn with_day_delayed(mut self, summary: DaySummary, delay: Duration) -> Self {
        self.days.insert(
            summary.date,
            Reply {
                result: Ok(summary),
                delay,
            },
        );
        self
    }

    /// Answer requests for `day` with `summary`, even if it's for another date
    pub fn with_day_answering(mut self, day: &str, summary: DaySummary) -> Self {
        self.days.insert(
            date(day),
            Reply {
                result: Ok(summary),
                delay: Duration::ZERO,
            },
        );
        self
    }

    pub fn with_failing_day(mut self, day: &str, err: ServiceError) -> Self {
        self.days.insert(
            date(day),
            Reply {
                result: Err(err),
                delay: Duration::ZERO,
            },
        );
        self
    }

    pub fn with_open_days(self, days: &[(&str, DayStatus)]) -> Self {
        *self.open_days.borrow_mut() = Ok(days
            .iter()
            .map(|(day, status)| OpenDayEntry {
                date: date(day),
                status: *status,
            })
            .collect());
        self
    }

    pub fn with_send_reply(mut self, day: &str, reply: Result<Ack, ServiceError>) -> Self {
        self.send_replies.insert(date(day), reply);
        self
    }

    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    pub fn with_live_delay(mut self, delay: Duration) -> Self {
        self.live_delay = delay;
        self
    }

    pub fn fail_open_days(&self, err: ServiceError) {
        *self.open_days.borrow_mut() = Err(err);
    }

    pub fn set_open_days_delay(&self, delay: Duration) {
        self.open_days_delay.set(delay);
    }

    pub fn set_collection_reply(&self, reply: Result<CollectionReport, ServiceError>) {
        *self.collection.borrow_mut() = reply;
    }

    pub fn set_collection_delay(&self, delay: Duration) {
        self.collection_delay.set(delay);
    }

    pub fn set_postings_reply(&self, reply: Result<Ack, ServiceError>) {
        *self.postings.borrow_mut() = reply;
    }

    pub fn set_live_reply(&self, reply: Result<Ack, ServiceError>) {
        *self.live.borrow_mut() = reply;
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, predicate: impl Fn(&RemoteCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| predicate(call)).count()
    }

    fn record(&self, call: RemoteCall) {
        self.calls.borrow_mut().push(call);
    }
}

async fn after<T>(delay: Duration, result: Result<T, ServiceError>) -> Result<T, ServiceError> {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    result
}

impl SyncBackend for FakeBackend {
    async fn day_summary(&self, date: NaiveDate) -> Result<DaySummary, ServiceError> {
        self.record(RemoteCall::DaySummary(date));
        match self.days.get(&date) {
            Some(reply) => after(reply.delay, reply.result.clone()).await,
            None => Err(ServiceError::Status {
                status: 404,
                body: format!("no data for {date}"),
            }),
        }
    }

    async fn open_days(&self) -> Result<Vec<OpenDayEntry>, ServiceError> {
        self.record(RemoteCall::OpenDays);
        let result = self.open_days.borrow().clone();
        after(self.open_days_delay.get(), result).await
    }

    async fn send_day(&self, date: NaiveDate) -> Result<Ack, ServiceError> {
        self.record(RemoteCall::SendDay(date));
        let result = self
            .send_replies
            .get(&date)
            .cloned()
            .unwrap_or(Ok(Ack::ok()));
        after(self.send_delay, result).await
    }

    async fn run_collection(&self) -> Result<CollectionReport, ServiceError> {
        self.record(RemoteCall::RunCollection);
        let result = self.collection.borrow().clone();
        after(self.collection_delay.get(), result).await
    }

    async fn send_postings(&self) -> Result<Ack, ServiceError> {
        self.record(RemoteCall::SendPostings);
        self.postings.borrow().clone()
    }

    async fn set_live_mode(&self, enabled: bool) -> Result<Ack, ServiceError> {
        self.record(RemoteCall::SetLiveMode(enabled));
        let result = self.live.borrow().clone();
        after(self.live_delay, result).await
    }
}
