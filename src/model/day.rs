use anyhow::{ensure, Context as _, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a day in its canonical `YYYY-MM-DD` form. Anything else (including
/// `2026-1-5`) is rejected, since dates are the identity key of every per-day
/// operation.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    ensure!(
        input.len() == 10,
        "Expected a date in the form YYYY-MM-DD but got {input:?}"
    );
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .with_context(|| format!("{input:?} is not a valid calendar date"))
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum DayStatus {
    Prepared,
    Sent,
    Error,
    /// Whatever the remote service reported that we don't know about
    Unknown,
}

impl From<String> for DayStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "prepared" => DayStatus::Prepared,
            "sent" => DayStatus::Sent,
            "error" => DayStatus::Error,
            other => {
                log::warn!("Unrecognized day status {other:?}");
                DayStatus::Unknown
            }
        }
    }
}

impl From<DayStatus> for String {
    fn from(status: DayStatus) -> Self {
        match status {
            DayStatus::Prepared => "prepared",
            DayStatus::Sent => "sent",
            DayStatus::Error => "error",
            DayStatus::Unknown => "unknown",
        }
        .to_string()
    }
}

/// Financial summary of one calendar day and where it stands in the sync
/// lifecycle. Amounts are CHF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRecord {
    date: NaiveDate,
    status: DayStatus,
    gross_revenue: Decimal,
    tax: Decimal,
    voucher_revenue: Decimal,
    last_sync_time: Option<DateTime<Utc>>,
}

impl DayRecord {
    /// A record without a sync time. Follow up with
    /// [`DayRecord::with_remote_sync_time`] or [`DayRecord::mark_sent`] so
    /// that sent records carry one.
    pub fn new(
        date: NaiveDate,
        status: DayStatus,
        gross_revenue: Decimal,
        tax: Decimal,
        voucher_revenue: Decimal,
    ) -> Result<Self> {
        for (name, amount) in [
            ("gross revenue", gross_revenue),
            ("tax", tax),
            ("voucher revenue", voucher_revenue),
        ] {
            ensure!(
                !amount.is_sign_negative() || amount.is_zero(),
                "Negative {name} {amount} for {date}"
            );
        }
        let record = Self {
            date,
            status,
            gross_revenue,
            tax,
            voucher_revenue,
            last_sync_time: None,
        };
        Ok(record)
    }

    /// Attach the time the remote service reports for the last successful send.
    /// A record that is already `sent` but comes without one gets `fallback`
    /// so that every sent record carries a sync time.
    pub fn with_remote_sync_time(
        mut self,
        last_sync_time: Option<DateTime<Utc>>,
        fallback: DateTime<Utc>,
    ) -> Self {
        self.last_sync_time = match (self.status, last_sync_time) {
            (_, Some(time)) => Some(time),
            (DayStatus::Sent, None) => Some(fallback),
            (_, None) => None,
        };
        self
    }

    pub fn mark_sent(self, confirmed_at: DateTime<Utc>) -> Self {
        Self {
            status: DayStatus::Sent,
            last_sync_time: Some(confirmed_at),
            ..self
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn status(&self) -> DayStatus {
        self.status
    }

    pub fn gross_revenue(&self) -> Decimal {
        self.gross_revenue
    }

    pub fn tax(&self) -> Decimal {
        self.tax
    }

    pub fn voucher_revenue(&self) -> Decimal {
        self.voucher_revenue
    }

    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        self.last_sync_time
    }

    pub fn is_sent(&self) -> bool {
        self.status == DayStatus::Sent
    }
}
