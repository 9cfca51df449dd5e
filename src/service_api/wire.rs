use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::DayStatus;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub status: DayStatus,
    #[serde(alias = "UmsatzBrutto")]
    pub gross_revenue: Decimal,
    #[serde(alias = "Mwst")]
    pub tax: Decimal,
    #[serde(alias = "Gutscheine")]
    pub voucher_revenue: Decimal,
    #[serde(default)]
    pub last_sync_time: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenDayEntry {
    pub date: NaiveDate,
    pub status: DayStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }

    pub fn refused() -> Self {
        Self { ok: false }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionReport {
    pub days_total: u32,
    pub days_with_revenue: u32,
    pub days_without_revenue: u32,
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct LiveModeRequest {
    pub enabled: bool,
}
