use chrono::{DateTime, NaiveDate, Utc};

pub const IMPORT_YEAR: i32 = 2025;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportRange {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl ImportRange {
    pub fn year(year: i32) -> Option<Self> {
        Some(Self {
            first_day: NaiveDate::from_ymd_opt(year, 1, 1)?,
            last_day: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    /// Number of calendar days, both ends included
    pub fn num_days(&self) -> u32 {
        let days = (self.last_day - self.first_day).num_days() + 1;
        u32::try_from(days).unwrap_or(0)
    }
}

/// The range the historical backfill covers
pub fn import_range() -> ImportRange {
    ImportRange::year(IMPORT_YEAR).expect("IMPORT_YEAR is a valid year")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionCounts {
    pub days_total: u32,
    pub days_with_revenue: u32,
    pub days_without_revenue: u32,
}

impl CollectionCounts {
    pub fn is_consistent(&self) -> bool {
        self.days_with_revenue
            .checked_add(self.days_without_revenue)
            .is_some_and(|sum| sum <= self.days_total)
    }

    pub fn is_complete(&self) -> bool {
        self.days_with_revenue.checked_add(self.days_without_revenue) == Some(self.days_total)
    }
}

/// Aggregate state of the historical backfill. Every transition builds a
/// new value, counts are replaced wholesale on each collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatus {
    pub range: ImportRange,
    pub has_run: bool,
    pub counts: CollectionCounts,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_sent_at: Option<DateTime<Utc>>,
}

impl ImportStatus {
    pub fn not_run(range: ImportRange) -> Self {
        Self {
            range,
            has_run: false,
            counts: CollectionCounts {
                days_total: range.num_days(),
                days_with_revenue: 0,
                days_without_revenue: 0,
            },
            last_run_at: None,
            last_sent_at: None,
        }
    }

    pub fn with_collection(&self, counts: CollectionCounts, run_at: DateTime<Utc>) -> Self {
        Self {
            range: self.range,
            has_run: true,
            counts,
            last_run_at: Some(run_at),
            last_sent_at: self.last_sent_at,
        }
    }

    pub fn with_sent(&self, sent_at: DateTime<Utc>) -> Self {
        Self {
            last_sent_at: Some(sent_at),
            ..self.clone()
        }
    }
}
