mod backlog;
mod day;
mod freshness;
mod import;

pub use backlog::{Backlog, OpenDay};
pub use day::{parse_date, DayRecord, DayStatus};
pub use freshness::Freshness;
pub use import::{
    import_range, CollectionCounts, ImportRange, ImportStatus, IMPORT_YEAR,
};
