use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::DayStatus;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenDay {
    pub date: NaiveDate,
    pub status: DayStatus,
}

/// Days that haven't been synchronized yet, in the order the remote service
/// reported them. Entries only ever leave the backlog, they're never edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Backlog {
    days: Vec<OpenDay>,
}

impl Backlog {
    pub fn new_empty() -> Self {
        Self { days: vec![] }
    }

    /// Build a backlog from a remote listing. A date listed more than once
    /// keeps its first entry.
    pub fn from_remote(days: impl IntoIterator<Item = OpenDay>) -> Self {
        let mut seen = HashSet::new();
        let days = days
            .into_iter()
            .filter(|day| {
                let first = seen.insert(day.date);
                if !first {
                    log::warn!("Open-day listing contains {} more than once", day.date);
                }
                first
            })
            .collect();
        Self { days }
    }

    /// Returns whether an entry was removed
    pub fn remove(&mut self, date: NaiveDate) -> bool {
        let before = self.days.len();
        self.days.retain(|day| day.date != date);
        self.days.len() != before
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.iter().any(|day| day.date == date)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&OpenDay> {
        self.days.iter().find(|day| day.date == date)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OpenDay> + ExactSizeIterator {
        self.days.iter()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.iter().map(|day| day.date)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(date: &str, status: DayStatus) -> OpenDay {
        OpenDay {
            date: date.parse().unwrap(),
            status,
        }
    }

    fn some_backlog() -> Backlog {
        Backlog::from_remote([
            open("2026-01-04", DayStatus::Prepared),
            open("2026-01-03", DayStatus::Error),
        ])
    }

    #[test]
    fn keeps_remote_order() {
        let dates: Vec<String> = some_backlog().dates().map(|d| d.to_string()).collect();
        assert_eq!(vec!["2026-01-04", "2026-01-03"], dates);
    }

    #[test]
    fn duplicate_dates_keep_first_entry() {
        let backlog = Backlog::from_remote([
            open("2026-01-04", DayStatus::Prepared),
            open("2026-01-03", DayStatus::Error),
            open("2026-01-04", DayStatus::Error),
        ]);
        assert_eq!(2, backlog.len());
        assert_eq!(
            DayStatus::Prepared,
            backlog.get("2026-01-04".parse().unwrap()).unwrap().status
        );
    }

    #[test]
    fn remove_only_touches_the_given_date() {
        let mut backlog = some_backlog();
        assert!(backlog.remove("2026-01-03".parse().unwrap()));
        assert_eq!(
            Backlog::from_remote([open("2026-01-04", DayStatus::Prepared)]),
            backlog
        );
    }

    #[test]
    fn remove_missing_date() {
        let mut backlog = some_backlog();
        assert!(!backlog.remove("2026-01-01".parse().unwrap()));
        assert_eq!(some_backlog(), backlog);
    }

    #[test]
    fn empty() {
        assert!(Backlog::new_empty().is_empty());
        assert!(!some_backlog().is_empty());
    }
}
