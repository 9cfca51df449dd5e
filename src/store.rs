use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;

use crate::error::{Precondition, SyncError};
use crate::model::{Backlog, DayRecord, Freshness};

/// Issued when a fetch starts. Only a ticket that is still current may write
/// its result back, which keeps late responses from clobbering newer ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

/// Local cache of the selected day and the open-day backlog.
///
/// Every write replaces a whole record or removes a whole backlog entry.
#[derive(Debug, Default)]
pub struct DayRecordStore {
    selected_date: Option<NaiveDate>,
    selection_generation: u64,
    selected: Option<DayRecord>,
    day_freshness: Freshness,
    backlog: Backlog,
    backlog_generation: u64,
    backlog_freshness: Freshness,
    /// Dates that left the backlog locally, with the refresh generation at
    /// that time. A refresh issued before then must not bring them back.
    resolved: HashMap<NaiveDate, u64>,
}

impl DayRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    /// The record currently displayed. It may belong to an earlier selection
    /// while a fetch is outstanding or after one failed.
    pub fn selected(&self) -> Option<&DayRecord> {
        self.selected.as_ref()
    }

    pub fn day_freshness(&self) -> &Freshness {
        &self.day_freshness
    }

    pub fn backlog(&self) -> &Backlog {
        &self.backlog
    }

    pub fn backlog_freshness(&self) -> &Freshness {
        &self.backlog_freshness
    }

    pub fn begin_selection(&mut self, date: NaiveDate) -> Ticket {
        self.selection_generation += 1;
        self.selected_date = Some(date);
        self.day_freshness = Freshness::InFlight;
        Ticket {
            generation: self.selection_generation,
        }
    }

    pub fn is_current_selection(&self, ticket: Ticket) -> bool {
        ticket.generation == self.selection_generation
    }

    /// Returns false (and changes nothing) if the user has moved on to
    /// another day since `ticket` was issued.
    pub fn finish_selection(
        &mut self,
        ticket: Ticket,
        result: Result<DayRecord, SyncError>,
    ) -> bool {
        if !self.is_current_selection(ticket) {
            return false;
        }
        match result {
            Ok(record) => {
                self.selected = Some(record);
                self.day_freshness = Freshness::Fresh;
            }
            Err(err) => {
                self.day_freshness = Freshness::StaleAfterError(err);
            }
        }
        true
    }

    pub fn begin_backlog_refresh(&mut self) -> Ticket {
        self.backlog_generation += 1;
        self.backlog_freshness = Freshness::InFlight;
        Ticket {
            generation: self.backlog_generation,
        }
    }

    pub fn finish_backlog_refresh(
        &mut self,
        ticket: Ticket,
        result: Result<Backlog, SyncError>,
    ) -> bool {
        if ticket.generation != self.backlog_generation {
            return false;
        }
        let resolved = std::mem::take(&mut self.resolved);
        match result {
            Ok(mut backlog) => {
                for (date, generation) in resolved {
                    if generation >= ticket.generation && backlog.remove(date) {
                        log::debug!("Open day {date} was resolved meanwhile, dropping it");
                    }
                }
                self.backlog = backlog;
                self.backlog_freshness = Freshness::Fresh;
            }
            Err(err) => {
                self.backlog_freshness = Freshness::StaleAfterError(err);
            }
        }
        true
    }

    pub fn remove_from_backlog(&mut self, date: NaiveDate) -> bool {
        let removed = self.backlog.remove(date);
        if removed {
            self.mark_resolved(date);
        }
        removed
    }

    fn mark_resolved(&mut self, date: NaiveDate) {
        self.resolved.insert(date, self.backlog_generation);
    }

    /// The date `send_today` would send, if sending is allowed right now
    pub fn sendable_day(&self) -> Result<NaiveDate, Precondition> {
        let record = self.selected.as_ref().ok_or(Precondition::NothingSelected)?;
        let date = record.date();
        if let Some(selected_date) = self.selected_date {
            if selected_date != date {
                return Err(match self.day_freshness {
                    Freshness::StaleAfterError(_) => Precondition::SelectionFailed(selected_date),
                    _ => Precondition::SelectionPending(selected_date),
                });
            }
        }
        if record.is_sent() {
            return Err(Precondition::AlreadySent(date));
        }
        Ok(date)
    }

    fn displays(&self, date: NaiveDate) -> bool {
        self.selected_date == Some(date)
            && self.selected.as_ref().map(DayRecord::date) == Some(date)
    }

    pub fn send_started(&mut self, date: NaiveDate) {
        if self.displays(date) {
            self.day_freshness = Freshness::InFlight;
        }
    }

    /// Apply a confirmed send of `date`: the displayed record becomes sent if
    /// it is still that day, and the day leaves the backlog.
    pub fn confirm_sent(&mut self, date: NaiveDate, confirmed_at: DateTime<Utc>) {
        if self.displays(date) {
            if let Some(record) = self.selected.take() {
                self.selected = Some(record.mark_sent(confirmed_at));
                self.day_freshness = Freshness::Fresh;
            }
        }
        self.backlog.remove(date);
        self.mark_resolved(date);
    }

    /// Record a failed write for `date` without touching any data
    pub fn send_failed(&mut self, date: NaiveDate, err: SyncError) {
        if self.displays(date) {
            self.day_freshness = Freshness::StaleAfterError(err);
        }
    }
}
