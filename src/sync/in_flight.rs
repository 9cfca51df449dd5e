use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt::{self, Display};

/// What a write is addressed to. At most one write per key may be outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightKey {
    Day(NaiveDate),
    /// Collection and ledger posting of the historical import share one key,
    /// they're meant to run one after the other
    HistoricalImport,
    LiveMode,
}

impl Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightKey::Day(date) => write!(f, "day {date}"),
            FlightKey::HistoricalImport => write!(f, "the historical import"),
            FlightKey::LiveMode => write!(f, "live mode"),
        }
    }
}

/// Keys with a write currently outstanding
#[derive(Debug, Default)]
pub struct InFlight {
    keys: RefCell<HashSet<FlightKey>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns None if `key` is already taken. Otherwise the key stays taken
    /// until the returned token is dropped, whichever way the call ends.
    pub fn begin(&self, key: FlightKey) -> Option<FlightToken<'_>> {
        if self.keys.borrow_mut().insert(key) {
            Some(FlightToken { owner: self, key })
        } else {
            None
        }
    }

    pub fn contains(&self, key: FlightKey) -> bool {
        self.keys.borrow().contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.borrow().is_empty()
    }
}

#[must_use]
#[derive(Debug)]
pub struct FlightToken<'a> {
    owner: &'a InFlight,
    key: FlightKey,
}

impl FlightToken<'_> {
    pub fn key(&self) -> FlightKey {
        self.key
    }
}

impl Drop for FlightToken<'_> {
    fn drop(&mut self) {
        self.owner.keys.borrow_mut().remove(&self.key);
    }
}
