mod import;
mod in_flight;
mod live;
mod orchestrator;
mod outcome;

#[cfg(test)]
mod testutils;

pub use in_flight::{FlightKey, FlightToken, InFlight};
pub use orchestrator::{Orchestrator, Snapshot};
pub use outcome::Outcome;
