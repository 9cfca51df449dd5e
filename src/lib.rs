pub mod args;
pub mod cli;
pub mod config;
mod dashboard;
pub mod error;
pub mod format;
pub mod model;
pub mod service_api;
pub mod store;
pub mod sync;
mod terminal;
