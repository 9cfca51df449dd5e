use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::parse_date;

/// Reconcile daily Shopify revenue with the Klara ledger.
#[derive(Parser, Debug)]
pub struct Args {
    /// Path to a YAML config file
    #[clap(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive dashboard (the default)
    Dashboard {
        /// Day to start with, YYYY-MM-DD. Defaults to today.
        #[clap(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Print the dashboard for a day and exit
    Show {
        /// YYYY-MM-DD, defaults to today
        #[clap(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Send a day's totals to the ledger
    Send {
        /// YYYY-MM-DD
        #[clap(short, long, value_parser = parse_date)]
        date: NaiveDate,
    },

    /// Send an open day again
    Resend {
        /// YYYY-MM-DD
        #[clap(short, long, value_parser = parse_date)]
        date: NaiveDate,
    },

    /// Collect all 2025 orders into daily totals
    Import {
        /// Post the collected totals to the ledger afterwards
        #[clap(long)]
        send: bool,
    },

    /// Show the connected ledger accounts
    Info,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand() {
        let args = Args::try_parse_from(["klara-sync"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn send_with_date() {
        let args =
            Args::try_parse_from(["klara-sync", "send", "--date", "2026-01-05", "-c", "a.yaml"])
                .unwrap();
        match args.command {
            Some(Command::Send { date }) => {
                assert_eq!(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(), date)
            }
            other => panic!("Unexpected command {other:?}"),
        }
        assert_eq!(Some(PathBuf::from("a.yaml")), args.config);
    }

    #[test]
    fn invalid_date_is_refused() {
        assert!(Args::try_parse_from(["klara-sync", "send", "--date", "2026-13-01"]).is_err());
        assert!(Args::try_parse_from(["klara-sync", "resend", "--date", "5.1.2026"]).is_err());
    }

    #[test]
    fn import_flags() {
        let args = Args::try_parse_from(["klara-sync", "import", "--send"]).unwrap();
        assert!(matches!(args.command, Some(Command::Import { send: true })));
    }
}
