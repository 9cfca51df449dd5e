//! Display helpers for the dashboard. All pure, no state.

use chrono::{DateTime, Local, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::model::{DayStatus, ImportRange};

pub const CURRENCY: &str = "CHF";
pub const NOT_YET_SENT: &str = "Noch nicht gesendet";

const THOUSANDS_SEPARATOR: char = '’';

/// How a status should stand out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Pending,
    Failure,
    Neutral,
}

pub fn status_label(status: DayStatus) -> &'static str {
    match status {
        DayStatus::Sent => "An Klara gesendet",
        DayStatus::Prepared => "Vorbereitet – noch nicht gesendet",
        DayStatus::Error => "Fehler beim Senden",
        DayStatus::Unknown => "Unbekannter Status",
    }
}

pub fn status_tone(status: DayStatus) -> Tone {
    match status {
        DayStatus::Sent => Tone::Success,
        DayStatus::Prepared => Tone::Pending,
        DayStatus::Error => Tone::Failure,
        DayStatus::Unknown => Tone::Neutral,
    }
}

pub fn live_mode_label(enabled: bool) -> &'static str {
    if enabled {
        "AKTIV"
    } else {
        "INAKTIV"
    }
}

/// Swiss formatting: `CHF 1’234.50`, `CHF-5.00`
pub fn format_chf(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let (separator, magnitude) = if rounded.is_sign_negative() && !rounded.is_zero() {
        ("-", rounded.abs())
    } else {
        (" ", rounded.abs())
    };
    let digits = format!("{magnitude:.2}");
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
    format!("{CURRENCY}{separator}{}.{fraction}", group_thousands(integer))
}

fn group_thousands(integer: &str) -> String {
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(THOUSANDS_SEPARATOR);
        }
        grouped.push(digit);
    }
    grouped
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%d.%m.%Y, %H:%M:%S")
        .to_string()
}

pub fn format_time_of_day(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Time of the last successful send, or an explicit "not yet" marker
pub fn last_sync_label(last_sync_time: Option<DateTime<Utc>>) -> String {
    last_sync_time
        .map(format_time_of_day)
        .unwrap_or_else(|| NOT_YET_SENT.to_string())
}

pub fn format_range(range: &ImportRange) -> String {
    format!(
        "{} – {}",
        range.first_day.format("%d.%m.%Y"),
        range.last_day.format("%d.%m.%Y")
    )
}
