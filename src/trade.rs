use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Datelike, Duration, Utc};
use serde_json::Value;
use tracing::error;

use crate::extract::extract_value;
use crate::slack::Message;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fixed shift applied to every message time after conversion to UTC.
const UTC_OFFSET_HOURS: i64 = 3;

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Action,
    EntryPrice,
    ClosePrice,
    StopLossPrice,
    TakeProfitPrice,
    PositionSize,
    TotalPositionSize,
    ClosedPositionSize,
    NumberOfPositions,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Action,
        Field::EntryPrice,
        Field::ClosePrice,
        Field::StopLossPrice,
        Field::TakeProfitPrice,
        Field::PositionSize,
        Field::TotalPositionSize,
        Field::ClosedPositionSize,
        Field::NumberOfPositions,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Action => "Action",
            Field::EntryPrice => "Entry Price",
            Field::ClosePrice => "Close Price",
            Field::StopLossPrice => "Stop Loss Price",
            Field::TakeProfitPrice => "Take Profit Price",
            Field::PositionSize => "Position Size",
            Field::TotalPositionSize => "Total Position Size",
            Field::ClosedPositionSize => "Closed Position Size",
            Field::NumberOfPositions => "Number of Positions",
        }
    }

    fn prefix(self) -> String {
        format!("{}: ", self.label())
    }
}

/// One exported row. Values are kept exactly as they appear in the message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTrade {
    values: [Option<String>; 9],
    pub date: Option<String>,
}

impl ParsedTrade {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values[field as usize].as_deref()
    }

    /// Cell values in column order, `Date` last.
    pub fn cells(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        Field::ALL
            .iter()
            .map(move |f| self.get(*f))
            .chain(std::iter::once(self.date.as_deref()))
    }
}

pub fn parse_message(message: &Message) -> ParsedTrade {
    let date = match format_date(message.ts.as_ref()) {
        Ok(date) => Some(date),
        Err(e) => {
            error!("Error parsing timestamp for message: {}", e);
            None
        }
    };
    let mut trade = ParsedTrade {
        date,
        ..Default::default()
    };
    for field in Field::ALL.iter() {
        trade.values[*field as usize] =
            extract_value(&field.prefix(), &message.text).map(From::from);
    }
    trade
}

/// Drops `_` digit separators. Each one must sit between two digits.
fn strip_separators(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let separated = |i: usize| {
        i > 0
            && bytes[i - 1].is_ascii_digit()
            && bytes.get(i + 1).map_or(false, u8::is_ascii_digit)
    };
    if bytes
        .iter()
        .enumerate()
        .any(|(i, b)| *b == b'_' && !separated(i))
    {
        return None;
    }
    Some(s.replace('_', ""))
}

fn seconds(ts: Option<&Value>) -> Result<f64> {
    match ts {
        Some(Value::String(s)) => strip_separators(s.trim())
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| anyhow!("could not convert string to float: {:?}", s)),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| anyhow!("unrepresentable timestamp {}", n)),
        Some(Value::Bool(b)) => Ok(if *b { 1.0 } else { 0.0 }),
        Some(other) => bail!("unsupported timestamp value {}", other),
        None => bail!("missing ts"),
    }
}

fn in_calendar_range(dt: &DateTime<Utc>) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&dt.year())
}

/// Converts a message timestamp to UTC shifted by a fixed three hours.
/// Dates outside years 1 to 9999, before or after the shift, are rejected.
pub fn format_date(ts: Option<&Value>) -> Result<String> {
    let secs = seconds(ts)?;
    let micros = (secs * 1_000_000.0).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        bail!("timestamp out of range: {}", secs)
    }
    let dt = DateTime::<Utc>::from_timestamp_micros(micros as i64)
        .filter(in_calendar_range)
        .and_then(|dt| dt.checked_add_signed(Duration::hours(UTC_OFFSET_HOURS)))
        .filter(in_calendar_range)
        .ok_or_else(|| anyhow!("timestamp out of range: {}", secs))?;
    Ok(dt.format(DATE_FORMAT).to_string())
}
