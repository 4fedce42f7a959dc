//! Interval units, formatting and parsing
//!
//! Intervals are whole minutes. Display strings use the compact `d`/`h`/`m`
//! notation of the settings screen (`"3d"`, `"1d 12h"`, `"30m"`).

use std::fmt;
use std::str::FromStr;

pub const MIN_PER_HOUR: u32 = 60;
pub const MIN_PER_DAY: u32 = 1440;

/// Exclusive upper bound on any interval (just over 19 years)
pub const MAX_INTERVAL_MINUTES: u32 = 10_000_000;

/// Unit suffix of an interval token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalUnit {
    Minutes,
    Hours,
    Days,
}

impl IntervalUnit {
    /// Minutes in one unit
    pub fn minutes(self) -> u32 {
        match self {
            IntervalUnit::Minutes => 1,
            IntervalUnit::Hours => MIN_PER_HOUR,
            IntervalUnit::Days => MIN_PER_DAY,
        }
    }

    pub fn suffix(self) -> char {
        match self {
            IntervalUnit::Minutes => 'm',
            IntervalUnit::Hours => 'h',
            IntervalUnit::Days => 'd',
        }
    }

    fn from_suffix(c: char) -> Option<Self> {
        match c {
            'm' => Some(IntervalUnit::Minutes),
            'h' => Some(IntervalUnit::Hours),
            'd' => Some(IntervalUnit::Days),
            _ => None,
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

impl FromStr for IntervalUnit {
    type Err = ParseIntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let mut chars = lowered.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                IntervalUnit::from_suffix(c).ok_or_else(|| ParseIntervalError::UnknownUnit(s.to_string()))
            }
            _ => Err(ParseIntervalError::UnknownUnit(s.to_string())),
        }
    }
}

/// Interval token parse failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseIntervalError {
    #[error("empty interval")]
    Empty,
    #[error("invalid interval '{0}', expected a number with an optional m/h/d suffix")]
    Invalid(String),
    #[error("unknown interval unit '{0}'")]
    UnknownUnit(String),
    #[error("interval must be positive")]
    Zero,
    #[error("interval '{0}' is too long")]
    TooLarge(String),
}

/// Render minutes as the largest fitting compound unit.
///
/// Days and hours appear when nonzero; minutes only when nothing larger does.
pub fn format_duration(minutes: u32) -> String {
    let d = minutes / MIN_PER_DAY;
    let h = (minutes % MIN_PER_DAY) / MIN_PER_HOUR;
    let m = minutes % MIN_PER_HOUR;

    let mut parts = Vec::with_capacity(2);
    if d > 0 {
        parts.push(format!("{d}d"));
    }
    if h > 0 {
        parts.push(format!("{h}h"));
    }
    if m > 0 && parts.is_empty() {
        parts.push(format!("{m}m"));
    }

    if parts.is_empty() {
        "0m".to_string()
    } else {
        parts.join(" ")
    }
}

/// Parse one token such as `"5m"`, `"12h"`, `"3d"` or a bare `"3"` (days).
pub fn parse_interval_token(token: &str) -> Result<u32, ParseIntervalError> {
    let s = token.trim().to_lowercase();
    if s.is_empty() {
        return Err(ParseIntervalError::Empty);
    }

    let digits_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if digits_end == 0 {
        return Err(ParseIntervalError::Invalid(token.trim().to_string()));
    }
    let (digits, rest) = s.split_at(digits_end);

    let unit = match rest.trim_start() {
        "" => IntervalUnit::Days,
        suffix => suffix.parse::<IntervalUnit>().map_err(|_| ParseIntervalError::Invalid(token.trim().to_string()))?,
    };

    let value: u64 = digits
        .parse()
        .map_err(|_| ParseIntervalError::TooLarge(token.trim().to_string()))?;
    if value == 0 {
        return Err(ParseIntervalError::Zero);
    }

    let minutes = value.saturating_mul(u64::from(unit.minutes()));
    if minutes >= u64::from(MAX_INTERVAL_MINUTES) {
        return Err(ParseIntervalError::TooLarge(token.trim().to_string()));
    }
    Ok(minutes as u32)
}

/// Parse a comma-separated schedule, dropping invalid tokens.
///
/// The result is ascending and duplicate-free; it may be empty.
pub fn parse_schedule(input: &str) -> Vec<u32> {
    let mut minutes: Vec<u32> = input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter_map(|t| match parse_interval_token(t) {
            Ok(m) => Some(m),
            Err(e) => {
                tracing::debug!(token = t, error = %e, "Dropping schedule token");
                None
            }
        })
        .collect();
    minutes.sort_unstable();
    minutes.dedup();
    minutes
}

/// Largest unit that divides `minutes` exactly.
pub fn best_unit(minutes: u32) -> (u32, IntervalUnit) {
    if minutes > 0 && minutes % MIN_PER_DAY == 0 {
        (minutes / MIN_PER_DAY, IntervalUnit::Days)
    } else if minutes > 0 && minutes % MIN_PER_HOUR == 0 {
        (minutes / MIN_PER_HOUR, IntervalUnit::Hours)
    } else {
        (minutes, IntervalUnit::Minutes)
    }
}

/// One-line preview of a schedule: `"3d → 7d → every 30d"`.
pub fn describe_schedule(stages: &[u32], rolling_minutes: u32) -> String {
    if stages.is_empty() {
        return "—".to_string();
    }
    let mut out = stages
        .iter()
        .map(|&m| format_duration(m))
        .collect::<Vec<_>>()
        .join(" → ");
    if rolling_minutes > 0 {
        out.push_str(" → every ");
        out.push_str(&format_duration(rolling_minutes));
    }
    out
}
