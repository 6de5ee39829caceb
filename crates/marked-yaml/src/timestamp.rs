//! YAML timestamps.
//!
//! Parsing follows the YAML 1.1 timestamp grammar. A bare `YYYY-MM-DD` becomes
//! a date; anything with a time part becomes a [`Timestamp`], which is aware
//! when an offset (`Z`, `z` or `±HH[:MM]`) is present and naive otherwise.

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)^
        (?P<year>[0-9]{4})-(?P<month>[0-9]{1,2})-(?P<day>[0-9]{1,2})
        (?:
            (?:[Tt]|[\ \t]+)
            (?P<hour>[0-9]{1,2}):(?P<minute>[0-9]{2}):(?P<second>[0-9]{2})
            (?:\.(?P<fraction>[0-9]*))?
            (?:[\ \t]*(?P<tz>[Zz]|(?P<tz_sign>[-+])(?P<tz_hour>[0-9]{1,2})(?::(?P<tz_minute>[0-9]{2}))?))?
        )?$",
    )
    .expect("timestamp pattern is valid")
});

/// A date-time with or without a UTC offset.
///
/// Naive and aware timestamps never compare equal and have no ordering
/// between them. Aware timestamps compare by instant.
#[derive(Debug, Clone, Copy)]
pub enum Timestamp {
    Naive(NaiveDateTime),
    Aware(DateTime<FixedOffset>),
}

/// Result of parsing a timestamp scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedTimestamp {
    Date(NaiveDate),
    DateTime(Timestamp),
}

impl Timestamp {
    /// Wall-clock time as written in the source.
    pub fn naive_local(&self) -> NaiveDateTime {
        match self {
            Timestamp::Naive(dt) => *dt,
            Timestamp::Aware(dt) => dt.naive_local(),
        }
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        match self {
            Timestamp::Naive(_) => None,
            Timestamp::Aware(dt) => Some(*dt.offset()),
        }
    }

    pub fn is_naive(&self) -> bool {
        matches!(self, Timestamp::Naive(_))
    }

    pub fn is_utc(&self) -> bool {
        self.offset().is_some_and(|o| o.local_minus_utc() == 0)
    }

    pub fn year(&self) -> i32 {
        self.naive_local().year()
    }

    pub fn month(&self) -> u32 {
        self.naive_local().month()
    }

    pub fn day(&self) -> u32 {
        self.naive_local().day()
    }

    pub fn hour(&self) -> u32 {
        self.naive_local().hour()
    }

    pub fn minute(&self) -> u32 {
        self.naive_local().minute()
    }

    pub fn second(&self) -> u32 {
        self.naive_local().second()
    }

    /// Fractional seconds in microseconds (six digits of precision)
    pub fn microsecond(&self) -> u32 {
        self.naive_local().nanosecond() / 1_000
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Timestamp::Naive(a), Timestamp::Naive(b)) => a == b,
            (Timestamp::Aware(a), Timestamp::Aware(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Timestamp {}

impl Hash for Timestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Timestamp::Naive(dt) => {
                0u8.hash(state);
                dt.hash(state);
            }
            Timestamp::Aware(dt) => {
                1u8.hash(state);
                dt.naive_utc().hash(state);
            }
        }
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Timestamp::Naive(a), Timestamp::Naive(b)) => Some(a.cmp(b)),
            (Timestamp::Aware(a), Timestamp::Aware(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let local = self.naive_local();
        write!(f, "{}", local.format("%Y-%m-%d %H:%M:%S"))?;
        let micros = self.microsecond();
        if micros != 0 {
            write!(f, ".{micros:06}")?;
        }
        if let Some(offset) = self.offset() {
            write!(f, "{offset}")?;
        }
        Ok(())
    }
}

/// Parse a YAML timestamp scalar.
///
/// Fractional seconds are padded or truncated to six digits. Returns None
/// when the text does not match the grammar or names an impossible date,
/// time or offset.
pub fn parse_timestamp(raw: &str) -> Option<ParsedTimestamp> {
    let caps = TIMESTAMP.captures(raw)?;
    let number = |name: &str| -> Option<u32> {
        caps.name(name).and_then(|m| m.as_str().parse().ok())
    };

    let year: i32 = caps.name("year")?.as_str().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, number("month")?, number("day")?)?;

    if caps.name("hour").is_none() {
        return Some(ParsedTimestamp::Date(date));
    }

    let micros = match caps.name("fraction") {
        Some(m) => {
            let mut digits: String = m.as_str().chars().take(6).collect();
            while digits.len() < 6 {
                digits.push('0');
            }
            digits.parse().ok()?
        }
        None => 0,
    };
    let time = NaiveTime::from_hms_micro_opt(
        number("hour")?,
        number("minute")?,
        number("second")?,
        micros,
    )?;
    let naive = NaiveDateTime::new(date, time);

    let offset_seconds = if let Some(sign) = caps.name("tz_sign") {
        let hours = number("tz_hour")? as i32;
        let minutes = number("tz_minute").unwrap_or(0) as i32;
        let seconds = hours * 3600 + minutes * 60;
        Some(if sign.as_str() == "-" { -seconds } else { seconds })
    } else if caps.name("tz").is_some() {
        Some(0)
    } else {
        None
    };

    let timestamp = match offset_seconds {
        Some(seconds) => {
            let offset = FixedOffset::east_opt(seconds)?;
            Timestamp::Aware(offset.from_local_datetime(&naive).single()?)
        }
        None => Timestamp::Naive(naive),
    };
    Some(ParsedTimestamp::DateTime(timestamp))
}
