//! Clock time handling for scraped timetables.
//!
//! Departure records carry a bare "HH:MM" clock value with no date attached.
//! Arithmetic on these values wraps around midnight: a bus leaving at 23:50
//! with a 20 minute ride arrives at 00:10.

use chrono::{Duration, NaiveTime, Timelike};
use std::fmt;

/// Minutes in one day.
const MINUTES_PER_DAY: i64 = 24 * 60;

/// Error returned when parsing an invalid clock string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid clock time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A wall-clock time of day with minute precision.
///
/// # Examples
///
/// ```
/// use timetable_server::domain::ClockTime;
///
/// let t = ClockTime::parse("08:05").unwrap();
/// assert_eq!(t.to_string(), "08:05");
///
/// // Single-digit hours are accepted, as the source data is not always padded
/// assert_eq!(ClockTime::parse("8:05").unwrap(), t);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Create a clock time from hour and minute components.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Parse "HH:MM" (or "H:MM").
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_server::domain::ClockTime;
    ///
    /// assert!(ClockTime::parse("00:00").is_ok());
    /// assert!(ClockTime::parse("23:59").is_ok());
    ///
    /// assert!(ClockTime::parse("1430").is_err());
    /// assert!(ClockTime::parse("14:3").is_err());
    /// assert!(ClockTime::parse("24:00").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let (hour_part, minute_part) = s
            .split_once(':')
            .ok_or_else(|| TimeError::new("expected HH:MM format"))?;

        if hour_part.is_empty() || hour_part.len() > 2 {
            return Err(TimeError::new("hour must have one or two digits"));
        }
        if minute_part.len() != 2 {
            return Err(TimeError::new("minute must have two digits"));
        }

        let hour = parse_digits(hour_part.as_bytes())
            .ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute = parse_digits(minute_part.as_bytes())
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        Self::from_hm(hour, minute).ok_or_else(|| TimeError::new("invalid time"))
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Minutes elapsed since midnight.
    pub fn minutes_from_midnight(&self) -> i64 {
        i64::from(self.hour()) * 60 + i64::from(self.minute())
    }

    /// Add whole minutes, wrapping past midnight.
    ///
    /// ```
    /// use timetable_server::domain::ClockTime;
    ///
    /// let t = ClockTime::parse("23:50").unwrap();
    /// assert_eq!(t.add_minutes(20).to_string(), "00:10");
    /// ```
    pub fn add_minutes(&self, minutes: i64) -> Self {
        let (time, _) = self
            .0
            .overflowing_add_signed(Duration::minutes(minutes.rem_euclid(MINUTES_PER_DAY)));
        Self(time)
    }

    /// Wall-clock minutes from `self` forward to `later`.
    ///
    /// A `later` value that reads earlier than `self` is taken to be on the
    /// following day.
    pub fn minutes_until(&self, later: ClockTime) -> i64 {
        (later.minutes_from_midnight() - self.minutes_from_midnight()).rem_euclid(MINUTES_PER_DAY)
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Format a number of minutes as "HH:MM".
///
/// ```
/// use timetable_server::domain::format_duration;
///
/// assert_eq!(format_duration(17), "00:17");
/// assert_eq!(format_duration(75), "01:15");
/// ```
pub fn format_duration(minutes: i64) -> String {
    let minutes = minutes.max(0);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Parse one or two ASCII digit bytes into a u32.
fn parse_digits(bytes: &[u8]) -> Option<u32> {
    bytes.iter().try_fold(0u32, |acc, &b| {
        let digit = (b as char).to_digit(10)?;
        Some(acc * 10 + digit)
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn valid_time()(hour in 0u32..24, minute in 0u32..60) -> String {
            format!("{:02}:{:02}", hour, minute)
        }
    }

    proptest! {
        /// Parse then display roundtrips
        #[test]
        fn parse_display_roundtrip(time_str in valid_time()) {
            let parsed = ClockTime::parse(&time_str).unwrap();
            prop_assert_eq!(parsed.to_string(), time_str);
        }

        #[test]
        fn invalid_hour_rejected(hour in 24u32..100, minute in 0u32..60) {
            let s = format!("{:02}:{:02}", hour, minute);
            prop_assert!(ClockTime::parse(&s).is_err());
        }

        #[test]
        fn invalid_minute_rejected(hour in 0u32..24, minute in 60u32..100) {
            let s = format!("{:02}:{:02}", hour, minute);
            prop_assert!(ClockTime::parse(&s).is_err());
        }

        /// Adding the gap between two times lands on the later one
        #[test]
        fn add_then_until_agree(
            h1 in 0u32..24, m1 in 0u32..60,
            h2 in 0u32..24, m2 in 0u32..60,
        ) {
            let a = ClockTime::from_hm(h1, m1).unwrap();
            let b = ClockTime::from_hm(h2, m2).unwrap();
            let gap = a.minutes_until(b);
            prop_assert!((0..MINUTES_PER_DAY).contains(&gap));
            prop_assert_eq!(a.add_minutes(gap), b);
        }
    }
}
