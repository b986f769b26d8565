//! Lines, directions and departure records.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ClockTime, ScheduleType, StopCode, TimeError};

/// A bus line such as "3" or "6A".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    pub id: i32,
    pub name: String,
}

impl Line {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Order line names by their numeric part ("2" < "6A" < "10"), then by name.
pub fn compare_line_names(a: &str, b: &str) -> Ordering {
    line_number(a)
        .cmp(&line_number(b))
        .then_with(|| a.cmp(b))
}

/// Digits of a line name read as a number; names without digits sort last.
fn line_number(name: &str) -> u64 {
    let digits: String = name.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(u64::MAX)
}

/// A scraped direction label, e.g. "Center - Tezno".
///
/// Directions are opaque grouping keys: departures sharing one travel the same
/// route segment in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Direction {
    pub id: i32,
    pub name: String,
}

/// One scheduled departure of a line from a stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    pub id: i32,
    pub stop_code: StopCode,
    pub line: Line,
    pub direction: String,
    /// Clock time as scraped. Not guaranteed to be well formed.
    pub departure_time: String,
    pub schedule: ScheduleType,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Departure {
    /// Parse the scraped departure time.
    pub fn clock_time(&self) -> Result<ClockTime, TimeError> {
        ClockTime::parse(&self.departure_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_ordering_is_numeric() {
        let mut names = vec!["10", "6A", "2", "6", "G1", "Night"];
        names.sort_by(|a, b| compare_line_names(a, b));
        assert_eq!(names, vec!["G1", "2", "6", "6A", "10", "Night"]);
    }

    #[test]
    fn clock_time_parses_scraped_value() {
        let dep = Departure {
            id: 1,
            stop_code: StopCode(101),
            line: Line::new(1, "6"),
            direction: "Center - Tezno".into(),
            departure_time: "8:05".into(),
            schedule: ScheduleType::Weekday,
            created_at: None,
            updated_at: None,
        };
        assert_eq!(dep.clock_time().unwrap().to_string(), "08:05");

        let broken = Departure {
            departure_time: "--:--".into(),
            ..dep
        };
        assert!(broken.clock_time().is_err());
    }
}
