//! Schedule partitions and calendar helpers.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Date format used by the API and by cache keys.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which day-type timetable a departure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleType {
    Weekday,
    Saturday,
    Sunday,
}

/// Error returned when parsing an unknown schedule name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown schedule type: {0}")]
pub struct InvalidScheduleType(String);

impl ScheduleType {
    /// Classify a calendar date.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use timetable_server::domain::ScheduleType;
    ///
    /// let saturday = NaiveDate::from_ymd_opt(2025, 5, 17).unwrap();
    /// assert_eq!(ScheduleType::classify(saturday), ScheduleType::Saturday);
    /// ```
    pub fn classify(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat => ScheduleType::Saturday,
            Weekday::Sun => ScheduleType::Sunday,
            _ => ScheduleType::Weekday,
        }
    }

    /// Classify a `YYYY-MM-DD` string. Unparseable input yields `Weekday`.
    pub fn from_date_str(date: &str) -> Self {
        NaiveDate::parse_from_str(date, DATE_FORMAT)
            .map(Self::classify)
            .unwrap_or(ScheduleType::Weekday)
    }

    /// The name stored in the `departures.schedule_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleType::Weekday => "weekday",
            ScheduleType::Saturday => "saturday",
            ScheduleType::Sunday => "sunday",
        }
    }
}

impl fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleType {
    type Err = InvalidScheduleType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekday" => Ok(ScheduleType::Weekday),
            "saturday" => Ok(ScheduleType::Saturday),
            "sunday" => Ok(ScheduleType::Sunday),
            other => Err(InvalidScheduleType(other.to_string())),
        }
    }
}

/// Today's local date as `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().date_naive().format(DATE_FORMAT).to_string()
}

/// Whether `date` is a valid `YYYY-MM-DD` string.
pub fn is_valid_date(date: &str) -> bool {
    NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn classify_days() {
        // 2025-05-12 is a Monday
        assert_eq!(ScheduleType::classify(date(2025, 5, 12)), ScheduleType::Weekday);
        assert_eq!(ScheduleType::classify(date(2025, 5, 16)), ScheduleType::Weekday);
        assert_eq!(ScheduleType::classify(date(2025, 5, 17)), ScheduleType::Saturday);
        assert_eq!(ScheduleType::classify(date(2025, 5, 18)), ScheduleType::Sunday);
    }

    #[test]
    fn from_date_str_parses() {
        assert_eq!(ScheduleType::from_date_str("2025-05-17"), ScheduleType::Saturday);
        assert_eq!(ScheduleType::from_date_str("2025-05-18"), ScheduleType::Sunday);
        assert_eq!(ScheduleType::from_date_str("2025-05-14"), ScheduleType::Weekday);
    }

    #[test]
    fn from_date_str_fails_closed() {
        assert_eq!(ScheduleType::from_date_str(""), ScheduleType::Weekday);
        assert_eq!(ScheduleType::from_date_str("not-a-date"), ScheduleType::Weekday);
        assert_eq!(ScheduleType::from_date_str("2025-02-30"), ScheduleType::Weekday);
        assert_eq!(ScheduleType::from_date_str("17/05/2025"), ScheduleType::Weekday);
    }

    #[test]
    fn name_roundtrip() {
        for schedule in [
            ScheduleType::Weekday,
            ScheduleType::Saturday,
            ScheduleType::Sunday,
        ] {
            assert_eq!(schedule.as_str().parse::<ScheduleType>().unwrap(), schedule);
        }
        assert!("holiday".parse::<ScheduleType>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&ScheduleType::Saturday).unwrap();
        assert_eq!(json, r#""saturday""#);
    }

    #[test]
    fn date_validation() {
        assert!(is_valid_date("2025-05-17"));
        assert!(!is_valid_date("2025-13-01"));
        assert!(!is_valid_date("tomorrow"));
        assert!(is_valid_date(&today()));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn valid_date()(
            year in 2000i32..2100,
            month in 1u32..=12,
            day in 1u32..=28
        ) -> NaiveDate {
            NaiveDate::from_ymd_opt(year, month, day).unwrap()
        }
    }

    proptest! {
        /// Classifying a formatted date agrees with classifying the date itself
        #[test]
        fn string_and_date_agree(d in valid_date()) {
            let s = d.format(DATE_FORMAT).to_string();
            prop_assert_eq!(ScheduleType::from_date_str(&s), ScheduleType::classify(d));
        }

        #[test]
        fn weekend_classification(d in valid_date()) {
            let expected = match d.weekday() {
                Weekday::Sat => ScheduleType::Saturday,
                Weekday::Sun => ScheduleType::Sunday,
                _ => ScheduleType::Weekday,
            };
            prop_assert_eq!(ScheduleType::classify(d), expected);
        }

        #[test]
        fn garbage_is_weekday(s in "[a-z ]{0,12}") {
            prop_assert_eq!(ScheduleType::from_date_str(&s), ScheduleType::Weekday);
        }
    }
}
