//! Domain types for the bus timetable service.
//!
//! Stations, lines, directions and departures as read from storage, plus the
//! clock and schedule types the timetable engine computes with.

mod departure;
mod schedule;
mod station;
mod time;

pub use departure::{Departure, Direction, Line, compare_line_names};
pub use schedule::{DATE_FORMAT, InvalidScheduleType, ScheduleType, is_valid_date, today};
pub use station::{Station, StationCode, StationId, StopCode};
pub use time::{ClockTime, TimeError, format_duration};
