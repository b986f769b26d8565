//! Timetable generation.
//!
//! Answers "which buses go from station A to station B on this date, and when
//! do they arrive?" from per-stop departure records. There is no route graph:
//! departures are grouped by their free-text direction label, and a trip
//! exists wherever the origin and destination share a direction (or the
//! direction ends at the destination).
//!
//! The steps, in order:
//!
//! 1. Classify the date into a schedule partition.
//! 2. [`find_valid_pair`] picks the stop codes and source departures.
//! 3. [`build_destination_index`] fetches destination departures per
//!    direction.
//! 4. [`resolve_arrival`] matches each departure to an arrival.
//! 5. [`assemble_rows`] formats and sorts the rows.

mod arrival;
mod directions;
mod error;
mod pair;
mod row;
mod service;


pub use arrival::resolve_arrival;
pub use directions::{DestinationIndex, build_destination_index};
pub use error::TimetableError;
pub use pair::{DeparturePair, find_valid_pair};
pub use row::{StationRef, TimetableRow, assemble_rows};
pub use service::TimetableService;
