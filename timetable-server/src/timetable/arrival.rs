//! Arrival time at the destination.

use crate::domain::{ClockTime, Departure, TimeError};

/// Arrival time for a bus leaving at `from_time` in `direction`.
///
/// The bus is taken to arrive at the first departure in the same direction
/// from the destination stop strictly after `from_time`. With no such
/// departure (the destination is the last stop, or the last bus of the day
/// has passed), arrival is estimated as `from_time + round(travel_minutes)`.
///
/// Candidates with malformed times are skipped; a malformed `from_time` is an
/// error.
///
/// ```
/// use timetable_server::timetable::resolve_arrival;
///
/// let arrival = resolve_arrival("08:00", "Center - Tezno", &[], 17.4).unwrap();
/// assert_eq!(arrival.to_string(), "08:17");
/// ```
pub fn resolve_arrival(
    from_time: &str,
    direction: &str,
    candidates: &[Departure],
    travel_minutes: f64,
) -> Result<ClockTime, TimeError> {
    let from = ClockTime::parse(from_time)?;

    let next = candidates
        .iter()
        .filter(|d| d.direction == direction)
        .filter_map(|d| d.clock_time().ok())
        .filter(|&t| t > from)
        .min();

    Ok(next.unwrap_or_else(|| from.add_minutes(estimate_minutes(travel_minutes))))
}

/// Whole minutes of travel; non-finite estimates count as zero.
fn estimate_minutes(travel_minutes: f64) -> i64 {
    if travel_minutes.is_finite() {
        travel_minutes.round() as i64
    } else {
        0
    }
}
