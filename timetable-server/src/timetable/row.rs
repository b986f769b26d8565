//! Timetable rows.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{ClockTime, Departure, Station, StationId, format_duration};
use crate::matrix::TravelEstimate;

use super::{DestinationIndex, resolve_arrival};

/// Station name and ID as shown in a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRef {
    pub name: String,
    pub id: StationId,
}

impl From<&Station> for StationRef {
    fn from(station: &Station) -> Self {
        Self {
            name: station.name.clone(),
            id: station.id,
        }
    }
}

/// One trip between the requested stations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableRow {
    /// ID of the source departure.
    pub id: i32,
    pub direction: String,
    pub line: String,
    pub from_station: StationRef,
    pub to_station: StationRef,
    /// "HH:MM"
    pub departure_at: String,
    /// "HH:MM"
    pub arrive_at: String,
    /// Wall-clock travel time, "HH:MM".
    pub duration: String,
    /// Road distance in km.
    pub distance: f64,
}

/// Turn source departures into rows ordered by departure time.
///
/// Departures with malformed times, directions missing from `index`, and
/// rows whose arrival can't be resolved are dropped. Rows with equal
/// departure times are ordered by departure ID, so the output does not depend
/// on the order the store returned them in.
pub fn assemble_rows(
    departures: &[Departure],
    index: &DestinationIndex,
    from: &Station,
    to: &Station,
    estimate: TravelEstimate,
) -> Vec<TimetableRow> {
    let from_ref = StationRef::from(from);
    let to_ref = StationRef::from(to);

    let mut rows: Vec<(ClockTime, TimetableRow)> = departures
        .iter()
        .filter_map(|dep| {
            let departs = match dep.clock_time() {
                Ok(t) => t,
                Err(e) => {
                    warn!(
                        departure = dep.id,
                        time = %dep.departure_time,
                        error = %e,
                        "Skipping departure with malformed time"
                    );
                    return None;
                }
            };

            let Some(candidates) = index.get(&dep.direction) else {
                debug!(
                    departure = dep.id,
                    direction = %dep.direction,
                    "Skipping departure: direction does not reach destination"
                );
                return None;
            };

            let arrives = resolve_arrival(
                &dep.departure_time,
                &dep.direction,
                candidates,
                estimate.duration_minutes,
            )
            .ok()?;

            let row = TimetableRow {
                id: dep.id,
                direction: dep.direction.clone(),
                line: dep.line.name.clone(),
                from_station: from_ref.clone(),
                to_station: to_ref.clone(),
                departure_at: departs.to_string(),
                arrive_at: arrives.to_string(),
                duration: format_duration(departs.minutes_until(arrives)),
                distance: estimate.distance_km,
            };
            Some((departs, row))
        })
        .collect();

    rows.sort_by_key(|(departs, row)| (*departs, row.id));
    rows.into_iter().map(|(_, row)| row).collect()
}
