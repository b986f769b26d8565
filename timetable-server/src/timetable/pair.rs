//! Choosing which stop codes connect two stations.
//!
//! A station may own several stop codes (one per platform or side of the
//! road), and only some combinations are served by a common line. Two
//! strategies are tried in order:
//!
//! 1. Final stop: a direction leaving from one of the origin's codes whose
//!    label ends with the destination name. Buses terminating at the
//!    destination have no onward departures there, so the direct lookup
//!    below would never find them.
//! 2. Direct: every `(from, to)` code combination in declaration order; the
//!    first with departures whose direction also departs from `to` wins.

use tracing::debug;

use crate::domain::{Departure, ScheduleType, Station, StopCode};
use crate::store::{DepartureStore, DirectionStore};

use super::TimetableError;

/// The stop codes and departures that connect two stations.
#[derive(Debug, Clone, PartialEq)]
pub struct DeparturePair {
    pub from_code: StopCode,
    /// `None` when the destination is the final stop of the chosen direction.
    pub to_code: Option<StopCode>,
    pub departures: Vec<Departure>,
}

impl DeparturePair {
    pub fn is_terminal(&self) -> bool {
        self.to_code.is_none()
    }
}

/// Find the first valid departure pair between two stations.
pub async fn find_valid_pair<S>(
    store: &S,
    from: &Station,
    to: &Station,
    schedule: ScheduleType,
) -> Result<DeparturePair, TimetableError>
where
    S: DirectionStore + DepartureStore,
{
    if let Some(pair) = find_terminal_pair(store, from, to, schedule).await? {
        return Ok(pair);
    }

    for &from_code in &from.codes {
        for &to_code in &to.codes {
            let departures = store.find_departures(from_code, to_code, schedule).await?;
            if !departures.is_empty() {
                debug!(
                    %from_code,
                    %to_code,
                    count = departures.len(),
                    "Found departures via shared direction"
                );
                return Ok(DeparturePair {
                    from_code,
                    to_code: Some(to_code),
                    departures,
                });
            }
        }
    }

    Err(TimetableError::NoRoute {
        from: from.id,
        to: to.id,
    })
}

async fn find_terminal_pair<S>(
    store: &S,
    from: &Station,
    to: &Station,
    schedule: ScheduleType,
) -> Result<Option<DeparturePair>, TimetableError>
where
    S: DirectionStore + DepartureStore,
{
    for &from_code in &from.codes {
        let directions = store.find_directions_by_code(from_code).await?;

        for direction in directions.iter().filter(|d| to.is_terminus_of(&d.name)) {
            let departures = store
                .find_departures_by_code_and_direction(from_code, &direction.name, schedule)
                .await?;

            if !departures.is_empty() {
                debug!(
                    %from_code,
                    direction = %direction.name,
                    count = departures.len(),
                    "Found departures terminating at destination"
                );
                return Ok(Some(DeparturePair {
                    from_code,
                    to_code: None,
                    departures,
                }));
            }
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ScheduleType::Weekday, StationId};
    use crate::store::{MemoryStore, StationStore};

    async fn stations(store: &MemoryStore, from: i32, to: i32) -> (Station, Station) {
        let from = store.find_station_by_id(StationId(from)).await.unwrap().unwrap();
        let to = store.find_station_by_id(StationId(to)).await.unwrap().unwrap();
        (from, to)
    }

    #[tokio::test]
    async fn prefers_terminal_direction() {
        let store = MemoryStore::builder()
            .station(1, "Center", &[101])
            .station(2, "Tezno", &[300])
            .departures(101, "6", "Center - Tezno", Weekday, &["08:00"])
            .departures(101, "3", "Center - Melje", Weekday, &["08:05"])
            .departures(300, "3", "Center - Melje", Weekday, &["08:20"])
            .build();
        let (from, to) = stations(&store, 1, 2).await;

        let pair = find_valid_pair(&store, &from, &to, Weekday).await.unwrap();
        assert!(pair.is_terminal());
        assert_eq!(pair.from_code, StopCode(101));
        assert_eq!(pair.departures.len(), 1);
        assert_eq!(pair.departures[0].direction, "Center - Tezno");
    }

    #[tokio::test]
    async fn terminal_direction_without_departures_falls_through() {
        // The terminal direction only runs on Saturdays
        let store = MemoryStore::builder()
            .station(1, "Center", &[101])
            .station(2, "Tezno", &[300])
            .departures(101, "6", "Center - Tezno", ScheduleType::Saturday, &["08:00"])
            .departures(101, "3", "Center - Melje", Weekday, &["08:05"])
            .departures(300, "3", "Center - Melje", Weekday, &["08:20"])
            .build();
        let (from, to) = stations(&store, 1, 2).await;

        let pair = find_valid_pair(&store, &from, &to, Weekday).await.unwrap();
        assert_eq!(pair.to_code, Some(StopCode(300)));
        assert_eq!(pair.departures[0].direction, "Center - Melje");
    }

    #[tokio::test]
    async fn tries_later_terminal_directions() {
        let store = MemoryStore::builder()
            .station(1, "Center", &[101])
            .station(2, "Tezno", &[300])
            .departures(101, "6", "Center - Tezno", ScheduleType::Sunday, &["08:00"])
            .departures(101, "9", "Studenci - Tezno", Weekday, &["09:00"])
            .build();
        let (from, to) = stations(&store, 1, 2).await;

        let pair = find_valid_pair(&store, &from, &to, Weekday).await.unwrap();
        assert!(pair.is_terminal());
        assert_eq!(pair.departures[0].direction, "Studenci - Tezno");
    }

    #[tokio::test]
    async fn no_route() {
        let store = MemoryStore::builder()
            .station(1, "Center", &[101])
            .station(2, "Tezno", &[300])
            .departures(101, "3", "Center - Melje", Weekday, &["08:05"])
            .departures(300, "4", "Tabor - Pobrežje", Weekday, &["08:20"])
            .build();
        let (from, to) = stations(&store, 1, 2).await;

        let err = find_valid_pair(&store, &from, &to, Weekday).await.unwrap_err();
        assert!(matches!(
            err,
            TimetableError::NoRoute { from, to } if from == StationId(1) && to == StationId(2)
        ));
    }
}
