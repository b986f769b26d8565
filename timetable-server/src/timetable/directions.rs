//! Departures at the destination, grouped by direction.

use std::collections::HashMap;

use crate::domain::{Departure, ScheduleType, Station};
use crate::store::{DepartureStore, DirectionStore, StoreError};

use super::DeparturePair;

/// Destination departures keyed by direction label.
///
/// A direction present with an empty list is one that terminates at the
/// destination: arrivals on it are estimated from travel time. A direction
/// absent from the index does not reach the destination at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestinationIndex {
    by_direction: HashMap<String, Vec<Departure>>,
}

impl DestinationIndex {
    pub fn get(&self, direction: &str) -> Option<&[Departure]> {
        self.by_direction.get(direction).map(Vec::as_slice)
    }

    pub fn contains(&self, direction: &str) -> bool {
        self.by_direction.contains_key(direction)
    }

    pub fn insert(&mut self, direction: impl Into<String>, departures: Vec<Departure>) {
        self.by_direction.insert(direction.into(), departures);
    }

    /// Add an empty slot for `direction` unless it is already indexed.
    pub fn ensure_slot(&mut self, direction: &str) {
        if !self.by_direction.contains_key(direction) {
            self.by_direction.insert(direction.to_string(), Vec::new());
        }
    }

    pub fn len(&self) -> usize {
        self.by_direction.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_direction.is_empty()
    }
}

/// Build the destination index for a departure pair.
pub async fn build_destination_index<S>(
    store: &S,
    pair: &DeparturePair,
    to: &Station,
    schedule: ScheduleType,
) -> Result<DestinationIndex, StoreError>
where
    S: DirectionStore + DepartureStore,
{
    let mut index = DestinationIndex::default();

    if let Some(to_code) = pair.to_code {
        let directions = store.find_shared_directions(pair.from_code, to_code).await?;
        for direction in directions {
            let departures = store
                .find_departures_by_code_and_direction(to_code, &direction, schedule)
                .await?;
            index.insert(direction, departures);
        }
    }

    for dep in &pair.departures {
        if to.is_terminus_of(&dep.direction) {
            index.ensure_slot(&dep.direction);
        }
    }

    Ok(index)
}
