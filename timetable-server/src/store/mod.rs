//! Read-only access to stations, lines, directions and departures.
//!
//! The timetable engine only talks to these traits. Two backends exist:
//! [`PgStore`] for the production Postgres database and [`MemoryStore`] for
//! tests and local development from a JSON fixture.

mod error;
mod memory;
mod postgres;

use std::future::Future;

pub use error::StoreError;
pub use memory::{MemoryStore, MemoryStoreBuilder};
pub use postgres::{PgStore, PostgresConfig};

use crate::domain::{
    Departure, Direction, Line, ScheduleType, Station, StationCode, StationId, StopCode,
};

/// Filters for station listings.
#[derive(Debug, Clone, Default)]
pub struct StationFilter {
    /// Case-insensitive station name prefix.
    pub name: Option<String>,
    /// Case-insensitive line name substring.
    pub line: Option<String>,
}

/// Offset pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
        }
    }
}

/// Station lookups.
pub trait StationStore: Send + Sync {
    /// Find a station with its stop codes, or `None` if the ID is unknown.
    fn find_station_by_id(
        &self,
        id: StationId,
    ) -> impl Future<Output = Result<Option<Station>, StoreError>> + Send;

    /// List stations ordered by name, each with the names of lines serving it.
    fn list_stations(
        &self,
        page: Page,
        filter: &StationFilter,
    ) -> impl Future<Output = Result<Vec<Station>, StoreError>> + Send;

    /// Resolve a stop code to its owning station.
    fn find_station_code(
        &self,
        code: StopCode,
    ) -> impl Future<Output = Result<Option<StationCode>, StoreError>> + Send;
}

/// Line lookups.
pub trait LineStore: Send + Sync {
    /// All lines, ordered by their numeric part.
    fn list_lines(&self) -> impl Future<Output = Result<Vec<Line>, StoreError>> + Send;

    /// Lines serving both stations.
    fn find_shared_lines(
        &self,
        from: StationId,
        to: StationId,
    ) -> impl Future<Output = Result<Vec<Line>, StoreError>> + Send;
}

/// Direction lookups.
pub trait DirectionStore: Send + Sync {
    /// Directions with at least one departure from `code` in any schedule,
    /// ordered by direction ID.
    fn find_directions_by_code(
        &self,
        code: StopCode,
    ) -> impl Future<Output = Result<Vec<Direction>, StoreError>> + Send;

    /// Names of directions with departures from both codes in any schedule,
    /// ordered by name.
    fn find_shared_directions(
        &self,
        from: StopCode,
        to: StopCode,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;
}

/// Departure lookups. Callers must not rely on the order of results.
pub trait DepartureStore: Send + Sync {
    /// Departures from `from` whose direction also departs from `to` in the
    /// same schedule.
    fn find_departures(
        &self,
        from: StopCode,
        to: StopCode,
        schedule: ScheduleType,
    ) -> impl Future<Output = Result<Vec<Departure>, StoreError>> + Send;

    /// Departures from `code` in one direction.
    fn find_departures_by_code_and_direction(
        &self,
        code: StopCode,
        direction: &str,
        schedule: ScheduleType,
    ) -> impl Future<Output = Result<Vec<Departure>, StoreError>> + Send;
}

/// Everything the timetable engine reads.
pub trait TimetableStore: StationStore + DirectionStore + DepartureStore {}

impl<T: StationStore + DirectionStore + DepartureStore> TimetableStore for T {}
