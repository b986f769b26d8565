//! In-memory store backed by a JSON fixture.
//!
//! Serves the same queries as the Postgres store from plain vectors. Used by
//! the engine tests and for running the server without a database.
//!
//! Fixture layout:
//!
//! ```json
//! {
//!   "stations": [
//!     { "id": 1, "name": "Center", "lat": 46.56, "lon": 15.65, "codes": [101, 205] }
//!   ],
//!   "departures": [
//!     { "code": 101, "line": "6", "direction": "Center - Tezno",
//!       "schedule": "weekday", "times": ["08:00", "08:30"] }
//!   ]
//! }
//! ```

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::Deserialize;

use crate::domain::{
    Departure, Direction, Line, ScheduleType, Station, StationCode, StationId, StopCode,
    compare_line_names,
};

use super::{
    DepartureStore, DirectionStore, LineStore, Page, StationFilter, StationStore, StoreError,
};

#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    stations: Vec<FixtureStation>,
    #[serde(default)]
    departures: Vec<DepartureGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixtureStation {
    id: i32,
    name: String,
    #[serde(default)]
    image_url: String,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lon: f64,
    codes: Vec<i32>,
}

/// All departures of one line in one direction from one stop.
#[derive(Debug, Clone, Deserialize)]
struct DepartureGroup {
    code: i32,
    line: String,
    direction: String,
    schedule: ScheduleType,
    times: Vec<String>,
}

/// Read-only store holding everything in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    stations: Vec<Station>,
    station_codes: Vec<StationCode>,
    lines: Vec<Line>,
    directions: Vec<Direction>,
    departures: Vec<Departure>,
}

impl MemoryStore {
    /// Start building a store programmatically.
    pub fn builder() -> MemoryStoreBuilder {
        MemoryStoreBuilder::default()
    }

    /// Load a fixture file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Parse a fixture from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let fixture: Fixture = serde_json::from_str(json)?;

        let mut builder = MemoryStoreBuilder::default();
        for s in fixture.stations {
            let codes = s.codes.into_iter().map(StopCode).collect();
            let mut station = Station::new(StationId(s.id), s.name, codes).with_position(s.lat, s.lon);
            station.image_url = s.image_url;
            builder = builder.add_station(station);
        }
        builder.groups = fixture.departures;

        Ok(builder.build())
    }

    /// Number of departure records held.
    pub fn departure_count(&self) -> usize {
        self.departures.len()
    }

    /// Names of lines with a departure from any of the station's codes.
    fn lines_serving(&self, station: &Station) -> Vec<String> {
        let names: BTreeSet<&str> = self
            .departures
            .iter()
            .filter(|d| station.codes.contains(&d.stop_code))
            .map(|d| d.line.name.as_str())
            .collect();
        names.into_iter().map(str::to_string).collect()
    }

    fn departures_at(&self, code: StopCode) -> impl Iterator<Item = &Departure> {
        self.departures.iter().filter(move |d| d.stop_code == code)
    }
}

impl StationStore for MemoryStore {
    async fn find_station_by_id(&self, id: StationId) -> Result<Option<Station>, StoreError> {
        Ok(self.stations.iter().find(|s| s.id == id).cloned())
    }

    async fn list_stations(
        &self,
        page: Page,
        filter: &StationFilter,
    ) -> Result<Vec<Station>, StoreError> {
        let name_prefix = filter.name.as_deref().map(str::to_lowercase);
        let line_part = filter.line.as_deref().map(str::to_lowercase);

        let mut stations: Vec<Station> = self
            .stations
            .iter()
            .filter_map(|s| {
                if let Some(prefix) = &name_prefix
                    && !s.name.to_lowercase().starts_with(prefix.as_str())
                {
                    return None;
                }

                let lines = self.lines_serving(s);
                if let Some(part) = &line_part
                    && !lines.iter().any(|l| l.to_lowercase().contains(part.as_str()))
                {
                    return None;
                }

                Some(Station {
                    codes: Vec::new(),
                    lines,
                    ..s.clone()
                })
            })
            .collect();

        stations.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(stations
            .into_iter()
            .skip(page.offset.max(0) as usize)
            .take(page.limit.max(0) as usize)
            .collect())
    }

    async fn find_station_code(&self, code: StopCode) -> Result<Option<StationCode>, StoreError> {
        Ok(self.station_codes.iter().find(|c| c.code == code).copied())
    }
}

impl LineStore for MemoryStore {
    async fn list_lines(&self) -> Result<Vec<Line>, StoreError> {
        let mut lines = self.lines.clone();
        lines.sort_by(|a, b| compare_line_names(&a.name, &b.name));
        Ok(lines)
    }

    async fn find_shared_lines(
        &self,
        from: StationId,
        to: StationId,
    ) -> Result<Vec<Line>, StoreError> {
        let serving = |id: StationId| {
            self.stations
                .iter()
                .find(|s| s.id == id)
                .map(|s| self.lines_serving(s))
                .unwrap_or_default()
        };
        let from_lines = serving(from);
        let to_lines = serving(to);

        Ok(self
            .lines
            .iter()
            .filter(|l| from_lines.contains(&l.name) && to_lines.contains(&l.name))
            .cloned()
            .collect())
    }
}

impl DirectionStore for MemoryStore {
    async fn find_directions_by_code(&self, code: StopCode) -> Result<Vec<Direction>, StoreError> {
        let names: BTreeSet<&str> = self
            .departures_at(code)
            .map(|d| d.direction.as_str())
            .collect();

        // self.directions is in ID order already
        Ok(self
            .directions
            .iter()
            .filter(|d| names.contains(d.name.as_str()))
            .cloned()
            .collect())
    }

    async fn find_shared_directions(
        &self,
        from: StopCode,
        to: StopCode,
    ) -> Result<Vec<String>, StoreError> {
        let at_to: BTreeSet<&str> = self
            .departures_at(to)
            .map(|d| d.direction.as_str())
            .collect();

        let shared: BTreeSet<&str> = self
            .departures_at(from)
            .map(|d| d.direction.as_str())
            .filter(|name| at_to.contains(name))
            .collect();

        Ok(shared.into_iter().map(str::to_string).collect())
    }
}

impl DepartureStore for MemoryStore {
    async fn find_departures(
        &self,
        from: StopCode,
        to: StopCode,
        schedule: ScheduleType,
    ) -> Result<Vec<Departure>, StoreError> {
        let directions_at_to: BTreeSet<&str> = self
            .departures_at(to)
            .filter(|d| d.schedule == schedule)
            .map(|d| d.direction.as_str())
            .collect();

        Ok(self
            .departures_at(from)
            .filter(|d| d.schedule == schedule)
            .filter(|d| directions_at_to.contains(d.direction.as_str()))
            .cloned()
            .collect())
    }

    async fn find_departures_by_code_and_direction(
        &self,
        code: StopCode,
        direction: &str,
        schedule: ScheduleType,
    ) -> Result<Vec<Departure>, StoreError> {
        Ok(self
            .departures_at(code)
            .filter(|d| d.schedule == schedule && d.direction == direction)
            .cloned()
            .collect())
    }
}

/// Builder for [`MemoryStore`].
///
/// Line and direction IDs are assigned in order of first appearance.
#[derive(Debug, Default)]
pub struct MemoryStoreBuilder {
    stations: Vec<Station>,
    groups: Vec<DepartureGroup>,
}

impl MemoryStoreBuilder {
    /// Add a station with the given stop codes, in declaration order.
    pub fn station(self, id: i32, name: &str, codes: &[i32]) -> Self {
        let codes = codes.iter().copied().map(StopCode).collect();
        self.add_station(Station::new(StationId(id), name, codes))
    }

    /// Add a fully specified station.
    pub fn add_station(mut self, station: Station) -> Self {
        self.stations.push(station);
        self
    }

    /// Add departures of `line` towards `direction` from stop `code`.
    pub fn departures(
        mut self,
        code: i32,
        line: &str,
        direction: &str,
        schedule: ScheduleType,
        times: &[&str],
    ) -> Self {
        self.groups.push(DepartureGroup {
            code,
            line: line.to_string(),
            direction: direction.to_string(),
            schedule,
            times: times.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    pub fn build(self) -> MemoryStore {
        let mut lines: Vec<Line> = Vec::new();
        let mut directions: Vec<Direction> = Vec::new();
        let mut departures = Vec::new();
        let mut line_ids: HashMap<String, i32> = HashMap::new();
        let mut direction_ids: HashMap<String, i32> = HashMap::new();

        for group in self.groups {
            let line_id = *line_ids.entry(group.line.clone()).or_insert_with(|| {
                let id = lines.len() as i32 + 1;
                lines.push(Line::new(id, group.line.clone()));
                id
            });
            direction_ids.entry(group.direction.clone()).or_insert_with(|| {
                let id = directions.len() as i32 + 1;
                directions.push(Direction {
                    id,
                    name: group.direction.clone(),
                });
                id
            });

            for time in group.times {
                departures.push(Departure {
                    id: departures.len() as i32 + 1,
                    stop_code: StopCode(group.code),
                    line: Line::new(line_id, group.line.clone()),
                    direction: group.direction.clone(),
                    departure_time: time,
                    schedule: group.schedule,
                    created_at: None,
                    updated_at: None,
                });
            }
        }

        let station_codes = self
            .stations
            .iter()
            .flat_map(|s| s.codes.iter().map(move |c| (s.id, *c)))
            .enumerate()
            .map(|(i, (station_id, code))| StationCode {
                id: i as i32 + 1,
                station_id,
                code,
            })
            .collect();

        MemoryStore {
            stations: self.stations,
            station_codes,
            lines,
            directions,
            departures,
        }
    }
}
