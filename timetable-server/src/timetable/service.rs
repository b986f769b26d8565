//! Timetable generation service.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::{CacheConfig, TtlCache};
use crate::domain::{ScheduleType, Station, StationId};
use crate::matrix::{DistanceProvider, TravelEstimate};
use crate::store::TimetableStore;

use super::{TimetableError, TimetableRow, assemble_rows, build_destination_index, find_valid_pair};

/// Cache key: (from station, to station, date as given).
type TimetableKey = (StationId, StationId, String);

/// Generates timetables between stations.
pub struct TimetableService<S, M> {
    store: S,
    matrix: M,
    cache: Option<TtlCache<TimetableKey, Arc<Vec<TimetableRow>>>>,
}

impl<S, M> TimetableService<S, M>
where
    S: TimetableStore,
    M: DistanceProvider,
{
    /// Create a service without caching.
    pub fn new(store: S, matrix: M) -> Self {
        Self {
            store,
            matrix,
            cache: None,
        }
    }

    /// Memoize generated timetables.
    pub fn with_cache(mut self, config: &CacheConfig) -> Self {
        self.cache = Some(TtlCache::new(config));
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn matrix(&self) -> &M {
        &self.matrix
    }

    /// Trips from one station to another on `date` (`YYYY-MM-DD`), ordered
    /// by departure time.
    ///
    /// Results are cached per `(from, to, date)` when caching is enabled.
    /// Failures are never cached.
    pub async fn generate_timetable(
        &self,
        from: StationId,
        to: StationId,
        date: &str,
    ) -> Result<Vec<TimetableRow>, TimetableError> {
        let Some(cache) = &self.cache else {
            return self.build_timetable(from, to, date).await;
        };

        let key = (from, to, date.to_string());
        if let Some(cached) = cache.get(&key).await {
            debug!(%from, %to, date, "Timetable cache hit");
            return Ok(Vec::clone(&cached));
        }

        let rows = self.build_timetable(from, to, date).await?;
        cache.insert(key, Arc::new(rows.clone())).await;

        Ok(rows)
    }

    /// Generate a timetable, bypassing the cache.
    pub async fn build_timetable(
        &self,
        from: StationId,
        to: StationId,
        date: &str,
    ) -> Result<Vec<TimetableRow>, TimetableError> {
        let from_station = self.station(from).await?;
        let to_station = self.station(to).await?;
        let schedule = ScheduleType::from_date_str(date);

        let pair = find_valid_pair(&self.store, &from_station, &to_station, schedule).await?;
        let index = build_destination_index(&self.store, &pair, &to_station, schedule).await?;
        debug!(
            from_code = %pair.from_code,
            terminal = pair.is_terminal(),
            directions = index.len(),
            "Resolved departure pair"
        );

        let estimate = self.travel_estimate(&from_station, &to_station).await?;
        let rows = assemble_rows(&pair.departures, &index, &from_station, &to_station, estimate);

        info!(
            %from,
            %to,
            date,
            %schedule,
            rows = rows.len(),
            "Generated timetable"
        );
        Ok(rows)
    }

    async fn station(&self, id: StationId) -> Result<Station, TimetableError> {
        self.store
            .find_station_by_id(id)
            .await?
            .ok_or(TimetableError::StationNotFound(id))
    }

    async fn travel_estimate(
        &self,
        from: &Station,
        to: &Station,
    ) -> Result<TravelEstimate, TimetableError> {
        let matrix = self
            .matrix
            .get_matrix(&[from.lon_lat(), to.lon_lat()])
            .await?;
        Ok(matrix.entry(0, 1)?)
    }
}
