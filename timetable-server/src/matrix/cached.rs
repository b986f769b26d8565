//! Matrix provider with caching.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheConfig, TtlCache};

use super::{Coordinate, DistanceProvider, MatrixError, MatrixResponse};

/// Road distances between fixed stations don't change often.
const MATRIX_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Coordinates by bit pattern, so they can be hashed.
type MatrixKey = Vec<[u64; 2]>;

/// Distance provider with caching.
///
/// Wraps another provider and memoizes matrices per location list.
pub struct CachedMatrix<P> {
    inner: P,
    cache: TtlCache<MatrixKey, Arc<MatrixResponse>>,
}

impl<P: DistanceProvider> CachedMatrix<P> {
    pub fn new(inner: P, max_capacity: u64) -> Self {
        let config = CacheConfig::new(MATRIX_TTL).with_max_capacity(max_capacity);
        Self {
            inner,
            cache: TtlCache::new(&config),
        }
    }

    /// Access the underlying provider for requests that bypass the cache.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

fn key(locations: &[Coordinate]) -> MatrixKey {
    locations
        .iter()
        .map(|[lon, lat]| [lon.to_bits(), lat.to_bits()])
        .collect()
}

impl<P: DistanceProvider> DistanceProvider for CachedMatrix<P> {
    async fn get_matrix(&self, locations: &[Coordinate]) -> Result<MatrixResponse, MatrixError> {
        let key = key(locations);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(MatrixResponse::clone(&cached));
        }

        let matrix = self.inner.get_matrix(locations).await?;
        self.cache.insert(key, Arc::new(matrix.clone())).await;

        Ok(matrix)
    }
}
