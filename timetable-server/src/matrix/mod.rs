//! Road distance and travel time between stations.
//!
//! Backed by the openrouteservice matrix API. Durations are adjusted for bus
//! travel (one extra minute per km) before they reach the timetable engine.

mod cached;
mod client;
mod error;
mod types;

use std::future::Future;

pub use cached::CachedMatrix;
pub use client::{OrsClient, OrsConfig};
pub use error::MatrixError;
pub use types::{Coordinate, MatrixRequest, MatrixResponse, TravelEstimate};

/// Source of distance/duration matrices.
pub trait DistanceProvider: Send + Sync {
    /// Matrix between every pair of `[lon, lat]` locations. Distances in km,
    /// durations in adjusted minutes.
    fn get_matrix(
        &self,
        locations: &[Coordinate],
    ) -> impl Future<Output = Result<MatrixResponse, MatrixError>> + Send;
}
