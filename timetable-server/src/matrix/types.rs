//! openrouteservice matrix request and response types.

use serde::{Deserialize, Serialize};

use super::MatrixError;

/// A `[lon, lat]` pair.
pub type Coordinate = [f64; 2];

/// Body of a `POST /matrix/{profile}` request.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixRequest {
    pub locations: Vec<Coordinate>,
    pub metrics: Vec<String>,
    pub resolve_locations: bool,
    pub units: String,
}

impl MatrixRequest {
    /// Distance and duration between every pair of `locations`, in km.
    pub fn new(locations: &[Coordinate]) -> Self {
        Self {
            locations: locations.to_vec(),
            metrics: vec!["distance".to_string(), "duration".to_string()],
            resolve_locations: true,
            units: "km".to_string(),
        }
    }
}

/// Matrix response. Cells are `None` where no route was found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixResponse {
    /// Kilometres.
    #[serde(default)]
    pub distances: Vec<Vec<Option<f64>>>,
    /// Seconds as returned by the API; minutes after [`adjust_durations`].
    ///
    /// [`adjust_durations`]: MatrixResponse::adjust_durations
    #[serde(default)]
    pub durations: Vec<Vec<Option<f64>>>,
}

/// Distance and duration between two locations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelEstimate {
    pub distance_km: f64,
    pub duration_minutes: f64,
}

impl MatrixResponse {
    /// Convert driving seconds into bus minutes: one extra minute per km for
    /// stops along the way, rounded to whole minutes.
    pub fn adjust_durations(&mut self) {
        for (i, row) in self.durations.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                let km = self
                    .distances
                    .get(i)
                    .and_then(|r| r.get(j))
                    .copied()
                    .flatten()
                    .unwrap_or(0.0);
                if let Some(seconds) = cell {
                    *seconds = (*seconds / 60.0 + km).round();
                }
            }
        }
    }

    /// The `[from][to]` cell.
    pub fn entry(&self, from: usize, to: usize) -> Result<TravelEstimate, MatrixError> {
        let cell = |m: &[Vec<Option<f64>>], what: &str| {
            m.get(from)
                .and_then(|r| r.get(to))
                .copied()
                .flatten()
                .ok_or_else(|| MatrixError::Malformed(format!("no {what} for [{from}][{to}]")))
        };

        Ok(TravelEstimate {
            distance_km: cell(&self.distances, "distance")?,
            duration_minutes: cell(&self.durations, "duration")?,
        })
    }
}
