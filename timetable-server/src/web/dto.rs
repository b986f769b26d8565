//! Query parameters and response bodies.
//!
//! Query values are read as raw strings and parsed leniently: a missing or
//! unparseable number falls back to its default instead of rejecting the
//! request.

use serde::{Deserialize, Serialize};

use crate::domain::{StationId, is_valid_date, today};
use crate::store::{Page, StationFilter};

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// `GET /api/bus-stations` query.
#[derive(Debug, Default, Deserialize)]
pub struct StationListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub name: Option<String>,
    pub line: Option<String>,
}

impl StationListQuery {
    pub fn page(&self) -> Page {
        let defaults = Page::default();
        Page {
            limit: query_int(self.limit.as_deref(), defaults.limit).clamp(0, MAX_PAGE_SIZE),
            offset: query_int(self.offset.as_deref(), defaults.offset).max(0),
        }
    }

    pub fn filter(&self) -> StationFilter {
        StationFilter {
            name: non_empty(self.name.as_deref()),
            line: non_empty(self.line.as_deref()),
        }
    }
}

/// `GET /api/bus-lines` query. With both stations given, only lines serving
/// both are listed.
#[derive(Debug, Default, Deserialize)]
pub struct LineListQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl LineListQuery {
    pub fn stations(&self) -> Option<(StationId, StationId)> {
        station_pair(self.from.as_deref(), self.to.as_deref())
    }
}

/// `GET /api/departures` query.
#[derive(Debug, Default, Deserialize)]
pub struct DeparturesQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
}

impl DeparturesQuery {
    pub fn stations(&self) -> Option<(StationId, StationId)> {
        station_pair(self.from.as_deref(), self.to.as_deref())
    }

    /// Requested date, or today when missing or not `YYYY-MM-DD`.
    pub fn date(&self) -> String {
        query_date(self.date.as_deref())
    }
}

/// Error body: `{"statusCode": 404, "message": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Parse an integer query value, falling back to `default`.
pub fn query_int(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// A `YYYY-MM-DD` query value, or today.
pub fn query_date(value: Option<&str>) -> String {
    match value {
        Some(date) if is_valid_date(date) => date.to_string(),
        _ => today(),
    }
}

fn station_pair(from: Option<&str>, to: Option<&str>) -> Option<(StationId, StationId)> {
    let parse = |v: Option<&str>| v.and_then(|s| s.trim().parse::<i32>().ok()).map(StationId);
    Some((parse(from)?, parse(to)?))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
