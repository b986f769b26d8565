//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::{Line, Station, StationId, StopCode};
use crate::matrix::DistanceProvider;
use crate::store::{LineStore, StoreError, TimetableStore};
use crate::timetable::{TimetableError, TimetableRow};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<S, M>(state: AppState<S, M>) -> Router
where
    S: TimetableStore + LineStore + 'static,
    M: DistanceProvider + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/api/bus-stations", get(list_stations::<S, M>))
        .route("/api/bus-stations/:id", get(get_station::<S, M>))
        .route("/api/station-codes/:code", get(get_station_by_code::<S, M>))
        .route("/api/bus-lines", get(list_lines::<S, M>))
        .route("/api/departures", get(get_departures::<S, M>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// List stations, optionally filtered by name prefix or line.
async fn list_stations<S, M>(
    State(state): State<AppState<S, M>>,
    Query(query): Query<StationListQuery>,
) -> Result<Json<Vec<Station>>, AppError>
where
    S: TimetableStore + LineStore,
    M: DistanceProvider,
{
    let stations = state
        .timetable
        .store()
        .list_stations(query.page(), &query.filter())
        .await?;

    Ok(Json(stations))
}

/// A single station with its stop codes.
async fn get_station<S, M>(
    State(state): State<AppState<S, M>>,
    Path(id): Path<String>,
) -> Result<Json<Station>, AppError>
where
    S: TimetableStore + LineStore,
    M: DistanceProvider,
{
    let id = id
        .parse::<i32>()
        .map(StationId)
        .map_err(|_| AppError::BadRequest {
            message: "Invalid bus station id format".to_string(),
        })?;

    let station = state
        .timetable
        .store()
        .find_station_by_id(id)
        .await?
        .ok_or(TimetableError::StationNotFound(id))?;

    Ok(Json(station))
}

/// The station a stop code belongs to.
async fn get_station_by_code<S, M>(
    State(state): State<AppState<S, M>>,
    Path(code): Path<String>,
) -> Result<Json<Station>, AppError>
where
    S: TimetableStore + LineStore,
    M: DistanceProvider,
{
    let code = code
        .parse::<i32>()
        .map(StopCode)
        .map_err(|_| AppError::BadRequest {
            message: "Invalid station code format".to_string(),
        })?;

    let store = state.timetable.store();
    let station_code = store
        .find_station_code(code)
        .await?
        .ok_or_else(|| AppError::NotFound {
            message: format!("Station code {code} does not exist"),
        })?;
    let station = store
        .find_station_by_id(station_code.station_id)
        .await?
        .ok_or(TimetableError::StationNotFound(station_code.station_id))?;

    Ok(Json(station))
}

/// All lines, or the lines shared by two stations.
async fn list_lines<S, M>(
    State(state): State<AppState<S, M>>,
    Query(query): Query<LineListQuery>,
) -> Result<Json<Vec<Line>>, AppError>
where
    S: TimetableStore + LineStore,
    M: DistanceProvider,
{
    let store = state.timetable.store();
    let lines = match query.stations() {
        Some((from, to)) => store.find_shared_lines(from, to).await?,
        None => store.list_lines().await?,
    };

    Ok(Json(lines))
}

/// Timetable between two stations.
async fn get_departures<S, M>(
    State(state): State<AppState<S, M>>,
    Query(query): Query<DeparturesQuery>,
) -> Result<Json<Vec<TimetableRow>>, AppError>
where
    S: TimetableStore + LineStore,
    M: DistanceProvider,
{
    let (from, to) = query.stations().ok_or_else(|| AppError::BadRequest {
        message: "Both 'from' and 'to' parameters are required".to_string(),
    })?;

    let rows = state
        .timetable
        .generate_timetable(from, to, &query.date())
        .await?;

    Ok(Json(rows))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<TimetableError> for AppError {
    fn from(e: TimetableError) -> Self {
        if e.is_not_found() {
            AppError::NotFound {
                message: e.to_string(),
            }
        } else {
            AppError::Internal {
                message: e.to_string(),
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => {
                warn!(%message, "Bad request");
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::NotFound { message } => {
                warn!(%message, "Not found");
                (StatusCode::NOT_FOUND, message)
            }
            AppError::Internal { message } => {
                error!(%message, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            status_code: status.as_u16(),
            message,
        });
        (status, body).into_response()
    }
}
