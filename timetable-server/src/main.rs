use std::net::SocketAddr;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use timetable_server::config::{AppConfig, DataSource};
use timetable_server::matrix::{CachedMatrix, DistanceProvider, OrsClient};
use timetable_server::store::{LineStore, MemoryStore, PgStore, TimetableStore};
use timetable_server::timetable::TimetableService;
use timetable_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    if config.ors_api_key.is_empty() {
        error!("ORS_API_KEY not set. Timetable requests will fail.");
    }

    let ors = OrsClient::new(config.ors()).expect("Failed to create openrouteservice client");
    let capacity = config.cache.as_ref().map_or(10_000, |c| c.max_capacity);
    let matrix = CachedMatrix::new(ors, capacity);

    match &config.data_source {
        DataSource::Postgres(_) => {
            let pg = config.postgres().expect("Postgres data source has a pool config");
            let store = PgStore::connect(&pg)
                .await
                .expect("Failed to connect to Postgres");
            serve(&config, store, matrix).await;
        }
        DataSource::Fixture(path) => {
            let store = MemoryStore::from_path(path).expect("Failed to load fixture");
            info!(
                path = %path.display(),
                departures = store.departure_count(),
                "Loaded fixture"
            );
            serve(&config, store, matrix).await;
        }
    }
}

async fn serve<S, M>(config: &AppConfig, store: S, matrix: M)
where
    S: TimetableStore + LineStore + 'static,
    M: DistanceProvider + 'static,
{
    let mut timetable = TimetableService::new(store, matrix);
    if let Some(cache) = &config.cache {
        timetable = timetable.with_cache(cache);
    }

    let app = create_router(AppState::new(timetable));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    info!(%addr, "Bus timetable server listening");
    info!("  GET /health");
    info!("  GET /api/bus-stations");
    info!("  GET /api/bus-stations/:id");
    info!("  GET /api/station-codes/:code");
    info!("  GET /api/bus-lines");
    info!("  GET /api/departures?from=&to=&date=");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
