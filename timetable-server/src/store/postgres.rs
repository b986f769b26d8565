//! Postgres-backed store.
//!
//! Tables: `bus_stations`, `station_codes`, `bus_lines`,
//! `bus_stations_bus_lines`, `directions` and `departures`. Schema creation is
//! handled outside this service.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::info;

use crate::domain::{
    Departure, Direction, Line, ScheduleType, Station, StationCode, StationId, StopCode,
};

use super::{
    DepartureStore, DirectionStore, LineStore, Page, StationFilter, StationStore, StoreError,
};

/// Connection settings for [`PgStore`].
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    /// Bound on waiting for a free pool connection.
    pub acquire_timeout: Duration,
    /// Server-side `statement_timeout` set on every connection.
    pub statement_timeout: Duration,
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
            statement_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_acquire_timeout(mut self, acquire_timeout: Duration) -> Self {
        self.acquire_timeout = acquire_timeout;
        self
    }

    pub fn with_statement_timeout(mut self, statement_timeout: Duration) -> Self {
        self.statement_timeout = statement_timeout;
        self
    }

    /// Connection options for `url`, with the statement timeout applied.
    pub fn connect_options(&self) -> Result<PgConnectOptions, StoreError> {
        let options: PgConnectOptions = self.url.parse()?;
        let timeout = format!("{}ms", self.statement_timeout.as_millis());
        Ok(options.options([("statement_timeout", timeout)]))
    }
}

/// Store reading from a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a connection pool.
    pub async fn connect(config: &PostgresConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(config.connect_options()?)
            .await?;

        info!(
            max_connections = config.max_connections,
            statement_timeout_ms = config.statement_timeout.as_millis() as u64,
            "Connected to Postgres"
        );
        Ok(Self { pool })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StationRow {
    id: i32,
    name: String,
    image_url: Option<String>,
    lat: f64,
    lon: f64,
    codes: Vec<i32>,
    lines: Vec<String>,
}

impl From<StationRow> for Station {
    fn from(row: StationRow) -> Self {
        Station {
            id: StationId(row.id),
            name: row.name,
            image_url: row.image_url.unwrap_or_default(),
            lat: row.lat,
            lon: row.lon,
            codes: row.codes.into_iter().map(StopCode).collect(),
            lines: row.lines,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StationCodeRow {
    id: i32,
    station_id: i32,
    code: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    id: i32,
    name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct DirectionRow {
    id: i32,
    name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct DepartureRow {
    id: i32,
    code: i32,
    line_id: i32,
    line_name: String,
    direction: String,
    departure_time: String,
    schedule_type: String,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<DepartureRow> for Departure {
    type Error = StoreError;

    fn try_from(row: DepartureRow) -> Result<Self, Self::Error> {
        let schedule = row.schedule_type.parse::<ScheduleType>().map_err(|e| {
            StoreError::InvalidRow(format!("departure {}: {}", row.id, e))
        })?;

        Ok(Departure {
            id: row.id,
            stop_code: StopCode(row.code),
            line: Line::new(row.line_id, row.line_name),
            direction: row.direction,
            departure_time: row.departure_time,
            schedule,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_departures(rows: Vec<DepartureRow>) -> Result<Vec<Departure>, StoreError> {
    rows.into_iter().map(Departure::try_from).collect()
}

const DEPARTURE_SELECT: &str = r#"
    SELECT
        d.id::int4 AS id,
        sc.code::int4 AS code,
        bl.id::int4 AS line_id,
        bl.name::text AS line_name,
        dir.name::text AS direction,
        d.departure_time::text AS departure_time,
        d.schedule_type::text AS schedule_type,
        d.created_at::timestamptz AS created_at,
        d.updated_at::timestamptz AS updated_at
    FROM departures d
    JOIN station_codes sc ON d.code_id = sc.id
    JOIN bus_lines bl ON d.line_id = bl.id
    JOIN directions dir ON d.direction_id = dir.id
"#;

impl StationStore for PgStore {
    async fn find_station_by_id(&self, id: StationId) -> Result<Option<Station>, StoreError> {
        let row: Option<StationRow> = sqlx::query_as(
            r#"
            SELECT
                bs.id::int4 AS id,
                bs.name::text AS name,
                bs.image_url::text AS image_url,
                bs.lat::float8 AS lat,
                bs.lng::float8 AS lon,
                COALESCE(
                    array_agg(sc.code::int4 ORDER BY sc.id) FILTER (WHERE sc.code IS NOT NULL),
                    '{}'
                ) AS codes,
                '{}'::text[] AS lines
            FROM bus_stations bs
            LEFT JOIN station_codes sc ON sc.station_id = bs.id
            WHERE bs.id = $1
            GROUP BY bs.id
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Station::from))
    }

    async fn list_stations(
        &self,
        page: Page,
        filter: &StationFilter,
    ) -> Result<Vec<Station>, StoreError> {
        // The line filter selects stations without narrowing their line list.
        let rows: Vec<StationRow> = sqlx::query_as(
            r#"
            SELECT
                bs.id::int4 AS id,
                bs.name::text AS name,
                bs.image_url::text AS image_url,
                bs.lat::float8 AS lat,
                bs.lng::float8 AS lon,
                '{}'::int4[] AS codes,
                COALESCE(
                    array_agg(DISTINCT bl.name::text ORDER BY bl.name::text)
                        FILTER (WHERE bl.name IS NOT NULL),
                    '{}'
                ) AS lines
            FROM bus_stations bs
            LEFT JOIN bus_stations_bus_lines bsl ON bsl.bus_station_id = bs.id
            LEFT JOIN bus_lines bl ON bl.id = bsl.bus_line_id
            WHERE ($3::text IS NULL OR bs.name ILIKE $3 || '%')
              AND ($4::text IS NULL OR EXISTS (
                    SELECT 1
                    FROM bus_stations_bus_lines f
                    JOIN bus_lines fl ON fl.id = f.bus_line_id
                    WHERE f.bus_station_id = bs.id
                      AND fl.name ILIKE '%' || $4 || '%'
              ))
            GROUP BY bs.id
            ORDER BY bs.name
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .bind(filter.name.as_deref())
        .bind(filter.line.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Station::from).collect())
    }

    async fn find_station_code(&self, code: StopCode) -> Result<Option<StationCode>, StoreError> {
        let row: Option<StationCodeRow> = sqlx::query_as(
            "SELECT id::int4 AS id, station_id::int4 AS station_id, code::int4 AS code \
             FROM station_codes WHERE code = $1",
        )
        .bind(code.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| StationCode {
            id: r.id,
            station_id: StationId(r.station_id),
            code: StopCode(r.code),
        }))
    }
}

impl LineStore for PgStore {
    async fn list_lines(&self) -> Result<Vec<Line>, StoreError> {
        let rows: Vec<LineRow> = sqlx::query_as(
            r#"
            SELECT id::int4 AS id, name::text AS name
            FROM bus_lines
            ORDER BY NULLIF(regexp_replace(name, '[^0-9]', '', 'g'), '')::int NULLS LAST, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| Line::new(r.id, r.name)).collect())
    }

    async fn find_shared_lines(
        &self,
        from: StationId,
        to: StationId,
    ) -> Result<Vec<Line>, StoreError> {
        let rows: Vec<LineRow> = sqlx::query_as(
            r#"
            SELECT bl.id::int4 AS id, bl.name::text AS name
            FROM bus_lines bl
            JOIN bus_stations_bus_lines bsl1 ON bsl1.bus_line_id = bl.id
            JOIN bus_stations_bus_lines bsl2 ON bsl2.bus_line_id = bl.id
            WHERE bsl1.bus_station_id = $1 AND bsl2.bus_station_id = $2
            GROUP BY bl.id, bl.name
            ORDER BY bl.id
            "#,
        )
        .bind(from.0)
        .bind(to.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| Line::new(r.id, r.name)).collect())
    }
}

impl DirectionStore for PgStore {
    async fn find_directions_by_code(&self, code: StopCode) -> Result<Vec<Direction>, StoreError> {
        let rows: Vec<DirectionRow> = sqlx::query_as(
            r#"
            SELECT d.id::int4 AS id, d.name::text AS name
            FROM directions d
            JOIN departures dep ON dep.direction_id = d.id
            JOIN station_codes sc ON dep.code_id = sc.id
            WHERE sc.code = $1
            GROUP BY d.id, d.name
            ORDER BY d.id
            "#,
        )
        .bind(code.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Direction {
                id: r.id,
                name: r.name,
            })
            .collect())
    }

    async fn find_shared_directions(
        &self,
        from: StopCode,
        to: StopCode,
    ) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT dir.name::text
            FROM departures d1
            JOIN station_codes sc1 ON d1.code_id = sc1.id
            JOIN departures d2 ON d1.direction_id = d2.direction_id
            JOIN station_codes sc2 ON d2.code_id = sc2.id
            JOIN directions dir ON d1.direction_id = dir.id
            WHERE sc1.code = $1 AND sc2.code = $2
            ORDER BY 1
            "#,
        )
        .bind(from.0)
        .bind(to.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}

impl DepartureStore for PgStore {
    async fn find_departures(
        &self,
        from: StopCode,
        to: StopCode,
        schedule: ScheduleType,
    ) -> Result<Vec<Departure>, StoreError> {
        let sql = format!(
            r#"{DEPARTURE_SELECT}
            WHERE sc.code = $1
              AND d.schedule_type::text = $3
              AND EXISTS (
                  SELECT 1 FROM departures d2
                  JOIN station_codes sc2 ON d2.code_id = sc2.id
                  WHERE sc2.code = $2
                    AND d2.schedule_type = d.schedule_type
                    AND d2.direction_id = d.direction_id
              )
            ORDER BY d.id"#
        );
        let rows: Vec<DepartureRow> = sqlx::query_as(&sql)
            .bind(from.0)
            .bind(to.0)
            .bind(schedule.as_str())
            .fetch_all(&self.pool)
            .await?;

        into_departures(rows)
    }

    async fn find_departures_by_code_and_direction(
        &self,
        code: StopCode,
        direction: &str,
        schedule: ScheduleType,
    ) -> Result<Vec<Departure>, StoreError> {
        let sql = format!(
            "{DEPARTURE_SELECT} WHERE sc.code = $1 AND dir.name = $2 AND d.schedule_type::text = $3 \
             ORDER BY d.id"
        );
        let rows: Vec<DepartureRow> = sqlx::query_as(&sql)
            .bind(code.0)
            .bind(direction)
            .bind(schedule.as_str())
            .fetch_all(&self.pool)
            .await?;

        into_departures(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(schedule_type: &str) -> DepartureRow {
        DepartureRow {
            id: 7,
            code: 101,
            line_id: 2,
            line_name: "6".into(),
            direction: "Center - Tezno".into(),
            departure_time: "08:00".into(),
            schedule_type: schedule_type.into(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn config_builder() {
        let config = PostgresConfig::new("postgres://localhost/bus")
            .with_max_connections(12)
            .with_acquire_timeout(Duration::from_secs(2))
            .with_statement_timeout(Duration::from_millis(1500));
        assert_eq!(config.url, "postgres://localhost/bus");
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.acquire_timeout, Duration::from_secs(2));
        assert_eq!(config.statement_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn statement_timeout_is_sent_as_connection_option() {
        let options = PostgresConfig::new("postgres://bus@localhost:5432/bus")
            .with_statement_timeout(Duration::from_secs(3))
            .connect_options()
            .unwrap();
        assert_eq!(options.get_database(), Some("bus"));
        let sent = options.get_options().unwrap_or_default();
        assert!(sent.contains("statement_timeout=3000ms"), "{sent}");

        let defaults = PostgresConfig::new("postgres://localhost/bus")
            .connect_options()
            .unwrap();
        assert!(defaults.get_options().unwrap_or_default().contains("statement_timeout=10000ms"));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = PostgresConfig::new("not a url").connect_options().unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn departure_row_maps_to_domain() {
        let dep = Departure::try_from(row("saturday")).unwrap();
        assert_eq!(dep.stop_code, StopCode(101));
        assert_eq!(dep.line, Line::new(2, "6"));
        assert_eq!(dep.schedule, ScheduleType::Saturday);
    }

    #[test]
    fn unknown_schedule_is_invalid_row() {
        let err = Departure::try_from(row("holiday")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRow(ref msg) if msg.contains("departure 7")));
    }

    #[test]
    fn station_row_without_image() {
        let station = Station::from(StationRow {
            id: 1,
            name: "Center".into(),
            image_url: None,
            lat: 46.5,
            lon: 15.6,
            codes: vec![101, 205],
            lines: vec![],
        });
        assert_eq!(station.image_url, "");
        assert_eq!(station.codes, vec![StopCode(101), StopCode(205)]);
    }

    const SCHEMA: &str = r#"
        CREATE TABLE bus_stations (
            id serial PRIMARY KEY,
            name text NOT NULL,
            image_url text,
            lat double precision NOT NULL,
            lng double precision NOT NULL
        );
        CREATE TABLE station_codes (
            id serial PRIMARY KEY,
            station_id int NOT NULL REFERENCES bus_stations (id),
            code int NOT NULL UNIQUE
        );
        CREATE TABLE bus_lines (id serial PRIMARY KEY, name text NOT NULL UNIQUE);
        CREATE TABLE bus_stations_bus_lines (
            bus_station_id int NOT NULL REFERENCES bus_stations (id),
            bus_line_id int NOT NULL REFERENCES bus_lines (id)
        );
        CREATE TABLE directions (id serial PRIMARY KEY, name text NOT NULL UNIQUE);
        CREATE TABLE departures (
            id serial PRIMARY KEY,
            code_id int NOT NULL REFERENCES station_codes (id),
            line_id int NOT NULL REFERENCES bus_lines (id),
            direction_id int NOT NULL REFERENCES directions (id),
            departure_time text NOT NULL,
            schedule_type text NOT NULL,
            created_at timestamptz,
            updated_at timestamptz
        );
        INSERT INTO bus_stations (name, image_url, lat, lng)
            VALUES ('Center', NULL, 46.56, 15.65), ('Tezno', 'tezno.jpg', 46.53, 15.67);
        INSERT INTO station_codes (station_id, code) VALUES (1, 101), (1, 205), (2, 300);
        INSERT INTO bus_lines (name) VALUES ('6'), ('3');
        INSERT INTO bus_stations_bus_lines VALUES (1, 1), (1, 2), (2, 2);
        INSERT INTO directions (name) VALUES ('Center - Melje'), ('Center - Tezno');
        INSERT INTO departures (code_id, line_id, direction_id, departure_time, schedule_type)
            VALUES
                (2, 2, 1, '08:00', 'weekday'),
                (2, 2, 1, '07:30', 'weekday'),
                (3, 2, 1, '08:10', 'weekday'),
                (1, 1, 2, '09:00', 'weekday'),
                (2, 2, 1, '10:00', 'saturday')
    "#;

    /// Runs every store query against a scratch schema in
    /// `TEST_DATABASE_URL`, which is dropped afterwards.
    #[tokio::test]
    #[ignore = "needs a Postgres database in TEST_DATABASE_URL"]
    async fn queries_run_against_postgres() {
        use ScheduleType::Weekday;

        let url = std::env::var("TEST_DATABASE_URL").unwrap();
        let schema = format!("timetable_test_{}", std::process::id());
        let admin = PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .unwrap();
        sqlx::query(&format!("CREATE SCHEMA {schema}"))
            .execute(&admin)
            .await
            .unwrap();

        let options = PostgresConfig::new(&url)
            .connect_options()
            .unwrap()
            .options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
            .unwrap();
        for statement in SCHEMA.split(';') {
            sqlx::query(statement).execute(&pool).await.unwrap();
        }
        let store = PgStore { pool };

        let center = store.find_station_by_id(StationId(1)).await.unwrap().unwrap();
        assert_eq!(center.codes, vec![StopCode(101), StopCode(205)]);
        assert_eq!(center.image_url, "");
        assert!(store.find_station_by_id(StationId(9)).await.unwrap().is_none());

        let all = store
            .list_stations(Page::default(), &StationFilter::default())
            .await
            .unwrap();
        let names: Vec<_> = all.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Center", "Tezno"]);
        assert_eq!(all[0].lines, vec!["3", "6"]);

        let filter = StationFilter {
            name: Some("te".into()),
            line: Some("3".into()),
        };
        let tezno = store.list_stations(Page::default(), &filter).await.unwrap();
        assert_eq!(tezno.len(), 1);
        assert_eq!(tezno[0].image_url, "tezno.jpg");

        let code = store.find_station_code(StopCode(205)).await.unwrap().unwrap();
        assert_eq!(code.station_id, StationId(1));

        let lines: Vec<_> = store
            .list_lines()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(lines, vec!["3", "6"]);
        let shared = store
            .find_shared_lines(StationId(1), StationId(2))
            .await
            .unwrap();
        assert_eq!(shared, vec![Line::new(2, "3")]);

        let directions = store.find_directions_by_code(StopCode(205)).await.unwrap();
        assert_eq!(directions.len(), 1);
        assert_eq!(directions[0].name, "Center - Melje");
        assert_eq!(
            store
                .find_shared_directions(StopCode(205), StopCode(300))
                .await
                .unwrap(),
            vec!["Center - Melje"]
        );

        let departures = store
            .find_departures(StopCode(205), StopCode(300), Weekday)
            .await
            .unwrap();
        let times: Vec<_> = departures.iter().map(|d| d.departure_time.as_str()).collect();
        assert_eq!(times, vec!["08:00", "07:30"]);
        assert!(
            store
                .find_departures(StopCode(101), StopCode(300), Weekday)
                .await
                .unwrap()
                .is_empty()
        );

        let at_tezno = store
            .find_departures_by_code_and_direction(StopCode(300), "Center - Melje", Weekday)
            .await
            .unwrap();
        assert_eq!(at_tezno.len(), 1);
        assert_eq!(at_tezno[0].departure_time, "08:10");

        store.pool.close().await;
        sqlx::query(&format!("DROP SCHEMA {schema} CASCADE"))
            .execute(&admin)
            .await
            .unwrap();
    }
}
