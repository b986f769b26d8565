//! openrouteservice HTTP client.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::debug;

use super::error::MatrixError;
use super::types::{Coordinate, MatrixRequest, MatrixResponse};
use super::DistanceProvider;

/// Default base URL for the openrouteservice v2 API.
const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org/v2";

/// Routing profile used for bus travel estimates.
const PROFILE: &str = "driving-car";

/// Configuration for the openrouteservice client.
#[derive(Debug, Clone)]
pub struct OrsConfig {
    /// API key, sent in the `Authorization` header
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OrsConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// openrouteservice matrix client.
#[derive(Debug, Clone)]
pub struct OrsClient {
    http: reqwest::Client,
    base_url: String,
}

impl OrsClient {
    pub fn new(config: OrsConfig) -> Result<Self, MatrixError> {
        let mut headers = HeaderMap::new();

        let api_key =
            HeaderValue::from_str(&config.api_key).map_err(|_| MatrixError::Api {
                status: 0,
                message: "Invalid API key format".to_string(),
            })?;
        headers.insert(AUTHORIZATION, api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the matrix and adjust its durations to bus minutes.
    pub async fn fetch_matrix(
        &self,
        locations: &[Coordinate],
    ) -> Result<MatrixResponse, MatrixError> {
        let url = format!("{}/matrix/{}", self.base_url, PROFILE);
        debug!(locations = locations.len(), "Requesting distance matrix");

        let response = self
            .http
            .post(&url)
            .json(&MatrixRequest::new(locations))
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(MatrixError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MatrixError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MatrixError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let mut matrix: MatrixResponse =
            serde_json::from_str(&body).map_err(|e| MatrixError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        matrix.adjust_durations();
        Ok(matrix)
    }
}

impl DistanceProvider for OrsClient {
    async fn get_matrix(&self, locations: &[Coordinate]) -> Result<MatrixResponse, MatrixError> {
        self.fetch_matrix(locations).await
    }
}
