//! Caiyun weather client
//!
//! HTTP client for the Caiyun Weather API v2.6.

use async_trait::async_trait;
use domain::GeoLocation;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::models::{
    ApiResponse, CurrentConditions, DailyForecast, DailyResult, HourlyForecast, HourlyResult,
    RealtimeResult,
};

/// Environment variable that carries the Caiyun API token
pub const TOKEN_ENV_VAR: &str = "CAIYUN_WEATHER_API_TOKEN";

/// Weather client errors
#[derive(Debug, Error)]
pub enum WeatherError {
    /// No API token configured
    #[error("CAIYUN_WEATHER_API_TOKEN is not set")]
    MissingToken,

    /// Connection to the weather service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the weather service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse response from weather service
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The service answered with a non-ok status
    #[error("API error: {0}")]
    Api(String),

    /// Service is temporarily unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        // The token is part of the URL path, never let it into messages
        let err = err.without_url();
        if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

/// Weather service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    /// Caiyun API base URL (default: <https://api.caiyunapp.com/v2.6>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API token; requests fail with `MissingToken` when absent
    #[serde(default)]
    pub api_token: Option<SecretString>,

    /// Response language (default: en_US)
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.caiyunapp.com/v2.6".to_string()
}

fn default_lang() -> String {
    "en_US".to_string()
}

const fn default_timeout() -> u64 {
    30
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            lang: default_lang(),
            timeout_secs: default_timeout(),
        }
    }
}

impl WeatherConfig {
    /// Set the API token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(SecretString::from(token.into()));
        self
    }

    /// Whether a non-blank token is configured
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.api_token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().trim().is_empty())
    }
}

/// Weather client trait for fetching weather data
#[async_trait]
pub trait WeatherClient: Send + Sync {
    /// Whether the client holds credentials for the provider
    fn has_credentials(&self) -> bool;

    /// Get realtime conditions for a location
    async fn get_realtime(&self, location: GeoLocation) -> Result<CurrentConditions, WeatherError>;

    /// Get an hourly forecast covering `hours` hours
    async fn get_hourly(
        &self,
        location: GeoLocation,
        hours: u8,
    ) -> Result<HourlyForecast, WeatherError>;

    /// Get a daily forecast covering `days` days
    async fn get_daily(
        &self,
        location: GeoLocation,
        days: u8,
    ) -> Result<DailyForecast, WeatherError>;
}

/// Caiyun HTTP client implementation
#[derive(Debug)]
pub struct CaiyunClient {
    client: Client,
    config: WeatherConfig,
}

impl CaiyunClient {
    /// Create a new Caiyun client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WeatherError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create a new client with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_defaults() -> Result<Self, WeatherError> {
        Self::new(WeatherConfig::default())
    }

    /// Build the API URL for an endpoint; `None` without a token
    fn endpoint_url(&self, location: GeoLocation, endpoint: &str) -> Option<String> {
        if !self.config.has_token() {
            return None;
        }
        let token = self.config.api_token.as_ref()?;
        Some(format!(
            "{}/{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            token.expose_secret().trim(),
            location.as_lng_lat(),
            endpoint
        ))
    }

    /// Issue a GET request and unwrap the Caiyun envelope
    async fn fetch<T: DeserializeOwned>(
        &self,
        location: GeoLocation,
        endpoint: &str,
        steps: Option<(&str, u8)>,
    ) -> Result<T, WeatherError> {
        let url = self
            .endpoint_url(location, endpoint)
            .ok_or(WeatherError::MissingToken)?;

        let mut query = vec![("lang", self.config.lang.clone())];
        if let Some((name, value)) = steps {
            query.push((name, value.to_string()));
        }

        debug!(endpoint, location = %location, "Fetching Caiyun weather data");

        let response = self.client.get(&url).query(&query).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(WeatherError::RateLimitExceeded);
        }
        if status.is_server_error() {
            return Err(WeatherError::ServiceUnavailable(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(WeatherError::RequestFailed(format!("HTTP {status}")));
        }

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| WeatherError::ParseError(e.without_url().to_string()))?;

        if envelope.status != "ok" {
            let message = envelope.error.unwrap_or(envelope.status);
            warn!(endpoint, error = %message, "Caiyun returned an error status");
            return Err(WeatherError::Api(message));
        }

        envelope
            .result
            .ok_or_else(|| WeatherError::ParseError(format!("No {endpoint} data in response")))
    }
}

#[async_trait]
impl WeatherClient for CaiyunClient {
    fn has_credentials(&self) -> bool {
        self.config.has_token()
    }

    #[instrument(skip(self), fields(location = %location))]
    async fn get_realtime(&self, location: GeoLocation) -> Result<CurrentConditions, WeatherError> {
        let result: RealtimeResult = self.fetch(location, "realtime", None).await?;
        Ok(result.realtime.into())
    }

    #[instrument(skip(self), fields(location = %location))]
    async fn get_hourly(
        &self,
        location: GeoLocation,
        hours: u8,
    ) -> Result<HourlyForecast, WeatherError> {
        let result: HourlyResult = self
            .fetch(location, "hourly", Some(("hourlysteps", hours)))
            .await?;
        HourlyForecast::try_from(result.hourly)
    }

    #[instrument(skip(self), fields(location = %location))]
    async fn get_daily(
        &self,
        location: GeoLocation,
        days: u8,
    ) -> Result<DailyForecast, WeatherError> {
        let result: DailyResult = self
            .fetch(location, "daily", Some(("dailysteps", days)))
            .await?;
        DailyForecast::try_from(result.daily)
    }
}
