//! Forecast fetching.
//!
//! [`WeatherClient`] is the capability the resolver consumes;
//! [`WeatherApiClient`] is the stock HTTP implementation for the
//! weatherapi.com `forecast.json` endpoint.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

use crate::types::ForecastSnapshot;
use crate::wire::{parse_error_message, parse_forecast};

const API_KEY_HEADER: &str = "X-RapidAPI-Key";
const API_HOST_HEADER: &str = "X-RapidAPI-Host";

/// Failure classes a weather fetch can end in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Provider did not recognize the query (HTTP 400).
    #[error("No matching location: {0}")]
    BadLocation(String),

    /// Host unreachable at call time (DNS or connect failure).
    #[error("No connection: {0}")]
    NoConnection(String),

    /// Anything else: timeouts, non-400 error statuses, malformed payloads.
    #[error("Weather request failed: {message}")]
    Other {
        status: Option<u16>,
        message: String,
    },
}

impl FetchError {
    pub fn other(message: impl Into<String>) -> Self {
        FetchError::Other {
            status: None,
            message: message.into(),
        }
    }
}

/// Query a forecast by free-text place name or `"lat,lon"`.
#[async_trait]
pub trait WeatherClient: Send + Sync {
    async fn fetch(&self, query: &str, days: u8) -> Result<ForecastSnapshot, FetchError>;
}

/// HTTP client for the weatherapi.com forecast endpoint.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    client: Client,
    base_url: String,
    api_host: String,
    api_key: Option<String>,
}

impl WeatherApiClient {
    pub fn new(
        base_url: &str,
        api_host: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_host: api_host.to_string(),
            api_key,
        })
    }

    fn forecast_url(&self) -> String {
        format!("{}/forecast.json", self.base_url)
    }
}

#[async_trait]
impl WeatherClient for WeatherApiClient {
    #[instrument(skip(self), level = "info")]
    async fn fetch(&self, query: &str, days: u8) -> Result<ForecastSnapshot, FetchError> {
        let days = days.to_string();
        let mut request = self
            .client
            .get(self.forecast_url())
            .query(&[("q", query), ("days", days.as_str())])
            .header(API_HOST_HEADER, &self.api_host);

        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await.map_err(classify_transport)?;
        let status = response.status();
        let body = response.text().await.map_err(classify_transport)?;

        if status == StatusCode::BAD_REQUEST {
            let message = parse_error_message(&body).unwrap_or_else(|| query.to_string());
            tracing::debug!("Provider rejected query {:?}: {}", query, message);
            return Err(FetchError::BadLocation(message));
        }

        if !status.is_success() {
            return Err(FetchError::Other {
                status: Some(status.as_u16()),
                message: parse_error_message(&body).unwrap_or_else(|| status.to_string()),
            });
        }

        parse_forecast(&body).map_err(|e| FetchError::other(e.to_string()))
    }
}

/// Split transport failures into "no connection" and everything else.
fn classify_transport(error: reqwest::Error) -> FetchError {
    if error.is_connect() {
        FetchError::NoConnection(error.to_string())
    } else if error.is_timeout() {
        FetchError::other(format!("request timed out: {}", error))
    } else {
        FetchError::Other {
            status: error.status().map(|s| s.as_u16()),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_url_trims_trailing_slash() {
        let client = WeatherApiClient::new(
            "https://example.test/",
            "example.test",
            None,
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(client.forecast_url(), "https://example.test/forecast.json");
    }

    #[test]
    fn test_other_constructor() {
        assert_eq!(
            FetchError::other("boom"),
            FetchError::Other {
                status: None,
                message: "boom".into()
            }
        );
    }
}
