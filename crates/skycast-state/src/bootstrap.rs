//! Wires the stock collaborators from configuration.

use std::sync::Arc;

use skycast_core::{AppError, Config, ConfigError};
use skycast_weather::{
    FixedLocationProvider, GeoCoordinate, TcpReachabilityProbe, WeatherApiClient,
};

use crate::resolver::{ForecastResolver, ResolverSettings};

/// Initialize logging and build a resolver from `config`.
///
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns `AppError::Config` when validation fails and `AppError::Internal`
/// when the HTTP client or runtime handle cannot be obtained.
pub fn bootstrap(config: &Config) -> Result<ForecastResolver, AppError> {
    skycast_core::init();

    let validation = config.validate();
    if !validation.is_valid() {
        return Err(ConfigError::Invalid(validation.error_summary()).into());
    }
    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }

    let provider = &config.provider;
    let client = WeatherApiClient::new(
        &provider.base_url,
        &provider.api_host,
        provider.resolved_api_key(),
        config.weather.request_timeout(),
    )
    .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

    let location = FixedLocationProvider::new(
        config
            .location
            .coordinates()
            .map(|(lat, lon)| GeoCoordinate::new(lat, lon)),
    );

    let connectivity = TcpReachabilityProbe::new(
        &config.connectivity.probe_host,
        config.connectivity.probe_port,
    );

    tracing::info!(
        base_url = %provider.base_url,
        forecast_days = config.weather.forecast_days,
        "Forecast resolver ready"
    );

    ForecastResolver::new(
        Arc::new(client),
        Arc::new(location),
        Arc::new(connectivity),
        ResolverSettings::from(&config.weather),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use skycast_core::Status;

    #[tokio::test]
    async fn default_config_bootstraps_idle_resolver() {
        let resolver = bootstrap(&Config::default()).unwrap();
        let state = resolver.state();
        assert_eq!(state.status, Status::Idle);
        assert!(!state.has_location_permission);
        assert_eq!(resolver.latest_attempt(), 0);
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let mut config = Config::default();
        config.provider.base_url = "not a url".into();

        let err = bootstrap(&config).err().unwrap();
        assert!(matches!(err, AppError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn requires_runtime() {
        let err = bootstrap(&Config::default()).err().unwrap();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
