use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable consulted when `provider.api_key` is not set.
pub const API_KEY_ENV: &str = "SKYCAST_API_KEY";

const DEFAULT_BASE_URL: &str = "https://weatherapi-com.p.rapidapi.com";
const DEFAULT_API_HOST: &str = "weatherapi-com.p.rapidapi.com";

/// Provider limit for `days`.
pub const MAX_FORECAST_DAYS: u8 = 14;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Weather provider endpoint and credentials
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Forecast request settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Fixed position for platforms without a positioning service
    #[serde(default)]
    pub location: LocationConfig,

    /// Reachability probe target
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the forecast endpoint
    pub base_url: String,

    /// Value of the provider host header
    pub api_host: String,

    /// API key (optional, can be set via environment)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_host: DEFAULT_API_HOST.to_string(),
            api_key: None,
        }
    }
}

impl ProviderConfig {
    /// Key from the config file, else from the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Number of forecast days requested
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,

    /// Upper bound on a forecast fetch, in seconds
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound on a position lookup, in seconds
    #[serde(default = "default_timeout_secs")]
    pub location_timeout_secs: u64,
}

fn default_forecast_days() -> u8 {
    3
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_days: default_forecast_days(),
            request_timeout_secs: default_timeout_secs(),
            location_timeout_secs: default_timeout_secs(),
        }
    }
}

impl WeatherConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl LocationConfig {
    /// Both coordinates, when configured.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    pub probe_host: String,
    pub probe_port: u16,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_host: DEFAULT_API_HOST.to_string(),
            probe_port: 443,
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, writing defaults there if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.provider.base_url, "provider.base_url", &mut result);

        if self.provider.api_host.trim().is_empty() {
            result.add_error("provider.api_host", "API host must not be empty");
        }

        if self.provider.resolved_api_key().is_none() {
            result.add_warning(
                "provider.api_key",
                format!("No API key configured (set it here or via {})", API_KEY_ENV),
            );
        }

        let days = self.weather.forecast_days;
        if days == 0 || days > MAX_FORECAST_DAYS {
            result.add_error(
                "weather.forecast_days",
                format!("Forecast days must be between 1 and {}", MAX_FORECAST_DAYS),
            );
        }

        for (field, secs) in [
            ("weather.request_timeout_secs", self.weather.request_timeout_secs),
            ("weather.location_timeout_secs", self.weather.location_timeout_secs),
        ] {
            if secs == 0 {
                result.add_error(field, "Timeout must be greater than 0");
            } else if secs > 60 {
                result.add_warning(field, "Timeout is unusually long (>60s)");
            }
        }

        match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    result.add_error("location.latitude", "Latitude must be within [-90, 90]");
                }
                if !(-180.0..=180.0).contains(&lon) {
                    result.add_error(
                        "location.longitude",
                        "Longitude must be within [-180, 180]",
                    );
                }
            }
            (None, None) => {}
            _ => result.add_error(
                "location",
                "Latitude and longitude must be set together",
            ),
        }

        if self.connectivity.probe_host.trim().is_empty() {
            result.add_error("connectivity.probe_host", "Probe host must not be empty");
        }
        if self.connectivity.probe_port == 0 {
            result.add_error("connectivity.probe_port", "Port cannot be 0");
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }
}
