pub mod config;
pub mod error;
pub mod status;

pub use config::{
    Config, ConnectivityConfig, LocationConfig, ProviderConfig, ValidationResult, WeatherConfig,
};
pub use error::{AppError, ConfigError, NetworkError, ProviderError};
pub use status::Status;

/// Initialize logging for the application.
///
/// Reads `RUST_LOG`, defaulting to `info`. Safe to call more than once.
pub fn init() {
    let initialized = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .is_ok();

    if initialized {
        tracing::info!("Skycast core initialized");
    }
}
