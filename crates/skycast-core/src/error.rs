//! Centralized error types for Skycast.
//!
//! Every failure the forecast pipeline can hit is absorbed into [`AppError`]
//! at the resolver boundary. `user_message()` gives the text shown to the
//! user and `status()` the UI state it settles into.

use thiserror::Error;

use crate::Status;

/// Top-level application error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Weather provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Unclassified fault from a collaborator (e.g. a panic inside a task).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::PermissionDenied => {
                "Location permission is required to show local weather."
            }
            AppError::Network(e) => e.user_message(),
            AppError::Provider(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Internal(_) => "An unexpected error occurred.",
        }
    }

    /// The status a failed refresh settles into.
    pub fn status(&self) -> Status {
        match self {
            AppError::PermissionDenied => Status::PermissionDenied,
            AppError::Network(_) => Status::NetworkError,
            AppError::Provider(_) | AppError::Config(_) | AppError::Internal(_) => {
                Status::ProviderError
            }
        }
    }
}

/// Connectivity-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("Device is offline")]
    Offline,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::Offline => "No internet connection.",
            NetworkError::ConnectionFailed(_) => "Connection error.",
        }
    }
}

/// The weather service rejected the query or answered with something unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("No matching location: {0}")]
    NoMatchingLocation(String),

    #[error("Current location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ProviderError::NoMatchingLocation(_) => "No matching location found.",
            ProviderError::LocationUnavailable(_) => "Unable to determine your location.",
            ProviderError::Timeout
            | ProviderError::ServerError { .. }
            | ProviderError::InvalidResponse(_) => "An error occurred.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}
