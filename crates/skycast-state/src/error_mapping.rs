//! Maps collaborator errors to `skycast_core::AppError` so the resolver
//! settles every failure into a status and a user-facing message.

use skycast_core::{AppError, NetworkError, ProviderError};
use skycast_weather::{FetchError, LocationError};

/// Conversion into the application error taxonomy.
pub trait IntoAppError {
    fn into_app_error(self) -> AppError;
}

impl IntoAppError for FetchError {
    fn into_app_error(self) -> AppError {
        match self {
            FetchError::BadLocation(message) => ProviderError::NoMatchingLocation(message).into(),
            FetchError::NoConnection(message) => NetworkError::ConnectionFailed(message).into(),
            FetchError::Other {
                status: Some(status),
                message,
            } => ProviderError::ServerError { status, message }.into(),
            FetchError::Other {
                status: None,
                message,
            } => ProviderError::InvalidResponse(message).into(),
        }
    }
}

impl IntoAppError for LocationError {
    fn into_app_error(self) -> AppError {
        match self {
            LocationError::PermissionDenied => AppError::PermissionDenied,
            other => ProviderError::LocationUnavailable(other.to_string()).into(),
        }
    }
}
