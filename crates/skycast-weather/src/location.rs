use async_trait::async_trait;
use thiserror::Error;

use crate::types::GeoCoordinate;

/// Location service errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// One-shot current-position lookup.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<GeoCoordinate, LocationError>;
}

/// Serves a configured position; unavailable when none is set.
#[derive(Debug, Clone, Default)]
pub struct FixedLocationProvider {
    position: Option<GeoCoordinate>,
}

impl FixedLocationProvider {
    pub fn new(position: Option<GeoCoordinate>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_position(&self) -> Result<GeoCoordinate, LocationError> {
        self.position.ok_or(LocationError::ServiceUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_position() {
        let provider = FixedLocationProvider::new(Some(GeoCoordinate::new(50.06, 19.94)));
        let pos = provider.current_position().await.unwrap();
        assert_eq!(pos.to_query(), "50.06,19.94");
    }

    #[tokio::test]
    async fn test_unset_position_is_unavailable() {
        let provider = FixedLocationProvider::default();
        assert_eq!(
            provider.current_position().await,
            Err(LocationError::ServiceUnavailable)
        );
    }
}
