//! One-shot device position lookup.

use placemap_map_models::Coordinate;
use thiserror::Error;

/// Why the device position could not be obtained.
#[derive(Debug, Error)]
pub enum GeolocationError {
    /// The user refused location access.
    #[error("Location permission denied")]
    PermissionDenied,

    /// The platform has no geolocation support.
    #[error("Geolocation is not supported")]
    Unsupported,

    /// A position could not be determined.
    #[error("Position unavailable: {message}")]
    Unavailable {
        /// Platform-provided detail.
        message: String,
    },
}

/// Single-shot device position source (not a continuous watch).
#[async_trait::async_trait]
pub trait Geolocator: Send + Sync {
    /// Requests the current position once.
    ///
    /// # Errors
    ///
    /// Returns [`GeolocationError`] on denial, missing support, or failure.
    async fn current_position(&self) -> Result<Coordinate, GeolocationError>;
}

/// Geolocator for platforms without position support.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedGeolocator;

#[async_trait::async_trait]
impl Geolocator for UnsupportedGeolocator {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unsupported_always_errors() {
        let err = UnsupportedGeolocator.current_position().await.unwrap_err();
        assert!(matches!(err, GeolocationError::Unsupported));
        assert_eq!(err.to_string(), "Geolocation is not supported");
    }
}
