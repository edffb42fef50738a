#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Place search and boundary lookup.
//!
//! Two provider seams feed geometry onto the map:
//!
//! 1. [`GeometrySearchProvider`] turns free text into an ordered list of
//!    candidate places. Order is the provider's relevance order and is
//!    preserved all the way to the UI.
//! 2. [`BoundaryResolver`] fetches the outline of a single selected
//!    place. A missing outline and a failed request both come back as
//!    `None`; callers must not read an error into it.
//!
//! Both are implemented against Nominatim ([`nominatim`], [`details`]),
//! configured from the embedded [`service_registry`].

pub mod details;
pub mod nominatim;
pub mod service_registry;

use placemap_geocoder_models::{BoundaryGeometry, SearchResult};
use thiserror::Error;

/// Errors from geocoding requests.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Unexpected status: {status}")]
    Status {
        /// The returned status code.
        status: reqwest::StatusCode,
    },

    /// Response body did not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

/// Free-text place search.
#[async_trait::async_trait]
pub trait GeometrySearchProvider: Send + Sync {
    /// Searches for places matching `query`.
    ///
    /// A blank query yields an empty list without issuing a request.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing fails.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, GeocodeError>;
}

/// Boundary lookup for a selected place.
#[async_trait::async_trait]
pub trait BoundaryResolver: Send + Sync {
    /// Fetches the outline of `place_id`.
    ///
    /// One request per call; no caching and no retry. Returns `None` both
    /// when the place has no outline and when the request fails.
    async fn resolve(&self, place_id: &str) -> Option<BoundaryGeometry>;
}

/// Builds the HTTP client shared by the Nominatim providers.
///
/// # Errors
///
/// Returns [`GeocodeError::Http`] if the TLS backend fails to initialize.
pub fn build_client(user_agent: &str) -> Result<reqwest::Client, GeocodeError> {
    Ok(reqwest::Client::builder().user_agent(user_agent).build()?)
}
