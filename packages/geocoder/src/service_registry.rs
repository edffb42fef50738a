//! Geocoding service configuration.
//!
//! The Nominatim endpoint set is defined in `services/nominatim.toml` and
//! embedded at compile time. [`load_service`] layers environment
//! overrides on top:
//!
//! * `PLACEMAP_SEARCH_URL` replaces `search.base_url`
//! * `PLACEMAP_DETAILS_URL` replaces `details.base_url`
//! * `PLACEMAP_USER_AGENT` replaces `user_agent`

use serde::Deserialize;

/// A geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// `User-Agent` header sent with every request. Public Nominatim
    /// instances reject anonymous clients.
    pub user_agent: String,
    /// Free-text search endpoint.
    pub search: SearchEndpoint,
    /// Place details (boundary) endpoint.
    pub details: DetailsEndpoint,
}

/// Free-text search endpoint parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchEndpoint {
    /// Endpoint URL (e.g., `"https://nominatim.openstreetmap.org/search"`).
    pub base_url: String,
    /// Maximum number of candidates per query.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Comma-separated ISO country codes to restrict results to.
    #[serde(default)]
    pub country_codes: Option<String>,
    /// `west,north,east,south` box to prefer (or restrict to, see `bounded`).
    #[serde(default)]
    pub viewbox: Option<String>,
    /// Whether results must fall inside `viewbox`.
    #[serde(default)]
    pub bounded: bool,
    /// Optional feature type filter.
    #[serde(default)]
    pub feature_type: Option<String>,
}

/// Place details endpoint parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct DetailsEndpoint {
    /// Endpoint URL (e.g., `"https://nominatim.openstreetmap.org/details"`).
    pub base_url: String,
}

const fn default_limit() -> u32 {
    5
}

const NOMINATIM_TOML: &str = include_str!("../services/nominatim.toml");

/// Returns the embedded Nominatim configuration without overrides.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed. The file is compiled into
/// the binary, so this is a development error caught by the tests.
#[must_use]
pub fn default_service() -> GeocodingService {
    toml::de::from_str(NOMINATIM_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse geocoding service 'nominatim': {e}"))
}

/// Returns the Nominatim configuration with environment overrides applied.
#[must_use]
pub fn load_service() -> GeocodingService {
    apply_overrides(default_service(), |key| std::env::var(key).ok())
}

/// Applies `PLACEMAP_*` overrides using `lookup` to read variables.
fn apply_overrides(
    mut service: GeocodingService,
    lookup: impl Fn(&str) -> Option<String>,
) -> GeocodingService {
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = lookup("PLACEMAP_SEARCH_URL") {
        log::debug!("Overriding search URL with {url}");
        service.search.base_url = url;
    }
    if let Some(url) = lookup("PLACEMAP_DETAILS_URL") {
        log::debug!("Overriding details URL with {url}");
        service.details.base_url = url;
    }
    if let Some(agent) = lookup("PLACEMAP_USER_AGENT") {
        service.user_agent = agent;
    }

    service
}
