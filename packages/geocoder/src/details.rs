//! Nominatim place details lookup for boundary outlines.
//!
//! See <https://nominatim.org/release-docs/develop/api/Details/>

use placemap_geocoder_models::BoundaryGeometry;
use serde::Deserialize;

use crate::service_registry::DetailsEndpoint;
use crate::{BoundaryResolver, GeocodeError};

/// Boundary resolver backed by a Nominatim `/details` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimBoundaryResolver {
    client: reqwest::Client,
    endpoint: DetailsEndpoint,
}

impl NominatimBoundaryResolver {
    /// Creates a resolver using `client` against `endpoint`.
    #[must_use]
    pub const fn new(client: reqwest::Client, endpoint: DetailsEndpoint) -> Self {
        Self { client, endpoint }
    }

    /// Fetches the outline of `place_id`, distinguishing failure from absence.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
    pub async fn fetch(&self, place_id: &str) -> Result<Option<BoundaryGeometry>, GeocodeError> {
        let resp = self
            .client
            .get(&self.endpoint.base_url)
            .query(&[
                ("place_id", place_id),
                ("format", "json"),
                ("polygon_geojson", "1"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(GeocodeError::Status {
                status: resp.status(),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(place_id, body)
    }
}

#[async_trait::async_trait]
impl BoundaryResolver for NominatimBoundaryResolver {
    async fn resolve(&self, place_id: &str) -> Option<BoundaryGeometry> {
        match self.fetch(place_id).await {
            Ok(Some(boundary)) => Some(boundary),
            Ok(None) => {
                log::debug!("No boundary available for place {place_id}");
                None
            }
            Err(e) => {
                log::warn!("Boundary lookup for place {place_id} failed: {e}");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    geometry: Option<serde_json::Value>,
    // `localname` on current Nominatim, `name` on older releases.
    #[serde(alias = "localname")]
    name: Option<String>,
    #[serde(rename = "type")]
    place_type: Option<String>,
    osm_type: Option<String>,
}

/// Parses a details response. A missing or non-areal geometry is `None`.
fn parse_response(
    place_id: &str,
    body: serde_json::Value,
) -> Result<Option<BoundaryGeometry>, GeocodeError> {
    let details: DetailsResponse = serde_json::from_value(body)?;

    let Some(raw) = details.geometry.filter(|g| !g.is_null()) else {
        return Ok(None);
    };

    let geometry: geojson::Geometry =
        serde_json::from_value(raw).map_err(|e| GeocodeError::Parse {
            message: format!("Invalid boundary geometry: {e}"),
        })?;

    if !BoundaryGeometry::is_areal(&geometry) {
        return Ok(None);
    }

    Ok(Some(BoundaryGeometry {
        place_id: place_id.to_string(),
        geometry,
        name: details.name,
        place_type: details.place_type,
        osm_type: details.osm_type,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_polygon_boundary() {
        let body = serde_json::json!({
            "name": "Bandung",
            "type": "city",
            "osm_type": "R",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[107.5, -7.0], [107.7, -7.0], [107.7, -6.8], [107.5, -7.0]]]
            }
        });

        let boundary = parse_response("42", body).unwrap().unwrap();
        assert_eq!(boundary.place_id, "42");
        assert_eq!(boundary.name.as_deref(), Some("Bandung"));
        assert_eq!(boundary.place_type.as_deref(), Some("city"));
        assert_eq!(boundary.osm_type.as_deref(), Some("R"));
        assert!(matches!(boundary.geometry.value, geojson::Value::Polygon(_)));
    }

    #[test]
    fn parses_multipolygon_boundary() {
        let body = serde_json::json!({
            "localname": "Kepulauan Seribu",
            "type": "administrative",
            "osm_type": "R",
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [
                    [[[106.5, -5.8], [106.6, -5.8], [106.6, -5.7], [106.5, -5.8]]],
                    [[[106.7, -5.6], [106.8, -5.6], [106.8, -5.5], [106.7, -5.6]]]
                ]
            }
        });

        let boundary = parse_response("7", body).unwrap().unwrap();
        assert_eq!(boundary.name.as_deref(), Some("Kepulauan Seribu"));
        assert!(matches!(
            boundary.geometry.value,
            geojson::Value::MultiPolygon(_)
        ));
    }

    #[test]
    fn missing_geometry_is_absent() {
        let body = serde_json::json!({ "name": "Somewhere", "type": "hamlet" });
        assert!(parse_response("1", body).unwrap().is_none());
    }

    #[test]
    fn point_geometry_is_absent() {
        let body = serde_json::json!({
            "name": "A bus stop",
            "geometry": { "type": "Point", "coordinates": [107.6, -6.9] }
        });
        assert!(parse_response("1", body).unwrap().is_none());
    }

    #[test]
    fn invalid_geometry_is_a_parse_error() {
        let body = serde_json::json!({ "geometry": { "type": "Polygon", "coordinates": "nope" } });
        assert!(parse_response("1", body).is_err());
    }

    #[tokio::test]
    async fn unreachable_endpoint_resolves_to_none() {
        let resolver = NominatimBoundaryResolver::new(
            reqwest::Client::new(),
            DetailsEndpoint {
                base_url: "http://127.0.0.1:9/details".to_string(),
            },
        );
        assert!(resolver.resolve("1").await.is_none());
    }
}
