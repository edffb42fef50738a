//! Nominatim / OpenStreetMap free-text search.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use placemap_geocoder_models::{Address, SearchResult, short_name};
use placemap_map_models::{BoundingBox, Coordinate};
use serde::Deserialize;

use crate::service_registry::SearchEndpoint;
use crate::{GeocodeError, GeometrySearchProvider};

/// Search provider backed by a Nominatim `/search` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimSearchProvider {
    client: reqwest::Client,
    endpoint: SearchEndpoint,
}

impl NominatimSearchProvider {
    /// Creates a provider using `client` against `endpoint`.
    #[must_use]
    pub const fn new(client: reqwest::Client, endpoint: SearchEndpoint) -> Self {
        Self { client, endpoint }
    }

    /// Query string parameters for `query`.
    #[must_use]
    pub fn query_params(&self, query: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("addressdetails", "1".to_string()),
            ("limit", self.endpoint.limit.to_string()),
        ];

        if let Some(codes) = &self.endpoint.country_codes {
            params.push(("countrycodes", codes.clone()));
        }
        if let Some(viewbox) = &self.endpoint.viewbox {
            params.push(("viewbox", viewbox.clone()));
        }
        if self.endpoint.bounded {
            params.push(("bounded", "1".to_string()));
        }
        if let Some(feature_type) = &self.endpoint.feature_type {
            params.push(("featuretype", feature_type.clone()));
        }

        params
    }
}

#[async_trait::async_trait]
impl GeometrySearchProvider for NominatimSearchProvider {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        log::debug!("Nominatim search: {query:?}");

        let resp = self
            .client
            .get(&self.endpoint.base_url)
            .query(&self.query_params(query))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(GeocodeError::Status {
                status: resp.status(),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(body)
    }
}

/// A place as returned on the wire.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    place_id: PlaceId,
    display_name: String,
    lat: String,
    lon: String,
    /// `[minLat, maxLat, minLon, maxLon]` as strings.
    boundingbox: Option<Vec<String>>,
    #[serde(rename = "type", default)]
    place_type: String,
    address: Option<NominatimAddress>,
}

/// Nominatim emits numeric ids; some mirrors quote them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PlaceId {
    Number(u64),
    Text(String),
}

impl PlaceId {
    fn into_string(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    country: Option<String>,
    postcode: Option<String>,
}

impl From<NominatimAddress> for Address {
    fn from(addr: NominatimAddress) -> Self {
        Self {
            road: addr.road,
            city: addr.city.or(addr.town).or(addr.village),
            state: addr.state,
            country: addr.country,
            postcode: addr.postcode,
        }
    }
}

/// Parses a Nominatim search response, preserving result order.
///
/// Entries with unparseable coordinates are skipped.
fn parse_response(body: serde_json::Value) -> Result<Vec<SearchResult>, GeocodeError> {
    if !body.is_array() {
        return Err(GeocodeError::Parse {
            message: "Nominatim response is not an array".to_string(),
        });
    }

    let places: Vec<NominatimPlace> = serde_json::from_value(body)?;

    Ok(places
        .into_iter()
        .filter_map(|place| {
            let lat = parse_degrees(&place.lat);
            let lon = parse_degrees(&place.lon);
            let (Some(lat), Some(lon)) = (lat, lon) else {
                log::warn!(
                    "Skipping Nominatim result with invalid coordinates: {}",
                    place.display_name
                );
                return None;
            };

            Some(SearchResult {
                id: place.place_id.into_string(),
                name: short_name(&place.display_name).to_string(),
                location: Coordinate::new(lon, lat),
                bounding_box: place.boundingbox.as_deref().and_then(parse_bounding_box),
                place_type: place.place_type,
                address: place.address.map(Address::from),
                display_name: place.display_name,
            })
        })
        .collect())
}

/// Parses a wire coordinate string. `NaN` and infinities are rejected.
fn parse_degrees(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reorders a wire `[minLat, maxLat, minLon, maxLon]` box into canonical form.
fn parse_bounding_box(raw: &[String]) -> Option<BoundingBox> {
    let [min_lat, max_lat, min_lon, max_lon] = raw else {
        return None;
    };

    Some(BoundingBox::new(
        parse_degrees(min_lon)?,
        parse_degrees(min_lat)?,
        parse_degrees(max_lon)?,
        parse_degrees(max_lat)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service_registry::default_service;

    fn provider() -> NominatimSearchProvider {
        NominatimSearchProvider::new(reqwest::Client::new(), default_service().search)
    }

    #[test]
    fn parses_nominatim_results_in_order() {
        let body = serde_json::json!([
            {
                "place_id": 282_912_355,
                "display_name": "Bandung, West Java, Java, Indonesia",
                "lat": "-6.9344694",
                "lon": "107.6049539",
                "boundingbox": ["-7.0", "-6.8", "107.5", "107.7"],
                "type": "city",
                "address": { "city": "Bandung", "state": "West Java", "country": "Indonesia" }
            },
            {
                "place_id": "17",
                "display_name": "Bandung Barat, West Java, Indonesia",
                "lat": "-6.86",
                "lon": "107.49",
                "type": "administrative"
            }
        ]);

        let results = parse_response(body).unwrap();
        assert_eq!(results.len(), 2);

        let first = &results[0];
        assert_eq!(first.id, "282912355");
        assert_eq!(first.name, "Bandung");
        assert_eq!(first.display_name, "Bandung, West Java, Java, Indonesia");
        assert!((first.location.lat - -6.934_469_4).abs() < 1e-7);
        assert!((first.location.lon - 107.604_953_9).abs() < 1e-7);
        assert_eq!(first.place_type, "city");
        assert_eq!(
            first.address.as_ref().and_then(|a| a.city.as_deref()),
            Some("Bandung")
        );

        let second = &results[1];
        assert_eq!(second.id, "17");
        assert_eq!(second.name, "Bandung Barat");
        assert!(second.bounding_box.is_none());
        assert!(second.address.is_none());
    }

    #[test]
    fn reorders_wire_bounding_box() {
        let raw = ["-7.0", "-6.8", "107.5", "107.7"].map(String::from);
        let bbox = parse_bounding_box(&raw).unwrap();
        assert_eq!(bbox, BoundingBox::new(107.5, -7.0, 107.7, -6.8));
    }

    #[test]
    fn rejects_malformed_bounding_box() {
        let short = ["1", "2", "3"].map(String::from);
        assert!(parse_bounding_box(&short).is_none());
        let garbage = ["a", "2", "3", "4"].map(String::from);
        assert!(parse_bounding_box(&garbage).is_none());
    }

    #[test]
    fn address_falls_back_to_town() {
        let body = serde_json::json!([{
            "place_id": 1,
            "display_name": "Ubud, Gianyar, Bali, Indonesia",
            "lat": "-8.5",
            "lon": "115.26",
            "type": "town",
            "address": { "town": "Ubud", "state": "Bali" }
        }]);
        let results = parse_response(body).unwrap();
        assert_eq!(
            results[0].address.as_ref().and_then(|a| a.city.as_deref()),
            Some("Ubud")
        );
    }

    #[test]
    fn skips_entries_with_bad_coordinates() {
        let body = serde_json::json!([
            { "place_id": 1, "display_name": "Nowhere", "lat": "abc", "lon": "1", "type": "x" },
            { "place_id": 2, "display_name": "Somewhere", "lat": "1", "lon": "2", "type": "x" }
        ]);
        let results = parse_response(body).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "2");
    }

    #[test]
    fn skips_entries_with_non_finite_coordinates() {
        let body = serde_json::json!([
            { "place_id": 1, "display_name": "Nan", "lat": "NaN", "lon": "1", "type": "x" },
            { "place_id": 2, "display_name": "Inf", "lat": "1", "lon": "inf", "type": "x" },
            {
                "place_id": 3,
                "display_name": "Ok",
                "lat": "1",
                "lon": "2",
                "boundingbox": ["nan", "1", "2", "3"],
                "type": "x"
            }
        ]);
        let results = parse_response(body).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "3");
        assert!(results[0].bounding_box.is_none());
    }

    #[test]
    fn parses_empty_response() {
        assert!(parse_response(serde_json::json!([])).unwrap().is_empty());
    }

    #[test]
    fn non_array_response_is_a_parse_error() {
        let err = parse_response(serde_json::json!({ "error": "nope" })).unwrap_err();
        assert!(matches!(err, GeocodeError::Parse { .. }));
    }

    #[test]
    fn query_params_follow_endpoint_config() {
        let params = provider().query_params("bandung");
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("q"), Some("bandung"));
        assert_eq!(get("format"), Some("json"));
        assert_eq!(get("addressdetails"), Some("1"));
        assert_eq!(get("limit"), Some("5"));
        assert_eq!(get("countrycodes"), Some("id"));
        assert_eq!(get("viewbox"), Some("95.0,6.0,141.0,-11.0"));
        assert_eq!(get("bounded"), Some("1"));
    }

    #[tokio::test]
    async fn blank_query_issues_no_request() {
        let results = provider().search("   ").await.unwrap();
        assert!(results.is_empty());
    }
}
