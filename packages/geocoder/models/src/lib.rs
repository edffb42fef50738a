#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Place search and boundary types.
//!
//! A [`SearchResult`] is produced by a geocoding provider and is never
//! mutated afterwards. A [`BoundaryGeometry`] is fetched lazily for a
//! single result when the user selects it.

use placemap_map_models::{BoundingBox, Coordinate};
use serde::{Deserialize, Serialize};

/// Postal address details attached to a search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Street name.
    pub road: Option<String>,
    /// City, town, or village.
    pub city: Option<String>,
    /// State or province.
    pub state: Option<String>,
    /// Country name.
    pub country: Option<String>,
    /// Postal code.
    pub postcode: Option<String>,
}

/// A candidate place returned by a search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Provider-specific place identifier (used to fetch the boundary).
    pub id: String,
    /// Short name: the display name up to its first comma.
    pub name: String,
    /// Full human-readable label.
    pub display_name: String,
    /// Representative point of the place.
    pub location: Coordinate,
    /// Extent of the place, when the provider knows it.
    pub bounding_box: Option<BoundingBox>,
    /// Provider place classification (e.g. `"city"`, `"administrative"`).
    #[serde(rename = "type")]
    pub place_type: String,
    /// Address breakdown, when requested and available.
    pub address: Option<Address>,
}

/// Short name for a display label: everything before the first comma.
#[must_use]
pub fn short_name(display_name: &str) -> &str {
    display_name
        .split_once(',')
        .map_or(display_name, |(head, _)| head)
}

/// Outline of a selected place.
///
/// Only areal geometries (`Polygon` / `MultiPolygon`) are represented;
/// places without an outline resolve to `None` rather than to an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryGeometry {
    /// The place this outline belongs to.
    pub place_id: String,
    /// Polygon or multipolygon geometry.
    pub geometry: geojson::Geometry,
    /// Place name reported by the details endpoint.
    pub name: Option<String>,
    /// Place classification reported by the details endpoint.
    pub place_type: Option<String>,
    /// Source object type (`N`, `W`, `R` for OSM node/way/relation).
    pub osm_type: Option<String>,
}

impl BoundaryGeometry {
    /// Whether a geometry is one a boundary can be made of.
    #[must_use]
    pub const fn is_areal(geometry: &geojson::Geometry) -> bool {
        matches!(
            geometry.value,
            geojson::Value::Polygon(_) | geojson::Value::MultiPolygon(_)
        )
    }

    /// Converts to a `GeoJSON` feature carrying `name`, `type`, and
    /// `osm_type` properties.
    #[must_use]
    pub fn to_feature(&self) -> geojson::Feature {
        let mut properties = serde_json::Map::new();
        properties.insert("name".to_string(), self.name.clone().into());
        properties.insert("type".to_string(), self.place_type.clone().into());
        properties.insert("osm_type".to_string(), self.osm_type.clone().into());

        geojson::Feature {
            bbox: None,
            geometry: Some(self.geometry.clone()),
            id: Some(geojson::feature::Id::String(self.place_id.clone())),
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_takes_text_before_first_comma() {
        assert_eq!(short_name("Bandung, West Java, Indonesia"), "Bandung");
        assert_eq!(short_name("Jakarta"), "Jakarta");
        assert_eq!(short_name(""), "");
    }

    #[test]
    fn short_name_keeps_surrounding_whitespace() {
        assert_eq!(short_name(" Kota Bandung , Jawa Barat"), " Kota Bandung ");
    }

    #[test]
    fn feature_carries_boundary_properties() {
        let boundary = BoundaryGeometry {
            place_id: "42".to_string(),
            geometry: geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![1.0, 1.0],
                vec![0.0, 0.0],
            ]])),
            name: Some("Somewhere".to_string()),
            place_type: Some("city".to_string()),
            osm_type: Some("R".to_string()),
        };

        let feature = boundary.to_feature();
        let props = feature.properties.unwrap();
        assert_eq!(props["name"], "Somewhere");
        assert_eq!(props["type"], "city");
        assert_eq!(props["osm_type"], "R");
        assert!(BoundaryGeometry::is_areal(&feature.geometry.unwrap()));
    }

    #[test]
    fn point_geometry_is_not_areal() {
        let point = geojson::Geometry::new(geojson::Value::Point(vec![1.0, 2.0]));
        assert!(!BoundaryGeometry::is_areal(&point));
    }

    #[test]
    fn search_result_serializes_type_field() {
        let result = SearchResult {
            id: "1".to_string(),
            name: "Bandung".to_string(),
            display_name: "Bandung, West Java".to_string(),
            location: Coordinate::new(107.6, -6.9),
            bounding_box: None,
            place_type: "city".to_string(),
            address: None,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "city");
        assert_eq!(value["displayName"], "Bandung, West Java");
    }
}
