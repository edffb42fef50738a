#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Core map surface types.
//!
//! Coordinates, drawing modes, markers, and the overlay layer records
//! tracked by the layer registry. These types carry no behavior beyond
//! simple geometry helpers; state transitions live in the drawing,
//! layers, and surface crates.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Opacity assigned to a new layer when the caller does not specify one.
pub const DEFAULT_OPACITY: f64 = 1.0;

/// A WGS84 position in degrees.
///
/// Values outside `[-180, 180]` / `[-90, 90]` are accepted as-is; the map
/// engine tolerates them and so do we. Only non-finite values are
/// rejected by callers that check [`Coordinate::is_finite`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl Coordinate {
    /// Creates a coordinate from a `(longitude, latitude)` pair.
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Whether both components are finite numbers.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// Straight-line distance in degree space.
    ///
    /// This is a planar approximation, not a geodesic distance. Polygon
    /// closure thresholds are tuned against it.
    #[must_use]
    pub fn planar_distance(&self, other: &Self) -> f64 {
        (self.lon - other.lon).hypot(self.lat - other.lat)
    }

    /// `GeoJSON` position (`[lon, lat]`).
    #[must_use]
    pub fn to_position(&self) -> geojson::Position {
        vec![self.lon, self.lat]
    }
}

/// An axis-aligned bounding box in canonical `{minLon, minLat, maxLon, maxLat}` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Western edge.
    pub min_lon: f64,
    /// Southern edge.
    pub min_lat: f64,
    /// Eastern edge.
    pub max_lon: f64,
    /// Northern edge.
    pub max_lat: f64,
}

impl BoundingBox {
    /// Creates a bounding box from its four edges.
    #[must_use]
    pub const fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }
}

/// How map clicks are currently interpreted.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DrawingMode {
    /// Clicks do nothing.
    #[default]
    None,
    /// Each click places (or moves) the single drawn point.
    Point,
    /// Clicks accumulate polygon vertices until the ring is closed.
    Polygon,
}

/// Why a marker was placed. At most one marker per origin is live.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MarkerOrigin {
    /// Placed by a click in point drawing mode.
    PointDrawing,
    /// Placed at the device position after a geolocation request.
    Geolocation,
    /// Placed at a selected search result.
    SearchSelection,
}

/// A single pinned position on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// What placed this marker.
    pub origin: MarkerOrigin,
    /// Where it sits.
    pub position: Coordinate,
}

/// What produced an overlay layer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LayerKind {
    /// The polygon drawn by the user. Only one exists at a time.
    UserPolygon,
    /// Outline of a selected place, keyed by the place identifier.
    PlaceBoundary,
    /// Anything else rendered on top of the basemap.
    Other,
}

/// An overlay layer as stored in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    /// Unique identifier.
    pub id: String,
    /// Display name shown in the layer panel.
    pub name: String,
    /// Whether the layer is drawn.
    pub visible: bool,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// What produced this layer.
    pub kind: LayerKind,
    /// Geometry to render, if any.
    pub feature: Option<geojson::Feature>,
}

/// Insert-or-replace request for the layer registry.
///
/// `visible` and `opacity` left as `None` keep the existing layer's
/// values (or the defaults for a new layer).
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    /// Identifier to insert under or replace.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Layer kind.
    pub kind: LayerKind,
    /// Requested visibility.
    pub visible: Option<bool>,
    /// Requested opacity (clamped on insertion).
    pub opacity: Option<f64>,
    /// Geometry to render.
    pub feature: Option<geojson::Feature>,
}

impl LayerSpec {
    /// Creates a spec with no explicit visibility, opacity, or geometry.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            visible: None,
            opacity: None,
            feature: None,
        }
    }

    /// Attaches the geometry to render.
    #[must_use]
    pub fn with_feature(mut self, feature: geojson::Feature) -> Self {
        self.feature = Some(feature);
        self
    }

    /// Sets an explicit visibility.
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Sets an explicit opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }
}

/// Partial update coming from the layer panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerChanges {
    /// New display name.
    pub name: Option<String>,
    /// New visibility.
    pub visible: Option<bool>,
    /// New opacity (clamped).
    pub opacity: Option<f64>,
}

/// A layer panel request: either a partial update or removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerChange {
    /// Apply the set fields.
    Update(LayerChanges),
    /// Drop the layer.
    Remove,
}

/// Clamps an opacity to `[0, 1]`. Returns `None` for NaN.
#[must_use]
pub fn clamp_opacity(opacity: f64) -> Option<f64> {
    if opacity.is_nan() {
        None
    } else {
        Some(opacity.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn planar_distance_is_euclidean_in_degrees() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(3.0, 4.0);
        assert!((a.planar_distance(&b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_range_coordinates_are_still_finite() {
        assert!(Coordinate::new(200.0, -95.0).is_finite());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_finite());
        assert!(!Coordinate::new(0.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn drawing_mode_round_trips_through_strings() {
        assert_eq!(DrawingMode::from_str("polygon").unwrap(), DrawingMode::Polygon);
        assert_eq!(DrawingMode::Point.to_string(), "point");
        assert!(DrawingMode::from_str("").is_err());
    }

    #[test]
    fn marker_origin_uses_kebab_case() {
        assert_eq!(MarkerOrigin::PointDrawing.as_ref(), "point-drawing");
        assert_eq!(
            serde_json::to_value(MarkerOrigin::SearchSelection).unwrap(),
            serde_json::json!("search-selection")
        );
    }

    #[test]
    fn clamp_opacity_bounds() {
        assert_eq!(clamp_opacity(1.5), Some(1.0));
        assert_eq!(clamp_opacity(-0.2), Some(0.0));
        assert_eq!(clamp_opacity(0.4), Some(0.4));
        assert_eq!(clamp_opacity(f64::NAN), None);
    }
}
