//! `GeoJSON` output for drawn shapes.

use geo::GeodesicArea as _;
use placemap_map_models::Coordinate;

/// Builds a polygon from a ring of vertices.
#[must_use]
pub fn ring_polygon(ring: &[Coordinate]) -> geo::Polygon<f64> {
    let exterior: geo::LineString<f64> = ring.iter().map(|c| (c.lon, c.lat)).collect();
    geo::Polygon::new(exterior, Vec::new())
}

/// Polygon feature for a sealed ring, carrying its geodesic area in
/// square meters as the `area_m2` property.
#[must_use]
pub fn ring_feature(ring: &[Coordinate]) -> geojson::Feature {
    let polygon = ring_polygon(ring);
    let area = polygon.geodesic_area_unsigned();

    let mut properties = serde_json::Map::new();
    properties.insert("area_m2".to_string(), area.into());

    geojson::Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(&polygon))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Polygon geometry for an open preview ring, kept verbatim.
///
/// Unlike [`ring_polygon`] this does not let `geo` re-close the ring, so
/// the degenerate short rings produced while drawing survive as-is.
#[must_use]
pub fn preview_geometry(ring: &[Coordinate]) -> geojson::Geometry {
    let positions = ring.iter().map(Coordinate::to_position).collect();
    geojson::Geometry::new(geojson::Value::Polygon(vec![positions]))
}

/// Point geometry for a single coordinate.
#[must_use]
pub fn point_geometry(coord: &Coordinate) -> geojson::Geometry {
    geojson::Geometry::new(geojson::Value::Point(coord.to_position()))
}
