//! Render state published after every handled event.

use placemap_drawing::geometry::{point_geometry, preview_geometry};
use placemap_geocoder_models::SearchResult;
use placemap_map_models::{Coordinate, DrawingMode, Layer, Marker};
use serde::Serialize;

/// Everything the UI shell needs to redraw.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSnapshot {
    /// Active drawing mode.
    pub mode: DrawingMode,
    /// All layers in render order, hidden ones included (for the layer panel).
    pub layers: Vec<Layer>,
    /// Live markers.
    pub markers: Vec<Marker>,
    /// Preview ring of the polygon being drawn.
    pub preview: Option<Vec<Coordinate>>,
    /// Search box text.
    pub query: String,
    /// Search results in provider order.
    pub results: Vec<SearchResult>,
    /// Whether a search is in flight.
    pub is_searching: bool,
    /// Currently selected place.
    pub selected: Option<SearchResult>,
}

impl RenderSnapshot {
    /// Layers to draw, bottom first.
    pub fn visible_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| l.visible)
    }

    /// Map contents as a `GeoJSON` feature collection: visible layers
    /// (with `layer_id`, `layer_name`, `kind`, `opacity` properties),
    /// then markers, then the drawing preview.
    #[must_use]
    pub fn to_feature_collection(&self) -> geojson::FeatureCollection {
        let mut features = Vec::new();

        for layer in self.visible_layers() {
            let Some(feature) = &layer.feature else {
                continue;
            };
            let mut feature = feature.clone();
            let properties = feature.properties.get_or_insert_with(serde_json::Map::new);
            properties.insert("layer_id".to_string(), layer.id.clone().into());
            properties.insert("layer_name".to_string(), layer.name.clone().into());
            properties.insert("kind".to_string(), layer.kind.to_string().into());
            properties.insert("opacity".to_string(), layer.opacity.into());
            features.push(feature);
        }

        for marker in &self.markers {
            let mut properties = serde_json::Map::new();
            properties.insert("marker".to_string(), marker.origin.to_string().into());
            features.push(geojson::Feature {
                bbox: None,
                geometry: Some(point_geometry(&marker.position)),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            });
        }

        if let Some(ring) = &self.preview {
            let mut properties = serde_json::Map::new();
            properties.insert("preview".to_string(), true.into());
            features.push(geojson::Feature {
                bbox: None,
                geometry: Some(preview_geometry(ring)),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            });
        }

        geojson::FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}
