#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Overlay layer registry.
//!
//! The single source of truth for what is drawn above the basemap,
//! regardless of why a layer was added. Layers are keyed by id and kept
//! in insertion order, which is also render order (later layers on top).
//! Replacing a layer keeps its original position.

use indexmap::IndexMap;
use placemap_map_models::{
    DEFAULT_OPACITY, Layer, LayerChange, LayerChanges, LayerKind, LayerSpec, clamp_opacity,
};

/// Fixed id of the user polygon layer. There is only ever one.
pub const USER_POLYGON_LAYER_ID: &str = "user-polygon";

/// Id prefix shared by every place boundary layer.
pub const PLACE_BOUNDARY_PREFIX: &str = "location-";

/// Layer id for the boundary of `place_id`.
#[must_use]
pub fn place_boundary_layer_id(place_id: &str) -> String {
    format!("{PLACE_BOUNDARY_PREFIX}{place_id}")
}

/// Ordered mapping from layer id to layer.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    layers: IndexMap<String, Layer>,
}

impl LayerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new layer or replaces the one with the same id.
    ///
    /// Visibility and opacity not given in `spec` carry over from the
    /// replaced layer, or default to visible at full opacity. Inserting a
    /// [`LayerKind::UserPolygon`] layer evicts any other user polygon.
    pub fn upsert(&mut self, spec: LayerSpec) -> &Layer {
        let LayerSpec {
            id,
            name,
            kind,
            visible,
            opacity,
            feature,
        } = spec;

        if kind == LayerKind::UserPolygon {
            self.layers
                .retain(|other_id, layer| layer.kind != LayerKind::UserPolygon || *other_id == id);
        }

        let previous = self.layers.get(&id);
        let visible = visible
            .or_else(|| previous.map(|l| l.visible))
            .unwrap_or(true);
        let opacity = opacity
            .and_then(clamp_opacity)
            .or_else(|| previous.map(|l| l.opacity))
            .unwrap_or(DEFAULT_OPACITY);

        log::debug!(
            "{} layer {id} ({kind})",
            if previous.is_some() { "Replacing" } else { "Adding" }
        );

        let layer = Layer {
            id: id.clone(),
            name,
            visible,
            opacity,
            kind,
            feature,
        };

        let (index, _) = self.layers.insert_full(id, layer);
        &self.layers[index]
    }

    /// Removes a layer. Returns it if it existed.
    pub fn remove(&mut self, id: &str) -> Option<Layer> {
        let removed = self.layers.shift_remove(id);
        if removed.is_some() {
            log::debug!("Removed layer {id}");
        }
        removed
    }

    /// Removes every layer whose id starts with `prefix`. Returns how
    /// many were removed.
    pub fn remove_by_id_prefix(&mut self, prefix: &str) -> usize {
        let before = self.layers.len();
        self.layers.retain(|id, _| !id.starts_with(prefix));
        let removed = before - self.layers.len();
        if removed > 0 {
            log::debug!("Removed {removed} layer(s) with prefix {prefix:?}");
        }
        removed
    }

    /// Shows or hides a layer. Unknown ids are ignored.
    pub fn set_visible(&mut self, id: &str, visible: bool) {
        if let Some(layer) = self.layers.get_mut(id) {
            layer.visible = visible;
        }
    }

    /// Sets a layer's opacity, clamped to `[0, 1]`. Unknown ids and NaN
    /// are ignored.
    pub fn set_opacity(&mut self, id: &str, opacity: f64) {
        if let (Some(layer), Some(opacity)) = (self.layers.get_mut(id), clamp_opacity(opacity)) {
            layer.opacity = opacity;
        }
    }

    /// Applies a partial update from the layer panel. Unknown ids are
    /// ignored.
    pub fn update(&mut self, id: &str, changes: LayerChanges) {
        let Some(layer) = self.layers.get_mut(id) else {
            log::debug!("Ignoring update for unknown layer {id}");
            return;
        };

        if let Some(name) = changes.name {
            layer.name = name;
        }
        if let Some(visible) = changes.visible {
            layer.visible = visible;
        }
        if let Some(opacity) = changes.opacity.and_then(clamp_opacity) {
            layer.opacity = opacity;
        }
    }

    /// Applies a layer panel request.
    pub fn apply(&mut self, id: &str, change: LayerChange) {
        match change {
            LayerChange::Update(changes) => self.update(id, changes),
            LayerChange::Remove => {
                self.remove(id);
            }
        }
    }

    /// Looks up a layer by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Layer> {
        self.layers.get(id)
    }

    /// Whether a layer with `id` exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.layers.contains_key(id)
    }

    /// All layers in render order.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    /// Visible layers in render order.
    pub fn visible_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values().filter(|l| l.visible)
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
