//! Live markers, at most one per origin.

use std::collections::BTreeMap;

use placemap_map_models::{Coordinate, Marker, MarkerOrigin};

/// Markers keyed by origin. Placing a marker replaces the previous one
/// with the same origin.
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    markers: BTreeMap<MarkerOrigin, Coordinate>,
}

impl MarkerSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places the `origin` marker at `position`, returning the position
    /// it replaced.
    pub fn place(&mut self, origin: MarkerOrigin, position: Coordinate) -> Option<Coordinate> {
        log::debug!("Marker {origin} at {position:?}");
        self.markers.insert(origin, position)
    }

    /// Removes the `origin` marker.
    pub fn remove(&mut self, origin: MarkerOrigin) -> Option<Coordinate> {
        self.markers.remove(&origin)
    }

    /// Position of the `origin` marker.
    #[must_use]
    pub fn get(&self, origin: MarkerOrigin) -> Option<Coordinate> {
        self.markers.get(&origin).copied()
    }

    /// All live markers.
    pub fn iter(&self) -> impl Iterator<Item = Marker> + '_ {
        self.markers.iter().map(|(&origin, &position)| Marker { origin, position })
    }

    /// Number of live markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Whether no marker is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
