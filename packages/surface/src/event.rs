//! Inbound events and the handle the UI shell sends them through.

use placemap_geocoder::GeocodeError;
use placemap_geocoder_models::{BoundaryGeometry, SearchResult};
use placemap_map_models::{Coordinate, DrawingMode, LayerChange};
use placemap_search::DebounceTicket;
use placemap_viewport::GeolocationError;
use tokio::sync::mpsc;

/// Something the user did.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// Click on the map at a geographic position.
    MapClick(Coordinate),
    /// Drawing toolbar selection.
    SetDrawingMode(DrawingMode),
    /// Drawing toolbar "clear".
    ClearDrawing,
    /// Search box text changed.
    QueryChanged(String),
    /// Search box cleared.
    ClearSearch,
    /// A search result was picked.
    SelectLocation(SearchResult),
    /// The result at this index of the current list was picked.
    SelectResultAt(usize),
    /// The selected place was dismissed.
    ClearSelection,
    /// Layer panel edit.
    LayerChange {
        /// Target layer id.
        id: String,
        /// Update or removal.
        change: LayerChange,
    },
    /// Zoom control "+".
    ZoomIn,
    /// Zoom control "-".
    ZoomOut,
    /// "Locate me" control.
    Locate,
}

/// Messages processed by the surface loop: user events plus completions
/// posted back by the tasks the surface spawned.
#[derive(Debug)]
pub(crate) enum Message {
    Input(SurfaceEvent),
    DebounceElapsed(DebounceTicket),
    SearchCompleted {
        request_id: u64,
        outcome: Result<Vec<SearchResult>, GeocodeError>,
    },
    BoundaryResolved {
        epoch: u64,
        place_id: String,
        name: String,
        boundary: Option<BoundaryGeometry>,
    },
    PositionResolved(Result<Coordinate, GeolocationError>),
}

/// Cloneable sender for [`SurfaceEvent`]s.
///
/// Sends never block. Events sent after the surface is dropped are
/// discarded.
#[derive(Debug, Clone)]
pub struct SurfaceHandle {
    tx: mpsc::UnboundedSender<Message>,
}

impl SurfaceHandle {
    pub(crate) const fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { tx }
    }

    /// Queues `event`.
    pub fn send(&self, event: SurfaceEvent) {
        if self.tx.send(Message::Input(event)).is_err() {
            log::debug!("Surface is gone; dropping event");
        }
    }

    /// Queues a click at (`lon`, `lat`).
    pub fn map_click(&self, lon: f64, lat: f64) {
        self.send(SurfaceEvent::MapClick(Coordinate::new(lon, lat)));
    }

    /// Queues a drawing mode change.
    pub fn set_drawing_mode(&self, mode: DrawingMode) {
        self.send(SurfaceEvent::SetDrawingMode(mode));
    }

    /// Queues a search text change.
    pub fn query_changed(&self, text: impl Into<String>) {
        self.send(SurfaceEvent::QueryChanged(text.into()));
    }

    /// Queues a place selection.
    pub fn select_location(&self, result: SearchResult) {
        self.send(SurfaceEvent::SelectLocation(result));
    }

    /// Queues a layer panel edit.
    pub fn layer_change(&self, id: impl Into<String>, change: LayerChange) {
        self.send(SurfaceEvent::LayerChange {
            id: id.into(),
            change,
        });
    }
}
