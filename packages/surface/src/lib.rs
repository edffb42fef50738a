#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Composition root for the map widget.
//!
//! [`MapSurface`] owns the drawing state machine, the layer registry, the
//! search session, the markers, and the viewport. All state changes happen
//! synchronously inside [`MapSurface::dispatch`] and
//! [`MapSurface::process_next`]. The asynchronous work (debounce timer,
//! search request, boundary request, geolocation) runs in spawned tasks
//! that post a completion message back onto the surface's channel, so the
//! completion is applied on the same path as user input.
//!
//! After every handled message the surface publishes a fresh
//! [`RenderSnapshot`] to its watchers.

pub mod config;
pub mod event;
pub mod markers;
pub mod snapshot;

use std::sync::Arc;
use std::time::Duration;

use placemap_drawing::{ClickOutcome, DrawingStateMachine, geometry::ring_feature};
use placemap_geocoder::{
    BoundaryResolver, GeocodeError, GeometrySearchProvider, build_client,
    details::NominatimBoundaryResolver, nominatim::NominatimSearchProvider,
    service_registry::GeocodingService,
};
use placemap_geocoder_models::{BoundaryGeometry, SearchResult, short_name};
use placemap_layers::{
    LayerRegistry, PLACE_BOUNDARY_PREFIX, USER_POLYGON_LAYER_ID, place_boundary_layer_id,
};
use placemap_map_models::{Coordinate, LayerKind, LayerSpec, MarkerOrigin};
use placemap_search::{DebounceTicket, QueryUpdate, SearchRequest, SearchSession};
use placemap_viewport::{Geolocator, MapEngine, MapViewport, UnsupportedGeolocator};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

pub use config::{ConfigError, SurfaceConfig};
pub use event::{SurfaceEvent, SurfaceHandle};
pub use markers::MarkerSet;
pub use snapshot::RenderSnapshot;

use event::Message;

const USER_POLYGON_LAYER_NAME: &str = "Drawn polygon";

/// The external collaborators a surface calls out to.
#[derive(Clone)]
pub struct Services {
    /// Free-text place search.
    pub search: Arc<dyn GeometrySearchProvider>,
    /// Outline lookup for a selected place.
    pub boundaries: Arc<dyn BoundaryResolver>,
    /// One-shot device position.
    pub geolocator: Arc<dyn Geolocator>,
}

impl Services {
    /// Nominatim search and details, without geolocation.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn nominatim(service: &GeocodingService) -> Result<Self, GeocodeError> {
        let client = build_client(&service.user_agent)?;
        Ok(Self {
            search: Arc::new(NominatimSearchProvider::new(
                client.clone(),
                service.search.clone(),
            )),
            boundaries: Arc::new(NominatimBoundaryResolver::new(
                client,
                service.details.clone(),
            )),
            geolocator: Arc::new(UnsupportedGeolocator),
        })
    }

    /// Services that never touch the network: searches find nothing,
    /// places have no boundary, and geolocation is unsupported.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            search: Arc::new(Offline),
            boundaries: Arc::new(Offline),
            geolocator: Arc::new(UnsupportedGeolocator),
        }
    }
}

/// Provider for [`Services::offline`].
struct Offline;

#[async_trait::async_trait]
impl GeometrySearchProvider for Offline {
    async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, GeocodeError> {
        Ok(Vec::new())
    }
}

#[async_trait::async_trait]
impl BoundaryResolver for Offline {
    async fn resolve(&self, _place_id: &str) -> Option<BoundaryGeometry> {
        None
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

/// The interactive map core.
///
/// Must be created and driven inside a tokio runtime.
pub struct MapSurface<E> {
    drawing: DrawingStateMachine,
    layers: LayerRegistry,
    search: SearchSession,
    markers: MarkerSet,
    viewport: MapViewport<E>,
    selected: Option<SearchResult>,
    selection_epoch: u64,
    pending_boundaries: usize,
    pending_locates: usize,
    services: Services,
    debounce: Duration,
    debounce_task: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
    snapshot_tx: watch::Sender<RenderSnapshot>,
}

impl<E: MapEngine> MapSurface<E> {
    /// Creates a surface over `engine`.
    pub fn new(engine: E, services: Services, config: &SurfaceConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(RenderSnapshot::default());

        Self {
            drawing: DrawingStateMachine::new(),
            layers: LayerRegistry::new(),
            search: SearchSession::new(),
            markers: MarkerSet::new(),
            viewport: MapViewport::new(engine, config.camera()),
            selected: None,
            selection_epoch: 0,
            pending_boundaries: 0,
            pending_locates: 0,
            services,
            debounce: config.debounce(),
            debounce_task: None,
            tx,
            rx,
            snapshot_tx,
        }
    }

    /// A handle for sending user events from elsewhere.
    #[must_use]
    pub fn handle(&self) -> SurfaceHandle {
        SurfaceHandle::new(self.tx.clone())
    }

    /// Subscribes to render snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RenderSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// The drawing state machine.
    pub const fn drawing(&self) -> &DrawingStateMachine {
        &self.drawing
    }

    /// The layer registry.
    pub const fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    /// The search session.
    pub const fn search(&self) -> &SearchSession {
        &self.search
    }

    /// Live markers.
    pub const fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// The viewport and its engine.
    pub const fn viewport(&self) -> &MapViewport<E> {
        &self.viewport
    }

    /// The selected place.
    pub const fn selected(&self) -> Option<&SearchResult> {
        self.selected.as_ref()
    }

    /// Whether no timer or request is outstanding.
    pub fn is_idle(&self) -> bool {
        self.search.pending_timer().is_none()
            && !self.search.is_searching()
            && self.pending_boundaries == 0
            && self.pending_locates == 0
    }

    /// Current render state.
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            mode: self.drawing.mode(),
            layers: self.layers.layers().cloned().collect(),
            markers: self.markers.iter().collect(),
            preview: self.drawing.preview_ring(),
            query: self.search.query().to_string(),
            results: self.search.results().to_vec(),
            is_searching: self.search.is_searching(),
            selected: self.selected.clone(),
        }
    }

    /// Applies a user event immediately.
    pub fn dispatch(&mut self, event: SurfaceEvent) {
        self.apply(Message::Input(event));
        self.publish();
    }

    /// Waits for and applies the next queued message.
    ///
    /// Returns `false` once no sender remains, which cannot happen while
    /// the surface is alive.
    pub async fn process_next(&mut self) -> bool {
        let Some(message) = self.rx.recv().await else {
            return false;
        };
        self.apply(message);
        self.publish();
        true
    }

    /// Processes messages until no timer or request is outstanding.
    ///
    /// A provider that never answers keeps this pending; wrap it in
    /// `tokio::time::timeout` when that matters.
    pub async fn settle(&mut self) {
        while !self.is_idle() {
            if !self.process_next().await {
                break;
            }
        }
    }

    /// Processes messages forever.
    pub async fn run(mut self) {
        while self.process_next().await {}
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }

    fn apply(&mut self, message: Message) {
        match message {
            Message::Input(event) => self.on_input(event),
            Message::DebounceElapsed(ticket) => {
                if let Some(request) = self.search.on_timer_fired(ticket) {
                    self.spawn_search(request);
                }
            }
            Message::SearchCompleted {
                request_id,
                outcome,
            } => match outcome {
                Ok(results) => {
                    self.search.on_results(request_id, results);
                }
                Err(e) => {
                    self.search.on_search_failed(request_id, &e);
                }
            },
            Message::BoundaryResolved {
                epoch,
                place_id,
                name,
                boundary,
            } => {
                self.pending_boundaries = self.pending_boundaries.saturating_sub(1);
                if epoch != self.selection_epoch {
                    log::debug!("Discarding boundary for {place_id}: selection was cleared");
                    return;
                }
                let Some(boundary) = boundary else {
                    log::debug!("No boundary for {place_id}");
                    return;
                };
                let name = boundary
                    .name
                    .clone()
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or(name);
                self.layers.upsert(
                    LayerSpec::new(
                        place_boundary_layer_id(&place_id),
                        name,
                        LayerKind::PlaceBoundary,
                    )
                    .with_feature(boundary.to_feature()),
                );
            }
            Message::PositionResolved(outcome) => {
                self.pending_locates = self.pending_locates.saturating_sub(1);
                match outcome {
                    Ok(position) => {
                        self.markers.place(MarkerOrigin::Geolocation, position);
                        self.viewport.focus_device(position);
                    }
                    Err(e) => log::debug!("Geolocation failed: {e}"),
                }
            }
        }
    }

    fn on_input(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::MapClick(coord) => self.on_map_click(coord),
            SurfaceEvent::SetDrawingMode(mode) => {
                self.drawing.set_mode(mode);
                self.discard_drawing();
            }
            SurfaceEvent::ClearDrawing => {
                self.drawing.clear();
                self.discard_drawing();
            }
            SurfaceEvent::QueryChanged(text) => {
                self.cancel_debounce();
                if let QueryUpdate::Debounce(ticket) = self.search.on_text_change(&text) {
                    self.spawn_debounce(ticket);
                }
            }
            SurfaceEvent::ClearSearch => {
                self.cancel_debounce();
                self.search.clear();
            }
            SurfaceEvent::SelectLocation(result) => {
                self.cancel_debounce();
                let result = self.search.select(result);
                self.select(result);
            }
            SurfaceEvent::SelectResultAt(index) => {
                if let Some(result) = self.search.select_index(index) {
                    self.cancel_debounce();
                    self.select(result);
                } else {
                    log::debug!("No search result at index {index}");
                }
            }
            SurfaceEvent::ClearSelection => self.clear_selection(),
            SurfaceEvent::LayerChange { id, change } => self.layers.apply(&id, change),
            SurfaceEvent::ZoomIn => self.viewport.zoom_in(),
            SurfaceEvent::ZoomOut => self.viewport.zoom_out(),
            SurfaceEvent::Locate => self.spawn_locate(),
        }
    }

    fn on_map_click(&mut self, coord: Coordinate) {
        match self.drawing.on_map_click(coord) {
            ClickOutcome::PointPlaced(position) => {
                self.markers.place(MarkerOrigin::PointDrawing, position);
            }
            ClickOutcome::PolygonClosed { ring } => {
                log::info!("Polygon closed with {} vertices", ring.len() - 1);
                self.layers.upsert(
                    LayerSpec::new(
                        USER_POLYGON_LAYER_ID,
                        USER_POLYGON_LAYER_NAME,
                        LayerKind::UserPolygon,
                    )
                    .with_feature(ring_feature(&ring)),
                );
            }
            ClickOutcome::VertexAdded { .. } | ClickOutcome::Ignored => {}
        }
    }

    fn discard_drawing(&mut self) {
        self.layers.remove(USER_POLYGON_LAYER_ID);
        self.markers.remove(MarkerOrigin::PointDrawing);
    }

    fn select(&mut self, result: SearchResult) {
        log::info!("Selected {} ({})", result.display_name, result.id);

        self.markers
            .place(MarkerOrigin::SearchSelection, result.location);
        self.viewport
            .focus_place(result.location, result.bounding_box);

        let resolver = Arc::clone(&self.services.boundaries);
        let tx = self.tx.clone();
        let epoch = self.selection_epoch;
        let place_id = result.id.clone();
        let name = if result.name.is_empty() {
            short_name(&result.display_name).to_string()
        } else {
            result.name.clone()
        };

        self.pending_boundaries += 1;
        self.selected = Some(result);

        tokio::spawn(async move {
            let boundary = resolver.resolve(&place_id).await;
            let _ = tx.send(Message::BoundaryResolved {
                epoch,
                place_id,
                name,
                boundary,
            });
        });
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.selection_epoch += 1;
        let removed = self.layers.remove_by_id_prefix(PLACE_BOUNDARY_PREFIX);
        self.markers.remove(MarkerOrigin::SearchSelection);
        log::debug!("Selection cleared ({removed} boundary layers removed)");
    }

    fn cancel_debounce(&mut self) {
        if let Some(task) = self.debounce_task.take() {
            task.abort();
        }
    }

    fn spawn_debounce(&mut self, ticket: DebounceTicket) {
        let tx = self.tx.clone();
        let window = self.debounce;
        self.debounce_task = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let _ = tx.send(Message::DebounceElapsed(ticket));
        }));
    }

    fn spawn_search(&self, request: SearchRequest) {
        let provider = Arc::clone(&self.services.search);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = provider.search(&request.query).await;
            let _ = tx.send(Message::SearchCompleted {
                request_id: request.request_id,
                outcome,
            });
        });
    }

    fn spawn_locate(&mut self) {
        let geolocator = Arc::clone(&self.services.geolocator);
        let tx = self.tx.clone();
        self.pending_locates += 1;
        tokio::spawn(async move {
            let outcome = geolocator.current_position().await;
            let _ = tx.send(Message::PositionResolved(outcome));
        });
    }
}

impl<E> Drop for MapSurface<E> {
    fn drop(&mut self) {
        if let Some(task) = self.debounce_task.take() {
            task.abort();
        }
    }
}
