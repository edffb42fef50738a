#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map viewport and geolocation.
//!
//! [`MapEngine`] is the camera control surface of whatever renders the
//! basemap. The core consumes it and never implements real rendering.
//! [`MapViewport`] wraps an engine with the camera policy used when a
//! place is selected or the device is located.

pub mod geolocation;

use std::time::Duration;

use placemap_map_models::{BoundingBox, Coordinate};

pub use geolocation::{GeolocationError, Geolocator, UnsupportedGeolocator};

/// Options for fitting the camera to a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Screen padding around the box, in pixels.
    pub padding: f64,
    /// Zoom ceiling so tiny places do not over-zoom.
    pub max_zoom: f64,
}

/// Camera operations exposed by the underlying map engine.
pub trait MapEngine {
    /// Animates the camera to `center` at `zoom`.
    fn fly_to(&mut self, center: Coordinate, zoom: f64, duration: Option<Duration>);

    /// Moves the camera so `bounds` fills the view.
    fn fit_bounds(&mut self, bounds: BoundingBox, options: FitOptions);

    /// Zooms in one step.
    fn zoom_in(&mut self);

    /// Zooms out one step.
    fn zoom_out(&mut self);
}

/// Camera policy constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// Padding used when fitting to a selected place's bounding box.
    pub fit_padding: f64,
    /// Zoom ceiling used when fitting to a bounding box.
    pub fit_max_zoom: f64,
    /// Zoom used when flying to a place without a bounding box.
    pub fly_to_zoom: f64,
    /// Zoom used when flying to the device position.
    pub locate_zoom: f64,
    /// Fly animation duration. `None` lets the engine decide.
    pub fly_duration: Option<Duration>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fit_padding: 50.0,
            fit_max_zoom: 16.0,
            fly_to_zoom: 14.0,
            locate_zoom: 16.0,
            fly_duration: None,
        }
    }
}

/// A camera command, as issued to a [`MapEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum CameraCommand {
    /// [`MapEngine::fly_to`].
    FlyTo {
        /// Target center.
        center: Coordinate,
        /// Target zoom.
        zoom: f64,
        /// Animation duration.
        duration: Option<Duration>,
    },
    /// [`MapEngine::fit_bounds`].
    FitBounds {
        /// Box to fit.
        bounds: BoundingBox,
        /// Fit options.
        options: FitOptions,
    },
    /// [`MapEngine::zoom_in`].
    ZoomIn,
    /// [`MapEngine::zoom_out`].
    ZoomOut,
}

/// Engine that renders nothing and records every command.
///
/// Used by the headless CLI and by tests.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    commands: Vec<CameraCommand>,
}

impl RecordingEngine {
    /// Creates an engine with no recorded commands.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands received so far, oldest first.
    #[must_use]
    pub fn commands(&self) -> &[CameraCommand] {
        &self.commands
    }

    fn record(&mut self, command: CameraCommand) {
        log::info!("Camera: {command:?}");
        self.commands.push(command);
    }
}

impl MapEngine for RecordingEngine {
    fn fly_to(&mut self, center: Coordinate, zoom: f64, duration: Option<Duration>) {
        self.record(CameraCommand::FlyTo {
            center,
            zoom,
            duration,
        });
    }

    fn fit_bounds(&mut self, bounds: BoundingBox, options: FitOptions) {
        self.record(CameraCommand::FitBounds { bounds, options });
    }

    fn zoom_in(&mut self) {
        self.record(CameraCommand::ZoomIn);
    }

    fn zoom_out(&mut self) {
        self.record(CameraCommand::ZoomOut);
    }
}

/// A map engine plus the camera policy applied on top of it.
#[derive(Debug)]
pub struct MapViewport<E> {
    engine: E,
    config: CameraConfig,
}

impl<E: MapEngine> MapViewport<E> {
    /// Wraps `engine` with `config`.
    pub const fn new(engine: E, config: CameraConfig) -> Self {
        Self { engine, config }
    }

    /// The wrapped engine.
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Unwraps the engine.
    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Brings a selected place into view.
    ///
    /// Fits the camera to `bounds` when known (padded, with a zoom
    /// ceiling); otherwise flies to `location` at the fixed place zoom.
    pub fn focus_place(&mut self, location: Coordinate, bounds: Option<BoundingBox>) {
        if let Some(bounds) = bounds {
            self.engine.fit_bounds(
                bounds,
                FitOptions {
                    padding: self.config.fit_padding,
                    max_zoom: self.config.fit_max_zoom,
                },
            );
        } else {
            self.engine
                .fly_to(location, self.config.fly_to_zoom, self.config.fly_duration);
        }
    }

    /// Flies to the device position at the locate zoom.
    pub fn focus_device(&mut self, position: Coordinate) {
        self.engine
            .fly_to(position, self.config.locate_zoom, self.config.fly_duration);
    }

    /// Zooms in one step.
    pub fn zoom_in(&mut self) {
        self.engine.zoom_in();
    }

    /// Zooms out one step.
    pub fn zoom_out(&mut self) {
        self.engine.zoom_out();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> MapViewport<RecordingEngine> {
        MapViewport::new(RecordingEngine::new(), CameraConfig::default())
    }

    #[test]
    fn place_with_bounds_fits_exact_box() {
        let mut viewport = viewport();
        let bounds = BoundingBox::new(107.5, -7.0, 107.7, -6.8);
        viewport.focus_place(Coordinate::new(107.6, -6.9), Some(bounds));

        assert_eq!(
            viewport.engine().commands(),
            [CameraCommand::FitBounds {
                bounds,
                options: FitOptions {
                    padding: 50.0,
                    max_zoom: 16.0,
                },
            }]
        );
    }

    #[test]
    fn place_without_bounds_flies_to_location() {
        let mut viewport = viewport();
        let location = Coordinate::new(110.4, -7.8);
        viewport.focus_place(location, None);

        assert_eq!(
            viewport.engine().commands(),
            [CameraCommand::FlyTo {
                center: location,
                zoom: 14.0,
                duration: None,
            }]
        );
    }

    #[test]
    fn device_focus_uses_locate_zoom() {
        let mut viewport = MapViewport::new(
            RecordingEngine::new(),
            CameraConfig {
                fly_duration: Some(Duration::from_millis(800)),
                ..CameraConfig::default()
            },
        );
        viewport.focus_device(Coordinate::new(1.0, 2.0));

        assert_eq!(
            viewport.into_engine().commands(),
            [CameraCommand::FlyTo {
                center: Coordinate::new(1.0, 2.0),
                zoom: 16.0,
                duration: Some(Duration::from_millis(800)),
            }]
        );
    }

    #[test]
    fn zoom_passes_through() {
        let mut viewport = viewport();
        viewport.zoom_in();
        viewport.zoom_out();
        assert_eq!(
            viewport.engine().commands(),
            [CameraCommand::ZoomIn, CameraCommand::ZoomOut]
        );
    }
}
