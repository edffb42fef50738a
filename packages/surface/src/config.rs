//! Surface configuration.
//!
//! Every field has a default, so an empty TOML file (or no file at all)
//! yields the stock behavior:
//!
//! ```toml
//! debounce_ms = 500
//! fit_padding = 50.0
//! fit_max_zoom = 16.0
//! fly_to_zoom = 14.0
//! locate_zoom = 16.0
//! # fly_duration_ms = 800
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use placemap_viewport::CameraConfig;
use serde::Deserialize;
use thiserror::Error;

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`SurfaceConfig`].
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Timing and camera settings for a [`crate::MapSurface`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurfaceConfig {
    /// Search debounce window in milliseconds.
    pub debounce_ms: u64,
    /// Padding (pixels) when fitting to a place's bounding box.
    pub fit_padding: f64,
    /// Zoom ceiling when fitting to a bounding box.
    pub fit_max_zoom: f64,
    /// Zoom when flying to a place without a bounding box.
    pub fly_to_zoom: f64,
    /// Zoom when flying to the device position.
    pub locate_zoom: f64,
    /// Fly animation duration in milliseconds.
    pub fly_duration_ms: Option<u64>,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        let camera = CameraConfig::default();
        Self {
            debounce_ms: u64::try_from(placemap_search::DEBOUNCE_WINDOW.as_millis())
                .unwrap_or(500),
            fit_padding: camera.fit_padding,
            fit_max_zoom: camera.fit_max_zoom,
            fly_to_zoom: camera.fly_to_zoom,
            locate_zoom: camera.locate_zoom,
            fly_duration_ms: None,
        }
    }
}

impl SurfaceConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown keys.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(s)?)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// The debounce window.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Camera policy for the viewport.
    #[must_use]
    pub fn camera(&self) -> CameraConfig {
        CameraConfig {
            fit_padding: self.fit_padding,
            fit_max_zoom: self.fit_max_zoom,
            fly_to_zoom: self.fly_to_zoom,
            locate_zoom: self.locate_zoom,
            fly_duration: self.fly_duration_ms.map(Duration::from_millis),
        }
    }
}
