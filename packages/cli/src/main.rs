#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Headless driver for the placemap core.
//!
//! Runs searches, boundary lookups, and drawing sessions against a
//! [`RecordingEngine`] and prints the results as JSON / `GeoJSON`. Camera
//! commands are logged at `info`; run with `RUST_LOG=info` to see them.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use placemap_geocoder::{
    GeometrySearchProvider as _, build_client, details::NominatimBoundaryResolver,
    nominatim::NominatimSearchProvider, service_registry,
};
use placemap_map_models::{Coordinate, DrawingMode};
use placemap_surface::{MapSurface, Services, SurfaceConfig, SurfaceEvent};
use placemap_viewport::RecordingEngine;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "placemap", about = "Place search and drawing on a headless map")]
struct Cli {
    /// Surface config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Give up waiting for network responses after this many seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for places and print the results
    Search {
        /// Free-text query
        query: String,
    },
    /// Fetch the boundary of a place by id
    Boundary {
        /// Provider place id
        place_id: String,
    },
    /// Search, select a result, and print the map as `GeoJSON`
    Select {
        /// Free-text query
        query: String,
        /// Which result to select
        #[arg(long, default_value_t = 0)]
        index: usize,
    },
    /// Feed clicks into a drawing session and print the map as `GeoJSON`
    Draw {
        /// Click positions as `lon,lat`
        #[arg(required = true, allow_hyphen_values = true, value_parser = parse_coordinate)]
        clicks: Vec<Coordinate>,
        /// Place a point instead of tracing a polygon
        #[arg(long)]
        point: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("No results for {query:?}")]
    NoResults { query: String },

    #[error("No result at index {index} ({count} results)")]
    NoSuchIndex { index: usize, count: usize },

    #[error("Timed out waiting for responses")]
    Timeout,
}

fn parse_coordinate(s: &str) -> Result<Coordinate, String> {
    let (lon, lat) = s
        .split_once(',')
        .ok_or_else(|| format!("Expected lon,lat but got {s:?}"))?;
    let lon = lon
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("Invalid longitude {lon:?}: {e}"))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("Invalid latitude {lat:?}: {e}"))?;
    Ok(Coordinate::new(lon, lat))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SurfaceConfig::load(path)?,
        None => SurfaceConfig::default(),
    };
    let timeout = Duration::from_secs(cli.timeout_secs);
    let service = service_registry::load_service();
    log::debug!("Using geocoding service {} ({})", service.name, service.id);

    match cli.command {
        Commands::Search { query } => {
            let client = build_client(&service.user_agent)?;
            let provider = NominatimSearchProvider::new(client, service.search);
            let results = tokio::time::timeout(timeout, provider.search(&query))
                .await
                .map_err(|_| CliError::Timeout)??;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Commands::Boundary { place_id } => {
            let client = build_client(&service.user_agent)?;
            let resolver = NominatimBoundaryResolver::new(client, service.details);
            let boundary = tokio::time::timeout(timeout, resolver.fetch(&place_id))
                .await
                .map_err(|_| CliError::Timeout)??;
            let feature = boundary.map(|b| b.to_feature());
            println!("{}", serde_json::to_string_pretty(&feature)?);
        }
        Commands::Select { query, index } => {
            let mut surface =
                MapSurface::new(RecordingEngine::new(), Services::nominatim(&service)?, &config);

            surface.dispatch(SurfaceEvent::QueryChanged(query.clone()));
            settle(&mut surface, timeout).await?;

            let count = surface.search().results().len();
            if count == 0 {
                return Err(CliError::NoResults { query }.into());
            }
            if index >= count {
                return Err(CliError::NoSuchIndex { index, count }.into());
            }

            surface.dispatch(SurfaceEvent::SelectResultAt(index));
            settle(&mut surface, timeout).await?;

            let collection = surface.snapshot().to_feature_collection();
            println!("{}", serde_json::to_string_pretty(&collection)?);
        }
        Commands::Draw { clicks, point } => {
            let mut surface = MapSurface::new(RecordingEngine::new(), Services::offline(), &config);

            let mode = if point {
                DrawingMode::Point
            } else {
                DrawingMode::Polygon
            };
            surface.dispatch(SurfaceEvent::SetDrawingMode(mode));
            for click in clicks {
                surface.dispatch(SurfaceEvent::MapClick(click));
            }

            if mode == DrawingMode::Polygon && surface.drawing().closed_ring().is_none() {
                log::warn!(
                    "Polygon is still open after {} vertices; repeat the first vertex to close it",
                    surface.drawing().draft().len()
                );
            }

            let collection = surface.snapshot().to_feature_collection();
            println!("{}", serde_json::to_string_pretty(&collection)?);
        }
    }

    Ok(())
}

async fn settle(
    surface: &mut MapSurface<RecordingEngine>,
    timeout: Duration,
) -> Result<(), CliError> {
    tokio::time::timeout(timeout, surface.settle())
        .await
        .map_err(|_| CliError::Timeout)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_coordinates() {
        assert_eq!(
            parse_coordinate("107.6,-6.9").unwrap(),
            Coordinate::new(107.6, -6.9)
        );
        assert_eq!(
            parse_coordinate(" 1 , 2 ").unwrap(),
            Coordinate::new(1.0, 2.0)
        );
        assert!(parse_coordinate("107.6").is_err());
        assert!(parse_coordinate("a,b").is_err());
    }

    #[test]
    fn draw_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["placemap", "draw", "-1,-1", "1,-1", "1,1", "-1,-1"])
            .unwrap();
        let Commands::Draw { clicks, point } = cli.command else {
            panic!("expected draw");
        };
        assert!(!point);
        assert_eq!(clicks.len(), 4);
        assert_eq!(clicks[0], Coordinate::new(-1.0, -1.0));
    }
}
