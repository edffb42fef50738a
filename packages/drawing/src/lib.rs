#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Drawing state machine.
//!
//! Interprets map clicks according to the active [`DrawingMode`]:
//!
//! * **Point** — every click moves the single drawn point.
//! * **Polygon** — clicks append vertices. Once the draft has more than
//!   two vertices, a click within [`CLOSE_THRESHOLD`] degrees of the first
//!   vertex seals the ring and finishes the polygon. Further clicks are
//!   ignored until the mode is set again.
//!
//! The machine never touches the layer registry or markers itself.
//! Transitions return what changed, and the map surface applies it.

use placemap_map_models::{Coordinate, DrawingMode};

pub mod geometry;

/// Closing distance to the first vertex, in degrees (about 11 m at the
/// equator). Measured with [`Coordinate::planar_distance`].
pub const CLOSE_THRESHOLD: f64 = 0.0001;

/// Current drawing state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DrawingState {
    /// Clicks are ignored.
    #[default]
    Idle,
    /// Clicks place the drawn point.
    PlacingPoint,
    /// Clicks build a polygon.
    PlacingPolygon {
        /// Vertices in click order. Once closed, the first vertex is
        /// repeated at the end.
        draft: Vec<Coordinate>,
        /// `false` once the ring has been sealed.
        is_open: bool,
    },
}

/// Result of a map click.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Nothing happened (idle, finished polygon, or non-finite input).
    Ignored,
    /// The drawn point moved here.
    PointPlaced(Coordinate),
    /// A vertex was appended to the open polygon.
    VertexAdded {
        /// Vertex count after the append.
        vertices: usize,
    },
    /// The polygon was sealed into this closed ring.
    PolygonClosed {
        /// Vertices with the first one repeated at the end.
        ring: Vec<Coordinate>,
    },
}

/// Result of a mode change. Every mode change discards the polygon
/// draft, any finished polygon, and the drawn point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    /// Mode before the change.
    pub previous: DrawingMode,
    /// Mode after the change.
    pub current: DrawingMode,
}

/// Owns the drawing mode and the polygon draft.
#[derive(Debug, Default)]
pub struct DrawingStateMachine {
    state: DrawingState,
}

impl DrawingStateMachine {
    /// Creates an idle machine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The full current state.
    #[must_use]
    pub const fn state(&self) -> &DrawingState {
        &self.state
    }

    /// The active mode.
    #[must_use]
    pub const fn mode(&self) -> DrawingMode {
        match self.state {
            DrawingState::Idle => DrawingMode::None,
            DrawingState::PlacingPoint => DrawingMode::Point,
            DrawingState::PlacingPolygon { .. } => DrawingMode::Polygon,
        }
    }

    /// Polygon vertices so far. Empty outside polygon mode.
    #[must_use]
    pub fn draft(&self) -> &[Coordinate] {
        match &self.state {
            DrawingState::PlacingPolygon { draft, .. } => draft,
            _ => &[],
        }
    }

    /// Whether a polygon is being drawn and not yet sealed.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, DrawingState::PlacingPolygon { is_open: true, .. })
    }

    /// The sealed ring, once the polygon has been closed.
    #[must_use]
    pub fn closed_ring(&self) -> Option<&[Coordinate]> {
        match &self.state {
            DrawingState::PlacingPolygon {
                draft,
                is_open: false,
            } => Some(draft),
            _ => None,
        }
    }

    /// Switches to `mode`, fully superseding the previous one.
    pub fn set_mode(&mut self, mode: DrawingMode) -> ModeChange {
        let previous = self.mode();

        self.state = match mode {
            DrawingMode::None => DrawingState::Idle,
            DrawingMode::Point => DrawingState::PlacingPoint,
            DrawingMode::Polygon => DrawingState::PlacingPolygon {
                draft: Vec::new(),
                is_open: true,
            },
        };

        log::debug!("Drawing mode {previous} -> {mode}");

        ModeChange {
            previous,
            current: mode,
        }
    }

    /// Resets to idle from any state. Same transition as
    /// `set_mode(DrawingMode::None)`.
    pub fn clear(&mut self) -> ModeChange {
        self.set_mode(DrawingMode::None)
    }

    /// Interprets a map click.
    pub fn on_map_click(&mut self, coord: Coordinate) -> ClickOutcome {
        if !coord.is_finite() {
            log::debug!("Ignoring non-finite click {coord:?}");
            return ClickOutcome::Ignored;
        }

        match &mut self.state {
            DrawingState::Idle
            | DrawingState::PlacingPolygon {
                is_open: false, ..
            } => ClickOutcome::Ignored,
            DrawingState::PlacingPoint => ClickOutcome::PointPlaced(coord),
            DrawingState::PlacingPolygon { draft, is_open } => {
                let closes = draft.len() > 2
                    && draft
                        .first()
                        .is_some_and(|first| coord.planar_distance(first) < CLOSE_THRESHOLD);

                if closes {
                    let first = draft[0];
                    draft.push(first);
                    *is_open = false;
                    log::debug!("Polygon closed with {} vertices", draft.len() - 1);
                    ClickOutcome::PolygonClosed {
                        ring: draft.clone(),
                    }
                } else {
                    draft.push(coord);
                    ClickOutcome::VertexAdded {
                        vertices: draft.len(),
                    }
                }
            }
        }
    }

    /// Ring to display while the polygon is still open.
    ///
    /// With three or more vertices the ring is closed back to the first
    /// vertex. With fewer, the last vertex is repeated so the renderer
    /// still receives a ring. The draft itself is not modified.
    #[must_use]
    pub fn preview_ring(&self) -> Option<Vec<Coordinate>> {
        let DrawingState::PlacingPolygon {
            draft,
            is_open: true,
        } = &self.state
        else {
            return None;
        };

        let (&first, &last) = (draft.first()?, draft.last()?);
        let closing = if draft.len() >= 3 { first } else { last };

        let mut ring = draft.clone();
        ring.push(closing);
        Some(ring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon_machine() -> DrawingStateMachine {
        let mut machine = DrawingStateMachine::new();
        machine.set_mode(DrawingMode::Polygon);
        machine
    }

    fn c(lon: f64, lat: f64) -> Coordinate {
        Coordinate::new(lon, lat)
    }

    #[test]
    fn starts_idle() {
        let machine = DrawingStateMachine::new();
        assert_eq!(machine.mode(), DrawingMode::None);
        assert_eq!(machine.state(), &DrawingState::Idle);
    }

    #[test]
    fn exactly_one_mode_after_each_change() {
        let mut machine = DrawingStateMachine::new();
        let sequence = [
            DrawingMode::Point,
            DrawingMode::Polygon,
            DrawingMode::Polygon,
            DrawingMode::None,
            DrawingMode::Point,
            DrawingMode::None,
        ];
        for mode in sequence {
            let change = machine.set_mode(mode);
            assert_eq!(change.current, mode);
            assert_eq!(machine.mode(), mode);
        }
    }

    #[test]
    fn click_while_idle_is_ignored() {
        let mut machine = DrawingStateMachine::new();
        assert_eq!(machine.on_map_click(c(1.0, 1.0)), ClickOutcome::Ignored);
    }

    #[test]
    fn point_clicks_replace_rather_than_accumulate() {
        let mut machine = DrawingStateMachine::new();
        machine.set_mode(DrawingMode::Point);

        assert_eq!(
            machine.on_map_click(c(1.0, 2.0)),
            ClickOutcome::PointPlaced(c(1.0, 2.0))
        );
        assert_eq!(
            machine.on_map_click(c(3.0, 4.0)),
            ClickOutcome::PointPlaced(c(3.0, 4.0))
        );
        assert_eq!(machine.mode(), DrawingMode::Point);
        assert!(machine.draft().is_empty());
    }

    #[test]
    fn click_near_first_vertex_closes_polygon() {
        let mut machine = polygon_machine();
        machine.on_map_click(c(0.0, 0.0));
        machine.on_map_click(c(1.0, 0.0));
        machine.on_map_click(c(1.0, 1.0));

        let outcome = machine.on_map_click(c(0.000_05, 0.000_05));
        let expected = vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 0.0)];

        assert_eq!(
            outcome,
            ClickOutcome::PolygonClosed {
                ring: expected.clone()
            }
        );
        assert!(!machine.is_open());
        assert_eq!(machine.closed_ring(), Some(expected.as_slice()));
    }

    #[test]
    fn two_vertices_never_close() {
        let mut machine = polygon_machine();
        machine.on_map_click(c(0.0, 0.0));
        machine.on_map_click(c(1.0, 0.0));

        let outcome = machine.on_map_click(c(0.000_01, 0.000_01));
        assert_eq!(outcome, ClickOutcome::VertexAdded { vertices: 3 });
        assert!(machine.is_open());
    }

    #[test]
    fn click_outside_threshold_adds_vertex() {
        let mut machine = polygon_machine();
        machine.on_map_click(c(0.0, 0.0));
        machine.on_map_click(c(1.0, 0.0));
        machine.on_map_click(c(1.0, 1.0));

        let outcome = machine.on_map_click(c(0.0002, 0.0));
        assert_eq!(outcome, ClickOutcome::VertexAdded { vertices: 4 });
    }

    #[test]
    fn click_exactly_at_threshold_does_not_close() {
        let mut machine = polygon_machine();
        machine.on_map_click(c(0.0, 0.0));
        machine.on_map_click(c(1.0, 0.0));
        machine.on_map_click(c(1.0, 1.0));

        let outcome = machine.on_map_click(c(CLOSE_THRESHOLD, 0.0));
        assert_eq!(outcome, ClickOutcome::VertexAdded { vertices: 4 });
    }

    #[test]
    fn clicks_after_closure_are_ignored() {
        let mut machine = polygon_machine();
        for p in [c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 0.0)] {
            machine.on_map_click(p);
        }
        assert!(!machine.is_open());
        assert_eq!(machine.on_map_click(c(5.0, 5.0)), ClickOutcome::Ignored);
        assert_eq!(machine.draft().len(), 4);
    }

    #[test]
    fn draft_grows_without_limit() {
        let mut machine = polygon_machine();
        for i in 0..1_000 {
            machine.on_map_click(c(f64::from(i), 1.0));
        }
        assert_eq!(machine.draft().len(), 1_000);
        assert!(machine.is_open());
    }

    #[test]
    fn non_finite_click_is_ignored() {
        let mut machine = polygon_machine();
        assert_eq!(
            machine.on_map_click(c(f64::NAN, 0.0)),
            ClickOutcome::Ignored
        );
        assert!(machine.draft().is_empty());
    }

    #[test]
    fn mode_change_discards_draft() {
        let mut machine = polygon_machine();
        machine.on_map_click(c(0.0, 0.0));
        machine.on_map_click(c(1.0, 0.0));

        machine.set_mode(DrawingMode::Point);
        assert!(machine.draft().is_empty());

        machine.set_mode(DrawingMode::Polygon);
        assert!(machine.draft().is_empty());
        assert!(machine.is_open());
    }

    #[test]
    fn clear_matches_set_mode_none() {
        let mut machine = polygon_machine();
        machine.on_map_click(c(0.0, 0.0));
        let change = machine.clear();

        assert_eq!(change.previous, DrawingMode::Polygon);
        assert_eq!(change.current, DrawingMode::None);
        assert_eq!(machine.state(), &DrawingState::Idle);
    }

    #[test]
    fn preview_closes_to_first_vertex_with_three_points() {
        let mut machine = polygon_machine();
        machine.on_map_click(c(0.0, 0.0));
        machine.on_map_click(c(1.0, 0.0));
        machine.on_map_click(c(1.0, 1.0));

        let preview = machine.preview_ring().unwrap();
        assert_eq!(
            preview,
            vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 0.0)]
        );
        assert_eq!(machine.draft().len(), 3);
    }

    #[test]
    fn preview_repeats_last_vertex_when_short() {
        let mut machine = polygon_machine();
        assert!(machine.preview_ring().is_none());

        machine.on_map_click(c(0.0, 0.0));
        assert_eq!(
            machine.preview_ring().unwrap(),
            vec![c(0.0, 0.0), c(0.0, 0.0)]
        );

        machine.on_map_click(c(1.0, 0.0));
        assert_eq!(
            machine.preview_ring().unwrap(),
            vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0)]
        );
    }

    #[test]
    fn no_preview_once_closed() {
        let mut machine = polygon_machine();
        for p in [c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 0.0)] {
            machine.on_map_click(p);
        }
        assert!(machine.preview_ring().is_none());
    }
}
