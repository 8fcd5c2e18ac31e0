//! Off-screen player indicators
//!
//! A remote player outside the viewport is shown as a small marker where the
//! line from the local player towards it crosses the screen border. Each
//! edge is tested on its own, so a player beyond a corner gets two markers.

use crate::rendering::{Colour, Surface};

const MARKER_SIZE: f32 = 4.0;

/// One side of the screen rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Bottom,
    Top,
    Left,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Bottom, Edge::Top, Edge::Left, Edge::Right];

    /// Whether a screen point lies beyond this edge
    pub fn is_crossed_by(self, x: f32, y: f32, width: f32, height: f32) -> bool {
        match self {
            Edge::Bottom => y > height,
            Edge::Top => y < 0.0,
            Edge::Left => x < 0.0,
            Edge::Right => x > width,
        }
    }

    /// Endpoints of this edge in screen coordinates
    pub fn segment(self, width: f32, height: f32) -> ((f32, f32), (f32, f32)) {
        match self {
            Edge::Bottom => ((0.0, height), (width, height)),
            Edge::Top => ((0.0, 0.0), (width, 0.0)),
            Edge::Left => ((0.0, 0.0), (0.0, height)),
            Edge::Right => ((width, 0.0), (width, height)),
        }
    }

    /// Top-left corner of the marker square so it sits just inside the edge
    pub fn marker_origin(self, x: f32, y: f32) -> (f32, f32) {
        let half = MARKER_SIZE / 2.0;
        match self {
            Edge::Bottom => (x - half, y - MARKER_SIZE),
            Edge::Top => (x - half, y),
            Edge::Left => (x, y - half),
            Edge::Right => (x - MARKER_SIZE, y - half),
        }
    }
}

/// Where to draw one off-screen marker, on a given edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub edge: Edge,
    pub x: f32,
    pub y: f32,
}

/// Intersection of the infinite lines through `p1`-`p2` and `p3`-`p4`.
///
/// Returns `None` for parallel or coincident lines, and whenever the result
/// would not be a finite point.
pub fn line_intersection(
    (x1, y1): (f32, f32),
    (x2, y2): (f32, f32),
    (x3, y3): (f32, f32),
    (x4, y4): (f32, f32),
) -> Option<(f32, f32)> {
    let denominator = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denominator.abs() <= f32::EPSILON {
        return None;
    }

    let a = x1 * y2 - y1 * x2;
    let b = x3 * y4 - y3 * x4;
    let px = (a * (x3 - x4) - (x1 - x2) * b) / denominator;
    let py = (a * (y3 - y4) - (y1 - y2) * b) / denominator;

    if px.is_finite() && py.is_finite() {
        Some((px, py))
    } else {
        None
    }
}

/// Markers for a remote player at unclamped screen position `remote`, seen
/// from the local player at `local`. Degenerate edges are skipped and every
/// returned point is clamped onto the screen.
pub fn project(local: (f32, f32), remote: (f32, f32), width: f32, height: f32) -> Vec<Marker> {
    let mut markers = Vec::new();

    for edge in Edge::ALL {
        if !edge.is_crossed_by(remote.0, remote.1, width, height) {
            continue;
        }

        let (start, end) = edge.segment(width, height);
        if let Some((x, y)) = line_intersection(local, remote, start, end) {
            markers.push(Marker {
                edge,
                x: x.min(width).max(0.0),
                y: y.min(height).max(0.0),
            });
        }
    }

    markers
}

/// Paints each marker as a small square just inside its edge
pub fn draw_markers<S: Surface + ?Sized>(surface: &mut S, markers: &[Marker]) {
    for marker in markers {
        let (x, y) = marker.edge.marker_origin(marker.x, marker.y);
        surface.fill_rect(x, y, MARKER_SIZE, MARKER_SIZE, Colour::MARKER);
    }
}
