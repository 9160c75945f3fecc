//! Handle-driven resize.
//!
//! A resize is computed from the geometry captured at drag start and the
//! cumulative world-space pointer delta since then. Because the original
//! geometry is never overwritten mid-drag, an edge dragged past the minimum
//! size stays pinned at the floor and starts tracking the cursor again as soon
//! as the pointer comes back within range.

#[cfg(test)]
#[path = "resize_test.rs"]
mod resize_test;

use std::fmt;
use std::str::FromStr;

use crate::camera::{Point, Rect};
use crate::error::EditorError;

/// One of the eight resize handles around a selection box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    Nw,
    N,
    Ne,
    W,
    E,
    Sw,
    S,
    Se,
}

/// Which edge of an axis a handle moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Leading,
    Trailing,
}

impl ResizeHandle {
    pub const ALL: [Self; 8] = [Self::Nw, Self::N, Self::Ne, Self::W, Self::E, Self::Sw, Self::S, Self::Se];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nw => "nw",
            Self::N => "n",
            Self::Ne => "ne",
            Self::W => "w",
            Self::E => "e",
            Self::Sw => "sw",
            Self::S => "s",
            Self::Se => "se",
        }
    }

    /// CSS cursor shown while hovering this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Nw | Self::Se => "nwse-resize",
            Self::Ne | Self::Sw => "nesw-resize",
            Self::N | Self::S => "ns-resize",
            Self::W | Self::E => "ew-resize",
        }
    }

    /// Handle location on `rect`.
    #[must_use]
    pub fn point_on(self, rect: &Rect) -> Point {
        let x = match self.x_edge() {
            Some(Edge::Leading) => rect.x,
            Some(Edge::Trailing) => rect.right(),
            None => rect.x + rect.width * 0.5,
        };
        let y = match self.y_edge() {
            Some(Edge::Leading) => rect.y,
            Some(Edge::Trailing) => rect.bottom(),
            None => rect.y + rect.height * 0.5,
        };
        Point::new(x, y)
    }

    fn x_edge(self) -> Option<Edge> {
        match self {
            Self::Nw | Self::W | Self::Sw => Some(Edge::Leading),
            Self::Ne | Self::E | Self::Se => Some(Edge::Trailing),
            Self::N | Self::S => None,
        }
    }

    fn y_edge(self) -> Option<Edge> {
        match self {
            Self::Nw | Self::N | Self::Ne => Some(Edge::Leading),
            Self::Sw | Self::S | Self::Se => Some(Edge::Trailing),
            Self::W | Self::E => None,
        }
    }
}

impl fmt::Display for ResizeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResizeHandle {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|h| h.as_str() == s)
            .ok_or_else(|| EditorError::InvalidResizeHandle(s.to_string()))
    }
}

/// Resize `orig` by dragging `handle` a cumulative `(dx, dy)`.
///
/// Each axis the handle touches gets `size = max(min_size, orig ± delta)`.
/// A leading edge (west/north) moves the origin so the opposite edge stays
/// where it was; a trailing edge leaves the origin alone. Axes the handle
/// does not touch are copied unchanged.
#[must_use]
pub fn resize(orig: Rect, handle: ResizeHandle, dx: f64, dy: f64, min_size: f64) -> Rect {
    let (x, width) = resize_axis(orig.x, orig.width, handle.x_edge(), dx, min_size);
    let (y, height) = resize_axis(orig.y, orig.height, handle.y_edge(), dy, min_size);
    Rect { x, y, width, height }
}

/// [`resize`] addressed by a handle tag.
///
/// # Errors
///
/// [`EditorError::InvalidResizeHandle`] when `tag` is not one of
/// `nw|n|ne|w|e|sw|s|se`.
pub fn resize_tagged(orig: Rect, tag: &str, dx: f64, dy: f64, min_size: f64) -> Result<Rect, EditorError> {
    let handle = tag.parse::<ResizeHandle>()?;
    Ok(resize(orig, handle, dx, dy, min_size))
}

fn resize_axis(origin: f64, size: f64, edge: Option<Edge>, delta: f64, min_size: f64) -> (f64, f64) {
    match edge {
        None => (origin, size),
        Some(Edge::Trailing) => (origin, (size + delta).max(min_size)),
        Some(Edge::Leading) => {
            let next = (size - delta).max(min_size);
            (origin + size - next, next)
        }
    }
}
