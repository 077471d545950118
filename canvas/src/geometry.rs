//! Geometry: canvas-space points, client-to-canvas mapping, and placement math.
//!
//! Every stored position and size lives in canvas space, a fixed logical
//! coordinate system (1024×1024 by default) with its origin at the top-left
//! and y pointing down. Client space is whatever the host reports pointer
//! positions in; [`to_canvas_coordinates`] bridges the two.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MIN_SCALE, STICKER_START_FRACTION};

/// A point in either client or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A square of edge `edge`.
    #[must_use]
    pub fn square(edge: f64) -> Self {
        Self { width: edge, height: edge }
    }
}

/// The on-screen rectangle the canvas occupies, in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ClientRect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// A rect at the client origin with the given size.
    #[must_use]
    pub fn at_origin(size: Size) -> Self {
        Self { left: 0.0, top: 0.0, width: size.width, height: size.height }
    }

    fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite()) || self.width <= 0.0 || self.height <= 0.0
    }
}

/// Map a client-space point into canvas space.
///
/// Scales by the ratio of the logical canvas size to the canvas's rendered
/// size. A degenerate bounding box yields the canvas origin.
#[must_use]
pub fn to_canvas_coordinates(client: Point, rect: ClientRect, logical: Size) -> Point {
    if rect.is_degenerate() {
        return Point::default();
    }
    Point {
        x: (client.x - rect.left) / rect.width * logical.width,
        y: (client.y - rect.top) / rect.height * logical.height,
    }
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Midpoint of the segment `a`–`b`.
#[must_use]
pub fn midpoint(a: Point, b: Point) -> Point {
    Point { x: (a.x + b.x) / 2.0, y: (a.y + b.y) / 2.0 }
}

/// Clamp a requested scale to the minimum floor. Non-finite requests clamp to the floor.
#[must_use]
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_finite() { scale.max(MIN_SCALE) } else { MIN_SCALE }
}

/// Position, intrinsic size, and scale of an image placed on the canvas.
///
/// The natural size is fixed at construction and the scale can never drop
/// below [`MIN_SCALE`]; both are enforced by keeping those fields private.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Top-left corner in canvas space, before any rotation.
    pub position: Point,
    natural_size: Size,
    scale: f64,
}

impl Placement {
    #[must_use]
    pub fn new(position: Point, natural_size: Size, scale: f64) -> Self {
        Self { position, natural_size, scale: clamp_scale(scale) }
    }

    /// Cover-fit: scale so the image fills `canvas` (cropping overflow), centered.
    #[must_use]
    pub fn cover(natural_size: Size, canvas: Size) -> Self {
        let scale = (canvas.width / natural_size.width).max(canvas.height / natural_size.height);
        Self::centered(natural_size, canvas, scale)
    }

    /// Starting placement for a sticker: fit-within, never upscaled, then
    /// shrunk to a quarter. Centered.
    #[must_use]
    pub fn sticker_start(natural_size: Size, canvas: Size) -> Self {
        let fit = (canvas.width / natural_size.width)
            .min(canvas.height / natural_size.height)
            .min(1.0);
        Self::centered(natural_size, canvas, fit * STICKER_START_FRACTION)
    }

    fn centered(natural_size: Size, canvas: Size, scale: f64) -> Self {
        let scale = clamp_scale(scale);
        let position = Point {
            x: (canvas.width - natural_size.width * scale) / 2.0,
            y: (canvas.height - natural_size.height * scale) / 2.0,
        };
        Self { position, natural_size, scale }
    }

    #[must_use]
    pub fn natural_size(&self) -> Size {
        self.natural_size
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the scale, clamped to the floor. Position is left untouched.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = clamp_scale(scale);
    }

    /// Natural size times scale.
    #[must_use]
    pub fn rendered_size(&self) -> Size {
        Size {
            width: self.natural_size.width * self.scale,
            height: self.natural_size.height * self.scale,
        }
    }

    /// Center of the unrotated box.
    #[must_use]
    pub fn center(&self) -> Point {
        let size = self.rendered_size();
        Point { x: self.position.x + size.width / 2.0, y: self.position.y + size.height / 2.0 }
    }

    /// Change the scale while keeping `anchor` at the same element-relative position.
    ///
    /// Per axis: `new_pos = old_pos - ((anchor - old_pos) / old_size) * (new_size - old_size)`.
    pub fn zoom_about(&mut self, anchor: Point, scale: f64) {
        let old = self.rendered_size();
        self.scale = clamp_scale(scale);
        let new = self.rendered_size();
        if old.width > 0.0 {
            self.position.x -= (anchor.x - self.position.x) / old.width * (new.width - old.width);
        }
        if old.height > 0.0 {
            self.position.y -= (anchor.y - self.position.y) / old.height * (new.height - old.height);
        }
    }
}

/// Whether `point` lies in the axis-aligned box `[x, x+w] × [y, y+h]`, edges included.
///
/// Rotation is not taken into account: a rotated sticker is hit-tested
/// against its unrotated box.
#[must_use]
pub fn point_in_bounds(point: Point, placement: &Placement) -> bool {
    let size = placement.rendered_size();
    point.x >= placement.position.x
        && point.x <= placement.position.x + size.width
        && point.y >= placement.position.y
        && point.y <= placement.position.y + size.height
}
