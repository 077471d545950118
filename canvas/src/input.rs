//! Input model: raw pointer/touch events and the gesture state machine.
//!
//! `InputEvent` is what the host feeds the engine, in client coordinates.
//! `InputState` is the gesture being tracked between press and release. It
//! is a tagged variant so a drag and a pinch can never be live at once.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::geometry::Point;
use crate::hit::Target;

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels. Ignored.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down = zoom out).
    pub dy: f64,
}

/// A raw input event in client coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Mouse button pressed.
    PointerDown(Point),
    /// Mouse moved.
    PointerMove(Point),
    /// Mouse button released.
    PointerUp,
    /// Mouse left the canvas.
    PointerLeave,
    /// Wheel scrolled over the canvas.
    Wheel { client: Point, delta: WheelDelta },
    /// Touch contacts after a finger landed.
    TouchStart(Vec<Point>),
    /// Touch contacts after fingers moved.
    TouchMove(Vec<Point>),
    /// A finger lifted.
    TouchEnd,
    /// The platform cancelled the touch sequence.
    TouchCancel,
}

/// Cursor hint for the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// Nothing loaded yet; clicking would open a file picker.
    #[default]
    Pointer,
    /// Something can be grabbed.
    Grab,
    /// A drag is in progress.
    Grabbing,
}

impl Cursor {
    /// CSS cursor keyword.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Pointer => "pointer",
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
        }
    }
}

/// Internal state for the gesture state machine.
///
/// Each active variant carries the baseline captured when the gesture began;
/// every move is computed from that baseline, not from the previous move.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// One pointer is moving an element.
    Dragging {
        /// The element being moved.
        target: Target,
        /// Canvas-space pointer position at press.
        anchor_pointer: Point,
        /// Element top-left at press.
        anchor_position: Point,
    },
    /// Two fingers are scaling an element.
    Pinching {
        /// The element being scaled.
        target: Target,
        /// Canvas-space finger distance at gesture start. Always positive.
        initial_distance: f64,
        /// Element scale at gesture start.
        initial_scale: f64,
    },
}

impl InputState {
    /// The element the live gesture acts on.
    #[must_use]
    pub fn target(&self) -> Option<Target> {
        match self {
            Self::Idle => None,
            Self::Dragging { target, .. } | Self::Pinching { target, .. } => Some(*target),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    #[must_use]
    pub fn is_pinching(&self) -> bool {
        matches!(self, Self::Pinching { .. })
    }
}

/// Position for the dragged element: anchor plus pointer travel.
#[must_use]
pub fn drag_position(anchor_pointer: Point, anchor_position: Point, pointer: Point) -> Point {
    Point {
        x: anchor_position.x + (pointer.x - anchor_pointer.x),
        y: anchor_position.y + (pointer.y - anchor_pointer.y),
    }
}

/// Requested scale for a pinch, before the floor clamp.
#[must_use]
pub fn pinch_scale(initial_scale: f64, initial_distance: f64, current_distance: f64) -> f64 {
    initial_scale * (current_distance / initial_distance)
}

/// Requested scale after a wheel step, before the floor clamp.
#[must_use]
pub fn wheel_scale(scale: f64, delta_y: f64) -> f64 {
    scale - delta_y * crate::consts::WHEEL_ZOOM_PER_DELTA
}
