//! Shared numeric constants for the canvas crate.

// ── Canvas ──────────────────────────────────────────────────────

/// Default logical edge length of the square canvas, in canvas units.
pub const DEFAULT_CANVAS_SIZE: f64 = 1024.0;

// ── Scale ───────────────────────────────────────────────────────

/// Smallest scale factor any placed image may have.
pub const MIN_SCALE: f64 = 0.05;

/// Fraction of the fit-within scale a freshly added sticker starts at.
pub const STICKER_START_FRACTION: f64 = 0.25;

/// Scale change per unit of vertical wheel delta.
pub const WHEEL_ZOOM_PER_DELTA: f64 = 0.001;

// ── Selection outline ───────────────────────────────────────────

/// Outline stroke width in canvas pixels. Not scaled with the sticker.
pub const SELECTION_STROKE_PX: f64 = 8.0;

/// Outline color (`#F97316`), opaque RGBA.
pub const SELECTION_RGBA: [u8; 4] = [0xF9, 0x73, 0x16, 0xFF];
