//! Rendering: composites the scene into an RGBA surface.
//!
//! This module is the only place that writes pixels. It receives read-only
//! views of the scene and image store and does not mutate application state.
//!
//! Layers, back to front:
//! 1. background, axis-aligned, scaled
//! 2. stickers in sequence order, each rotated and optionally mirrored about
//!    its own center
//! 3. selection outline around the active sticker (rotated, never mirrored)
//!
//! Each destination pixel center is mapped back through the inverse element
//! transform and sampled bilinearly, then blended source-over. The output
//! depends only on the inputs, so repeated renders are bit-identical.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::consts::{SELECTION_RGBA, SELECTION_STROKE_PX};
use crate::geometry::{Placement, Point};
use crate::images::{ImageHandle, ImageStore};
use crate::scene::{Scene, Sticker};

/// Errors from turning a rendered surface into bytes.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Per-render switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Draw the outline around the active sticker.
    pub selection: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { selection: true }
    }
}

/// Allocate a transparent surface matching the scene's canvas size.
#[must_use]
pub fn surface_for(scene: &Scene) -> RgbaImage {
    let canvas = scene.canvas();
    RgbaImage::new(to_pixels(canvas.width), to_pixels(canvas.height))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_pixels(units: f64) -> u32 {
    units.round().clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Draw the full scene.
pub fn draw(surface: &mut RgbaImage, scene: &Scene, images: &ImageStore, options: RenderOptions) {
    // Layer 0: clear.
    for px in surface.pixels_mut() {
        *px = Rgba([0, 0, 0, 0]);
    }

    // Layer 1: background.
    if let Some(bg) = scene.background() {
        draw_image(surface, bg.image(), &ElementTransform::upright(&bg.placement));
    }

    // Layer 2: stickers, bottom first. Stickers whose pixels are not in the store yet are skipped.
    for sticker in scene.stickers() {
        if let Some(image) = images.get(&sticker.id) {
            draw_image(surface, image, &ElementTransform::for_sticker(sticker));
        }
    }

    // Layer 3: selection.
    if options.selection {
        if let Some(active) = scene.active_sticker() {
            draw_selection(surface, active);
        }
    }
}

/// Encode a surface as PNG bytes.
///
/// # Errors
///
/// Returns `RenderError::Encode` if the PNG encoder fails.
pub fn encode_png(surface: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Cursor::new(Vec::new());
    surface.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

// =============================================================
// Transforms
// =============================================================

/// Element box transform: translate to center, rotate, mirror.
///
/// Maps canvas points into the element's local frame, where the box spans
/// `[-w/2, w/2] × [-h/2, h/2]`.
struct ElementTransform {
    center: Point,
    half_w: f64,
    half_h: f64,
    sin: f64,
    cos: f64,
    mirror: bool,
    scale: f64,
}

impl ElementTransform {
    fn upright(placement: &Placement) -> Self {
        Self::new(placement, 0.0, false)
    }

    fn for_sticker(sticker: &Sticker) -> Self {
        Self::new(&sticker.placement, sticker.rotation, sticker.flip)
    }

    fn new(placement: &Placement, rotation_deg: f64, mirror: bool) -> Self {
        let size = placement.rendered_size();
        let (sin, cos) = rotation_deg.to_radians().sin_cos();
        Self {
            center: placement.center(),
            half_w: size.width / 2.0,
            half_h: size.height / 2.0,
            sin,
            cos,
            mirror,
            scale: placement.scale(),
        }
    }

    /// Canvas point → local frame. Inverse rotation; y-down makes positive angles clockwise.
    fn to_local(&self, p: Point) -> Point {
        let dx = p.x - self.center.x;
        let dy = p.y - self.center.y;
        let x = dx * self.cos + dy * self.sin;
        let y = -dx * self.sin + dy * self.cos;
        Point { x: if self.mirror { -x } else { x }, y }
    }

    /// Local frame → canvas point (rotation only; the mirror is symmetric about the box).
    fn to_canvas(&self, local: Point) -> Point {
        Point {
            x: self.center.x + local.x * self.cos - local.y * self.sin,
            y: self.center.y + local.x * self.sin + local.y * self.cos,
        }
    }

    /// Integer pixel bounds of the rotated box grown by `pad`, clipped to the surface.
    fn pixel_bounds(&self, pad: f64, surface: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
        let (hw, hh) = (self.half_w + pad, self.half_h + pad);
        let corners = [
            self.to_canvas(Point::new(-hw, -hh)),
            self.to_canvas(Point::new(hw, -hh)),
            self.to_canvas(Point::new(hw, hh)),
            self.to_canvas(Point::new(-hw, hh)),
        ];
        let min_x = corners.iter().map(|c| c.x).fold(f64::INFINITY, f64::min).floor();
        let max_x = corners.iter().map(|c| c.x).fold(f64::NEG_INFINITY, f64::max).ceil();
        let min_y = corners.iter().map(|c| c.y).fold(f64::INFINITY, f64::min).floor();
        let max_y = corners.iter().map(|c| c.y).fold(f64::NEG_INFINITY, f64::max).ceil();

        let width = f64::from(surface.width());
        let height = f64::from(surface.height());
        let x0 = min_x.max(0.0);
        let y0 = min_y.max(0.0);
        let x1 = max_x.min(width);
        let y1 = max_y.min(height);
        if !(x0 < x1 && y0 < y1) {
            return None;
        }
        Some((to_pixels(x0), to_pixels(y0), to_pixels(x1), to_pixels(y1)))
    }
}

// =============================================================
// Image layer
// =============================================================

fn draw_image(surface: &mut RgbaImage, image: &ImageHandle, xf: &ElementTransform) {
    if !image.is_drawable() || xf.scale <= 0.0 {
        return;
    }
    let Some((x0, y0, x1, y1)) = xf.pixel_bounds(0.0, surface) else {
        return;
    };
    let src = image.pixels();
    let natural = image.size();

    for dy in y0..y1 {
        for dx in x0..x1 {
            let local = xf.to_local(Point::new(f64::from(dx) + 0.5, f64::from(dy) + 0.5));
            let u = (local.x + xf.half_w) / xf.scale;
            let v = (local.y + xf.half_h) / xf.scale;
            if u < 0.0 || v < 0.0 || u >= natural.width || v >= natural.height {
                continue;
            }
            let sample = bilinear_sample(src, u - 0.5, v - 0.5);
            blend_over(surface.get_pixel_mut(dx, dy), sample);
        }
    }
}

/// Bilinear interpolation with clamp-to-edge addressing.
fn bilinear_sample(img: &RgbaImage, x: f64, y: f64) -> [f64; 4] {
    let max_x = i64::from(img.width()) - 1;
    let max_y = i64::from(img.height()) - 1;
    let x0f = x.floor();
    let y0f = y.floor();
    let fx = x - x0f;
    let fy = y - y0f;

    #[allow(clippy::cast_possible_truncation)]
    let (x0, y0) = (x0f as i64, y0f as i64);

    let texel = |sx: i64, sy: i64| -> [f64; 4] {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let p = img.get_pixel(sx.clamp(0, max_x) as u32, sy.clamp(0, max_y) as u32);
        [f64::from(p[0]), f64::from(p[1]), f64::from(p[2]), f64::from(p[3])]
    };

    let tl = texel(x0, y0);
    let tr = texel(x0 + 1, y0);
    let bl = texel(x0, y0 + 1);
    let br = texel(x0 + 1, y0 + 1);

    let lerp = |a: f64, b: f64, t: f64| a + (b - a) * t;
    let mut out = [0.0; 4];
    for c in 0..4 {
        out[c] = lerp(lerp(tl[c], tr[c], fx), lerp(bl[c], br[c], fx), fy);
    }
    out
}

/// Source-over compositing of a straight-alpha sample onto a straight-alpha pixel.
fn blend_over(dst: &mut Rgba<u8>, src: [f64; 4]) {
    let sa = src[3] / 255.0;
    if sa <= 0.0 {
        return;
    }
    let da = f64::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for c in 0..3 {
        let blended = (src[c] * sa + f64::from(dst[c]) * da * (1.0 - sa)) / out_a;
        dst[c] = channel(blended);
    }
    dst[3] = channel(out_a * 255.0);
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

// =============================================================
// Selection outline
// =============================================================

/// Stroke the active sticker's rotated box. The stroke straddles the box edge
/// and keeps a fixed width regardless of the sticker's scale.
fn draw_selection(surface: &mut RgbaImage, sticker: &Sticker) {
    let xf = ElementTransform::new(&sticker.placement, sticker.rotation, false);
    let half_stroke = SELECTION_STROKE_PX / 2.0;
    let Some((x0, y0, x1, y1)) = xf.pixel_bounds(half_stroke, surface) else {
        return;
    };
    let outer_w = xf.half_w + half_stroke;
    let outer_h = xf.half_h + half_stroke;
    let inner_w = xf.half_w - half_stroke;
    let inner_h = xf.half_h - half_stroke;
    let color = SELECTION_RGBA.map(f64::from);

    for dy in y0..y1 {
        for dx in x0..x1 {
            let local = xf.to_local(Point::new(f64::from(dx) + 0.5, f64::from(dy) + 0.5));
            let (ax, ay) = (local.x.abs(), local.y.abs());
            let in_outer = ax <= outer_w && ay <= outer_h;
            let in_inner = ax < inner_w && ay < inner_h;
            if in_outer && !in_inner {
                blend_over(surface.get_pixel_mut(dx, dy), color);
            }
        }
    }
}
