//! Decoded image handles and the sticker image store.
//!
//! A sticker only carries geometry; the pixels it draws live in
//! [`ImageStore`] under the sticker's id. Ids are never reused, so entries
//! left behind by deleted stickers are inert rather than wrong.

#[cfg(test)]
#[path = "images_test.rs"]
mod images_test;

use std::collections::HashMap;

use image::{DynamicImage, RgbaImage};

use crate::geometry::Size;
use crate::scene::StickerId;

/// A decoded RGBA raster, ready to draw.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    pixels: RgbaImage,
}

impl ImageHandle {
    #[must_use]
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Convert any decoded image into an RGBA handle.
    #[must_use]
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { pixels: image.into_rgba8() }
    }

    /// Intrinsic pixel dimensions.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.pixels.width()), f64::from(self.pixels.height()))
    }

    /// Whether the raster has at least one pixel.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.pixels.width() > 0 && self.pixels.height() > 0
    }

    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Sticker images keyed by sticker id.
#[derive(Debug, Default)]
pub struct ImageStore {
    stickers: HashMap<StickerId, ImageHandle>,
}

impl ImageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the image for `id`, replacing any previous entry.
    pub fn insert(&mut self, id: StickerId, image: ImageHandle) {
        self.stickers.insert(id, image);
    }

    #[must_use]
    pub fn get(&self, id: &StickerId) -> Option<&ImageHandle> {
        self.stickers.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &StickerId) -> bool {
        self.stickers.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stickers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stickers.is_empty()
    }
}
