//! Scene model: the background, the sticker sequence, and the active selection.
//!
//! This module defines the elements that make up a composition (`Background`,
//! `Sticker`), a sparse-update type for edits coming from the editing controls
//! (`StickerPatch`), and the single owned store all handlers go through
//! (`Scene`).
//!
//! Sticker order is meaningful: the sequence is drawn front to back in
//! insertion order, so the last sticker is on top and is hit-tested first.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use tracing::debug;
use uuid::Uuid;

use crate::geometry::{Placement, Size};
use crate::hit::Target;
use crate::images::ImageHandle;

/// Unique identifier for a sticker. Never reused within a process.
pub type StickerId = Uuid;

/// The photo every sticker is composed over.
#[derive(Debug, Clone)]
pub struct Background {
    /// Where the background sits and how large it is drawn.
    pub placement: Placement,
    image: ImageHandle,
}

impl Background {
    #[must_use]
    pub fn image(&self) -> &ImageHandle {
        &self.image
    }
}

/// A decorative image placed over the background.
#[derive(Debug, Clone, PartialEq)]
pub struct Sticker {
    /// Stable identity, assigned on insertion.
    pub id: StickerId,
    /// Unrotated box in canvas space.
    pub placement: Placement,
    /// Clockwise rotation in degrees about the box center. Stored unwrapped.
    pub rotation: f64,
    /// Mirror horizontally about the box center.
    pub flip: bool,
    /// Where the image was loaded from.
    pub source: String,
}

/// Sparse update for a sticker. Only present fields are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StickerPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    /// New scale; clamped to the floor on apply.
    pub scale: Option<f64>,
    pub rotation: Option<f64>,
    pub flip: Option<bool>,
}

/// Sparse update for the background. Rotation and flip do not apply to it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BackgroundPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub scale: Option<f64>,
}

/// The composition: optional background, ordered stickers, optional selection.
#[derive(Debug)]
pub struct Scene {
    canvas: Size,
    background: Option<Background>,
    stickers: Vec<Sticker>,
    active: Option<StickerId>,
}

impl Scene {
    /// Create an empty scene on a canvas of the given logical size.
    #[must_use]
    pub fn new(canvas: Size) -> Self {
        Self { canvas, background: None, stickers: Vec::new(), active: None }
    }

    /// Logical canvas size.
    #[must_use]
    pub fn canvas(&self) -> Size {
        self.canvas
    }

    // --- Background ---

    /// Replace the background with `image`, cover-fit and centered.
    pub fn set_background(&mut self, image: ImageHandle) {
        let placement = Placement::cover(image.size(), self.canvas);
        debug!(scale = placement.scale(), x = placement.position.x, y = placement.position.y, "background set");
        self.background = Some(Background { placement, image });
    }

    /// Apply a partial update to the background. Returns false without one.
    pub fn update_background(&mut self, patch: &BackgroundPatch) -> bool {
        let Some(bg) = self.background.as_mut() else {
            return false;
        };
        if let Some(x) = patch.x {
            bg.placement.position.x = x;
        }
        if let Some(y) = patch.y {
            bg.placement.position.y = y;
        }
        if let Some(scale) = patch.scale {
            bg.placement.set_scale(scale);
        }
        true
    }

    #[must_use]
    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    #[must_use]
    pub fn has_background(&self) -> bool {
        self.background.is_some()
    }

    // --- Stickers ---

    /// Append a sticker of the given natural size on top of the stack and select it.
    pub fn add_sticker(&mut self, natural_size: Size, source: impl Into<String>) -> StickerId {
        let id = Uuid::new_v4();
        let placement = Placement::sticker_start(natural_size, self.canvas);
        self.stickers.push(Sticker { id, placement, rotation: 0.0, flip: false, source: source.into() });
        self.active = Some(id);
        debug!(sticker = %id, scale = placement.scale(), "sticker added");
        id
    }

    /// Remove a sticker. Unknown ids are ignored. Clears the selection if it pointed here.
    pub fn remove_sticker(&mut self, id: &StickerId) -> Option<Sticker> {
        let index = self.stickers.iter().position(|s| s.id == *id)?;
        let removed = self.stickers.remove(index);
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        debug!(sticker = %id, "sticker removed");
        Some(removed)
    }

    /// Apply a partial update to a sticker. Returns false if the sticker doesn't exist.
    pub fn update_sticker(&mut self, id: &StickerId, patch: &StickerPatch) -> bool {
        let Some(sticker) = self.sticker_mut(id) else {
            return false;
        };
        if let Some(x) = patch.x {
            sticker.placement.position.x = x;
        }
        if let Some(y) = patch.y {
            sticker.placement.position.y = y;
        }
        if let Some(scale) = patch.scale {
            sticker.placement.set_scale(scale);
        }
        if let Some(rotation) = patch.rotation {
            sticker.rotation = rotation;
        }
        if let Some(flip) = patch.flip {
            sticker.flip = flip;
        }
        true
    }

    #[must_use]
    pub fn sticker(&self, id: &StickerId) -> Option<&Sticker> {
        self.stickers.iter().find(|s| s.id == *id)
    }

    fn sticker_mut(&mut self, id: &StickerId) -> Option<&mut Sticker> {
        self.stickers.iter_mut().find(|s| s.id == *id)
    }

    /// Stickers in draw order (bottom first).
    #[must_use]
    pub fn stickers(&self) -> &[Sticker] {
        &self.stickers
    }

    // --- Selection ---

    /// Select a sticker, or clear the selection. An unknown id clears it.
    ///
    /// Returns true when the selection changed.
    pub fn set_active(&mut self, id: Option<StickerId>) -> bool {
        let next = id.filter(|id| self.sticker(id).is_some());
        let changed = next != self.active;
        self.active = next;
        changed
    }

    #[must_use]
    pub fn active(&self) -> Option<StickerId> {
        self.active
    }

    #[must_use]
    pub fn active_sticker(&self) -> Option<&Sticker> {
        self.active.as_ref().and_then(|id| self.sticker(id))
    }

    // --- Targets ---

    /// Placement of a drag/zoom target, if it still exists.
    #[must_use]
    pub fn placement(&self, target: &Target) -> Option<&Placement> {
        match target {
            Target::Background => self.background.as_ref().map(|b| &b.placement),
            Target::Sticker(id) => self.sticker(id).map(|s| &s.placement),
        }
    }

    // --- Lifecycle ---

    /// Drop the background, every sticker, and the selection.
    pub fn reset(&mut self) {
        self.background = None;
        self.stickers.clear();
        self.active = None;
        debug!("scene reset");
    }

    /// Number of stickers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stickers.len()
    }

    /// True when there is neither a background nor any sticker.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.background.is_none() && self.stickers.is_empty()
    }
}
