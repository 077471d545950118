#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::geometry::{Point, point_in_bounds};
use crate::scene::{Scene, StickerId};

/// Something a gesture can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Background,
    Sticker(StickerId),
}

impl Target {
    /// The sticker id, if this target is a sticker.
    #[must_use]
    pub fn sticker_id(&self) -> Option<StickerId> {
        match self {
            Self::Sticker(id) => Some(*id),
            Self::Background => None,
        }
    }
}

/// Test which element (if any) is under `canvas_pt`.
///
/// Stickers are checked topmost first (reverse draw order), then the
/// background. Boxes are treated as unrotated.
#[must_use]
pub fn hit_test(scene: &Scene, canvas_pt: Point) -> Option<Target> {
    if let Some(sticker) = scene
        .stickers()
        .iter()
        .rev()
        .find(|s| point_in_bounds(canvas_pt, &s.placement))
    {
        return Some(Target::Sticker(sticker.id));
    }
    scene
        .background()
        .filter(|bg| point_in_bounds(canvas_pt, &bg.placement))
        .map(|_| Target::Background)
}
