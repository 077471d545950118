#![allow(clippy::float_cmp)]

use image::RgbaImage;

use super::*;
use crate::consts::MIN_SCALE;
use crate::geometry::Point;

// =============================================================
// Helpers
// =============================================================

fn canvas() -> Size {
    Size::square(1024.0)
}

fn image(w: u32, h: u32) -> ImageHandle {
    ImageHandle::new(RgbaImage::new(w, h))
}

fn scene_with_stickers(n: usize) -> (Scene, Vec<StickerId>) {
    let mut scene = Scene::new(canvas());
    let ids = (0..n)
        .map(|i| scene.add_sticker(Size::square(200.0), format!("sticker-{i}")))
        .collect();
    (scene, ids)
}

// =============================================================
// Construction
// =============================================================

#[test]
fn new_scene_is_empty() {
    let scene = Scene::new(canvas());
    assert!(scene.is_empty());
    assert!(!scene.has_background());
    assert_eq!(scene.len(), 0);
    assert!(scene.active().is_none());
    assert_eq!(scene.canvas(), canvas());
}

// =============================================================
// Background
// =============================================================

#[test]
fn set_background_cover_fits_and_centers() {
    let mut scene = Scene::new(canvas());
    scene.set_background(image(800, 600));

    let bg = scene.background().map(|b| b.placement);
    let Some(p) = bg else {
        panic!("background missing");
    };
    assert!((p.scale() - 1024.0 / 600.0).abs() < 1e-9);
    assert!(p.position.x < 0.0);
    assert!(p.position.y.abs() < 1e-9);
}

#[test]
fn set_background_replaces_previous() {
    let mut scene = Scene::new(canvas());
    scene.set_background(image(800, 600));
    scene.set_background(image(1024, 1024));

    let bg = scene.background().map(|b| (b.placement.scale(), b.image().size()));
    assert_eq!(bg, Some((1.0, Size::square(1024.0))));
}

#[test]
fn background_does_not_affect_selection() {
    let (mut scene, ids) = scene_with_stickers(1);
    scene.set_background(image(100, 100));
    assert_eq!(scene.active(), Some(ids[0]));
}

#[test]
fn update_background_applies_present_fields() {
    let mut scene = Scene::new(canvas());
    scene.set_background(image(1024, 1024));
    assert!(scene.update_background(&BackgroundPatch { x: Some(-20.0), scale: Some(0.0), ..Default::default() }));

    let Some(p) = scene.background().map(|b| b.placement) else {
        panic!("background missing");
    };
    assert_eq!(p.position, Point::new(-20.0, 0.0));
    assert_eq!(p.scale(), MIN_SCALE);
}

#[test]
fn update_background_without_background_is_noop() {
    let mut scene = Scene::new(canvas());
    assert!(!scene.update_background(&BackgroundPatch { y: Some(5.0), ..Default::default() }));
    assert!(!scene.has_background());
}

// =============================================================
// Stickers
// =============================================================

#[test]
fn add_sticker_places_and_selects() {
    let mut scene = Scene::new(canvas());
    let id = scene.add_sticker(Size::square(200.0), "star.png");

    assert_eq!(scene.active(), Some(id));
    let Some(sticker) = scene.sticker(&id) else {
        panic!("sticker missing");
    };
    assert_eq!(sticker.placement.scale(), 0.25);
    assert_eq!(sticker.placement.position, Point::new(487.0, 487.0));
    assert_eq!(sticker.rotation, 0.0);
    assert!(!sticker.flip);
    assert_eq!(sticker.source, "star.png");
}

#[test]
fn add_sticker_keeps_insertion_order_and_unique_ids() {
    let (scene, ids) = scene_with_stickers(3);
    let order: Vec<StickerId> = scene.stickers().iter().map(|s| s.id).collect();
    assert_eq!(order, ids);
    assert_ne!(ids[0], ids[1]);
    assert_ne!(ids[1], ids[2]);
    assert_eq!(scene.active(), Some(ids[2]));
}

#[test]
fn remove_active_sticker_clears_selection() {
    let (mut scene, ids) = scene_with_stickers(2);
    assert_eq!(scene.active(), Some(ids[1]));

    let removed = scene.remove_sticker(&ids[1]);
    assert_eq!(removed.map(|s| s.id), Some(ids[1]));
    assert!(scene.active().is_none());
    assert_eq!(scene.len(), 1);
}

#[test]
fn remove_inactive_sticker_keeps_selection() {
    let (mut scene, ids) = scene_with_stickers(2);
    scene.remove_sticker(&ids[0]);
    assert_eq!(scene.active(), Some(ids[1]));
    assert_eq!(scene.len(), 1);
}

#[test]
fn remove_unknown_sticker_is_noop() {
    let (mut scene, ids) = scene_with_stickers(1);
    assert!(scene.remove_sticker(&Uuid::new_v4()).is_none());
    assert_eq!(scene.len(), 1);
    assert_eq!(scene.active(), Some(ids[0]));
}

#[test]
fn update_sticker_applies_only_present_fields() {
    let (mut scene, ids) = scene_with_stickers(1);
    let patch = StickerPatch { rotation: Some(450.0), flip: Some(true), ..Default::default() };
    assert!(scene.update_sticker(&ids[0], &patch));

    let Some(s) = scene.sticker(&ids[0]) else {
        panic!("sticker missing");
    };
    // Rotation is stored unwrapped.
    assert_eq!(s.rotation, 450.0);
    assert!(s.flip);
    assert_eq!(s.placement.scale(), 0.25);
    assert_eq!(s.placement.position, Point::new(487.0, 487.0));
}

#[test]
fn update_sticker_position_and_clamped_scale() {
    let (mut scene, ids) = scene_with_stickers(1);
    let patch = StickerPatch { x: Some(1.0), y: Some(2.0), scale: Some(-4.0), ..Default::default() };
    assert!(scene.update_sticker(&ids[0], &patch));

    let s = scene.sticker(&ids[0]).map(|s| s.placement);
    assert_eq!(s.map(|p| p.position), Some(Point::new(1.0, 2.0)));
    assert_eq!(s.map(|p| p.scale()), Some(MIN_SCALE));
}

#[test]
fn update_unknown_sticker_is_noop() {
    let (mut scene, _) = scene_with_stickers(1);
    let patch = StickerPatch { rotation: Some(10.0), ..Default::default() };
    assert!(!scene.update_sticker(&Uuid::new_v4(), &patch));
}

// =============================================================
// Selection
// =============================================================

#[test]
fn set_active_reports_change() {
    let (mut scene, ids) = scene_with_stickers(2);
    assert!(scene.set_active(Some(ids[0])));
    assert!(!scene.set_active(Some(ids[0])));
    assert!(scene.set_active(None));
    assert!(scene.active_sticker().is_none());
}

#[test]
fn set_active_unknown_id_clears() {
    let (mut scene, _) = scene_with_stickers(1);
    assert!(scene.set_active(Some(Uuid::new_v4())));
    assert!(scene.active().is_none());
}

// =============================================================
// Targets
// =============================================================

#[test]
fn placement_lookup_by_target() {
    let (mut scene, ids) = scene_with_stickers(1);
    assert!(scene.placement(&Target::Background).is_none());

    scene.set_background(image(1024, 1024));
    assert!(scene.placement(&Target::Background).is_some());
    assert!(scene.placement(&Target::Sticker(ids[0])).is_some());
    assert!(scene.placement(&Target::Sticker(Uuid::new_v4())).is_none());

    assert!(scene.update_background(&BackgroundPatch { x: Some(-5.0), y: Some(3.0), scale: None }));
    assert_eq!(scene.placement(&Target::Background).map(|p| p.position), Some(Point::new(-5.0, 3.0)));
}

// =============================================================
// Reset
// =============================================================

#[test]
fn reset_clears_everything() {
    let (mut scene, _) = scene_with_stickers(3);
    scene.set_background(image(64, 64));
    scene.reset();

    assert!(scene.is_empty());
    assert!(scene.background().is_none());
    assert!(scene.stickers().is_empty());
    assert!(scene.active().is_none());
}
