use image::Rgba;

use super::*;
use crate::geometry::Size;
use crate::scene::{BackgroundPatch, StickerId, StickerPatch};

// =============================================================
// Helpers
// =============================================================

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
const GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);
const ORANGE: Rgba<u8> = Rgba(SELECTION_RGBA);

fn solid(w: u32, h: u32, color: Rgba<u8>) -> ImageHandle {
    ImageHandle::new(RgbaImage::from_pixel(w, h, color))
}

/// 40x40: left half red, right half blue.
fn split_vertical() -> ImageHandle {
    ImageHandle::new(RgbaImage::from_fn(40, 40, |x, _| if x < 20 { RED } else { BLUE }))
}

/// 40x40: top half red, bottom half blue.
fn split_horizontal() -> ImageHandle {
    ImageHandle::new(RgbaImage::from_fn(40, 40, |_, y| if y < 20 { RED } else { BLUE }))
}

/// Scene on a 100x100 canvas with one 40x40 sticker at (30,30), scale 1.
fn small_scene(image: ImageHandle) -> (Scene, ImageStore, StickerId) {
    let mut scene = Scene::new(Size::square(100.0));
    let mut store = ImageStore::new();
    let id = scene.add_sticker(image.size(), "test");
    store.insert(id, image);
    scene.update_sticker(&id, &StickerPatch { x: Some(30.0), y: Some(30.0), scale: Some(1.0), ..Default::default() });
    (scene, store, id)
}

fn rendered(scene: &Scene, store: &ImageStore, options: RenderOptions) -> RgbaImage {
    let mut surface = surface_for(scene);
    draw(&mut surface, scene, store, options);
    surface
}

fn no_selection() -> RenderOptions {
    RenderOptions { selection: false }
}

fn close(a: Rgba<u8>, b: Rgba<u8>, tolerance: u8) -> bool {
    a.0.iter().zip(b.0.iter()).all(|(x, y)| x.abs_diff(*y) <= tolerance)
}

// =============================================================
// Surface
// =============================================================

#[test]
fn surface_matches_canvas_size() {
    let scene = Scene::new(Size::new(64.0, 32.0));
    let surface = surface_for(&scene);
    assert_eq!(surface.dimensions(), (64, 32));
}

#[test]
fn empty_scene_renders_transparent() {
    let scene = Scene::new(Size::square(32.0));
    let surface = rendered(&scene, &ImageStore::new(), RenderOptions::default());
    assert!(surface.pixels().all(|p| *p == CLEAR));
}

#[test]
fn render_clears_previous_contents() {
    let scene = Scene::new(Size::square(16.0));
    let mut surface = RgbaImage::from_pixel(16, 16, RED);
    draw(&mut surface, &scene, &ImageStore::new(), RenderOptions::default());
    assert!(surface.pixels().all(|p| *p == CLEAR));
}

// =============================================================
// Background
// =============================================================

#[test]
fn cover_fit_background_fills_every_pixel() {
    let mut scene = Scene::new(Size::square(100.0));
    scene.set_background(solid(80, 60, GRAY));
    let surface = rendered(&scene, &ImageStore::new(), RenderOptions::default());
    assert!(surface.pixels().all(|p| *p == GRAY));
}

#[test]
fn dragged_background_leaves_uncovered_area_clear() {
    let mut scene = Scene::new(Size::square(100.0));
    scene.set_background(solid(100, 100, GRAY));
    scene.update_background(&BackgroundPatch { x: Some(50.0), ..Default::default() });
    let surface = rendered(&scene, &ImageStore::new(), RenderOptions::default());
    assert_eq!(*surface.get_pixel(10, 50), CLEAR);
    assert_eq!(*surface.get_pixel(75, 50), GRAY);
}

// =============================================================
// Stickers
// =============================================================

#[test]
fn sticker_draws_inside_its_box_only() {
    let (scene, store, _) = small_scene(solid(40, 40, RED));
    let surface = rendered(&scene, &store, no_selection());
    assert_eq!(*surface.get_pixel(50, 50), RED);
    assert_eq!(*surface.get_pixel(31, 31), RED);
    assert_eq!(*surface.get_pixel(69, 69), RED);
    assert_eq!(*surface.get_pixel(29, 50), CLEAR);
    assert_eq!(*surface.get_pixel(70, 50), CLEAR);
}

#[test]
fn sticker_without_image_is_skipped() {
    let (mut scene, store, _) = small_scene(solid(40, 40, RED));
    let orphan = scene.add_sticker(Size::square(40.0), "pending");
    scene.update_sticker(&orphan, &StickerPatch { x: Some(0.0), y: Some(0.0), scale: Some(1.0), ..Default::default() });
    let surface = rendered(&scene, &store, no_selection());
    assert_eq!(*surface.get_pixel(5, 5), CLEAR);
    assert_eq!(*surface.get_pixel(50, 50), RED);
}

#[test]
fn later_sticker_draws_on_top() {
    let (mut scene, mut store, _) = small_scene(solid(40, 40, RED));
    let top = scene.add_sticker(Size::square(40.0), "top");
    store.insert(top, solid(40, 40, BLUE));
    scene.update_sticker(&top, &StickerPatch { x: Some(30.0), y: Some(30.0), scale: Some(1.0), ..Default::default() });
    let surface = rendered(&scene, &store, no_selection());
    assert_eq!(*surface.get_pixel(50, 50), BLUE);
}

#[test]
fn flip_mirrors_about_center() {
    let (mut scene, store, id) = small_scene(split_vertical());
    let plain = rendered(&scene, &store, no_selection());
    assert_eq!(*plain.get_pixel(35, 50), RED);
    assert_eq!(*plain.get_pixel(65, 50), BLUE);

    scene.update_sticker(&id, &StickerPatch { flip: Some(true), ..Default::default() });
    let flipped = rendered(&scene, &store, no_selection());
    assert_eq!(*flipped.get_pixel(35, 50), BLUE);
    assert_eq!(*flipped.get_pixel(65, 50), RED);
}

#[test]
fn positive_rotation_is_clockwise() {
    let (mut scene, store, id) = small_scene(split_horizontal());
    scene.update_sticker(&id, &StickerPatch { rotation: Some(90.0), ..Default::default() });
    let surface = rendered(&scene, &store, no_selection());
    // The image's top edge now faces right.
    assert_eq!(*surface.get_pixel(65, 50), RED);
    assert_eq!(*surface.get_pixel(35, 50), BLUE);
}

#[test]
fn full_turn_rotation_matches_unrotated() {
    let (mut scene, store, id) = small_scene(split_horizontal());
    let plain = rendered(&scene, &store, no_selection());
    scene.update_sticker(&id, &StickerPatch { rotation: Some(720.0), ..Default::default() });
    let turned = rendered(&scene, &store, no_selection());
    assert!(close(*plain.get_pixel(50, 35), *turned.get_pixel(50, 35), 1));
    assert!(close(*plain.get_pixel(50, 65), *turned.get_pixel(50, 65), 1));
}

#[test]
fn translucent_sticker_blends_over_background() {
    let (mut scene, store, _) = small_scene(solid(40, 40, Rgba([255, 0, 0, 128])));
    scene.set_background(solid(100, 100, Rgba([0, 0, 255, 255])));
    let surface = rendered(&scene, &store, no_selection());
    let p = surface.get_pixel(50, 50);
    assert!(close(*p, Rgba([128, 0, 127, 255]), 2), "got {p:?}");
}

// =============================================================
// Selection outline
// =============================================================

#[test]
fn selection_outline_straddles_box_edge() {
    let (scene, store, _) = small_scene(solid(40, 40, RED));
    let surface = rendered(&scene, &store, RenderOptions::default());
    assert_eq!(*surface.get_pixel(27, 50), ORANGE);
    assert_eq!(*surface.get_pixel(30, 50), ORANGE);
    assert_eq!(*surface.get_pixel(50, 50), RED);
    assert_eq!(*surface.get_pixel(20, 50), CLEAR);
}

#[test]
fn selection_outline_hidden_when_disabled() {
    let (scene, store, _) = small_scene(solid(40, 40, RED));
    let surface = rendered(&scene, &store, no_selection());
    assert_eq!(*surface.get_pixel(27, 50), CLEAR);
    assert_eq!(*surface.get_pixel(30, 50), RED);
}

#[test]
fn selection_outline_ignores_flip() {
    let (mut scene, store, id) = small_scene(solid(40, 40, RED));
    let before = rendered(&scene, &store, RenderOptions::default());
    scene.update_sticker(&id, &StickerPatch { flip: Some(true), ..Default::default() });
    let after = rendered(&scene, &store, RenderOptions::default());
    assert_eq!(before, after);
}

#[test]
fn no_outline_without_active_sticker() {
    let (mut scene, store, _) = small_scene(solid(40, 40, RED));
    scene.set_active(None);
    let surface = rendered(&scene, &store, RenderOptions::default());
    assert_eq!(*surface.get_pixel(27, 50), CLEAR);
}

// =============================================================
// Determinism and export
// =============================================================

#[test]
fn render_is_idempotent() {
    let (mut scene, store, id) = small_scene(split_vertical());
    scene.set_background(solid(50, 70, GRAY));
    scene.update_sticker(&id, &StickerPatch { rotation: Some(33.0), scale: Some(1.3), ..Default::default() });
    let first = rendered(&scene, &store, RenderOptions::default());
    let second = rendered(&scene, &store, RenderOptions::default());
    assert_eq!(first, second);
}

#[test]
fn export_round_trip_preserves_sticker_center() {
    // 1024 background at scale 1 covering the canvas, one rotated sticker.
    let mut scene = Scene::new(Size::square(1024.0));
    let mut store = ImageStore::new();
    scene.set_background(solid(1024, 1024, GRAY));

    let sticker = RgbaImage::from_fn(64, 64, |x, y| {
        if (24..40).contains(&x) && (24..40).contains(&y) { RED } else { BLUE }
    });
    let source_center = *sticker.get_pixel(32, 32);
    let id = scene.add_sticker(Size::square(64.0), "target");
    store.insert(id, ImageHandle::new(sticker));
    scene.update_sticker(
        &id,
        &StickerPatch { x: Some(300.0), y: Some(200.0), scale: Some(2.0), rotation: Some(30.0), flip: Some(false) },
    );
    scene.set_active(None);

    let surface = rendered(&scene, &store, RenderOptions::default());
    let bytes = match encode_png(&surface) {
        Ok(bytes) => bytes,
        Err(e) => panic!("encode failed: {e}"),
    };
    let decoded = match image::load_from_memory(&bytes) {
        Ok(img) => img.into_rgba8(),
        Err(e) => panic!("decode failed: {e}"),
    };

    assert_eq!(decoded.dimensions(), (1024, 1024));
    // Center of the 128x128 box at (300,200).
    assert!(close(*decoded.get_pixel(364, 264), source_center, 2));
    // Background untouched far from the sticker.
    assert_eq!(*decoded.get_pixel(900, 900), GRAY);
}
