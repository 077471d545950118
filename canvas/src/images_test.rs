use image::{DynamicImage, Rgb, RgbImage, RgbaImage};
use uuid::Uuid;

use super::*;

#[test]
fn handle_reports_natural_size() {
    let handle = ImageHandle::new(RgbaImage::new(800, 600));
    assert_eq!(handle.size(), Size::new(800.0, 600.0));
    assert!(handle.is_drawable());
}

#[test]
fn handle_from_dynamic_converts_to_rgba() {
    let rgb = RgbImage::from_pixel(3, 2, Rgb([10, 20, 30]));
    let handle = ImageHandle::from_dynamic(DynamicImage::ImageRgb8(rgb));
    assert_eq!(handle.size(), Size::new(3.0, 2.0));
    assert_eq!(handle.pixels().get_pixel(2, 1).0, [10, 20, 30, 255]);
}

#[test]
fn empty_handle_is_not_drawable() {
    assert!(!ImageHandle::new(RgbaImage::new(0, 0)).is_drawable());
}

#[test]
fn store_insert_get_and_replace() {
    let mut store = ImageStore::new();
    assert!(store.is_empty());

    let id = Uuid::new_v4();
    store.insert(id, ImageHandle::new(RgbaImage::new(4, 4)));
    assert!(store.contains(&id));
    assert_eq!(store.len(), 1);

    store.insert(id, ImageHandle::new(RgbaImage::new(8, 2)));
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&id).map(ImageHandle::size), Some(Size::new(8.0, 2.0)));
}

#[test]
fn store_misses_unknown_id() {
    let store = ImageStore::new();
    assert!(store.get(&Uuid::new_v4()).is_none());
}
