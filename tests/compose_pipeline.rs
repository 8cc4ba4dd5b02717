//! End-to-end composition: select → render → export → decode back.

use std::io::Cursor;

use picblend::{
    DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH, ImageHandle, InputSlot, Provenance, Session,
    Surface,
};

fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn pixel(img: &image::RgbaImage, x: u32, y: u32) -> [u8; 4] {
    img.get_pixel(x, y).0
}

#[test]
fn selections_render_and_export_losslessly() {
    let mut session = Session::new();
    session
        .select(InputSlot::Background, png_bytes(20, 20, [200, 0, 0, 255]))
        .unwrap();
    session
        .select(InputSlot::Foreground, png_bytes(10, 10, [0, 0, 200, 255]))
        .unwrap();

    let mut surface = Surface::new(40, 30).unwrap();
    session.render_preview(&mut surface).unwrap();

    let encoded = surface.export().unwrap();
    let back = image::load_from_memory(encoded.as_bytes()).unwrap().to_rgba8();
    assert_eq!(back.dimensions(), (40, 30));

    // Foreground (10x10, under the height budget) sits centered above the
    // covering background.
    assert_eq!(pixel(&back, 20, 15), [0, 0, 200, 255]);
    assert_eq!(pixel(&back, 1, 1), [200, 0, 0, 255]);
    assert_eq!(pixel(&back, 38, 28), [200, 0, 0, 255]);

    // The exported bytes decode back into a usable handle.
    let handle = ImageHandle::from_encoded(&encoded, Provenance::RemoteResult).unwrap();
    assert_eq!((handle.width(), handle.height()), (40, 30));
}

#[test]
fn default_surface_honors_the_foreground_height_budget() {
    let mut session = Session::new();
    session
        .select(
            InputSlot::Background,
            png_bytes(80, 60, [200, 0, 0, 255]),
        )
        .unwrap();
    session
        .select(
            InputSlot::Foreground,
            png_bytes(100, 100, [0, 0, 200, 255]),
        )
        .unwrap();

    let mut surface = Surface::new(DEFAULT_SURFACE_WIDTH, DEFAULT_SURFACE_HEIGHT).unwrap();
    session.render_preview(&mut surface).unwrap();

    let encoded = surface.export().unwrap();
    let back = image::load_from_memory(encoded.as_bytes()).unwrap().to_rgba8();

    // A 100x100 foreground upscales to nothing: it stays 100x100, centered at
    // (350..450, 250..350); the height budget only ever shrinks.
    assert_eq!(pixel(&back, 400, 300), [0, 0, 200, 255]);
    assert_eq!(pixel(&back, 400, 240), [200, 0, 0, 255]);
    assert_eq!(pixel(&back, 340, 300), [200, 0, 0, 255]);
    assert_eq!(pixel(&back, 10, 10), [200, 0, 0, 255]);
}

#[test]
fn foreground_larger_than_the_budget_is_scaled_down() {
    let mut session = Session::new();
    session
        .select(
            InputSlot::Foreground,
            png_bytes(1000, 1000, [0, 0, 200, 255]),
        )
        .unwrap();

    let mut surface = Surface::new(DEFAULT_SURFACE_WIDTH, DEFAULT_SURFACE_HEIGHT).unwrap();
    session.render_preview(&mut surface).unwrap();

    let encoded = surface.export().unwrap();
    let back = image::load_from_memory(encoded.as_bytes()).unwrap().to_rgba8();

    // Budget: 0.7 × 600 = 420 px tall, so the square lands at (190..610,
    // 90..510). No background layer means everything else stays transparent.
    assert_eq!(pixel(&back, 400, 300), [0, 0, 200, 255]);
    assert_eq!(pixel(&back, 400, 95), [0, 0, 200, 255]);
    assert_eq!(pixel(&back, 400, 80), [0, 0, 0, 0]);
    assert_eq!(pixel(&back, 180, 300), [0, 0, 0, 0]);
}
