use super::*;

#[test]
fn canvas_starts_filled_with_background() {
    let size = CanvasSize::even_within(4, 2).unwrap();
    let canvas = Canvas::new(size, [10, 20, 30, 255]);
    let frame = canvas.as_frame();
    assert_eq!(frame.data.len(), 4 * 2 * 4);
    for y in 0..2 {
        for x in 0..4 {
            assert_eq!(frame.pixel(x, y), [10, 20, 30, 255]);
        }
    }
}

#[test]
fn set_pixel_touches_only_target() {
    let size = CanvasSize::even_within(2, 2).unwrap();
    let mut canvas = Canvas::new(size, [0, 0, 0, 255]);
    canvas.set_pixel(1, 0, [9, 8, 7, 255]);
    let frame = canvas.as_frame();
    assert_eq!(frame.pixel(1, 0), [9, 8, 7, 255]);
    assert_eq!(frame.pixel(0, 0), [0, 0, 0, 255]);
    assert_eq!(frame.pixel(0, 1), [0, 0, 0, 255]);
    assert_eq!(frame.pixel(1, 1), [0, 0, 0, 255]);
}

#[test]
fn source_image_validates_buffer_length() {
    assert!(SourceImage::from_rgba8(2, 2, vec![0; 15]).is_err());
    let img = SourceImage::from_rgba8(3, 1, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]).unwrap();
    assert_eq!(img.pixel(2, 0), [9, 10, 11, 12]);
}

#[test]
fn odd_source_maps_to_even_canvas() {
    let img = SourceImage::from_rgba8(5, 3, vec![0; 5 * 3 * 4]).unwrap();
    let size = img.even_canvas_size().unwrap();
    assert_eq!((size.width, size.height), (4, 2));
}

#[test]
fn open_decodes_png_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("src.png");
    let img = image::RgbaImage::from_fn(3, 2, |x, y| image::Rgba([x as u8, y as u8, 7, 255]));
    img.save(&path).unwrap();

    let src = SourceImage::open(&path).unwrap();
    assert_eq!((src.width(), src.height()), (3, 2));
    assert_eq!(src.pixel(2, 1), [2, 1, 7, 255]);
}

#[test]
fn open_reports_undecodable_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"not an image").unwrap();
    assert!(SourceImage::open(&path).is_err());
}
