use super::*;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::default(),
    }
}

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: rgba.repeat((width * height) as usize),
    }
}

#[test]
fn digits_never_below_four() {
    assert_eq!(frame_number_digits(0), 4);
    assert_eq!(frame_number_digits(1), 4);
    assert_eq!(frame_number_digits(300), 4);
    assert_eq!(frame_number_digits(10_000), 4);
    assert_eq!(frame_number_digits(10_001), 5);
    assert_eq!(frame_number_digits(250_000), 6);
}

#[test]
fn pattern_and_paths_agree() {
    let sink = PngSequenceSink::new("frames", 300, [0, 0, 0, 255]);
    assert_eq!(sink.pattern(), PathBuf::from("frames").join("frame_%04d.png"));
    assert_eq!(
        sink.frame_path(FrameIndex(7)),
        PathBuf::from("frames").join("frame_0007.png")
    );
}

#[test]
fn flatten_straight_over_black_produces_expected_rgb() {
    // Straight red @ 50% alpha => rgb becomes 128,0,0 over black.
    let src = vec![255u8, 0u8, 0u8, 128u8];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128u8, 0u8, 0u8, 255u8]);
}

#[test]
fn flatten_transparent_returns_background() {
    let src = vec![50u8, 60, 70, 0];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn png_sink_writes_numbered_opaque_frames() {
    let dir = tempfile::tempdir().unwrap();
    let frames_dir = dir.path().join("frames");
    let mut sink = PngSequenceSink::new(&frames_dir, 2, [0, 0, 0, 255]);

    sink.begin(cfg(4, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &solid(4, 2, [0, 0, 255, 0]))
        .unwrap();
    sink.push_frame(FrameIndex(1), &solid(4, 2, [0, 255, 0, 255]))
        .unwrap();
    sink.end().unwrap();
    assert_eq!(sink.written(), 2);

    let f0 = image::open(frames_dir.join("frame_0000.png")).unwrap().to_rgba8();
    assert_eq!(f0.dimensions(), (4, 2));
    assert_eq!(f0.get_pixel(0, 0).0, [0, 0, 0, 255]);
    let f1 = image::open(frames_dir.join("frame_0001.png")).unwrap().to_rgba8();
    assert_eq!(f1.get_pixel(3, 1).0, [0, 255, 0, 255]);
}

#[test]
fn png_sink_rejects_odd_sizes_and_disorder() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = PngSequenceSink::new(dir.path(), 4, [0, 0, 0, 255]);
    assert!(sink.begin(cfg(3, 2)).is_err());
    assert!(sink.begin(cfg(0, 2)).is_err());

    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(1), &solid(2, 2, [1, 2, 3, 255]))
        .unwrap();
    assert!(
        sink.push_frame(FrameIndex(1), &solid(2, 2, [1, 2, 3, 255]))
            .is_err()
    );
    assert!(
        sink.push_frame(FrameIndex(2), &solid(4, 2, [1, 2, 3, 255]))
            .is_err()
    );
}

#[test]
fn png_sink_requires_begin() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = PngSequenceSink::new(dir.path(), 1, [0, 0, 0, 255]);
    assert!(
        sink.push_frame(FrameIndex(0), &solid(2, 2, [0, 0, 0, 255]))
            .is_err()
    );
}

#[test]
fn in_memory_sink_keeps_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &solid(2, 2, [1, 1, 1, 255]))
        .unwrap();
    sink.push_frame(FrameIndex(1), &solid(2, 2, [2, 2, 2, 255]))
        .unwrap();
    sink.end().unwrap();
    assert_eq!(sink.config().unwrap().width, 2);
    assert_eq!(sink.frames()[1].0, FrameIndex(1));
    let frames = sink.into_frames();
    assert_eq!(frames[0].pixel(0, 0), [1, 1, 1, 255]);
}
