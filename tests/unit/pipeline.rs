use super::*;
use crate::encode::gateway::{JobKind, RecordedJob, RecordingGateway};
use crate::foundation::core::Fps;

fn write_png(path: &Path, w: u32, h: u32) {
    let mut data = Vec::new();
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&[(x * 40) as u8, (y * 60) as u8, 128, 255]);
        }
    }
    image::save_buffer_with_format(
        path,
        &data,
        w,
        h,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .unwrap();
}

fn config_in(dir: &Path) -> RevealConfig {
    let source = dir.join("shot.png");
    write_png(&source, 5, 3);
    RevealConfig {
        source_image: source,
        frames_dir: dir.join("frames"),
        audio_file: dir.join("audio.wav"),
        raw_audio_file: dir.join("audio.f32le"),
        video_file: dir.join("video.mp4"),
        overlay_script: dir.join("overlay.cmd"),
        output: dir.join("output.mp4"),
        state_dir: dir.to_path_buf(),
        followers_this_session: 1,
        pixels_per_follower: 3,
        duration_secs: 1,
        fps: Fps::new(4, 1).unwrap(),
        hold_secs: 2,
        ..RevealConfig::default()
    }
}

fn kinds(gw: &RecordingGateway) -> Vec<JobKind> {
    gw.jobs().iter().map(RecordedJob::kind).collect()
}

fn state_file(dir: &Path) -> PathBuf {
    dir.join("shot.png.state")
}

#[test]
fn successful_run_issues_jobs_in_order_and_persists_total() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_in(dir.path());
    std::fs::write(state_file(dir.path()), "2").unwrap();

    let mut gw = RecordingGateway::new();
    let summary = run(&cfg, &mut gw, RunOptions::default()).unwrap();

    assert_eq!(kinds(&gw), vec![JobKind::Audio, JobKind::Video, JobKind::Compose]);
    assert_eq!((summary.canvas.width, summary.canvas.height), (4, 2));
    assert_eq!(summary.frames, 4);
    assert_eq!(summary.previous_followers, 2);
    assert_eq!(summary.total_followers, 3);
    // 3 followers * 3 px = 9, clamped to the 8-pixel canvas.
    assert_eq!(summary.pixels_revealed, 8);
    assert_eq!(summary.chimes, 1);
    assert!(!summary.overlay_enabled);

    assert_eq!(
        std::fs::read_to_string(state_file(dir.path())).unwrap(),
        "3"
    );
    assert!(!cfg.frames_dir.exists());
}

#[test]
fn recorded_jobs_carry_exact_timing() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_in(dir.path());
    let mut gw = RecordingGateway::new();
    run(&cfg, &mut gw, RunOptions { dry_run: true }).unwrap();

    let RecordedJob::Audio(audio) = &gw.jobs()[0] else {
        panic!("first job must be audio");
    };
    assert!((audio.graph.duration_secs() - 1.0).abs() < 1e-9);
    assert!(audio.pcm_input.is_none());

    let RecordedJob::Video(video) = &gw.jobs()[1] else {
        panic!("second job must be video");
    };
    assert_eq!(video.frame_count, 4);
    assert!(video.frames_pattern.ends_with("frame_%04d.png"));

    let RecordedJob::Compose(compose) = &gw.jobs()[2] else {
        panic!("third job must be compose");
    };
    assert!((compose.total_duration_secs() - 3.0).abs() < 1e-9);
    assert_eq!(compose.out_path, cfg.output);
}

#[test]
fn dry_run_keeps_frames_and_state() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_in(dir.path());
    let mut gw = RecordingGateway::new();
    run(&cfg, &mut gw, RunOptions { dry_run: true }).unwrap();

    assert!(cfg.frames_dir.join("frame_0000.png").is_file());
    assert!(cfg.frames_dir.join("frame_0003.png").is_file());
    assert!(!state_file(dir.path()).exists());
}

#[test]
fn encoder_failure_leaves_state_and_intermediates() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_in(dir.path());
    std::fs::write(state_file(dir.path()), "5").unwrap();

    let mut gw = RecordingGateway::failing_on(JobKind::Video);
    let err = run(&cfg, &mut gw, RunOptions::default()).unwrap_err();

    let RevealError::Encoder { task, .. } = err else {
        panic!("expected encoder error");
    };
    assert_eq!(task, "encode the frame sequence");
    assert_eq!(kinds(&gw), vec![JobKind::Audio, JobKind::Video]);
    assert_eq!(
        std::fs::read_to_string(state_file(dir.path())).unwrap(),
        "5"
    );
    assert!(cfg.frames_dir.join("frame_0000.png").is_file());
}

#[test]
fn missing_encoder_aborts_before_any_work() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_in(dir.path());
    let mut gw = RecordingGateway::unavailable();

    let err = run(&cfg, &mut gw, RunOptions::default()).unwrap_err();
    assert!(matches!(err, RevealError::MissingPrerequisite(_)));
    assert!(gw.jobs().is_empty());
    assert!(!cfg.frames_dir.exists());
}

#[test]
fn missing_source_is_a_missing_prerequisite() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = RevealConfig {
        source_image: dir.path().join("absent.png"),
        ..config_in(dir.path())
    };
    let mut gw = RecordingGateway::new();

    let err = run(&cfg, &mut gw, RunOptions::default()).unwrap_err();
    assert!(matches!(err, RevealError::MissingPrerequisite(_)));
    assert!(gw.jobs().is_empty());
}

#[test]
fn chimes_are_capped() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config_in(dir.path());
    cfg.followers_this_session = 100;
    cfg.chimes.max_events = 40;

    let mut gw = RecordingGateway::new();
    let summary = run(&cfg, &mut gw, RunOptions { dry_run: true }).unwrap();
    assert_eq!(summary.chimes, 40);
}

#[test]
fn zero_followers_yield_silence_and_blank_frames() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config_in(dir.path());
    cfg.followers_this_session = 0;

    let mut gw = RecordingGateway::new();
    let summary = run(&cfg, &mut gw, RunOptions::default()).unwrap();
    assert_eq!(summary.chimes, 0);
    assert_eq!(summary.pixels_revealed, 0);
    let RecordedJob::Audio(audio) = &gw.jobs()[0] else {
        panic!("first job must be audio");
    };
    assert!(audio.graph.events().is_empty());
    assert_eq!(
        std::fs::read_to_string(state_file(dir.path())).unwrap(),
        "0"
    );
}

#[test]
fn counters_are_attached_when_the_font_exists() {
    let dir = tempfile::tempdir().unwrap();
    let font = dir.path().join("font.ttf");
    std::fs::write(&font, b"not really a font").unwrap();
    let cfg = RevealConfig {
        font_file: Some(font.clone()),
        pixels_per_follower: 8,
        ..config_in(dir.path())
    };

    let mut gw = RecordingGateway::new();
    let summary = run(&cfg, &mut gw, RunOptions { dry_run: true }).unwrap();
    assert!(summary.overlay_enabled);

    let RecordedJob::Compose(compose) = &gw.jobs()[2] else {
        panic!("third job must be compose");
    };
    let overlay = compose.overlay.as_ref().unwrap();
    assert_eq!(overlay.font_file, font);
    assert_eq!(overlay.counters.len(), 2);
    assert_eq!(overlay.counters[0].values, vec![0, 0, 1, 1]);
    assert_eq!(overlay.counters[1].values, vec![2, 4, 6, 8]);
}

#[test]
fn missing_font_degrades_to_no_counters() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = RevealConfig {
        font_file: Some(dir.path().join("nope.ttf")),
        ..config_in(dir.path())
    };
    let mut gw = RecordingGateway::new();
    let summary = run(&cfg, &mut gw, RunOptions { dry_run: true }).unwrap();
    assert!(!summary.overlay_enabled);
}

#[test]
fn pcm_mode_writes_raw_samples_first() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = RevealConfig {
        audio_mode: AudioMode::Pcm,
        ..config_in(dir.path())
    };
    let mut gw = RecordingGateway::new();
    run(&cfg, &mut gw, RunOptions { dry_run: true }).unwrap();

    let RecordedJob::Audio(audio) = &gw.jobs()[0] else {
        panic!("first job must be audio");
    };
    let pcm = audio.pcm_input.as_ref().unwrap();
    assert_eq!(pcm.path, cfg.raw_audio_file);
    let bytes = std::fs::metadata(&cfg.raw_audio_file).unwrap().len();
    assert_eq!(bytes, 44_100 * 4);
}

#[test]
fn same_source_name_renders_the_same_frames() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let cfg_a = config_in(a.path());
    let cfg_b = config_in(b.path());
    run(&cfg_a, &mut RecordingGateway::new(), RunOptions { dry_run: true }).unwrap();
    run(&cfg_b, &mut RecordingGateway::new(), RunOptions { dry_run: true }).unwrap();

    let frame = "frame_0001.png";
    let fa = image::open(cfg_a.frames_dir.join(frame)).unwrap().to_rgba8();
    let fb = image::open(cfg_b.frames_dir.join(frame)).unwrap().to_rgba8();
    assert_eq!(fa.as_raw(), fb.as_raw());
}
