use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    audio::{
        chime::ChimeTrack,
        synth::{render_pcm, write_pcm_f32le_file},
    },
    config::{AudioMode, RevealConfig},
    encode::{
        gateway::{AudioInputConfig, AudioJob, ComposeJob, EncodingGateway, VideoJob},
        sink::PngSequenceSink,
    },
    foundation::{
        core::CanvasSize,
        error::{RevealError, RevealResult},
        rng::Rng64,
    },
    overlay::{CounterTrack, OverlaySpec},
    reveal::{
        canvas::{Canvas, SourceImage},
        permutation::CoordinatePermutation,
        scheduler::{RevealScheduler, reveal_schedule},
    },
    session::SessionCounter,
};

/// Switches that change what a run leaves behind, not what it renders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Keep intermediates and leave the follower state untouched.
    pub dry_run: bool,
}

/// What a finished run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Canvas the frames were rendered at.
    pub canvas: CanvasSize,
    /// Reveal frames written (the hold is added by the encoder).
    pub frames: u64,
    /// Pixels visible on the final frame.
    pub pixels_revealed: u64,
    /// Cumulative followers before this run.
    pub previous_followers: u64,
    /// Cumulative followers including this run.
    pub total_followers: u64,
    /// Chimes in the audio track.
    pub chimes: usize,
    /// Whether the counters were drawn.
    pub overlay_enabled: bool,
    /// Final video.
    pub output: PathBuf,
}

/// Render one reveal video end to end.
///
/// Stages run strictly in order and the first failure aborts the run. The follower state is only
/// written once every stage has succeeded, so a failed run can simply be repeated.
///
/// Pipeline:
/// 1. preflight (encoder, source image, optional font)
/// 2. frames: shuffle the canvas and reveal it into a PNG sequence
/// 3. job A: chime audio
/// 4. job B: silent video
/// 5. job C: mux, counters, hold
/// 6. cleanup and state update
#[tracing::instrument(skip_all, fields(source = %config.source_image.display()))]
pub fn run(
    config: &RevealConfig,
    gateway: &mut dyn EncodingGateway,
    opts: RunOptions,
) -> RevealResult<RunSummary> {
    config.validate()?;
    gateway.ensure_available()?;
    if !config.source_image.is_file() {
        return Err(RevealError::missing(format!(
            "source image '{}' not found",
            config.source_image.display()
        )));
    }
    let font = usable_font(config);

    let session = SessionCounter::for_source(&config.state_dir, &config.source_image)?;
    let previous_followers = session.load();
    let total_followers = previous_followers.saturating_add(config.followers_this_session);
    tracing::info!(
        previous = previous_followers,
        session = config.followers_this_session,
        total = total_followers,
        "followers"
    );

    clear_stale_outputs(config)?;

    let source = SourceImage::open(&config.source_image)?;
    let size = source.even_canvas_size()?;
    if size.width != source.width() || size.height != source.height() {
        tracing::info!(
            from = %format!("{}x{}", source.width(), source.height()),
            to = %format!("{}x{}", size.width, size.height),
            "cropping to even dimensions for yuv420p"
        );
    }

    let identity = config
        .source_image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut rng = Rng64::from_identity(&identity);
    let permutation = CoordinatePermutation::generate(size.width, size.height, &mut rng);

    let total_frames = config.total_frames();
    let requested = config.pixels_for_followers(total_followers);
    let total_to_reveal = requested.min(size.pixel_count());
    if requested > total_to_reveal {
        tracing::info!(requested, canvas = size.pixel_count(), "image fully revealed");
    }

    tracing::info!(frames = total_frames, pixels = total_to_reveal, "rendering frames");
    let mut sink = PngSequenceSink::new(&config.frames_dir, total_frames, config.background_rgba);
    let mut canvas = Canvas::new(size, config.background_rgba);
    let stats = RevealScheduler::new(&source, &permutation, total_to_reveal, total_frames)?
        .render(&mut canvas, &mut sink, config.fps)?;

    let video_duration_secs = config.video_duration_secs();
    let graph = ChimeTrack::build(
        config.followers_this_session,
        video_duration_secs,
        &config.chimes,
        &mut rng,
    )?;
    let chimes = graph.events().len();
    tracing::info!(chimes, "generating audio track");

    let pcm_input = match config.audio_mode {
        AudioMode::FilterGraph => None,
        AudioMode::Pcm => {
            write_pcm_f32le_file(&render_pcm(&graph), &config.raw_audio_file)?;
            Some(AudioInputConfig {
                path: config.raw_audio_file.clone(),
                sample_rate: graph.sample_rate(),
                channels: 1,
            })
        }
    };
    gateway.encode_audio(&AudioJob {
        graph,
        pcm_input,
        out_path: config.audio_file.clone(),
    })?;

    tracing::info!("encoding frame sequence");
    gateway.encode_video(&VideoJob {
        frames_pattern: sink.pattern(),
        frame_count: stats.frames,
        fps: config.fps,
        out_path: config.video_file.clone(),
    })?;

    let overlay = font.map(|font_file| OverlaySpec {
        font_file,
        font_size: config.font_size,
        counters: vec![
            CounterTrack::followers(config.followers_this_session, total_frames),
            CounterTrack::pixels(&reveal_schedule(total_to_reveal, total_frames)),
        ],
    });
    let overlay_enabled = overlay.is_some();

    tracing::info!(hold_secs = config.hold_secs, "creating final video");
    gateway.compose(&ComposeJob {
        video_path: config.video_file.clone(),
        audio_path: config.audio_file.clone(),
        overlay,
        overlay_script: config.overlay_script.clone(),
        fps: config.fps,
        video_duration_secs,
        hold_secs: config.hold_secs,
        out_path: config.output.clone(),
    })?;

    if opts.dry_run {
        tracing::info!("dry run: keeping intermediates, follower state unchanged");
    } else {
        if !config.keep_intermediates {
            remove_intermediates(config);
        }
        session.save(total_followers)?;
    }

    Ok(RunSummary {
        canvas: size,
        frames: stats.frames,
        pixels_revealed: stats.pixels_revealed,
        previous_followers,
        total_followers,
        chimes,
        overlay_enabled,
        output: config.output.clone(),
    })
}

fn usable_font(config: &RevealConfig) -> Option<PathBuf> {
    match config.font_file.as_ref() {
        Some(path) if path.is_file() => Some(path.clone()),
        Some(path) => {
            tracing::warn!(
                font = %path.display(),
                "font file not found, rendering without counters"
            );
            None
        }
        None => {
            tracing::warn!("no font configured, rendering without counters");
            None
        }
    }
}

fn clear_stale_outputs(config: &RevealConfig) -> RevealResult<()> {
    for path in [&config.output, &config.audio_file] {
        remove_file_if_present(path)
            .with_context(|| format!("remove stale '{}'", path.display()))?;
    }
    if let Err(e) = std::fs::remove_dir_all(&config.frames_dir)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        return Err(anyhow::Error::new(e)
            .context(format!(
                "clear frames directory '{}'",
                config.frames_dir.display()
            ))
            .into());
    }
    std::fs::create_dir_all(&config.frames_dir).with_context(|| {
        format!(
            "create frames directory '{}'",
            config.frames_dir.display()
        )
    })?;
    Ok(())
}

fn remove_intermediates(config: &RevealConfig) {
    if let Err(e) = std::fs::remove_dir_all(&config.frames_dir)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!(path = %config.frames_dir.display(), error = %e, "cleanup failed");
    }
    for path in [
        &config.audio_file,
        &config.raw_audio_file,
        &config.video_file,
        &config.overlay_script,
    ] {
        if let Err(e) = remove_file_if_present(path) {
            tracing::warn!(path = %path.display(), error = %e, "cleanup failed");
        }
    }
}

fn remove_file_if_present(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
