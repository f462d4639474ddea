use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Render a pixel-by-pixel reveal video of an image.
#[derive(Parser, Debug)]
#[command(name = "pixel-reveal", version)]
struct Cli {
    /// JSON configuration file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Image to reveal.
    #[arg(long)]
    source: Option<PathBuf>,

    /// ffmpeg executable.
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// TrueType font for the on-screen counters.
    #[arg(long)]
    font: Option<PathBuf>,

    /// New followers in this run.
    #[arg(long)]
    followers: Option<u64>,

    /// Pixels revealed per follower.
    #[arg(long)]
    pixels_per_follower: Option<u64>,

    /// Reveal length in seconds.
    #[arg(long)]
    duration: Option<u32>,

    /// Integer frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Seconds to hold the final frame.
    #[arg(long)]
    hold: Option<u32>,

    /// Final MP4 path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// How the chime track reaches ffmpeg.
    #[arg(long, value_enum)]
    audio_mode: Option<AudioModeChoice>,

    /// Keep frames, audio and the silent video.
    #[arg(long)]
    keep_intermediates: bool,

    /// Render frames but only print the ffmpeg commands; state is left untouched.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AudioModeChoice {
    FilterGraph,
    Pcm,
}

impl From<AudioModeChoice> for pixel_reveal::AudioMode {
    fn from(choice: AudioModeChoice) -> Self {
        match choice {
            AudioModeChoice::FilterGraph => Self::FilterGraph,
            AudioModeChoice::Pcm => Self::Pcm,
        }
    }
}

fn main() -> anyhow::Result<()> {
    initialise_tracing();
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let summary = if cli.dry_run {
        let mut gateway = pixel_reveal::RecordingGateway::new();
        let summary =
            pixel_reveal::run(&config, &mut gateway, pixel_reveal::RunOptions { dry_run: true })?;
        print_commands(&config, gateway.jobs());
        summary
    } else {
        let mut gateway = pixel_reveal::FfmpegEncoder::new(&config.ffmpeg);
        pixel_reveal::run(&config, &mut gateway, pixel_reveal::RunOptions::default())?
    };

    eprintln!(
        "wrote {} ({} frames, {} pixels, {} followers total)",
        summary.output.display(),
        summary.frames,
        summary.pixels_revealed,
        summary.total_followers
    );
    Ok(())
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> anyhow::Result<pixel_reveal::RevealConfig> {
    let mut config = match cli.config.as_ref() {
        Some(path) => pixel_reveal::RevealConfig::load(path)?,
        None => pixel_reveal::RevealConfig::default(),
    };

    if let Some(source) = cli.source.clone() {
        config.source_image = source;
    }
    if let Some(ffmpeg) = cli.ffmpeg.clone() {
        config.ffmpeg = ffmpeg;
    }
    if let Some(font) = cli.font.clone() {
        config.font_file = Some(font);
    }
    if let Some(followers) = cli.followers {
        config.followers_this_session = followers;
    }
    if let Some(pixels) = cli.pixels_per_follower {
        config.pixels_per_follower = pixels;
    }
    if let Some(duration) = cli.duration {
        config.duration_secs = duration;
    }
    if let Some(fps) = cli.fps {
        config.fps = pixel_reveal::Fps::new(fps, 1).context("--fps")?;
    }
    if let Some(hold) = cli.hold {
        config.hold_secs = hold;
    }
    if let Some(output) = cli.output.clone() {
        config.output = output;
    }
    if let Some(mode) = cli.audio_mode {
        config.audio_mode = mode.into();
    }
    if cli.keep_intermediates {
        config.keep_intermediates = true;
    }
    Ok(config)
}

fn print_commands(config: &pixel_reveal::RevealConfig, jobs: &[pixel_reveal::RecordedJob]) {
    for job in jobs {
        let args = match job {
            pixel_reveal::RecordedJob::Audio(job) => pixel_reveal::FfmpegEncoder::audio_args(job),
            pixel_reveal::RecordedJob::Video(job) => pixel_reveal::FfmpegEncoder::video_args(job),
            pixel_reveal::RecordedJob::Compose(job) => {
                pixel_reveal::FfmpegEncoder::compose_args(job)
            }
        };
        println!("# {}", job.kind().task());
        println!("{} {}", config.ffmpeg.display(), args.join(" "));
    }
}
