//! Run configuration.
//!
//! Every knob has a built-in default, so an empty JSON object (or no file at all) is a valid
//! configuration. The CLI applies its flags on top of whatever was loaded.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::audio::chime::ChimeSettings;
use crate::foundation::core::Fps;
use crate::foundation::error::{RevealError, RevealResult};

/// How the audio track reaches the encoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioMode {
    /// Describe the chimes as an encoder filter graph.
    #[default]
    FilterGraph,
    /// Synthesize samples in-process and hand the encoder raw `f32le` PCM.
    Pcm,
}

/// Settings for one reveal run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    /// Image being revealed. Its file name also seeds the shuffle and names the state file.
    pub source_image: PathBuf,
    /// Encoder executable (bare names are looked up on `PATH`).
    pub ffmpeg: PathBuf,
    /// TrueType font for the counters; `None` or a missing file disables them.
    pub font_file: Option<PathBuf>,
    /// Font size of the counters in pixels.
    pub font_size: u32,
    /// Directory receiving the numbered PNG frames.
    pub frames_dir: PathBuf,
    /// Intermediate audio asset.
    pub audio_file: PathBuf,
    /// Raw PCM written in [`AudioMode::Pcm`].
    pub raw_audio_file: PathBuf,
    /// Intermediate silent video.
    pub video_file: PathBuf,
    /// Encoder command script driving the counters.
    pub overlay_script: PathBuf,
    /// Final muxed video.
    pub output: PathBuf,
    /// Directory holding the follower state file.
    pub state_dir: PathBuf,
    /// New followers in this run; also the number of chimes requested.
    pub followers_this_session: u64,
    /// Pixels revealed per cumulative follower.
    pub pixels_per_follower: u64,
    /// Length of the reveal in seconds.
    pub duration_secs: u32,
    /// Frame rate of the reveal.
    pub fps: Fps,
    /// Seconds the final frame is held after the reveal.
    pub hold_secs: u32,
    /// Colour of unrevealed pixels (straight RGBA).
    pub background_rgba: [u8; 4],
    /// Chime synthesis settings.
    pub chimes: ChimeSettings,
    /// Audio hand-off to the encoder.
    pub audio_mode: AudioMode,
    /// Keep frames, audio and the silent video after a successful run.
    pub keep_intermediates: bool,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            source_image: PathBuf::from("source.png"),
            ffmpeg: PathBuf::from("ffmpeg"),
            font_file: None,
            font_size: 48,
            frames_dir: PathBuf::from("frames"),
            audio_file: PathBuf::from("audio.wav"),
            raw_audio_file: PathBuf::from("audio.f32le"),
            video_file: PathBuf::from("video.mp4"),
            overlay_script: PathBuf::from("overlay.cmd"),
            output: PathBuf::from("output.mp4"),
            state_dir: PathBuf::from("."),
            followers_this_session: 1,
            pixels_per_follower: 5000,
            duration_secs: 10,
            fps: Fps::default(),
            hold_secs: 30,
            background_rgba: [0, 0, 0, 255],
            chimes: ChimeSettings::default(),
            audio_mode: AudioMode::default(),
            keep_intermediates: false,
        }
    }
}

impl RevealConfig {
    /// Read a JSON configuration file; absent keys take their defaults.
    pub fn load(path: &Path) -> RevealResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        serde_json::from_str(&text)
            .map_err(|e| RevealError::serde(format!("config '{}': {e}", path.display())))
    }

    /// Parse a JSON configuration document.
    pub fn from_json(text: &str) -> RevealResult<Self> {
        serde_json::from_str(text).map_err(|e| RevealError::serde(e.to_string()))
    }

    /// Reject settings no run could honour.
    pub fn validate(&self) -> RevealResult<()> {
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(RevealError::validation("fps must have num>0 and den>0"));
        }
        if self.duration_secs == 0 {
            return Err(RevealError::validation("duration must be > 0 seconds"));
        }
        if self.total_frames() == 0 {
            return Err(RevealError::validation(
                "duration and fps must yield at least one frame",
            ));
        }
        if self.font_size == 0 {
            return Err(RevealError::validation("font size must be > 0"));
        }
        if self.source_image.file_name().is_none() {
            return Err(RevealError::validation(format!(
                "source image '{}' has no file name",
                self.source_image.display()
            )));
        }
        self.chimes.validate()
    }

    /// Frames in the reveal (`duration * fps`, floored).
    pub fn total_frames(&self) -> u64 {
        self.fps.frames_in_secs(self.duration_secs)
    }

    /// Video length covered by the reveal frames, in seconds.
    pub fn video_duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.total_frames())
    }

    /// Pixels the cumulative follower count unlocks, before clamping to the canvas.
    pub fn pixels_for_followers(&self, followers: u64) -> u64 {
        followers.saturating_mul(self.pixels_per_follower)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
