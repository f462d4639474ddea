use std::path::PathBuf;

use crate::audio::graph::AudioFilterGraph;
use crate::foundation::core::Fps;
use crate::foundation::error::{RevealError, RevealResult};
use crate::overlay::OverlaySpec;

/// Raw PCM audio input for encoders that accept pre-rendered samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Job A: produce the audio asset.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioJob {
    /// Track description. Always present; also fixes duration and sample rate.
    pub graph: AudioFilterGraph,
    /// When set, the encoder converts these samples instead of realizing `graph` itself.
    pub pcm_input: Option<AudioInputConfig>,
    /// Output audio file.
    pub out_path: PathBuf,
}

/// Job B: encode a numbered image sequence into a silent video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoJob {
    /// `printf`-style frame path pattern.
    pub frames_pattern: PathBuf,
    /// Number of frames in the sequence.
    pub frame_count: u64,
    /// Input frame rate.
    pub fps: Fps,
    /// Output video file.
    pub out_path: PathBuf,
}

impl VideoJob {
    /// Video length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.frame_count)
    }
}

/// Job C: mux video and audio, draw overlays, hold the last frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeJob {
    /// Silent video from job B.
    pub video_path: PathBuf,
    /// Audio asset from job A.
    pub audio_path: PathBuf,
    /// Counters to draw; `None` when overlays are unavailable.
    pub overlay: Option<OverlaySpec>,
    /// Scratch file an encoder may use to feed per-frame overlay values.
    pub overlay_script: PathBuf,
    /// Frame rate of the input video.
    pub fps: Fps,
    /// Length of the input video in seconds.
    pub video_duration_secs: f64,
    /// Seconds the final frame is held (audio padded with silence to match).
    pub hold_secs: u32,
    /// Final output file.
    pub out_path: PathBuf,
}

impl ComposeJob {
    /// Output length: video plus hold.
    pub fn total_duration_secs(&self) -> f64 {
        self.video_duration_secs + f64::from(self.hold_secs)
    }
}

/// Job discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Job A.
    Audio,
    /// Job B.
    Video,
    /// Job C.
    Compose,
}

impl JobKind {
    /// Task phrase used in logs and errors ("failed to ...").
    pub fn task(self) -> &'static str {
        match self {
            Self::Audio => "generate the audio track",
            Self::Video => "encode the frame sequence",
            Self::Compose => "create the final video",
        }
    }
}

/// The fixed set of operations any encoder backend must support.
///
/// Every call blocks until the job finishes. A failed job is terminal: callers do not retry and
/// leave partial outputs on disk.
pub trait EncodingGateway {
    /// Check that the encoder can run at all.
    fn ensure_available(&self) -> RevealResult<()>;
    /// Run job A.
    fn encode_audio(&mut self, job: &AudioJob) -> RevealResult<()>;
    /// Run job B.
    fn encode_video(&mut self, job: &VideoJob) -> RevealResult<()>;
    /// Run job C.
    fn compose(&mut self, job: &ComposeJob) -> RevealResult<()>;
}

/// A job captured by [`RecordingGateway`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedJob {
    /// Job A.
    Audio(AudioJob),
    /// Job B.
    Video(VideoJob),
    /// Job C.
    Compose(ComposeJob),
}

impl RecordedJob {
    /// Which job this is.
    pub fn kind(&self) -> JobKind {
        match self {
            Self::Audio(_) => JobKind::Audio,
            Self::Video(_) => JobKind::Video,
            Self::Compose(_) => JobKind::Compose,
        }
    }
}

/// Gateway that records jobs without running anything. Used for dry runs and tests.
#[derive(Debug)]
pub struct RecordingGateway {
    jobs: Vec<RecordedJob>,
    fail_on: Option<JobKind>,
    available: bool,
}

impl Default for RecordingGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingGateway {
    /// Gateway where every job succeeds.
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            fail_on: None,
            available: true,
        }
    }

    /// Gateway whose `kind` job fails like a non-zero encoder exit.
    pub fn failing_on(kind: JobKind) -> Self {
        Self {
            fail_on: Some(kind),
            ..Self::new()
        }
    }

    /// Gateway reporting the encoder as missing.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Jobs received so far, in call order (failed jobs included).
    pub fn jobs(&self) -> &[RecordedJob] {
        &self.jobs
    }

    fn record(&mut self, job: RecordedJob) -> RevealResult<()> {
        let kind = job.kind();
        self.jobs.push(job);
        if self.fail_on == Some(kind) {
            return Err(RevealError::encoder(
                kind.task(),
                &[],
                "exit status: 1",
                "recording gateway: injected failure",
            ));
        }
        Ok(())
    }
}

impl EncodingGateway for RecordingGateway {
    fn ensure_available(&self) -> RevealResult<()> {
        if self.available {
            Ok(())
        } else {
            Err(RevealError::missing("recording gateway marked unavailable"))
        }
    }

    fn encode_audio(&mut self, job: &AudioJob) -> RevealResult<()> {
        self.record(RecordedJob::Audio(job.clone()))
    }

    fn encode_video(&mut self, job: &VideoJob) -> RevealResult<()> {
        self.record(RecordedJob::Video(job.clone()))
    }

    fn compose(&mut self, job: &ComposeJob) -> RevealResult<()> {
        self.record(RecordedJob::Compose(job.clone()))
    }
}
