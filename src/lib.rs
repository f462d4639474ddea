//! pixel-reveal renders a video in which an image appears pixel by pixel.
//!
//! Each run adds this session's followers to a persisted total, reveals `total * pixels_per_follower`
//! pixels of the source image in a seeded random order, scores the reveal with a short chime track
//! and hands the three encoder jobs (audio, silent video, final mux) to an [`EncodingGateway`].
//!
//! - Load a [`RevealConfig`]
//! - Pick a gateway ([`FfmpegEncoder`] or [`RecordingGateway`])
//! - Call [`run`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod audio;
pub(crate) mod config;
pub(crate) mod encode;
pub(crate) mod overlay;
pub(crate) mod pipeline;
pub(crate) mod reveal;
pub(crate) mod session;

pub use crate::foundation::core::{CanvasSize, Fps, FrameIndex};
pub use crate::foundation::error::{RevealError, RevealResult};
pub use crate::foundation::rng::{Rng64, seed_from_identity};

pub use crate::audio::chime::{
    CHIME_FREQUENCIES_HZ, ChimeEvent, ChimeSettings, ChimeTrack, ToneShape, decay_envelope,
};
pub use crate::audio::graph::AudioFilterGraph;
pub use crate::audio::synth::{render_pcm, write_pcm_f32le_file};
pub use crate::config::{AudioMode, RevealConfig};
pub use crate::encode::ffmpeg::{
    FfmpegEncoder, chime_filter_complex, is_encoder_available, overlay_filter_chain,
    overlay_sendcmd_script,
};
pub use crate::encode::gateway::{
    AudioInputConfig, AudioJob, ComposeJob, EncodingGateway, JobKind, RecordedJob,
    RecordingGateway, VideoJob,
};
pub use crate::encode::sink::{
    FrameSink, InMemorySink, PngSequenceSink, SinkConfig, frame_number_digits,
};
pub use crate::overlay::{CounterTrack, OverlaySpec, follower_counter_values};
pub use crate::pipeline::{RunOptions, RunSummary, run};
pub use crate::reveal::canvas::{Canvas, FrameRGBA, SourceImage};
pub use crate::reveal::permutation::{Coord, CoordinatePermutation};
pub use crate::reveal::scheduler::{
    FrameStep, RevealScheduler, RevealState, RevealStats, render_frames, reveal_schedule,
};
pub use crate::session::SessionCounter;
