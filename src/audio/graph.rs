use crate::audio::chime::{ChimeEvent, ToneShape};

/// Declarative description of the audio track, realized by an encoder (or [`render_pcm`]).
///
/// [`render_pcm`]: crate::render_pcm
#[derive(Clone, Debug, PartialEq)]
pub enum AudioFilterGraph {
    /// Silent mono track.
    Silence {
        /// Track length in seconds.
        duration_secs: f64,
        /// Sample rate in Hz.
        sample_rate: u32,
    },
    /// Mono mix of delayed chime tones.
    Chimes {
        /// Track length in seconds.
        duration_secs: f64,
        /// Sample rate in Hz.
        sample_rate: u32,
        /// Gain and decay shared by every tone.
        shape: ToneShape,
        /// Events in ascending offset order.
        events: Vec<ChimeEvent>,
    },
}

impl AudioFilterGraph {
    /// Track length in seconds.
    pub fn duration_secs(&self) -> f64 {
        match self {
            Self::Silence { duration_secs, .. } | Self::Chimes { duration_secs, .. } => {
                *duration_secs
            }
        }
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        match self {
            Self::Silence { sample_rate, .. } | Self::Chimes { sample_rate, .. } => *sample_rate,
        }
    }

    /// Chime events (empty for silence).
    pub fn events(&self) -> &[ChimeEvent] {
        match self {
            Self::Silence { .. } => &[],
            Self::Chimes { events, .. } => events.as_slice(),
        }
    }

    /// Exact sample count of the track.
    pub fn total_samples(&self) -> u64 {
        (self.duration_secs() * f64::from(self.sample_rate())).round() as u64
    }
}
