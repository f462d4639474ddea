//! Chime cue builder.
//!
//! A chime is three sine partials with random weights under a steep decay, giving a short
//! "coin pickup" blip. Events are spread evenly across the track and capped in number.

use serde::{Deserialize, Serialize};

use crate::audio::graph::AudioFilterGraph;
use crate::foundation::error::{RevealError, RevealResult};
use crate::foundation::rng::Rng64;

/// C6, F6, C7.
pub const CHIME_FREQUENCIES_HZ: [f64; 3] = [1046.0, 1396.0, 2093.0];

/// Amplitude shaping shared by every tone in a track.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToneShape {
    /// Overall gain applied to the partial sum.
    pub gain: f64,
    /// Exponent `p` of the `(1 - t mod d)^p` decay.
    pub decay_exponent: f64,
}

impl Default for ToneShape {
    fn default() -> Self {
        Self {
            gain: 0.4,
            decay_exponent: 20.0,
        }
    }
}

/// Settings for [`ChimeTrack::build`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChimeSettings {
    /// Hard cap on audible events per track.
    pub max_events: u32,
    /// Length of one tone in seconds.
    pub tone_duration_secs: f64,
    /// Partial frequencies in Hz.
    pub frequencies_hz: [f64; 3],
    /// Gain and decay.
    pub shape: ToneShape,
    /// Output sample rate in Hz.
    pub sample_rate: u32,
}

impl Default for ChimeSettings {
    fn default() -> Self {
        Self {
            max_events: 40,
            tone_duration_secs: 0.2,
            frequencies_hz: CHIME_FREQUENCIES_HZ,
            shape: ToneShape::default(),
            sample_rate: 44_100,
        }
    }
}

impl ChimeSettings {
    /// Reject settings that cannot produce a track.
    pub fn validate(&self) -> RevealResult<()> {
        if self.max_events == 0 {
            return Err(RevealError::validation("chime max_events must be > 0"));
        }
        if !(self.tone_duration_secs.is_finite() && self.tone_duration_secs > 0.0) {
            return Err(RevealError::validation(
                "chime tone_duration_secs must be finite and > 0",
            ));
        }
        if self.sample_rate == 0 {
            return Err(RevealError::validation("audio sample_rate must be > 0"));
        }
        if self.frequencies_hz.iter().any(|f| !f.is_finite() || *f <= 0.0) {
            return Err(RevealError::validation(
                "chime frequencies must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// One scheduled chime.
#[derive(Clone, Debug, PartialEq)]
pub struct ChimeEvent {
    /// Start time in the track, in seconds.
    pub offset_secs: f64,
    /// Partial frequencies in Hz.
    pub frequencies_hz: [f64; 3],
    /// Per-partial weights, `sin(draw)` with `draw` uniform in `[0, 1)`.
    pub weights: [f64; 3],
    /// Tone length in seconds.
    pub tone_duration_secs: f64,
}

impl ChimeEvent {
    /// Start offset rounded to whole samples.
    pub fn offset_samples(&self, sample_rate: u32) -> u64 {
        (self.offset_secs * f64::from(sample_rate)).round() as u64
    }

    /// Instantaneous amplitude `t` seconds into the tone.
    pub fn amplitude_at(&self, t: f64, shape: &ToneShape) -> f64 {
        let partials: f64 = self
            .frequencies_hz
            .iter()
            .zip(self.weights)
            .map(|(f, w)| w * (std::f64::consts::TAU * f * t).sin())
            .sum();
        shape.gain * partials * decay_envelope(t, self.tone_duration_secs, shape.decay_exponent)
    }
}

/// `(1 - (t mod d))^p`: 1.0 at the onset, decaying steeply across the tone.
pub fn decay_envelope(t: f64, tone_duration_secs: f64, exponent: f64) -> f64 {
    (1.0 - t.rem_euclid(tone_duration_secs)).max(0.0).powf(exponent)
}

/// Builder for the chime track.
#[derive(Debug)]
pub struct ChimeTrack;

impl ChimeTrack {
    /// Build the graph for `event_count` events over `duration_secs`.
    ///
    /// Draws three values from `rng` per emitted event, in event order; a silent track draws
    /// nothing.
    #[tracing::instrument(skip(settings, rng))]
    pub fn build(
        event_count: u64,
        duration_secs: f64,
        settings: &ChimeSettings,
        rng: &mut Rng64,
    ) -> RevealResult<AudioFilterGraph> {
        if !(duration_secs.is_finite() && duration_secs > 0.0) {
            return Err(RevealError::validation(
                "audio track duration must be finite and > 0",
            ));
        }
        settings.validate()?;

        if event_count == 0 {
            return Ok(AudioFilterGraph::Silence {
                duration_secs,
                sample_rate: settings.sample_rate,
            });
        }

        let total = event_count.min(u64::from(settings.max_events));
        let interval = duration_secs / total as f64;
        let events = (0..total)
            .map(|i| {
                let weights = [
                    rng.next_f64_01().sin(),
                    rng.next_f64_01().sin(),
                    rng.next_f64_01().sin(),
                ];
                ChimeEvent {
                    offset_secs: i as f64 * interval,
                    frequencies_hz: settings.frequencies_hz,
                    weights,
                    tone_duration_secs: settings.tone_duration_secs,
                }
            })
            .collect();

        Ok(AudioFilterGraph::Chimes {
            duration_secs,
            sample_rate: settings.sample_rate,
            shape: settings.shape,
            events,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/chime.rs"]
mod tests;
