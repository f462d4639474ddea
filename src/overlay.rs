//! On-screen counters, precomputed once per frame.
//!
//! The encoder receives plain per-frame values and only has to draw them.

use std::path::PathBuf;

use crate::foundation::core::FrameIndex;
use crate::foundation::math::mul_div_floor;

/// One live counter drawn over the video.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CounterTrack {
    /// Stable identifier, usable as an encoder filter instance name.
    pub name: String,
    /// Text drawn before the value.
    pub label: String,
    /// Value for each video frame, index = frame.
    pub values: Vec<u64>,
}

impl CounterTrack {
    /// "New Followers" counter: climbs to `session_followers` over the video, never above it.
    pub fn followers(session_followers: u64, total_frames: u64) -> Self {
        Self {
            name: "followers".to_string(),
            label: "New Followers".to_string(),
            values: follower_counter_values(session_followers, total_frames),
        }
    }

    /// "Total Pixels revealed" counter, mirroring the reveal schedule.
    pub fn pixels(schedule: &[u64]) -> Self {
        Self {
            name: "pixels".to_string(),
            label: "Total Pixels revealed".to_string(),
            values: schedule.to_vec(),
        }
    }

    /// Text shown at `frame` (the last value holds past the end).
    pub fn text_at(&self, frame: FrameIndex) -> String {
        let idx = (frame.0 as usize).min(self.values.len().saturating_sub(1));
        let value = self.values.get(idx).copied().unwrap_or(0);
        format!("{}: {value}", self.label)
    }

    /// Frames where the value differs from the previous frame (frame 0 always included).
    pub fn changes(&self) -> impl Iterator<Item = (FrameIndex, u64)> + '_ {
        self.values.iter().enumerate().filter_map(|(i, v)| {
            let changed = i == 0 || self.values[i - 1] != *v;
            changed.then_some((FrameIndex(i as u64), *v))
        })
    }
}

/// `min(session, floor((f + 1) / frames * (session + 0.5)))` per frame, in exact integers.
///
/// The half-step bias makes the counter reach `session` slightly before the last frame.
pub fn follower_counter_values(session_followers: u64, total_frames: u64) -> Vec<u64> {
    if total_frames == 0 {
        return Vec::new();
    }
    let twice_target = session_followers.saturating_mul(2).saturating_add(1);
    (0..total_frames)
        .map(|f| {
            mul_div_floor(f + 1, twice_target, total_frames.saturating_mul(2)).min(session_followers)
        })
        .collect()
}

/// Text overlay request for the compose job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlaySpec {
    /// TrueType font used by the encoder.
    pub font_file: PathBuf,
    /// Font size in pixels.
    pub font_size: u32,
    /// Counters stacked from the top of the frame.
    pub counters: Vec<CounterTrack>,
}

#[cfg(test)]
#[path = "../tests/unit/overlay.rs"]
mod tests;
