use std::path::Path;

use anyhow::Context as _;

use crate::audio::graph::AudioFilterGraph;
use crate::foundation::error::RevealResult;

/// Realize `graph` as mono `f32` samples, in-process.
///
/// Uses the same sample offsets and envelope as the `ffmpeg` filter graph, which mixes with
/// `amix=normalize=0`: tones are summed at unity gain, then clamped to `[-1, 1]`. A chime is as
/// loud in a crowded track as on its own. The result always holds exactly
/// [`AudioFilterGraph::total_samples`] samples.
pub fn render_pcm(graph: &AudioFilterGraph) -> Vec<f32> {
    let total = graph.total_samples() as usize;
    let mut out = vec![0.0f64; total];

    if let AudioFilterGraph::Chimes {
        sample_rate,
        shape,
        events,
        ..
    } = graph
    {
        let sr = f64::from(*sample_rate);
        for event in events {
            let start = event.offset_samples(*sample_rate) as usize;
            let tone_len = (event.tone_duration_secs * sr).round() as usize;
            let end = start.saturating_add(tone_len).min(total);
            for (n, slot) in out.iter_mut().enumerate().take(end).skip(start) {
                let t = (n - start) as f64 / sr;
                *slot += event.amplitude_at(t, shape);
            }
        }
    }

    out.into_iter()
        .map(|s| s.clamp(-1.0, 1.0) as f32)
        .collect()
}

/// Write mono `f32` PCM samples to a raw little-endian `.f32le` file.
pub fn write_pcm_f32le_file(samples: &[f32], out_path: &Path) -> RevealResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("create audio output directory '{}'", parent.display())
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples.len() * 4);
    for &sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes)
        .with_context(|| format!("write raw audio file '{}'", out_path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/audio/synth.rs"]
mod tests;
