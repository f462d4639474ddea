use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{RevealError, RevealResult};
use crate::foundation::math::mul_div_floor;
use crate::reveal::canvas::{Canvas, FrameRGBA, SourceImage};
use crate::reveal::permutation::CoordinatePermutation;

/// Cumulative number of revealed pixels after each frame.
///
/// Linear in time: `floor((f + 1) * total / frames)`, computed exactly in integers. The final
/// frame always lands on `total_to_reveal`, whatever the rounding of earlier frames.
pub fn reveal_schedule(total_to_reveal: u64, total_frames: u64) -> Vec<u64> {
    (0..total_frames)
        .map(|f| target_for_frame(f, total_to_reveal, total_frames))
        .collect()
}

fn target_for_frame(frame: u64, total_to_reveal: u64, total_frames: u64) -> u64 {
    if frame + 1 >= total_frames {
        return total_to_reveal;
    }
    mul_div_floor(frame + 1, total_to_reveal, total_frames).min(total_to_reveal)
}

/// Scheduler counters. Only ever increase while rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RevealState {
    /// Pixels copied from the source so far (also the permutation cursor).
    pub revealed_so_far: u64,
    /// Pixels revealed once the last frame is emitted.
    pub total_to_reveal: u64,
    /// Next frame to emit.
    pub frame_index: FrameIndex,
}

/// Outcome of one scheduler step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameStep {
    /// Frame that was just produced.
    pub index: FrameIndex,
    /// Pixels revealed during this frame.
    pub newly_revealed: u64,
    /// Cumulative revealed pixels after this frame.
    pub revealed_total: u64,
}

/// Totals reported after a full render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RevealStats {
    /// Frames emitted.
    pub frames: u64,
    /// Pixels revealed by the last frame.
    pub pixels_revealed: u64,
}

/// Reveals source pixels onto a canvas in permutation order, one frame at a time.
#[derive(Debug)]
pub struct RevealScheduler<'a> {
    source: &'a SourceImage,
    permutation: &'a CoordinatePermutation,
    total_frames: u64,
    state: RevealState,
}

impl<'a> RevealScheduler<'a> {
    /// Create a scheduler. `total_to_reveal` is clamped to the permutation length.
    pub fn new(
        source: &'a SourceImage,
        permutation: &'a CoordinatePermutation,
        total_to_reveal: u64,
        total_frames: u64,
    ) -> RevealResult<Self> {
        if total_frames == 0 {
            return Err(RevealError::validation("reveal needs at least one frame"));
        }
        if permutation.width() > source.width() || permutation.height() > source.height() {
            return Err(RevealError::validation(format!(
                "permutation grid {}x{} exceeds source image {}x{}",
                permutation.width(),
                permutation.height(),
                source.width(),
                source.height()
            )));
        }

        Ok(Self {
            source,
            permutation,
            total_frames,
            state: RevealState {
                revealed_so_far: 0,
                total_to_reveal: total_to_reveal.min(permutation.len() as u64),
                frame_index: FrameIndex(0),
            },
        })
    }

    /// Current counters.
    pub fn state(&self) -> RevealState {
        self.state
    }

    /// Total frames this scheduler emits.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Advance one frame, copying the newly due pixels onto `canvas`.
    ///
    /// Returns `Ok(None)` once every frame has been produced.
    pub fn step(&mut self, canvas: &mut Canvas) -> RevealResult<Option<FrameStep>> {
        let f = self.state.frame_index.0;
        if f >= self.total_frames {
            return Ok(None);
        }
        let size = canvas.size();
        if size.width != self.permutation.width() || size.height != self.permutation.height() {
            return Err(RevealError::validation(format!(
                "canvas {}x{} does not match permutation grid {}x{}",
                size.width,
                size.height,
                self.permutation.width(),
                self.permutation.height()
            )));
        }

        let target = target_for_frame(f, self.state.total_to_reveal, self.total_frames);
        let now = target.saturating_sub(self.state.revealed_so_far);
        let start = self.state.revealed_so_far as usize;
        for c in &self.permutation.coords()[start..start + now as usize] {
            canvas.set_pixel(c.x, c.y, self.source.pixel(c.x, c.y));
        }

        self.state.revealed_so_far += now;
        self.state.frame_index = FrameIndex(f + 1);
        Ok(Some(FrameStep {
            index: FrameIndex(f),
            newly_revealed: now,
            revealed_total: self.state.revealed_so_far,
        }))
    }

    /// Run every remaining step, pushing the canvas into `sink` after each one.
    #[tracing::instrument(skip_all)]
    pub fn render(
        mut self,
        canvas: &mut Canvas,
        sink: &mut dyn FrameSink,
        fps: Fps,
    ) -> RevealResult<RevealStats> {
        let size = canvas.size();
        sink.begin(SinkConfig {
            width: size.width,
            height: size.height,
            fps,
        })?;

        let mut stats = RevealStats::default();
        while let Some(step) = self.step(canvas)? {
            sink.push_frame(step.index, canvas.as_frame())?;
            tracing::debug!(
                frame = step.index.0 + 1,
                of = self.total_frames,
                revealed = step.revealed_total,
                "frame rendered"
            );
            stats.frames += 1;
            stats.pixels_revealed = step.revealed_total;
        }

        sink.end()?;
        Ok(stats)
    }
}

/// Render every frame into memory.
pub fn render_frames(
    source: &SourceImage,
    canvas: &mut Canvas,
    permutation: &CoordinatePermutation,
    total_to_reveal: u64,
    total_frames: u64,
) -> RevealResult<Vec<FrameRGBA>> {
    let scheduler = RevealScheduler::new(source, permutation, total_to_reveal, total_frames)?;
    let mut sink = InMemorySink::new();
    scheduler.render(canvas, &mut sink, Fps::default())?;
    Ok(sink.into_frames())
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/scheduler.rs"]
mod tests;
