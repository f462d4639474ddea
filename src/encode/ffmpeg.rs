use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context as _;

use crate::audio::graph::AudioFilterGraph;
use crate::encode::gateway::{AudioJob, ComposeJob, EncodingGateway, JobKind, VideoJob};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{RevealError, RevealResult};
use crate::overlay::OverlaySpec;

/// Gateway backed by the system `ffmpeg` binary.
///
/// Each job is one blocking `ffmpeg` invocation; stderr is captured and returned verbatim on
/// failure.
#[derive(Clone, Debug)]
pub struct FfmpegEncoder {
    program: PathBuf,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegEncoder {
    /// Encoder invoking `program` (a bare name is looked up on `PATH`).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Executable this encoder runs.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments for job A.
    pub fn audio_args(job: &AudioJob) -> Vec<String> {
        let graph = &job.graph;
        let mut args = base_args();

        if let Some(pcm) = job.pcm_input.as_ref() {
            args.extend(strs(&["-f", "f32le", "-ar"]));
            args.push(pcm.sample_rate.to_string());
            args.push("-ac".into());
            args.push(pcm.channels.to_string());
            args.push("-i".into());
            args.push(path_arg(&pcm.path));
        } else {
            match graph {
                AudioFilterGraph::Silence { sample_rate, .. } => {
                    args.extend(strs(&["-f", "lavfi", "-i"]));
                    args.push(format!("anullsrc=r={sample_rate}:cl=mono"));
                }
                AudioFilterGraph::Chimes { .. } => {
                    args.push("-filter_complex".into());
                    args.push(chime_filter_complex(graph));
                    args.extend(strs(&["-map", "[a]"]));
                }
            }
        }

        args.push("-ar".into());
        args.push(graph.sample_rate().to_string());
        args.extend(strs(&["-ac", "1", "-t"]));
        args.push(graph.duration_secs().to_string());
        args.push(path_arg(&job.out_path));
        args
    }

    /// Arguments for job B.
    pub fn video_args(job: &VideoJob) -> Vec<String> {
        let mut args = base_args();
        args.push("-framerate".into());
        args.push(job.fps.to_ffmpeg_rate());
        args.extend(strs(&["-start_number", "0", "-i"]));
        args.push(path_arg(&job.frames_pattern));
        args.push("-frames:v".into());
        args.push(job.frame_count.to_string());
        args.extend(strs(&[
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-r",
        ]));
        args.push(job.fps.to_ffmpeg_rate());
        args.push(path_arg(&job.out_path));
        args
    }

    /// Arguments for job C.
    pub fn compose_args(job: &ComposeJob) -> Vec<String> {
        let mut args = base_args();
        args.push("-i".into());
        args.push(path_arg(&job.video_path));
        args.push("-i".into());
        args.push(path_arg(&job.audio_path));
        args.extend(strs(&["-map", "0:v:0", "-map", "1:a:0"]));

        let mut video_filters = Vec::new();
        if let Some(overlay) = job.overlay.as_ref() {
            video_filters.push(overlay_filter_chain(overlay, &job.overlay_script));
        }
        if job.hold_secs > 0 {
            video_filters.push(format!(
                "tpad=stop_mode=clone:stop_duration={}",
                job.hold_secs
            ));
        }
        if !video_filters.is_empty() {
            args.push("-vf".into());
            args.push(video_filters.join(","));
        }
        if job.hold_secs > 0 {
            args.push("-af".into());
            args.push(format!("apad=pad_dur={}", job.hold_secs));
        }

        args.push("-t".into());
        args.push(job.total_duration_secs().to_string());
        args.extend(strs(&[
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-movflags",
            "+faststart",
        ]));
        args.push(path_arg(&job.out_path));
        args
    }

    fn run(&self, kind: JobKind, args: &[String]) -> RevealResult<()> {
        tracing::info!(task = kind.task(), "running ffmpeg");
        tracing::debug!(program = %self.program.display(), ?args, "ffmpeg arguments");

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RevealError::missing(format!(
                        "ffmpeg not found at '{}': {e}",
                        self.program.display()
                    ))
                } else {
                    RevealError::Other(anyhow::anyhow!(
                        "failed to spawn ffmpeg to {}: {e}",
                        kind.task()
                    ))
                }
            })?;

        if !output.status.success() {
            return Err(RevealError::encoder(
                kind.task(),
                args,
                output.status,
                String::from_utf8_lossy(&output.stderr),
            ));
        }
        Ok(())
    }
}

impl EncodingGateway for FfmpegEncoder {
    fn ensure_available(&self) -> RevealResult<()> {
        if is_encoder_available(&self.program) {
            Ok(())
        } else {
            Err(RevealError::missing(format!(
                "ffmpeg not found at '{}' (install it or pass --ffmpeg)",
                self.program.display()
            )))
        }
    }

    fn encode_audio(&mut self, job: &AudioJob) -> RevealResult<()> {
        self.run(JobKind::Audio, &Self::audio_args(job))
    }

    fn encode_video(&mut self, job: &VideoJob) -> RevealResult<()> {
        if job.frame_count == 0 {
            return Err(RevealError::validation("video job needs at least one frame"));
        }
        self.run(JobKind::Video, &Self::video_args(job))
    }

    fn compose(&mut self, job: &ComposeJob) -> RevealResult<()> {
        if let Some(overlay) = job.overlay.as_ref() {
            let script = overlay_sendcmd_script(overlay, job.fps);
            std::fs::write(&job.overlay_script, script).with_context(|| {
                format!(
                    "write overlay command script '{}'",
                    job.overlay_script.display()
                )
            })?;
        }
        self.run(JobKind::Compose, &Self::compose_args(job))
    }
}

/// `-filter_complex` graph for a chime track: one `aevalsrc` per event, delayed by whole samples,
/// mixed at unity gain (no per-input normalisation), then padded so `-t` can cut the track to its
/// exact length.
///
/// Returns an empty string for [`AudioFilterGraph::Silence`].
pub fn chime_filter_complex(graph: &AudioFilterGraph) -> String {
    let AudioFilterGraph::Chimes {
        sample_rate,
        shape,
        events,
        ..
    } = graph
    else {
        return String::new();
    };

    let mut out = String::new();
    let mut mix_inputs = String::new();
    for (i, e) in events.iter().enumerate() {
        let partials = e
            .frequencies_hz
            .iter()
            .zip(e.weights)
            .map(|(f, w)| format!("{w}*sin({f}*2*PI*t)"))
            .collect::<Vec<_>>()
            .join("+");
        out.push_str(&format!(
            "aevalsrc='{gain}*({partials})*pow(1-mod(t,{d}),{p})':s={sample_rate}:d={d}[t{i}];",
            gain = shape.gain,
            d = e.tone_duration_secs,
            p = shape.decay_exponent,
        ));
        out.push_str(&format!(
            "[t{i}]adelay=delays={}S:all=1[d{i}];",
            e.offset_samples(*sample_rate)
        ));
        mix_inputs.push_str(&format!("[d{i}]"));
    }
    out.push_str(&format!(
        "{mix_inputs}amix=inputs={}:normalize=0,apad[a]",
        events.len()
    ));
    out
}

/// `sendcmd` script re-initialising each counter's `drawtext` whenever its value changes.
pub fn overlay_sendcmd_script(spec: &OverlaySpec, fps: Fps) -> String {
    let mut by_frame: BTreeMap<u64, Vec<String>> = BTreeMap::new();
    for counter in &spec.counters {
        for (frame, _) in counter.changes() {
            by_frame.entry(frame.0).or_default().push(format!(
                "drawtext@{} reinit 'text={}'",
                counter.name,
                escape_option_value(&counter.text_at(frame))
            ));
        }
    }

    let mut script = String::new();
    for (frame, commands) in by_frame {
        script.push_str(&format!(
            "{:.6} {};\n",
            fps.frames_to_secs(frame),
            commands.join(", ")
        ));
    }
    script
}

/// `sendcmd` + one named `drawtext` per counter, stacked from the top centre.
pub fn overlay_filter_chain(spec: &OverlaySpec, script_path: &Path) -> String {
    let font = escape_filter_path(&spec.font_file);
    let line_height = spec.font_size + 12;

    let mut parts = vec![format!("sendcmd=f='{}'", escape_filter_path(script_path))];
    for (i, counter) in spec.counters.iter().enumerate() {
        let y = 20 + line_height * i as u32;
        parts.push(format!(
            "drawtext@{name}=fontfile='{font}':expansion=none:text='{text}':fontsize={size}:\
             fontcolor=white:x=(w-text_w)/2:y={y}:box=1:boxcolor=black@0.5:boxborderw=10",
            name = counter.name,
            text = escape_option_value(&counter.text_at(FrameIndex(0))),
            size = spec.font_size,
        ));
    }
    parts.join(",")
}

/// Return `true` when `program -version` runs successfully.
pub fn is_encoder_available(program: &Path) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn base_args() -> Vec<String> {
    strs(&["-y", "-hide_banner", "-loglevel", "error"])
}

fn strs(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Path inside a quoted filter option: forward slashes, escaped drive colons.
fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .replace(':', "\\:")
}

fn escape_option_value(text: &str) -> String {
    text.replace('\\', "\\\\").replace(':', "\\:")
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
