//! Encoding layer: frame sinks and the encoder gateway.

/// `ffmpeg`-backed gateway (system binary).
pub mod ffmpeg;
/// Encoder job descriptions and the gateway trait.
pub mod gateway;
/// Frame sink trait and built-in sinks.
pub mod sink;
