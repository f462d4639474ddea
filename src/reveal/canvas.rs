use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::CanvasSize;
use crate::foundation::error::{RevealError, RevealResult};

/// One rendered frame: straight-alpha RGBA8, row-major, `width * height * 4` bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// RGBA value at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}

/// Decoded still image used as the read-only source of reveal colours.
#[derive(Clone, Debug)]
pub struct SourceImage {
    width: u32,
    height: u32,
    rgba8: Vec<u8>,
}

impl SourceImage {
    /// Decode an image file into straight-alpha RGBA8.
    pub fn open(path: &Path) -> RevealResult<Self> {
        let dyn_img = image::open(path)
            .with_context(|| format!("decode source image '{}'", path.display()))?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            rgba8: rgba.into_raw(),
        })
    }

    /// Wrap raw RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> RevealResult<Self> {
        if rgba8.len() != width as usize * height as usize * 4 {
            return Err(RevealError::validation(format!(
                "source buffer has {} bytes, expected {width}x{height}x4",
                rgba8.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA value at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.rgba8[i],
            self.rgba8[i + 1],
            self.rgba8[i + 2],
            self.rgba8[i + 3],
        ]
    }

    /// Canvas size this image maps onto (trailing odd row/column dropped).
    pub fn even_canvas_size(&self) -> RevealResult<CanvasSize> {
        CanvasSize::even_within(self.width, self.height)
    }
}

/// Mutable frame buffer the scheduler reveals pixels into.
#[derive(Clone, Debug)]
pub struct Canvas {
    frame: FrameRGBA,
}

impl Canvas {
    /// New canvas filled with `background` (straight-alpha RGBA8).
    pub fn new(size: CanvasSize, background: [u8; 4]) -> Self {
        let len = size.pixel_count() as usize;
        let mut data = Vec::with_capacity(len * 4);
        for _ in 0..len {
            data.extend_from_slice(&background);
        }
        Self {
            frame: FrameRGBA {
                width: size.width,
                height: size.height,
                data,
            },
        }
    }

    /// Canvas dimensions.
    pub fn size(&self) -> CanvasSize {
        CanvasSize {
            width: self.frame.width,
            height: self.frame.height,
        }
    }

    pub(crate) fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = (y as usize * self.frame.width as usize + x as usize) * 4;
        self.frame.data[i..i + 4].copy_from_slice(&rgba);
    }

    /// Current bitmap.
    pub fn as_frame(&self) -> &FrameRGBA {
        &self.frame
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/canvas.rs"]
mod tests;
