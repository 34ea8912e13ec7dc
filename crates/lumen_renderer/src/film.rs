//! Accumulation film and the final 8-bit image.

use std::path::Path;

use crate::bucket::BucketResult;
use crate::config::ToneMap;
use crate::error::{RenderError, RenderResult};
use lumen_math::{is_valid_color, max_channel, Color};

/// Running per-pixel sum over completed iterations.
#[derive(Debug, Clone)]
pub struct Film {
    width: u32,
    height: u32,
    sum: Vec<Color>,
    iterations: u32,
}

impl Film {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            sum: vec![Color::ZERO; (width * height) as usize],
            iterations: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of iterations accumulated so far.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Add a rendered bucket. Returns the number of invalid pixels skipped.
    pub fn add_bucket(&mut self, result: &BucketResult) -> usize {
        let b = &result.bucket;
        let mut skipped = 0;
        for (i, color) in result.pixels.iter().enumerate() {
            let x = b.x + i as u32 % b.width;
            let y = b.y + i as u32 / b.width;
            if x >= self.width || y >= self.height {
                continue;
            }
            if !is_valid_color(*color) {
                skipped += 1;
                continue;
            }
            self.sum[(y * self.width + x) as usize] += *color;
        }
        skipped
    }

    /// Mark the end of one iteration.
    pub fn finish_iteration(&mut self) {
        self.iterations += 1;
    }

    /// Mean radiance per pixel over completed iterations.
    pub fn average(&self) -> Vec<Color> {
        let scale = 1.0 / self.iterations.max(1) as f32;
        self.sum.iter().map(|c| *c * scale).collect()
    }

    /// Average, map into [0, 1] and apply display gamma `1 / gamma`.
    pub fn tone_map(&self, gamma: f32, mode: ToneMap) -> ImageBuffer {
        let mut pixels = self.average();

        match mode {
            ToneMap::Normalize => {
                let peak = pixels.iter().copied().map(max_channel).fold(0.0_f32, f32::max);
                if peak > 0.0 {
                    pixels.iter_mut().for_each(|c| *c /= peak);
                }
            }
            ToneMap::Clamp => {
                pixels.iter_mut().for_each(|c| *c = c.min(Color::ONE));
            }
        }

        let inv_gamma = if gamma > 0.0 { 1.0 / gamma } else { 1.0 };
        for c in pixels.iter_mut() {
            *c = Color::new(c.x.powf(inv_gamma), c.y.powf(inv_gamma), c.z.powf(inv_gamma));
        }

        ImageBuffer {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

/// Display-ready image with channels in [0, 1].
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Row-major 8-bit RGBA bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| color_to_rgba(*c)).collect()
    }

    /// Write the image; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| RenderError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let bytes = self.to_rgba8();
        let expected = (self.width * self.height * 4) as usize;
        let found = bytes.len();
        let image = image::RgbaImage::from_raw(self.width, self.height, bytes)
            .ok_or(RenderError::BufferSize { found, expected })?;
        image.save(path)?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Convert a display color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let r = (255.0 * clamp_01(color.x)).round() as u8;
    let g = (255.0 * clamp_01(color.y)).round() as u8;
    let b = (255.0 * clamp_01(color.z)).round() as u8;
    [r, g, b, 255]
}
