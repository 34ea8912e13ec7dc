//! Texture loading for materials.
//!
//! Images are decoded once with the `image` crate and stored as linear
//! RGBA floats, ready for bilinear lookup during shading.

use std::path::Path;

use lumen_math::{Color, Vec2};
use thiserror::Error;

/// Texture loading and construction failures.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture has no pixels: {0}")]
    Empty(String),

    #[error("Pixel buffer holds {found} texels, expected {expected}")]
    BufferSize { found: usize, expected: usize },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Linear RGBA image sampled by UV coordinates.
///
/// Stores pixels in linear RGBA float format for rendering.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Pixels per row
    pub width: u32,

    /// Rows
    pub height: u32,

    /// Row-major linear RGBA, top row first
    pub pixels: Vec<[f32; 4]>,

    /// Source path, or a tag for generated textures
    pub path: String,
}

impl Texture {
    /// Wrap row-major pixels; the count must match `width * height`.
    pub fn new(
        width: u32,
        height: u32,
        pixels: Vec<[f32; 4]>,
        path: impl Into<String>,
    ) -> TextureResult<Self> {
        let path = path.into();
        let expected = (width as usize) * (height as usize);
        if expected == 0 {
            return Err(TextureError::Empty(path));
        }
        if pixels.len() != expected {
            return Err(TextureError::BufferSize {
                found: pixels.len(),
                expected,
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            path,
        })
    }

    /// 1x1 texture of one colour.
    pub fn solid_color(color: Color) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![[color.x, color.y, color.z, 1.0]],
            path: "<solid>".to_string(),
        }
    }

    /// Load a texture from an image file, converting sRGB to linear.
    pub fn open(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels: Vec<[f32; 4]> = rgba
            .pixels()
            .map(|p| {
                [
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                    p[3] as f32 / 255.0, // Alpha is linear
                ]
            })
            .collect();

        let texture = Self::new(width, height, pixels, path.display().to_string())?;
        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            texture.path,
            texture.width,
            texture.height,
            texture.size_bytes() as f32 / 1024.0
        );
        Ok(texture)
    }

    /// Sample the texture at UV coordinates (bilinear filtering, wrapping).
    ///
    /// UV coordinates repeat every unit, with (0, 0) at the bottom-left.
    /// The closed unit square maps onto the image as is, so `1.0` is the
    /// last row or column and not the first.
    pub fn sample(&self, uv: Vec2) -> Color {
        let u = wrap_unit(uv.x);
        let v = wrap_unit(uv.y);

        // Convert to pixel coordinates, flipping V for image rows
        let x = u * (self.width as f32 - 1.0);
        let y = (1.0 - v) * (self.height as f32 - 1.0);

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = x.fract();
        let fy = y.fract();

        let top = self.texel(x0, y0).lerp(self.texel(x1, y0), fx);
        let bottom = self.texel(x0, y1).lerp(self.texel(x1, y1), fx);
        top.lerp(bottom, fy)
    }

    /// RGB of the texel at integer coordinates.
    fn texel(&self, x: u32, y: u32) -> Color {
        let idx = (y * self.width + x) as usize;
        self.pixels
            .get(idx)
            .map(|p| Color::new(p[0], p[1], p[2]))
            .unwrap_or(Color::ZERO)
    }

    /// Bytes held by the pixel buffer.
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<[f32; 4]>()
    }
}

/// Repeat `t` into `[0, 1]`, leaving values already inside untouched.
fn wrap_unit(t: f32) -> f32 {
    if (0.0..=1.0).contains(&t) {
        t
    } else {
        t.rem_euclid(1.0)
    }
}

/// sRGB-encoded byte to linear intensity.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Texture {
        // 2x2: white, black on the top row; black, white on the bottom row
        let w = [1.0, 1.0, 1.0, 1.0];
        let b = [0.0, 0.0, 0.0, 1.0];
        Texture::new(2, 2, vec![w, b, b, w], "checker").unwrap()
    }

    #[test]
    fn test_solid_color_texture() {
        let tex = Texture::solid_color(Color::new(1.0, 0.5, 0.0));
        let sample = tex.sample(Vec2::new(0.3, 0.9));
        assert!((sample - Color::new(1.0, 0.5, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_sample_corners_and_center() {
        let tex = checker();
        // v = 1 is the top row
        assert!((tex.sample(Vec2::new(0.0, 1.0)) - Color::ONE).length() < 1e-5);
        assert!(tex.sample(Vec2::new(0.0, 0.0)).length() < 1e-5);
        // Bilinear blend of all four texels
        assert!((tex.sample(Vec2::new(0.5, 0.5)) - Color::splat(0.5)).length() < 1e-5);
    }

    #[test]
    fn test_unit_edges_do_not_wrap() {
        let tex = checker();
        // Right and top edges stay on their own side of the image
        assert!((tex.sample(Vec2::new(1.0, 1.0)) - Color::ZERO).length() < 1e-5);
        assert!((tex.sample(Vec2::new(1.0, 0.0)) - Color::ONE).length() < 1e-5);
        assert!((tex.sample(Vec2::new(0.0, 1.0)) - tex.sample(Vec2::new(0.0, 0.999_9))).length() < 1e-3);
        assert_eq!(wrap_unit(1.0), 1.0);
        assert_eq!(wrap_unit(-0.25), 0.75);
        assert_eq!(wrap_unit(2.5), 0.5);
    }

    #[test]
    fn test_sample_wraps() {
        let tex = checker();
        let a = tex.sample(Vec2::new(0.25, 0.75));
        let b = tex.sample(Vec2::new(1.25, -0.25));
        assert!((a - b).length() < 1e-5);
    }

    #[test]
    fn test_new_rejects_wrong_buffer() {
        assert!(matches!(
            Texture::new(2, 2, vec![[0.0; 4]; 3], "bad"),
            Err(TextureError::BufferSize { found: 3, expected: 4 })
        ));
        assert!(matches!(
            Texture::new(0, 4, Vec::new(), "empty"),
            Err(TextureError::Empty(_))
        ));
    }

    #[test]
    fn test_open_png() {
        let dir = std::env::temp_dir().join(format!("lumen_texture_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("red.png");
        image::RgbaImage::from_pixel(4, 2, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let tex = Texture::open(&path).unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
        assert!((tex.sample(Vec2::new(0.5, 0.5)) - Color::new(1.0, 0.0, 0.0)).length() < 1e-4);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_srgb_to_linear() {
        assert!((srgb_to_linear(0) - 0.0).abs() < 0.001);
        assert!((srgb_to_linear(255) - 1.0).abs() < 0.001);

        // 50% sRGB is about 21% linear
        let mid = srgb_to_linear(128);
        assert!(mid < 0.5);
        assert!(mid > 0.1);
    }
}
