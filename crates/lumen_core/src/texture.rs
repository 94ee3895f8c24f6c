//! Textures evaluated by materials at a surface hit.
//!
//! Every texture is a pure function of the hit's (u, v) coordinates and
//! world-space point, and is shared read-only between render threads.

use std::path::Path;
use std::sync::Arc;

use lumen_math::{Interval, Vec3};
use thiserror::Error;

use crate::Perlin;

/// Color type alias (linear RGB, each channel typically 0-1)
pub type Color = Vec3;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture: {0}")]
    LoadError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Texture has no pixels: {0}")]
    Empty(String),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A color lookup over a surface.
pub trait Texture: Send + Sync {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color;
}

/// A constant color.
#[derive(Clone, Copy, Debug)]
pub struct SolidColor {
    albedo: Color,
}

impl SolidColor {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    pub fn from_rgb(red: f32, green: f32, blue: f32) -> Self {
        Self::new(Color::new(red, green, blue))
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.albedo
    }
}

/// A solid (3D) checker pattern alternating between two textures.
pub struct CheckerTexture {
    inv_scale: f32,
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
}

impl CheckerTexture {
    /// `scale` is the edge length of one checker cell in world units.
    pub fn new(scale: f32, even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self {
            inv_scale: 1.0 / scale,
            even,
            odd,
        }
    }

    pub fn from_colors(scale: f32, even: Color, odd: Color) -> Self {
        Self::new(
            scale,
            Arc::new(SolidColor::new(even)),
            Arc::new(SolidColor::new(odd)),
        )
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        let x = (self.inv_scale * p.x).floor() as i32;
        let y = (self.inv_scale * p.y).floor() as i32;
        let z = (self.inv_scale * p.z).floor() as i32;

        if (x + y + z).rem_euclid(2) == 0 {
            self.even.value(u, v, p)
        } else {
            self.odd.value(u, v, p)
        }
    }
}

/// Marble-like pattern driven by Perlin turbulence.
pub struct NoiseTexture {
    noise: Perlin,
    scale: f32,
}

impl NoiseTexture {
    pub fn new(noise: Perlin, scale: f32) -> Self {
        Self { noise, scale }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f32, _v: f32, p: Vec3) -> Color {
        let phase = self.scale * p.z + 10.0 * self.noise.turbulence(p, 7);
        Color::splat(0.5) * (1.0 + phase.sin())
    }
}

/// A decoded image sampled by (u, v).
///
/// Stores pixels in linear RGB float format, row-major, top row first.
#[derive(Clone, Debug)]
pub struct ImageTexture {
    pub width: u32,
    pub height: u32,
    pixels: Vec<[f32; 3]>,
}

impl ImageTexture {
    /// Create a texture from linear pixel data.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<[f32; 3]>) -> TextureResult<Self> {
        if width == 0 || height == 0 || pixels.len() != (width * height) as usize {
            return Err(TextureError::Empty(format!(
                "{}x{} with {} pixels",
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Load a texture from an image file, converting sRGB to linear.
    pub fn open(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|e| {
            TextureError::LoadError(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let pixels = rgb
            .pixels()
            .map(|p| {
                [
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                ]
            })
            .collect();

        log::debug!("Loaded texture: {} ({}x{})", path.display(), width, height);

        Self::from_pixels(width, height, pixels)
    }

    fn get_pixel(&self, x: u32, y: u32) -> Color {
        let idx = (y.min(self.height - 1) * self.width + x.min(self.width - 1)) as usize;
        let [r, g, b] = self.pixels[idx];
        Color::new(r, g, b)
    }
}

impl Texture for ImageTexture {
    /// Nearest-pixel lookup; (u, v) is clamped to the unit square with v=0 at the bottom.
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        let u = Interval::UNIT.clamp(u);
        let v = 1.0 - Interval::UNIT.clamp(v); // Flip V to image coordinates

        let x = (u * self.width as f32) as u32;
        let y = (v * self.height as f32) as u32;
        self.get_pixel(x, y)
    }
}

/// Convert sRGB byte value to linear float.
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
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_solid_color_texture() {
        let tex = SolidColor::from_rgb(1.0, 0.5, 0.0);
        assert_eq!(tex.value(0.3, 0.9, Vec3::new(4.0, 5.0, 6.0)), Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_checker_alternates() {
        let white = Color::ONE;
        let black = Color::ZERO;
        let tex = CheckerTexture::from_colors(1.0, white, black);

        assert_eq!(tex.value(0.0, 0.0, Vec3::new(0.5, 0.5, 0.5)), white);
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(1.5, 0.5, 0.5)), black);
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(1.5, 1.5, 0.5)), white);
        // Negative cells continue the pattern
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(-0.5, 0.5, 0.5)), black);
    }

    #[test]
    fn test_noise_texture_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let tex = NoiseTexture::new(Perlin::new(&mut rng), 4.0);
        for i in 0..100 {
            let c = tex.value(0.0, 0.0, Vec3::splat(i as f32 * 0.173));
            assert!(c.x >= 0.0 && c.x <= 1.0);
            assert_eq!(c.x, c.y);
        }
    }

    #[test]
    fn test_image_texture_lookup() {
        // 2x2: top row red, green; bottom row blue, white
        let tex = ImageTexture::from_pixels(
            2,
            2,
            vec![
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 1.0, 1.0],
            ],
        )
        .unwrap();

        // v = 1 is the top of the image
        assert_eq!(tex.value(0.1, 0.9, Vec3::ZERO), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.value(0.9, 0.9, Vec3::ZERO), Color::new(0.0, 1.0, 0.0));
        assert_eq!(tex.value(0.1, 0.1, Vec3::ZERO), Color::new(0.0, 0.0, 1.0));
        // Out-of-range coordinates clamp to the edge
        assert_eq!(tex.value(2.0, -1.0, Vec3::ZERO), Color::ONE);
    }

    #[test]
    fn test_image_texture_rejects_empty() {
        assert!(ImageTexture::from_pixels(0, 0, vec![]).is_err());
        assert!(ImageTexture::from_pixels(2, 2, vec![[0.0; 3]]).is_err());
    }

    #[test]
    fn test_image_texture_missing_file() {
        let _ = env_logger::builder().is_test(true).try_init();
        let result = ImageTexture::open("definitely/not/here.png");
        assert!(matches!(result, Err(TextureError::LoadError(_))));
    }

    #[test]
    fn test_srgb_to_linear() {
        assert!((srgb_to_linear(0) - 0.0).abs() < 0.001);
        assert!((srgb_to_linear(255) - 1.0).abs() < 0.001);

        // Mid-gray is darker in linear
        let mid = srgb_to_linear(128);
        assert!(mid < 0.5);
        assert!(mid > 0.1);
    }
}
