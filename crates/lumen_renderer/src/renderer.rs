//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive radiance estimation with configurable depth
//! - Light importance sampling mixed with material sampling
//! - Gamma correction
//! - Anti-aliasing via multi-sampling

use crate::bucket::DEFAULT_BUCKET_SIZE;
use crate::pdf::{HittablePdf, MixturePdf, Pdf};
use crate::{Camera, Color, HitRecord, Hittable, HittableList, Ray, ScatterKind};
use lumen_math::Interval;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Smallest sampling density the estimator will divide by.
const MIN_PDF: f32 = 1e-4;

/// Render configuration.
///
/// Every field has a default, so a JSON file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Background color when ray doesn't hit anything
    pub background: Color,
    /// Whether to use sky gradient instead of solid background
    pub use_sky_gradient: bool,
    /// Base seed; each bucket derives its own generator from it
    pub seed: u64,
    /// Bucket edge length in pixels
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
            max_depth: 50,
            background: Color::ZERO,
            use_sky_gradient: false,
            seed: 0,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

/// Estimate the radiance arriving along `ray`.
///
/// `depth` is the number of bounces still allowed. With a non-empty `lights`
/// list, diffuse bounces sample an even mixture of the light set and the
/// material's own PDF; otherwise only the material PDF is used.
pub fn estimate_radiance(
    ray: &Ray,
    depth: u32,
    world: &dyn Hittable,
    lights: Option<&HittableList>,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    let mut rec = HitRecord::default();
    if !world.hit(ray, Interval::new(0.001, f32::INFINITY), &mut rec, rng) {
        return background(ray, config);
    }

    let emission = rec.material.emitted(ray, &rec);

    let Some(srec) = rec.material.scatter(ray, &rec, rng) else {
        // Absorbed
        return emission;
    };

    let material_pdf = match srec.kind {
        ScatterKind::Specular(specular) => {
            let incoming = estimate_radiance(&specular, depth - 1, world, lights, config, rng);
            return emission + srec.attenuation * incoming;
        }
        ScatterKind::Sampled(pdf) => pdf,
    };

    let (direction, sampling_density) = match lights.filter(|l| !l.is_empty()) {
        Some(lights) => {
            let light_pdf = HittablePdf::new(lights, rec.p);
            let mixture = MixturePdf::new(&light_pdf, &*material_pdf);
            let direction = mixture.generate(rng).normalize_or_zero();
            (direction, mixture.value(direction))
        }
        None => {
            let direction = material_pdf.generate(rng).normalize_or_zero();
            (direction, material_pdf.value(direction))
        }
    };

    if sampling_density.is_nan() || sampling_density < MIN_PDF {
        return emission;
    }

    let scattered = Ray::new(rec.p, direction, ray.time());
    let scattering_pdf = rec.material.scattering_pdf(ray, &rec, &scattered);
    let incoming = estimate_radiance(&scattered, depth - 1, world, lights, config, rng);

    emission + srec.attenuation * scattering_pdf * incoming / sampling_density
}

fn background(ray: &Ray, config: &RenderConfig) -> Color {
    if config.use_sky_gradient {
        sky_gradient(ray)
    } else {
        config.background
    }
}

/// Compute sky gradient background.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Convert a color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    // Apply gamma correction and convert to 0-255
    let r = (255.0 * clamp_01(linear_to_gamma(color.x))) as u8;
    let g = (255.0 * clamp_01(linear_to_gamma(color.y))) as u8;
    let b = (255.0 * clamp_01(linear_to_gamma(color.z))) as u8;
    [r, g, b, 255]
}

/// Replace NaN components with zero.
#[inline]
fn drop_nan(color: Color) -> Color {
    Color::new(
        if color.x.is_nan() { 0.0 } else { color.x },
        if color.y.is_nan() { 0.0 } else { color.y },
        if color.z.is_nan() { 0.0 } else { color.z },
    )
}

/// Render a single pixel with multi-sampling.
///
/// NaN components of individual samples are dropped before averaging.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    lights: Option<&HittableList>,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let samples = config.samples_per_pixel.max(1);
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        // Camera.get_ray already adds random offset for anti-aliasing
        let ray = camera.get_ray(x, y, rng);
        pixel_color += drop_nan(estimate_radiance(&ray, config.max_depth, world, lights, config, rng));
    }

    // Average the samples
    pixel_color / samples as f32
}

/// Simple image buffer for storing render output.
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Convert to gamma-corrected RGBA bytes (for saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width * self.height * 4) as usize);
        for color in &self.pixels {
            let rgba = color_to_rgba(*color);
            bytes.extend_from_slice(&rgba);
        }
        bytes
    }
}

/// Render the entire scene to an image buffer on the calling thread.
///
/// See `render_parallel` for the bucketed multi-threaded path.
pub fn render(
    camera: &Camera,
    world: &dyn Hittable,
    lights: Option<&HittableList>,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> ImageBuffer {
    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);

    for y in 0..camera.image_height {
        for x in 0..camera.image_width {
            let color = render_pixel(camera, world, lights, x, y, config, rng);
            image.set(x, y, color);
        }
    }

    image
}
