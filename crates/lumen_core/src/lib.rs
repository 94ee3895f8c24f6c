//! Lumen Core - surface textures for the path tracer.
//!
//! This crate provides:
//!
//! - **Texture trait**: `Texture::value(u, v, p)` evaluated by materials
//! - **Procedural textures**: `SolidColor`, `CheckerTexture`, `NoiseTexture`
//! - **Image textures**: `ImageTexture`, decoded with the `image` crate
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{CheckerTexture, ImageTexture, Color};
//!
//! let checker = CheckerTexture::from_colors(0.32, Color::new(0.2, 0.3, 0.1), Color::splat(0.9));
//! let earth = ImageTexture::open("earthmap.jpg")?;
//! ```

pub mod perlin;
pub mod texture;

// Re-export commonly used types
pub use perlin::Perlin;
pub use texture::{
    CheckerTexture, Color, ImageTexture, NoiseTexture, SolidColor, Texture, TextureError,
    TextureResult,
};
