use std::path::PathBuf;

use clap::Parser;
use lumen_renderer::RenderConfig;

use crate::scenes::SceneKind;

/// Render one of the built-in scenes to a PNG file.
#[derive(Parser, Debug)]
#[command(name = "lumen", author, version, about, long_about = None)]
pub struct Cli {
    /// Scene to render
    #[arg(short, long, value_enum, default_value_t = SceneKind::Cornell)]
    pub scene: SceneKind,
    /// Image width in pixels (defaults to the scene's own)
    #[arg(long)]
    pub width: Option<u32>,
    /// Image height in pixels (defaults to the scene's own)
    #[arg(long)]
    pub height: Option<u32>,
    /// Samples per pixel
    #[arg(long)]
    pub spp: Option<u32>,
    /// Maximum bounce depth
    #[arg(long)]
    pub max_depth: Option<u32>,
    /// Seed for scene generation and sampling
    #[arg(long)]
    pub seed: Option<u64>,
    /// JSON file with `RenderConfig` fields; flags win over the file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Output PNG path
    #[arg(short, long, default_value = "render.png")]
    pub output: PathBuf,
    /// Image to wrap around the main sphere of the `textures` scene
    #[arg(long)]
    pub texture: Option<PathBuf>,
}

impl Cli {
    /// Apply the command-line sampling flags on top of `config`.
    pub fn apply_overrides(&self, config: &mut RenderConfig) {
        if let Some(spp) = self.spp {
            config.samples_per_pixel = spp;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
    }
}
