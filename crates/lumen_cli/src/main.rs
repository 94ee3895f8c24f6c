//! `lumen`: render a built-in scene to a PNG file.

mod cli;
mod config;
mod scenes;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use lumen_renderer::{render_parallel, ImageBuffer};

use cli::Cli;
use scenes::SceneOptions;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = config::load_config(&cli.scene.preset_config(), cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    log::debug!("Render config: {:?}", config);

    let options = SceneOptions {
        seed: config.seed,
        texture: cli.texture.as_deref(),
    };
    let scene = scenes::build(cli.scene, &options)?;
    if scene.has_emitters && scene.lights().is_none() {
        log::warn!("Scene has emitters but no light list; falling back to material sampling");
    }

    let mut camera = scene.camera.clone();
    if let Some(width) = cli.width {
        camera.image_width = width;
    }
    if let Some(height) = cli.height {
        camera.image_height = height;
    }
    camera.initialize().context("Invalid camera setup")?;

    let image = render_parallel(&camera, &scene.world, scene.lights(), &config)?;
    save_png(&image, &cli.output)?;

    log::info!("Wrote {}", cli.output.display());
    Ok(())
}

/// Gamma-correct `buffer` and write it as an 8-bit PNG.
fn save_png(buffer: &ImageBuffer, path: &Path) -> Result<()> {
    let rgba = image::RgbaImage::from_raw(buffer.width, buffer.height, buffer.to_rgba())
        .context("Image buffer size does not match its dimensions")?;
    rgba.save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
