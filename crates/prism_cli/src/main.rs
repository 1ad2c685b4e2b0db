//! `prism`: render a JSON scene to an image file.

mod cli;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use prism_renderer::{ImageBuffer, Renderer};

use crate::cli::{parse_args, CliOptions, Command, USAGE};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match parse_args(std::env::args().skip(1))? {
        Command::Help => {
            println!("{USAGE}");
            Ok(())
        }
        Command::Render(options) => run(&options),
    }
}

fn run(options: &CliOptions) -> Result<()> {
    let start = Instant::now();
    let settings = &options.settings;

    let mut scene = prism_scene::load_scene(&options.scene)
        .with_context(|| format!("Failed to load scene {}", options.scene.display()))?;

    let (open, close) = (scene.camera.shutter_open, scene.camera.shutter_close);
    scene.build_bvh(open, close, &settings.bvh, settings.seed);

    let renderer = Renderer::new(settings.clone())?;
    let mut image = ImageBuffer::new(settings.width, settings.height);
    let stats = renderer.render(&scene, &mut image)?;

    save_image(&image, &options.output)?;

    log::info!(
        "Wrote {} ({} pixels rendered in {:.2?}, total {:.2?})",
        options.output.display(),
        stats.pixels,
        stats.elapsed,
        start.elapsed()
    );
    Ok(())
}

/// Encode with the format implied by the file extension.
fn save_image(image: &ImageBuffer, path: &Path) -> Result<()> {
    let rgb = image::RgbImage::from_raw(image.width, image.height, image.to_rgb8())
        .context("Rendered buffer does not match image dimensions")?;
    rgb.save(path)
        .with_context(|| format!("Failed to write image {}", path.display()))?;
    Ok(())
}
