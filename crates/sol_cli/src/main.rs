use anyhow::{Context, Result};
use clap::Parser;
use sol_core::SceneDescription;
use sol_renderer::{render_with_stats, Camera, OsThreads, RayonThreads, Spawner};

mod cli;
mod output;

use cli::Args;
use output::write_image;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    log::info!("Starting Sol");

    let description = match &args.scene {
        Some(path) => SceneDescription::load(path)
            .with_context(|| format!("Failed to load scene {}", path.display()))?,
        None => SceneDescription::demo(),
    };
    let world = description.to_world().context("Invalid scene")?;

    let camera = Camera::looking_at(
        description.camera.position,
        description.camera.target,
        args.width,
        args.height,
    );
    let config = args.render_config();

    let spawner: &dyn Spawner = if args.rayon {
        &RayonThreads
    } else {
        &OsThreads
    };

    let (image, stats) = render_with_stats(&world, &camera, &config, spawner)?;
    log::debug!("Tiles per worker: {:?}", stats.tiles_per_worker);

    write_image(&image, &args.output)?;

    log::info!("Done in {:?}", stats.elapsed);
    Ok(())
}
