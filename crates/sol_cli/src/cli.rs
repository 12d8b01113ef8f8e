use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use sol_renderer::{
    default_workers, RenderConfig, SeedPolicy, TileOrder, DEFAULT_SEED, DEFAULT_TILE_SIZE,
};

/// Log levels accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "sol")]
#[command(about = "Render planes and spheres with a tile-parallel path tracer")]
pub struct Args {
    /// Scene description (JSON). Renders the built-in scene when omitted
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Output image; `.bmp` is written directly, other extensions via the image crate
    #[arg(short, long, default_value = "out.bmp")]
    pub output: PathBuf,

    /// Image width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Paths traced per pixel
    #[arg(short = 's', long, default_value_t = 1)]
    pub samples: u32,

    /// Maximum bounces per path
    #[arg(long, default_value_t = 8)]
    pub bounces: u32,

    /// Tile edge length in pixels
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
    pub tile_size: u32,

    /// Worker threads (0 renders on the main thread). Defaults to one per core
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Random seed (non-zero)
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u32,

    /// Reseed per tile so the image does not depend on the thread count
    #[arg(long)]
    pub per_tile_seed: bool,

    /// Hand out tiles from the image center outwards
    #[arg(long)]
    pub spiral: bool,

    /// Run workers on the rayon pool instead of dedicated threads
    #[arg(long)]
    pub rayon: bool,

    /// Set the logging level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Render settings selected by the arguments.
    pub fn render_config(&self) -> RenderConfig {
        let order = if self.spiral {
            TileOrder::Spiral
        } else {
            TileOrder::Scanline
        };
        let policy = if self.per_tile_seed {
            SeedPolicy::PerTile
        } else {
            SeedPolicy::PerWorker
        };

        RenderConfig::default()
            .with_quality(self.samples, self.bounces)
            .with_tiles(self.tile_size, order)
            .with_workers(self.threads.unwrap_or_else(default_workers))
            .with_seed(self.seed, policy)
    }
}
