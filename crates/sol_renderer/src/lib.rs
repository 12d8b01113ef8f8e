//! Sol Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer for scenes of planes and spheres. The image is
//! split into tiles which a fixed set of workers claim through a shared
//! atomic counter.

mod bucket;
mod camera;
mod error;
mod hittable;
mod pixels;
mod random;
mod renderer;
mod scheduler;

pub use bucket::{generate_tiles, render_tile, Tile, TileOrder, DEFAULT_TILE_SIZE};
pub use camera::Camera;
pub use error::{RenderError, RenderResult};
pub use hittable::{hit_plane, hit_sphere, nearest_hit, HitRecord};
pub use pixels::{Image, PixelBuffer};
pub use random::{RandomSeries, DEFAULT_SEED};
pub use renderer::{
    color_to_packed, default_workers, pack_bgra8, render_pixel, srgb_from_linear, trace_path,
    unpack_rgba8, Color, RenderConfig, SeedPolicy,
};
pub use scheduler::{
    render, render_with_stats, OsThreads, RayonThreads, RenderStats, Spawner, TileScheduler,
};

/// Re-export Vec3 and common math types from sol_math
pub use sol_math::{Interval, Ray, Vec3};
