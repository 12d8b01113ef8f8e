//! Core path tracing kernel.
//!
//! Implements Monte Carlo path tracing with:
//! - An iterative bounce loop with configurable depth
//! - Diffuse/mirror blending per material
//! - sRGB encoding and BGRA8 packing of the final pixel

use sol_core::World;
use sol_math::{Interval, Mix, Ray, Vec3, VectorExt};

use crate::bucket::{TileOrder, DEFAULT_TILE_SIZE};
use crate::hittable::nearest_hit;
use crate::random::{RandomSeries, DEFAULT_SEED};
use crate::{Camera, RenderError, RenderResult};

/// Color type alias (linear RGB, may exceed 1 before tone mapping)
pub type Color = Vec3;

/// How worker random series are seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedPolicy {
    /// Every worker starts from the same seed and keeps drawing across the
    /// tiles it claims. Output depends on which worker claims which tile, so
    /// it only repeats exactly when a single worker renders everything. On
    /// small images one worker often claims every tile before the others
    /// start, which hides the dependence.
    #[default]
    PerWorker,
    /// Every tile reseeds from the base seed and its index. Output is the
    /// same for any worker count.
    PerTile,
}

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Denominators at or below this magnitude count as parallel/degenerate
    pub tolerance: f32,
    /// Hits closer than this are ignored (avoids self-intersection)
    pub min_hit_distance: f32,
    /// Maximum number of bounces per path
    pub max_bounces: u32,
    /// Paths traced per pixel
    pub rays_per_pixel: u32,
    /// Tile edge length in pixels
    pub tile_size: u32,
    /// Order in which tiles are handed out
    pub tile_order: TileOrder,
    /// Worker threads; 0 renders on the calling thread
    pub workers: usize,
    /// Base random seed
    pub seed: u32,
    /// How the seed is applied to workers
    pub seed_policy: SeedPolicy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.0001,
            min_hit_distance: 0.001,
            max_bounces: 8,
            rays_per_pixel: 1,
            tile_size: DEFAULT_TILE_SIZE,
            tile_order: TileOrder::Scanline,
            workers: default_workers(),
            seed: DEFAULT_SEED,
            seed_policy: SeedPolicy::PerWorker,
        }
    }
}

/// One worker per available core.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl RenderConfig {
    /// Set sampling quality.
    pub fn with_quality(mut self, rays_per_pixel: u32, max_bounces: u32) -> Self {
        self.rays_per_pixel = rays_per_pixel;
        self.max_bounces = max_bounces;
        self
    }

    /// Set tile size and ordering.
    pub fn with_tiles(mut self, tile_size: u32, tile_order: TileOrder) -> Self {
        self.tile_size = tile_size;
        self.tile_order = tile_order;
        self
    }

    /// Set the number of worker threads.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the seed and how it is applied.
    pub fn with_seed(mut self, seed: u32, seed_policy: SeedPolicy) -> Self {
        self.seed = seed;
        self.seed_policy = seed_policy;
        self
    }

    /// Weight of one path in the pixel average (1 / rays_per_pixel).
    #[inline]
    pub fn inv_rays_per_pixel(&self) -> f32 {
        1.0 / self.rays_per_pixel as f32
    }

    /// Check the settings before any rendering starts.
    pub fn validate(&self) -> RenderResult<()> {
        let invalid = |msg: String| Err(RenderError::InvalidConfig(msg));

        if !(self.tolerance > 0.0) {
            return invalid(format!("tolerance must be positive, got {}", self.tolerance));
        }
        if !(self.min_hit_distance > 0.0) {
            return invalid(format!(
                "min_hit_distance must be positive, got {}",
                self.min_hit_distance
            ));
        }
        if self.tolerance >= self.min_hit_distance {
            return invalid(format!(
                "tolerance ({}) must be smaller than min_hit_distance ({})",
                self.tolerance, self.min_hit_distance
            ));
        }
        if self.max_bounces == 0 {
            return invalid("max_bounces must be at least 1".to_string());
        }
        if self.rays_per_pixel == 0 {
            return invalid("rays_per_pixel must be at least 1".to_string());
        }
        if self.tile_size == 0 {
            return invalid("tile_size must be at least 1".to_string());
        }
        if self.seed == 0 {
            return invalid("seed must be non-zero".to_string());
        }
        Ok(())
    }
}

/// Trace one light path starting with `ray`.
///
/// Each bounce adds the hit material's emission weighted by the running
/// attenuation. The path ends on the background or after `max_bounces`.
pub fn trace_path(
    world: &World,
    ray: Ray,
    config: &RenderConfig,
    series: &mut RandomSeries,
) -> Color {
    let mut ray = ray;
    let mut color = Color::ZERO;
    let mut attenuation = Color::ONE;

    for _ in 0..config.max_bounces {
        let rec = nearest_hit(world, &ray, config);
        let material = world.material(rec.material);

        color += attenuation.hadamard(material.emit);

        if rec.is_miss() {
            break;
        }

        let cos_attenuation = (-ray.direction).dot(rec.normal).max(0.0);
        attenuation = attenuation.hadamard(cos_attenuation * material.reflect);

        let origin = ray.at(rec.t);

        let x = series.rand_f32_bi();
        let y = series.rand_f32_bi();
        let z = series.rand_f32_bi();
        let rvec = Vec3::new(x, y, z);

        let pure_bounce = ray.direction.reflect(rec.normal);
        let random_bounce = (rec.normal + rvec).normalize_zero();
        let direction = random_bounce
            .mix(pure_bounce, material.specularity)
            .normalize_zero();

        ray = Ray::new(origin, direction);
    }

    color
}

/// Render a single pixel: the mean of `rays_per_pixel` paths.
///
/// Every path starts from the same primary ray; only the bounces differ.
pub fn render_pixel(
    camera: &Camera,
    world: &World,
    row: u32,
    col: u32,
    config: &RenderConfig,
    series: &mut RandomSeries,
) -> Color {
    let primary = camera.primary_ray(row, col);
    let weight = config.inv_rays_per_pixel();

    let mut final_color = Color::ZERO;
    for _ in 0..config.rays_per_pixel {
        final_color += trace_path(world, primary, config, series) * weight;
    }
    final_color
}

/// Encode one linear channel with the sRGB transfer curve.
///
/// Input is clamped to [0, 1] first.
#[inline]
pub fn srgb_from_linear(linear: f32) -> f32 {
    if linear >= 1.0 {
        return 1.0;
    }
    if linear <= 0.0 {
        return 0.0;
    }

    if linear > 0.0031308 {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    } else {
        linear * 12.92
    }
}

/// Pack an encoded color as a little-endian BGRA8 word with full alpha.
#[inline]
pub fn pack_bgra8(color: Color) -> u32 {
    let c = 255.0 * Vec3::new(
        Interval::UNIT.clamp(color.x),
        Interval::UNIT.clamp(color.y),
        Interval::UNIT.clamp(color.z),
    );
    (c.z as u32) | (c.y as u32) << 8 | (c.x as u32) << 16 | 255 << 24
}

/// Tone map a linear color and pack it.
pub fn color_to_packed(color: Color) -> u32 {
    pack_bgra8(Vec3::new(
        srgb_from_linear(color.x),
        srgb_from_linear(color.y),
        srgb_from_linear(color.z),
    ))
}

/// Unpack a BGRA8 word into `[r, g, b, a]` bytes.
#[inline]
pub fn unpack_rgba8(packed: u32) -> [u8; 4] {
    let [b, g, r, a] = packed.to_le_bytes();
    [r, g, b, a]
}
