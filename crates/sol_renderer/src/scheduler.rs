//! Parallel tile scheduling.
//!
//! Tiles sit in a shared bag. Workers claim them one at a time by bumping a
//! single atomic counter and render each claimed tile to completion. The
//! counter is the only point of contention: every tile maps to its own
//! region of the pixel buffer, and the scene is read-only.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use sol_core::World;

use crate::bucket::{generate_tiles, render_tile, Tile};
use crate::pixels::{Image, PixelBuffer};
use crate::random::RandomSeries;
use crate::renderer::SeedPolicy;
use crate::{Camera, RenderConfig, RenderError, RenderResult};

/// Hands out tiles through a monotonic atomic counter.
#[derive(Debug)]
pub struct TileScheduler {
    tiles: Vec<Tile>,
    next: AtomicUsize,
}

impl TileScheduler {
    pub fn new(tiles: Vec<Tile>) -> Self {
        Self {
            tiles,
            next: AtomicUsize::new(0),
        }
    }

    /// Claim the next unclaimed tile, or `None` once all are taken.
    ///
    /// Each tile is returned to exactly one caller.
    #[inline]
    pub fn claim(&self) -> Option<&Tile> {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        self.tiles.get(index)
    }

    /// Number of tiles in the bag, claimed or not.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }
}

/// Thread capability used to run render workers.
///
/// `run` starts `workers` concurrent calls `job(0) .. job(workers - 1)` and
/// returns once every call has finished.
pub trait Spawner: Sync {
    fn run(&self, workers: usize, job: &(dyn Fn(usize) + Sync)) -> RenderResult<()>;
}

/// Dedicated OS threads, spawned for the render and joined at the end.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsThreads;

impl Spawner for OsThreads {
    fn run(&self, workers: usize, job: &(dyn Fn(usize) + Sync)) -> RenderResult<()> {
        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            let mut result = Ok(());

            for index in 0..workers {
                let spawned = thread::Builder::new()
                    .name(format!("sol-worker-{}", index))
                    .spawn_scoped(scope, move || job(index));
                match spawned {
                    Ok(handle) => handles.push((index, handle)),
                    Err(e) => {
                        result = Err(RenderError::Spawn(e));
                        break;
                    }
                }
            }

            for (index, handle) in handles {
                if handle.join().is_err() && result.is_ok() {
                    result = Err(RenderError::WorkerPanicked(index));
                }
            }

            result
        })
    }
}

/// Workers run as tasks on the global rayon pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct RayonThreads;

impl Spawner for RayonThreads {
    fn run(&self, workers: usize, job: &(dyn Fn(usize) + Sync)) -> RenderResult<()> {
        let first_panic = AtomicUsize::new(usize::MAX);

        rayon::scope(|scope| {
            for index in 0..workers {
                let first_panic = &first_panic;
                scope.spawn(move |_| {
                    if catch_unwind(AssertUnwindSafe(|| job(index))).is_err() {
                        first_panic.fetch_min(index, Ordering::Relaxed);
                    }
                });
            }
        });

        match first_panic.into_inner() {
            usize::MAX => Ok(()),
            index => Err(RenderError::WorkerPanicked(index)),
        }
    }
}

/// Summary of a finished render.
#[derive(Debug, Clone)]
pub struct RenderStats {
    /// Tiles in the image
    pub tiles: usize,
    /// Tiles rendered by each worker (one entry when rendering inline)
    pub tiles_per_worker: Vec<usize>,
    pub elapsed: Duration,
}

/// Everything a worker needs, shared by reference.
struct RenderJob<'a> {
    world: &'a World,
    camera: &'a Camera,
    config: &'a RenderConfig,
    scheduler: &'a TileScheduler,
    pixels: &'a PixelBuffer,
    tiles_done: &'a [AtomicUsize],
}

impl RenderJob<'_> {
    /// Claim and render tiles until none are left.
    fn run_worker(&self, worker: usize) {
        let seed = self.config.seed;
        let mut series = RandomSeries::new(seed).unwrap_or_default();
        let mut count = 0;

        while let Some(tile) = self.scheduler.claim() {
            if self.config.seed_policy == SeedPolicy::PerTile {
                series = RandomSeries::for_tile(seed, tile.index);
            }
            render_tile(tile, self.camera, self.world, self.config, &mut series, self.pixels);
            count += 1;
        }

        self.tiles_done[worker].store(count, Ordering::Relaxed);
        log::debug!("Worker {} finished after {} tiles", worker, count);
    }
}

/// Render the scene, returning the image and per-worker statistics.
///
/// With `config.workers == 0` the claim loop runs on the calling thread and
/// `spawner` is not used.
pub fn render_with_stats(
    world: &World,
    camera: &Camera,
    config: &RenderConfig,
    spawner: &dyn Spawner,
) -> RenderResult<(Image, RenderStats)> {
    config.validate()?;

    let (width, height) = (camera.image_width, camera.image_height);
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyImage);
    }

    let scheduler = TileScheduler::new(generate_tiles(
        width,
        height,
        config.tile_size,
        config.tile_order,
    ));
    let pixels = PixelBuffer::new(width, height);
    let slots = config.workers.max(1);
    let tiles_done: Vec<AtomicUsize> = (0..slots).map(|_| AtomicUsize::new(0)).collect();

    log::info!(
        "Rendering {}x{} @ {} rays/pixel, {} bounces: {} tiles on {} workers",
        width,
        height,
        config.rays_per_pixel,
        config.max_bounces,
        scheduler.tile_count(),
        config.workers
    );

    let job = RenderJob {
        world,
        camera,
        config,
        scheduler: &scheduler,
        pixels: &pixels,
        tiles_done: &tiles_done,
    };

    let start = Instant::now();
    if config.workers == 0 {
        job.run_worker(0);
    } else {
        spawner.run(config.workers, &|worker| job.run_worker(worker))?;
    }
    let elapsed = start.elapsed();

    log::info!("Rendered {} tiles in {:?}", scheduler.tile_count(), elapsed);

    let stats = RenderStats {
        tiles: scheduler.tile_count(),
        tiles_per_worker: tiles_done.into_iter().map(AtomicUsize::into_inner).collect(),
        elapsed,
    };

    Ok((pixels.into_image(), stats))
}

/// Render the scene to an image.
pub fn render(
    world: &World,
    camera: &Camera,
    config: &RenderConfig,
    spawner: &dyn Spawner,
) -> RenderResult<Image> {
    render_with_stats(world, camera, config, spawner).map(|(image, _)| image)
}
