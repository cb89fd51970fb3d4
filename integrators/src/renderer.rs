//! Parallel tile rendering.

use crate::path::PathIntegrator;
use glam::Vec2;
use indicatif::{ProgressBar, ProgressStyle};
use itertools::iproduct;
use luma_core::camera::Camera;
use luma_core::common::*;
use luma_core::film::{partition_tiles, FilmTile, Framebuffer, TileBounds};
use luma_core::sampler::Sampler;
use luma_core::scene::Scene;
use luma_core::spectrum::Spectrum;

/// Rendering parameters gathered from the command line.
#[derive(Clone, Copy, Debug)]
pub struct RenderSettings {
    /// Maximum path depth; non-positive enables Russian roulette.
    pub max_depth: i32,

    /// Shadow rays per path vertex.
    pub light_split: usize,

    /// Tiles per film axis.
    pub tile_grid: u32,

    /// Base seed; each tile offsets it by its index.
    pub seed: u64,

    /// Suppress the progress bar.
    pub quiet: bool,
}

/// Renders the film in square tiles spread over a fixed pool of worker
/// threads.
///
/// Tiles are assigned statically round-robin, each worker owning every
/// n-th tile. A worker clones the sampler prototype per tile so sample
/// streams never cross thread boundaries, renders the tile to a private
/// buffer, and sends the finished tile over a channel. The collecting
/// thread alone touches the framebuffer, so merging needs no locks.
pub struct TileRenderer {
    settings: RenderSettings,
    threads: usize,
}

impl TileRenderer {
    /// Creates a renderer.
    ///
    /// * `settings` - Rendering parameters.
    /// * `threads`  - Worker thread count.
    pub fn new(settings: RenderSettings, threads: usize) -> Self {
        Self {
            settings,
            threads: threads.max(1),
        }
    }

    /// Renders the scene into a new framebuffer.
    ///
    /// * `scene`   - The scene.
    /// * `camera`  - The camera; its resolution sizes the film.
    /// * `sampler` - Sampler prototype, cloned once per tile.
    pub fn render(&self, scene: &Scene, camera: &Camera, sampler: &dyn Sampler) -> Framebuffer {
        let tiles = partition_tiles(camera.resolution, self.settings.tile_grid);
        let workers = self.threads.min(tiles.len());
        let integrator = PathIntegrator::new(self.settings.max_depth, self.settings.light_split);

        info!(
            "rendering {}x{} at {} spp, {} tiles on {} threads",
            camera.resolution.0,
            camera.resolution.1,
            sampler.samples_per_pixel(),
            tiles.len(),
            workers
        );

        let progress = if self.settings.quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(tiles.len() as u64);
            if let Ok(style) =
                ProgressStyle::with_template("{wide_bar} {pos}/{len} tiles [{elapsed_precise}]")
            {
                bar.set_style(style);
            }
            bar
        };

        let mut framebuffer = Framebuffer::new(camera.resolution);
        let (tx, rx) = crossbeam_channel::bounded::<TileStats>(workers * 2);

        let mut total_depth = 0u64;
        let mut total_samples = 0u64;

        crossbeam::scope(|scope| {
            for worker in 0..workers {
                let tx = tx.clone();
                let tiles = &tiles;
                let integrator = &integrator;
                scope.spawn(move |_| {
                    let seed = self.settings.seed;
                    for bounds in tiles.iter().skip(worker).step_by(workers) {
                        let stats = render_tile(scene, camera, integrator, sampler, *bounds, seed);
                        if tx.send(stats).is_err() {
                            // collector is gone, nothing useful left to do
                            return;
                        }
                    }
                });
            }
            drop(tx);

            for stats in rx.iter() {
                framebuffer.merge_tile(&stats.tile);
                total_depth += stats.depth_sum;
                total_samples += stats.samples;
                progress.inc(1);
            }
        })
        .unwrap(); // a worker panic propagates here

        progress.finish_and_clear();
        if total_samples > 0 {
            info!(
                "average path length {:.2}",
                total_depth as f64 / total_samples as f64
            );
        }

        #[cfg(feature = "tile-audit")]
        framebuffer.verify_coverage();

        framebuffer
    }
}

/// A finished tile plus its path-length tallies.
struct TileStats {
    tile: FilmTile,
    depth_sum: u64,
    samples: u64,
}

/// Renders one tile with a tile-local sampler clone.
fn render_tile(
    scene: &Scene,
    camera: &Camera,
    integrator: &PathIntegrator,
    sampler: &dyn Sampler,
    bounds: TileBounds,
    seed: u64,
) -> TileStats {
    let mut sampler = sampler.clone_sampler(seed.wrapping_add(bounds.index as u64));
    let spp = sampler.samples_per_pixel();
    let inv_spp = 1.0 / spp as Float;

    let mut tile = FilmTile::new(bounds);
    let mut depth_sum = 0u64;
    let mut samples = 0u64;

    for (y, x) in iproduct!(0..bounds.height, 0..bounds.width) {
        sampler.start_pixel();
        let mut accum = Spectrum::ZERO;
        for _ in 0..spp {
            let jitter = sampler.get_2d();
            let film_pos = Vec2::new(
                (bounds.x0 + x) as Float + jitter.x,
                (bounds.y0 + y) as Float + jitter.y,
            );
            let ray = camera.primary_ray(film_pos);
            let sample = integrator.li(&ray, scene, sampler.as_mut());

            let mut radiance = sample.radiance;
            if radiance.has_nans() {
                error!("NaN radiance at pixel ({}, {})", film_pos.x, film_pos.y);
                radiance = Spectrum::ZERO;
            } else if radiance.min_component() < 0.0 {
                error!(
                    "negative radiance at pixel ({}, {})",
                    film_pos.x, film_pos.y
                );
                radiance = Spectrum::ZERO;
            }

            accum += radiance;
            depth_sum += u64::from(sample.depth);
            samples += 1;
            sampler.start_next_sample();
        }
        tile.set_pixel(x, y, accum * inv_spp);
    }

    debug!("tile {} finished", bounds.index);
    TileStats {
        tile,
        depth_sum,
        samples,
    }
}
