//! A tile-parallel CPU path tracer over instanced triangle meshes.

#[macro_use]
extern crate log;

mod scenes;

use luma_core::app::OPTIONS;
use luma_integrators::{RenderSettings, TileRenderer};
use luma_samplers::StratifiedSampler;
use std::process::exit;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        error!("{}", e);
        exit(1);
    }
}

fn run() -> Result<(), String> {
    let resolution = (OPTIONS.width, OPTIONS.height);
    let (scene, camera) = scenes::build(&OPTIONS.scene, resolution, OPTIONS.leaf_size)?;
    info!(
        "scene '{}' spans {:.0} world units, {} emissive triangles",
        OPTIONS.scene,
        scene.scene_scale(),
        scene.emitters.len()
    );

    // Stratify the image jitter plus the per-vertex decisions of the first
    // few bounces; deeper paths fall back to plain uniform draws.
    let bounces = 4;
    let dims_1d = bounces * (1 + OPTIONS.light_split);
    let dims_2d = 1 + bounces * (OPTIONS.light_split + 1);
    let sampler = StratifiedSampler::new(OPTIONS.spp, dims_1d, dims_2d, OPTIONS.seed);

    let renderer = TileRenderer::new(
        RenderSettings {
            max_depth: OPTIONS.max_depth,
            light_split: OPTIONS.light_split,
            tile_grid: OPTIONS.tiles,
            seed: OPTIONS.seed,
            quiet: OPTIONS.quiet,
        },
        OPTIONS.threads(),
    );
    let framebuffer = renderer.render(&scene, &camera, &sampler);
    framebuffer.write_png(&OPTIONS.outfile)
}
