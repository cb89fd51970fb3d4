//! Application options.

use clap::Parser;

lazy_static! {
    /// The global application options.
    pub static ref OPTIONS: Options = Options::parse();
}

/// Command-line options.
#[derive(Clone, Debug, Parser)]
#[command(version, about = "A tile-parallel CPU path tracer")]
pub struct Options {
    /// Number of worker threads (0 = automatic).
    #[arg(short = 't', long = "threads", default_value_t = 0)]
    pub n_threads: usize,

    /// Image width in pixels.
    #[arg(long, default_value_t = 600)]
    pub width: u32,

    /// Image height in pixels.
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Samples per pixel.
    #[arg(short = 's', long, default_value_t = 16)]
    pub spp: usize,

    /// Tile-grid size (the film splits into tiles x tiles rectangles).
    #[arg(long, default_value_t = 8)]
    pub tiles: u32,

    /// Maximum path depth; 0 or less means unbounded with Russian roulette.
    #[arg(short = 'd', long, default_value_t = 6)]
    pub max_depth: i32,

    /// Light samples per bounce (direct-lighting split factor).
    #[arg(long, default_value_t = 1)]
    pub light_split: usize,

    /// Triangles per bottom-level leaf node.
    #[arg(long, default_value_t = 4)]
    pub leaf_size: usize,

    /// Base random seed.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Built-in scene to render.
    #[arg(long, default_value = "cornell")]
    pub scene: String,

    /// Output image path.
    #[arg(short = 'o', long, default_value = "render.png")]
    pub outfile: String,

    /// Suppress progress output.
    #[arg(short = 'q', long, default_value_t = false)]
    pub quiet: bool,
}

impl Options {
    /// Worker thread count: the explicit `--threads` value when given,
    /// otherwise hardware concurrency minus one with a floor of eight.
    pub fn threads(&self) -> usize {
        if self.n_threads > 0 {
            let cores = num_cpus::get();
            if self.n_threads > cores {
                warn!(
                    "{} threads requested on a {}-core machine",
                    self.n_threads, cores
                );
            }
            self.n_threads
        } else {
            num_cpus::get().saturating_sub(1).max(8)
        }
    }
}
