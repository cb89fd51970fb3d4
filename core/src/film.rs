//! Film: tile partitioning, tile pixel storage, and the final framebuffer.

use crate::common::*;
use crate::spectrum::Spectrum;
use itertools::iproduct;

/// Pixel rectangle covered by one tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileBounds {
    /// Tile index in row-major tile-grid order.
    pub index: usize,

    /// Left-most pixel column.
    pub x0: u32,

    /// Top-most pixel row.
    pub y0: u32,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

/// Partitions the film into a `grid` x `grid` tile layout. Tiles share a
/// uniform base size; the last row and column absorb the remainder. The
/// grid is clamped so no tile is empty.
///
/// * `resolution` - Film resolution (width, height).
/// * `grid`       - Requested tiles per axis.
pub fn partition_tiles(resolution: (u32, u32), grid: u32) -> Vec<TileBounds> {
    let (width, height) = resolution;
    let grid = grid.clamp(1, width.min(height));
    let base_w = width / grid;
    let base_h = height / grid;

    let mut tiles = Vec::with_capacity((grid * grid) as usize);
    for ty in 0..grid {
        for tx in 0..grid {
            let x0 = tx * base_w;
            let y0 = ty * base_h;
            let w = if tx == grid - 1 { width - x0 } else { base_w };
            let h = if ty == grid - 1 { height - y0 } else { base_h };
            tiles.push(TileBounds {
                index: tiles.len(),
                x0,
                y0,
                width: w,
                height: h,
            });
        }
    }
    tiles
}

/// Pixel storage for one tile. Radiance is gamma-encoded to 8-bit on write;
/// the finished tile is merged into the framebuffer by the collecting
/// thread.
pub struct FilmTile {
    /// The pixel rectangle this tile covers.
    pub bounds: TileBounds,

    /// Encoded RGB pixels, row-major within the tile.
    pixels: Vec<[u8; 3]>,
}

impl FilmTile {
    /// Creates a tile with black pixels.
    ///
    /// * `bounds` - The tile's pixel rectangle.
    pub fn new(bounds: TileBounds) -> Self {
        Self {
            bounds,
            pixels: vec![[0; 3]; (bounds.width * bounds.height) as usize],
        }
    }

    /// Stores a pixel's averaged linear radiance, gamma-encoded.
    ///
    /// * `x`     - Column within the tile.
    /// * `y`     - Row within the tile.
    /// * `color` - Averaged linear radiance.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Spectrum) {
        let i = (y * self.bounds.width + x) as usize;
        self.pixels[i] = [
            gamma_encode(color[0]),
            gamma_encode(color[1]),
            gamma_encode(color[2]),
        ];
    }

    fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels[(y * self.bounds.width + x) as usize]
    }
}

/// The shared 8-bit RGB framebuffer, owned exclusively by the thread that
/// merges finished tiles.
pub struct Framebuffer {
    /// Film resolution (width, height).
    pub resolution: (u32, u32),

    /// RGB bytes, row-major from the top-left corner.
    data: Vec<u8>,

    /// Per-pixel write counter for the coverage diagnostic.
    #[cfg(feature = "tile-audit")]
    write_counts: Vec<u32>,
}

impl Framebuffer {
    /// Creates a black framebuffer.
    ///
    /// * `resolution` - Film resolution (width, height).
    pub fn new(resolution: (u32, u32)) -> Self {
        let n = (resolution.0 * resolution.1) as usize;
        Self {
            resolution,
            data: vec![0; n * 3],
            #[cfg(feature = "tile-audit")]
            write_counts: vec![0; n],
        }
    }

    /// Copies a finished tile's pixels into place.
    ///
    /// * `tile` - The finished tile.
    pub fn merge_tile(&mut self, tile: &FilmTile) {
        let b = tile.bounds;
        for (y, x) in iproduct!(0..b.height, 0..b.width) {
            let px = b.x0 + x;
            let py = b.y0 + y;
            let i = ((py * self.resolution.0 + px) * 3) as usize;
            self.data[i..i + 3].copy_from_slice(&tile.pixel(x, y));

            #[cfg(feature = "tile-audit")]
            {
                self.write_counts[(py * self.resolution.0 + px) as usize] += 1;
            }
        }
    }

    /// Raw RGB bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Asserts that every pixel was written by exactly one tile. Tile
    /// merging is single-threaded, so a plain counter suffices.
    #[cfg(feature = "tile-audit")]
    pub fn verify_coverage(&self) {
        for (i, &count) in self.write_counts.iter().enumerate() {
            assert_eq!(
                count,
                1,
                "pixel ({}, {}) written {} times",
                i as u32 % self.resolution.0,
                i as u32 / self.resolution.0,
                count
            );
        }
    }

    /// Writes the framebuffer as a PNG.
    ///
    /// * `path` - Output file path.
    pub fn write_png(&self, path: &str) -> Result<(), String> {
        let (w, h) = self.resolution;
        let img = image::RgbImage::from_raw(w, h, self.data.clone())
            .ok_or_else(|| "framebuffer size mismatch".to_string())?;
        img.save(path)
            .map_err(|e| format!("failed to write '{}': {}", path, e))?;
        info!("wrote {}x{} image to {}", w, h, path);
        Ok(())
    }
}
