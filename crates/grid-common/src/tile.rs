//! Tile coordinates and tile pixel buffers.

use serde::{Deserialize, Serialize};

use crate::palette::Rgb;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: usize = 256;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Generate a cache key string.
    pub fn cache_key(&self) -> String {
        format!("{}/{}/{}", self.z, self.x, self.y)
    }

    /// Pixel-space position of the tile's top-left corner.
    pub fn pixel_origin(&self, tile_size: usize) -> (f64, f64) {
        (
            self.x as f64 * tile_size as f64,
            self.y as f64 * tile_size as f64,
        )
    }

    /// Parse `z/x/y`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().split('/');
        let z = parts.next()?.parse().ok()?;
        let x = parts.next()?.parse().ok()?;
        let y = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { z, x, y })
    }
}

/// A square RGBA tile, row-major, 4 bytes per pixel, transparent by default.
#[derive(Debug, Clone, PartialEq)]
pub struct TileImage {
    size: usize,
    pixels: Vec<u8>,
}

impl TileImage {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            pixels: vec![0u8; size * size * 4],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Write an opaque color at `(row, col)`.
    #[inline]
    pub fn set_pixel(&mut self, row: usize, col: usize, color: Rgb) {
        let offset = (row * self.size + col) * 4;
        self.pixels[offset] = color.r;
        self.pixels[offset + 1] = color.g;
        self.pixels[offset + 2] = color.b;
        self.pixels[offset + 3] = 255;
    }

    /// RGBA at `(row, col)`.
    pub fn pixel(&self, row: usize, col: usize) -> [u8; 4] {
        let offset = (row * self.size + col) * 4;
        [
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
            self.pixels[offset + 3],
        ]
    }

    pub fn is_transparent(&self, row: usize, col: usize) -> bool {
        self.pixel(row, col)[3] == 0
    }

    /// True when no pixel has been written.
    pub fn is_empty(&self) -> bool {
        self.pixels.chunks_exact(4).all(|p| p[3] == 0)
    }

    /// Number of pixels that have been written.
    pub fn opaque_count(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|p| p[3] != 0).count()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }
}
