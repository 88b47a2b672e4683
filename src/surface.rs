use std::path::Path;

use anyhow::Context;

use crate::foundation::{
    core::Rgba8Premul,
    error::{ShardmapError, ShardmapResult},
    math::{mul_div255_u8, premultiply_rgba8_in_place, unpremultiply_rgba8_in_place},
};

/// What [`Surface::sample_bilinear`] returns outside the surface bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeMode {
    /// Coordinates are clamped to the nearest edge texel.
    Clamp,
    /// Samples outside the surface are fully transparent.
    Transparent,
}

/// Premultiplied RGBA8 pixel buffer.
///
/// A default surface is *unallocated* (zero size); compositor entry points
/// treat unallocated inputs as "nothing to draw".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Surface {
    /// Allocate a transparent surface.
    pub fn new(width: u32, height: u32) -> ShardmapResult<Self> {
        if width == 0 || height == 0 {
            return Err(ShardmapError::validation("surface dimensions must be > 0"));
        }
        Ok(Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize * 4],
        })
    }

    /// Wrap an existing premultiplied buffer.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> ShardmapResult<Self> {
        if data.len() != width as usize * height as usize * 4 {
            return Err(ShardmapError::validation(format!(
                "premultiplied buffer is {} bytes, expected {}x{}x4",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a surface from straight-alpha RGBA8 bytes.
    pub fn from_straight(width: u32, height: u32, mut rgba: Vec<u8>) -> ShardmapResult<Self> {
        premultiply_rgba8_in_place(&mut rgba);
        Self::from_premul(width, height, rgba)
    }

    /// Build an opaque single-color surface.
    pub fn solid(width: u32, height: u32, color: Rgba8Premul) -> ShardmapResult<Self> {
        let mut s = Self::new(width, height)?;
        s.fill(color);
        Ok(s)
    }

    /// Decode an image file (any format the `image` crate understands).
    pub fn open(path: &Path) -> ShardmapResult<Self> {
        let img = image::open(path)
            .with_context(|| format!("decode image {}", path.display()))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Self::from_straight(width, height, img.into_raw())
    }

    pub fn is_allocated(&self) -> bool {
        self.width > 0 && self.height > 0 && !self.data.is_empty()
    }

    pub fn fill(&mut self, color: Rgba8Premul) {
        let px = color.to_array();
        for dst in self.data.chunks_exact_mut(4) {
            dst.copy_from_slice(&px);
        }
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    pub fn put(&mut self, x: u32, y: u32, px: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data[i..i + 4].copy_from_slice(&px);
    }

    /// Bilinear sample at continuous coordinates where texel centers sit at
    /// `+0.5`. Returns premultiplied `[r, g, b, a]` in `0..=255`.
    pub fn sample_bilinear(&self, x: f64, y: f64, edge: EdgeMode) -> [f32; 4] {
        if !self.is_allocated() || !x.is_finite() || !y.is_finite() {
            return [0.0; 4];
        }
        let w = f64::from(self.width);
        let h = f64::from(self.height);
        if edge == EdgeMode::Transparent && (x < 0.0 || y < 0.0 || x >= w || y >= h) {
            return [0.0; 4];
        }

        let fx = (x - 0.5).clamp(0.0, w - 1.0);
        let fy = (y - 0.5).clamp(0.0, h - 1.0);
        let x0 = fx.floor() as u32;
        let y0 = fy.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = (fx - f64::from(x0)) as f32;
        let ty = (fy - f64::from(y0)) as f32;

        let texel = |xx: u32, yy: u32| -> [f32; 4] {
            let i = (yy as usize * self.width as usize + xx as usize) * 4;
            [
                f32::from(self.data[i]),
                f32::from(self.data[i + 1]),
                f32::from(self.data[i + 2]),
                f32::from(self.data[i + 3]),
            ]
        };
        let (a, b, c, d) = (texel(x0, y0), texel(x1, y0), texel(x0, y1), texel(x1, y1));
        let mut out = [0.0f32; 4];
        for k in 0..4 {
            let top = a[k] + (b[k] - a[k]) * tx;
            let bottom = c[k] + (d[k] - c[k]) * tx;
            out[k] = top + (bottom - top) * ty;
        }
        out
    }

    /// Multiply every pixel by the matching mask coverage.
    pub fn apply_alpha_mask(&mut self, mask: &AlphaMask) -> ShardmapResult<()> {
        if mask.width != self.width || mask.height != self.height {
            return Err(ShardmapError::validation(format!(
                "mask {}x{} does not match surface {}x{}",
                mask.width, mask.height, self.width, self.height
            )));
        }
        for (px, &m) in self.data.chunks_exact_mut(4).zip(mask.data.iter()) {
            match m {
                255 => {}
                0 => px.fill(0),
                _ => {
                    for c in px.iter_mut() {
                        *c = mul_div255_u8(u16::from(*c), u16::from(m));
                    }
                }
            }
        }
        Ok(())
    }

    /// Overwrite `self` with the window of `src` whose top-left corner is at
    /// `(x, y)`; texels outside `src` become transparent.
    pub fn copy_window(&mut self, src: &Surface, x: i64, y: i64) {
        let row_bytes = self.width as usize * 4;
        for row in 0..self.height {
            let dst_row = &mut self.data[row as usize * row_bytes..(row as usize + 1) * row_bytes];
            let sy = y + i64::from(row);
            if sy < 0 || sy >= i64::from(src.height) {
                dst_row.fill(0);
                continue;
            }
            for col in 0..self.width {
                let sx = x + i64::from(col);
                let d = col as usize * 4;
                if sx < 0 || sx >= i64::from(src.width) {
                    dst_row[d..d + 4].fill(0);
                    continue;
                }
                let s = (sy as usize * src.width as usize + sx as usize) * 4;
                dst_row[d..d + 4].copy_from_slice(&src.data[s..s + 4]);
            }
        }
    }

    /// Straight-alpha copy suitable for encoding.
    pub fn to_rgba_image(&self) -> ShardmapResult<image::RgbaImage> {
        let mut rgba = self.data.clone();
        unpremultiply_rgba8_in_place(&mut rgba);
        image::RgbaImage::from_raw(self.width, self.height, rgba)
            .ok_or_else(|| ShardmapError::validation("surface buffer size mismatch"))
    }

    pub fn save_png(&self, path: &Path) -> ShardmapResult<()> {
        if !self.is_allocated() {
            return Err(ShardmapError::validation("cannot save an unallocated surface"));
        }
        self.to_rgba_image()?
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write png {}", path.display()))?;
        Ok(())
    }
}

/// Single-channel coverage mask (0 = outside, 255 = inside).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlphaMask {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl AlphaMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize],
        }
    }

    pub fn is_allocated(&self) -> bool {
        self.width > 0 && self.height > 0 && !self.data.is_empty()
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn covered_pixels(&self) -> usize {
        self.data.iter().filter(|&&m| m != 0).count()
    }
}

#[cfg(test)]
#[path = "../tests/unit/surface.rs"]
mod tests;
