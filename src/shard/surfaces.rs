use crate::{
    foundation::{
        core::{Point, Rect},
        error::ShardmapResult,
        math::EPSILON,
    },
    surface::{AlphaMask, Surface},
};

/// Canvas-space window a shard's surfaces cover.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceRegion {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl SurfaceRegion {
    pub fn origin(self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }

    pub fn rect(self) -> Rect {
        Rect::new(
            self.x as f64,
            self.y as f64,
            self.x as f64 + f64::from(self.width),
            self.y as f64 + f64::from(self.height),
        )
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Integer pixel window enclosing `rect`, clipped to `bounds`.
    pub fn enclosing(rect: Rect, bounds: SurfaceRegion) -> Self {
        // snap values within EPSILON of a pixel edge onto it
        let x0 = ((rect.x0 + EPSILON).floor() as i64).max(bounds.x);
        let y0 = ((rect.y0 + EPSILON).floor() as i64).max(bounds.y);
        let x1 = ((rect.x1 - EPSILON).ceil() as i64).min(bounds.x + i64::from(bounds.width));
        let y1 = ((rect.y1 - EPSILON).ceil() as i64).min(bounds.y + i64::from(bounds.height));
        if x1 <= x0 || y1 <= y0 {
            return Self {
                x: x0,
                y: y0,
                width: 0,
                height: 0,
            };
        }
        Self {
            x: x0,
            y: y0,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        }
    }
}

/// Offscreen buffers owned by one shard.
///
/// All four share one region. They are reallocated only when the region's
/// size changes; moving a same-sized region keeps the buffers.
#[derive(Clone, Debug, Default)]
pub struct ShardSurfaces {
    pub region: SurfaceRegion,
    pub mask: AlphaMask,
    pub content: Surface,
    pub masked: Surface,
    pub warp: Surface,
    reallocations: u64,
}

impl ShardSurfaces {
    /// Move to `region`, reallocating only on a size change. Returns whether
    /// buffers were reallocated.
    pub fn ensure_region(&mut self, region: SurfaceRegion) -> ShardmapResult<bool> {
        let resized = !self.is_allocated()
            || region.width != self.region.width
            || region.height != self.region.height;
        if resized {
            let (w, h) = (region.width, region.height);
            self.mask = AlphaMask::new(w, h);
            self.content = Surface::new(w, h)?;
            self.masked = Surface::new(w, h)?;
            self.warp = Surface::new(w, h)?;
            self.reallocations += 1;
            tracing::debug!(width = w, height = h, "reallocated shard surfaces");
        }
        self.region = region;
        Ok(resized)
    }

    pub fn is_allocated(&self) -> bool {
        self.content.is_allocated()
    }

    /// Number of times buffers have been (re)allocated.
    pub fn reallocations(&self) -> u64 {
        self.reallocations
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shard/surfaces.rs"]
mod tests;
