use crate::{
    composite::{
        background::draw_background,
        blend::over,
        plan::{BackgroundOp, StencilRegion, WarpUniforms},
    },
    foundation::{
        core::Canvas,
        error::{ShardmapError, ShardmapResult},
    },
    geometry::{polygon, raster::rasterize_polygon},
    render::{backend::FrameRGBA, passes::CompositeBackend, program::shade},
    shard::surfaces::SurfaceRegion,
    surface::Surface,
};

/// Software compositor with a 16-bit stencil.
#[derive(Default)]
pub struct CpuBackend {
    canvas: Option<Canvas>,
    color: Surface,
    stencil: Vec<u16>,
    /// Pixel window last written for each stencil id, indexed by `id - 1`.
    stencil_bounds: Vec<Option<SurfaceRegion>>,
    uniforms: Option<WarpUniforms>,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stencil value at a canvas pixel of the frame in progress or the last
    /// finished frame.
    pub fn stencil_at(&self, x: u32, y: u32) -> Option<u16> {
        let canvas = self.canvas?;
        if x >= canvas.width || y >= canvas.height {
            return None;
        }
        self.stencil
            .get(y as usize * canvas.width as usize + x as usize)
            .copied()
    }

    fn active_canvas(&self) -> ShardmapResult<Canvas> {
        self.canvas
            .filter(|_| self.color.is_allocated())
            .ok_or_else(|| ShardmapError::render("no frame in progress"))
    }
}

impl CompositeBackend for CpuBackend {
    fn max_stencil_id(&self) -> u16 {
        u16::MAX
    }

    fn begin_frame(&mut self, canvas: Canvas) -> ShardmapResult<()> {
        if self.color.is_allocated() {
            return Err(ShardmapError::render("begin_frame called while a frame is active"));
        }
        self.color = Surface::new(canvas.width, canvas.height)?;
        self.stencil.clear();
        self.stencil.resize(canvas.pixel_count(), 0);
        self.stencil_bounds.clear();
        self.uniforms = None;
        self.canvas = Some(canvas);
        Ok(())
    }

    fn draw_background(&mut self, op: &BackgroundOp, live: &Surface) -> ShardmapResult<()> {
        self.active_canvas()?;
        self.color.clear();
        draw_background(&mut self.color, op, live)
    }

    fn write_stencil(&mut self, region: &StencilRegion) -> ShardmapResult<()> {
        let canvas = self.active_canvas()?;
        if region.id == 0 {
            return Err(ShardmapError::render("stencil id 0 is reserved"));
        }
        let Some(bbox) = polygon::bounding_box(&region.polygon) else {
            return Ok(());
        };
        let full = SurfaceRegion {
            x: 0,
            y: 0,
            width: canvas.width,
            height: canvas.height,
        };
        let window = SurfaceRegion::enclosing(bbox, full);
        if window.is_empty() {
            return Ok(());
        }

        let coverage = rasterize_polygon(window.width, window.height, &region.polygon, window.origin())?;
        let stride = canvas.width as usize;
        for row in 0..window.height as usize {
            let y = window.y as usize + row;
            let cov_row = &coverage[row * window.width as usize..(row + 1) * window.width as usize];
            let dst = &mut self.stencil[y * stride + window.x as usize..][..window.width as usize];
            for (s, &c) in dst.iter_mut().zip(cov_row) {
                if c != 0 {
                    *s = region.id;
                }
            }
        }

        let slot = usize::from(region.id) - 1;
        if self.stencil_bounds.len() <= slot {
            self.stencil_bounds.resize(slot + 1, None);
        }
        self.stencil_bounds[slot] = Some(window);
        Ok(())
    }

    fn bind_program(&mut self, _source: &Surface, uniforms: &WarpUniforms) -> ShardmapResult<()> {
        self.active_canvas()?;
        self.uniforms = Some(uniforms.clone());
        Ok(())
    }

    fn draw_shard(&mut self, source: &Surface, ordinal: usize, stencil_id: u16) -> ShardmapResult<()> {
        let canvas = self.active_canvas()?;
        let uniforms = self
            .uniforms
            .as_ref()
            .ok_or_else(|| ShardmapError::render("draw_shard before bind_program"))?;
        let m = uniforms
            .matrices
            .get(ordinal)
            .ok_or_else(|| ShardmapError::render(format!("no homography for shard ordinal {ordinal}")))?;
        if !source.is_allocated() {
            return Err(ShardmapError::render("source surface is not allocated"));
        }
        let Some(Some(window)) = usize::from(stencil_id)
            .checked_sub(1)
            .and_then(|slot| self.stencil_bounds.get(slot).copied())
        else {
            return Ok(());
        };

        let debug = uniforms.debug_view.then_some(ordinal);
        let stride = canvas.width as usize;
        for y in window.y as u32..window.y as u32 + window.height {
            for x in window.x as u32..window.x as u32 + window.width {
                if self.stencil[y as usize * stride + x as usize] != stencil_id {
                    continue;
                }
                let px = shade(source, m, uniforms.resolution, x, y, debug);
                if let Some(dst) = self.color.get(x, y) {
                    self.color.put(x, y, over(dst, px, uniforms.opacity));
                }
            }
        }
        Ok(())
    }

    fn end_frame(&mut self) -> ShardmapResult<FrameRGBA> {
        self.active_canvas()?;
        let color = std::mem::take(&mut self.color);
        self.uniforms = None;
        Ok(FrameRGBA {
            width: color.width,
            height: color.height,
            data: color.data,
            premultiplied: true,
        })
    }

    fn abort_frame(&mut self) {
        self.color = Surface::default();
        self.uniforms = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
