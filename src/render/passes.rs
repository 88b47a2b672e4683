use crate::{
    composite::plan::{BackgroundOp, CompositePlan, StencilRegion, WarpUniforms},
    foundation::{core::Canvas, error::ShardmapResult},
    render::backend::FrameRGBA,
    surface::Surface,
};

/// Stencil-and-program state machine a compositing backend exposes.
///
/// A frame is `begin_frame`, background, stencil writes, one program bind,
/// one `draw_shard` per region, then `end_frame`. A second `begin_frame`
/// while a frame is active is an error.
pub trait CompositeBackend {
    /// Largest stencil id the backend can store.
    fn max_stencil_id(&self) -> u16;

    fn begin_frame(&mut self, canvas: Canvas) -> ShardmapResult<()>;

    /// Clear the color target and draw the background.
    fn draw_background(&mut self, op: &BackgroundOp, live: &Surface) -> ShardmapResult<()>;

    /// Write `region.id` into the stencil under the region polygon, with
    /// color writes disabled. Later writes replace earlier ones.
    fn write_stencil(&mut self, region: &StencilRegion) -> ShardmapResult<()>;

    /// Bind the shard program and upload its uniforms.
    fn bind_program(&mut self, source: &Surface, uniforms: &WarpUniforms) -> ShardmapResult<()>;

    /// Run the program over pixels whose stencil equals `stencil_id`, using
    /// homography `ordinal`.
    fn draw_shard(&mut self, source: &Surface, ordinal: usize, stencil_id: u16) -> ShardmapResult<()>;

    fn end_frame(&mut self) -> ShardmapResult<FrameRGBA>;

    /// Drop any in-flight frame state after an error.
    fn abort_frame(&mut self) {}
}

pub fn execute_plan<B: CompositeBackend + ?Sized>(
    backend: &mut B,
    plan: &CompositePlan,
    source: &Surface,
    live: &Surface,
) -> ShardmapResult<FrameRGBA> {
    backend.begin_frame(plan.canvas)?;
    match run_passes(backend, plan, source, live) {
        Ok(frame) => Ok(frame),
        Err(err) => {
            backend.abort_frame();
            Err(err)
        }
    }
}

fn run_passes<B: CompositeBackend + ?Sized>(
    backend: &mut B,
    plan: &CompositePlan,
    source: &Surface,
    live: &Surface,
) -> ShardmapResult<FrameRGBA> {
    backend.draw_background(&plan.background, live)?;
    for region in &plan.regions {
        backend.write_stencil(region)?;
    }
    if !plan.regions.is_empty() {
        backend.bind_program(source, &plan.uniforms)?;
        for region in &plan.regions {
            backend.draw_shard(source, region.ordinal, region.id)?;
        }
    }
    backend.end_frame()
}

#[cfg(test)]
#[path = "../../tests/unit/render/passes.rs"]
mod tests;
