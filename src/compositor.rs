use crate::{
    composite::plan::compile_frame,
    config::CompositorSettings,
    foundation::{core::Canvas, error::ShardmapResult},
    render::{
        backend::{BackendKind, create_backend},
        passes::{CompositeBackend, execute_plan},
    },
    shard::model::Shard,
    surface::Surface,
};

/// Per-frame counters, reset never.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompositorStats {
    pub frames_rendered: u64,
    /// Frames skipped because an input was missing.
    pub frames_skipped: u64,
    /// Frames where the backend failed and the previous output was kept.
    pub frames_failed: u64,
}

/// Owns the output surface and a backend, and composites shards into it
/// once per frame.
pub struct Compositor {
    canvas: Canvas,
    settings: CompositorSettings,
    backend: Box<dyn CompositeBackend>,
    output: Surface,
    stats: CompositorStats,
}

impl Compositor {
    pub fn new(
        canvas: Canvas,
        settings: CompositorSettings,
        backend: Box<dyn CompositeBackend>,
    ) -> ShardmapResult<Self> {
        settings.validate()?;
        Ok(Self {
            canvas,
            settings,
            backend,
            output: Surface::default(),
            stats: CompositorStats::default(),
        })
    }

    pub fn with_backend_kind(
        canvas: Canvas,
        settings: CompositorSettings,
        kind: BackendKind,
    ) -> ShardmapResult<Self> {
        Self::new(canvas, settings, create_backend(kind)?)
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn settings(&self) -> &CompositorSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: CompositorSettings) -> ShardmapResult<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Last successfully composited frame. Unallocated before the first one.
    pub fn output(&self) -> &Surface {
        &self.output
    }

    pub fn stats(&self) -> CompositorStats {
        self.stats
    }

    /// Composite `shards` over the background into the output surface.
    ///
    /// Does nothing when `source` or `live` is unallocated or there are no
    /// shards. Backend failures are logged and leave the previous output in
    /// place.
    #[tracing::instrument(skip_all, fields(shards = shards.len()))]
    pub fn render_frame(&mut self, source: &Surface, live: &Surface, shards: &mut [Shard]) -> &Surface {
        if !source.is_allocated() || !live.is_allocated() || shards.is_empty() {
            tracing::debug!("missing input, keeping previous output");
            self.stats.frames_skipped += 1;
            return &self.output;
        }

        let plan = compile_frame(shards, &self.settings, self.canvas, self.backend.max_stencil_id());
        tracing::debug!(regions = plan.regions.len(), "compiled frame");

        match execute_plan(self.backend.as_mut(), &plan, source, live).and_then(|f| f.into_surface()) {
            Ok(surface) => {
                self.output = surface;
                self.stats.frames_rendered += 1;
            }
            Err(err) => {
                tracing::error!(error = %err, "frame composite failed, keeping previous output");
                self.stats.frames_failed += 1;
            }
        }
        &self.output
    }
}

#[cfg(test)]
#[path = "../tests/unit/compositor.rs"]
mod tests;
