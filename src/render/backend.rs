use crate::{
    foundation::error::{ShardmapError, ShardmapResult},
    render::passes::CompositeBackend,
    surface::Surface,
};

/// A finished frame as read back from a backend.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Convert into a premultiplied [`Surface`].
    pub fn into_surface(self) -> ShardmapResult<Surface> {
        if self.premultiplied {
            Surface::from_premul(self.width, self.height, self.data)
        } else {
            Surface::from_straight(self.width, self.height, self.data)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Cpu,
    #[cfg(feature = "gpu")]
    Gpu,
}

pub fn create_backend(kind: BackendKind) -> ShardmapResult<Box<dyn CompositeBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuBackend::new())),
        #[cfg(feature = "gpu")]
        BackendKind::Gpu => Ok(Box::new(crate::render::gpu::GpuBackend::new()?)),
        #[allow(unreachable_patterns)]
        _ => Err(ShardmapError::render("requested backend is not available")),
    }
}
