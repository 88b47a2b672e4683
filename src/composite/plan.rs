use nalgebra::Matrix4;

use crate::{
    config::{CompositorSettings, QuadMapping, ShardSelection},
    foundation::core::{Canvas, Point, Rgba8},
    geometry::polygon,
    shard::model::Shard,
};

/// Step 1 of a frame: what goes under the shards.
#[derive(Clone, Debug, PartialEq)]
pub enum BackgroundOp {
    Flat {
        color: Rgba8,
    },
    /// Background color, then the live feed remapped per quadrant.
    Live {
        color: Rgba8,
        opacity: f32,
        mapping: [QuadMapping; 4],
    },
}

/// One shard's footprint in the stencil buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct StencilRegion {
    /// Stencil value, `ordinal + 1`; 0 means "no shard".
    pub id: u16,
    /// Position in the frame's homography array.
    pub ordinal: usize,
    /// Index of the shard in the slice handed to [`compile_frame`].
    pub shard_index: usize,
    /// Display-space polygon (the transformed mask perimeter).
    pub polygon: Vec<Point>,
    /// Ear-clipped triangles over `polygon`, for backends that rasterize
    /// triangles.
    pub triangles: Vec<[usize; 3]>,
}

/// Parameters shared by every shard draw in a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct WarpUniforms {
    pub resolution: [f32; 2],
    pub debug_view: bool,
    pub opacity: f32,
    pub background: Rgba8,
    /// Sampling matrix per active shard, indexed by ordinal.
    pub matrices: Vec<Matrix4<f64>>,
}

impl WarpUniforms {
    pub fn shard_count(&self) -> usize {
        self.matrices.len()
    }
}

/// Backend-agnostic description of one composited frame.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositePlan {
    pub canvas: Canvas,
    pub background: BackgroundOp,
    pub regions: Vec<StencilRegion>,
    pub uniforms: WarpUniforms,
}

/// Collect the active shards into a plan.
///
/// Each shown shard is refreshed first (point snapshot, homography,
/// transformed mask). Shards with fewer than three transformed mask points,
/// a self-intersecting mask or invalid transforms are skipped. Ordinals are assigned to the shards
/// that remain; once `max_stencil_id` is reached further shards are dropped.
pub fn compile_frame(
    shards: &mut [Shard],
    settings: &CompositorSettings,
    canvas: Canvas,
    max_stencil_id: u16,
) -> CompositePlan {
    let background = if settings.flat_background {
        BackgroundOp::Flat {
            color: settings.background,
        }
    } else {
        BackgroundOp::Live {
            color: settings.background,
            opacity: settings.live_opacity,
            mapping: settings.quad_mapping,
        }
    };

    let mut regions = Vec::new();
    let mut matrices = Vec::new();
    for (shard_index, shard) in shards.iter_mut().enumerate() {
        if matches!(settings.selection, ShardSelection::Single { index } if index != shard_index) {
            continue;
        }

        shard.refresh();
        shard.update_transformed_mask_points();
        if shard.transformed_mask_points().len() < 3 || !shard.are_transforms_valid() {
            tracing::debug!(shard = shard.name(), "skipping shard without a drawable mask");
            continue;
        }

        if !polygon::is_simple(shard.transformed_mask_points()) {
            tracing::warn!(shard = shard.name(), "skipping shard with a self-intersecting mask");
            continue;
        }

        let ordinal = regions.len();
        let Some(id) = u16::try_from(ordinal + 1).ok().filter(|id| *id <= max_stencil_id) else {
            tracing::warn!(
                shard = shard.name(),
                max_stencil_id,
                "stencil ids exhausted, dropping remaining shards"
            );
            break;
        };

        let h = shard.homography();
        matrices.push(if settings.use_inverse {
            *h.inverse()
        } else {
            *h.matrix()
        });
        let poly = shard.transformed_mask_points().to_vec();
        regions.push(StencilRegion {
            id,
            ordinal,
            shard_index,
            triangles: polygon::triangulate(&poly),
            polygon: poly,
        });
    }

    CompositePlan {
        canvas,
        background,
        regions,
        uniforms: WarpUniforms {
            resolution: [canvas.width as f32, canvas.height as f32],
            debug_view: settings.debug_view,
            opacity: settings.shard_opacity,
            background: settings.background,
            matrices,
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composite/plan.rs"]
mod tests;
