//! Shardmap maps video content onto physical mirror shards.
//!
//! Each shard carries four or more calibration point pairs relating display
//! space to the live camera view. From those the crate derives a planar
//! homography, a perimeter mask and a rough 3D pose, and composites every
//! shard into one output surface with a stencil-tagged per-pixel program:
//!
//! - Discover calibrated shards on disk with a [`ShardRegistry`]
//! - Build a [`Compositor`] over a CPU or GPU backend
//! - Call [`Compositor::render_frame`] once per frame
#![forbid(unsafe_code)]

mod foundation;

pub mod composite;
pub mod compositor;
pub mod config;
pub mod geometry;
pub mod homography;
pub mod registry;
pub mod render;
pub mod shard;
pub mod surface;

pub use crate::foundation::core::{Affine, BezPath, Canvas, Point, Rect, Rgba8, Rgba8Premul, Vec2};
pub use crate::foundation::error::{ShardmapError, ShardmapResult};
pub use crate::foundation::math::EPSILON;

pub use crate::compositor::{Compositor, CompositorStats};
pub use crate::config::{
    CompositorSettings, QuadMapping, ShardSelection, ShardSurfaceSettings, ShardmapConfig,
};
pub use crate::homography::pose::Pose3D;
pub use crate::homography::solver::{Homography, solve, transform_point};
pub use crate::registry::discover::ShardRegistry;
pub use crate::render::backend::{BackendKind, FrameRGBA, create_backend};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::passes::CompositeBackend;
pub use crate::shard::model::{PointChanges, Shard};
pub use crate::shard::quadrant::Quadrant;
pub use crate::surface::Surface;
