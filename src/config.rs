use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::{
    core::{Canvas, Rgba8},
    error::{ShardmapError, ShardmapResult},
};

/// How one output quadrant of the background shows the live feed.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct QuadMapping {
    /// Quadrant of the live frame (0 = top-left .. 3 = bottom-right) drawn here.
    pub source_quad: u8,
    pub rotation_deg: f64,
    /// Mirror horizontally.
    pub mirror: bool,
    /// Flip vertically.
    pub flip: bool,
}

impl Default for QuadMapping {
    fn default() -> Self {
        Self {
            source_quad: 0,
            rotation_deg: 0.0,
            mirror: false,
            flip: false,
        }
    }
}

impl QuadMapping {
    /// Each output quadrant shows the matching live quadrant, untransformed.
    pub fn identity_set() -> [QuadMapping; 4] {
        [0u8, 1, 2, 3].map(|q| QuadMapping {
            source_quad: q,
            ..QuadMapping::default()
        })
    }
}

/// Which shards the compositor draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ShardSelection {
    #[default]
    All,
    Single { index: usize },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompositorSettings {
    pub selection: ShardSelection,
    /// Upload `H⁻¹` rather than `H` to the shard program.
    pub use_inverse: bool,
    /// Skip the live-feed quadrants and show only the background color.
    pub flat_background: bool,
    pub background: Rgba8,
    pub live_opacity: f32,
    pub shard_opacity: f32,
    /// Tint each shard with its palette color.
    pub debug_view: bool,
    pub quad_mapping: [QuadMapping; 4],
}

impl Default for CompositorSettings {
    fn default() -> Self {
        Self {
            selection: ShardSelection::All,
            use_inverse: true,
            flat_background: false,
            background: Rgba8::opaque(0, 0, 0),
            live_opacity: 1.0,
            shard_opacity: 1.0,
            debug_view: false,
            quad_mapping: QuadMapping::identity_set(),
        }
    }
}

impl CompositorSettings {
    pub fn validate(&self) -> ShardmapResult<()> {
        for (name, v) in [
            ("live_opacity", self.live_opacity),
            ("shard_opacity", self.shard_opacity),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(ShardmapError::validation(format!(
                    "{name} must be in [0, 1], got {v}"
                )));
            }
        }
        for (i, q) in self.quad_mapping.iter().enumerate() {
            if q.source_quad > 3 {
                return Err(ShardmapError::validation(format!(
                    "quad_mapping[{i}].source_quad must be 0..=3, got {}",
                    q.source_quad
                )));
            }
            if !q.rotation_deg.is_finite() {
                return Err(ShardmapError::validation(format!(
                    "quad_mapping[{i}].rotation_deg must be finite"
                )));
            }
        }
        Ok(())
    }
}

/// Surface sizing applied to every shard after discovery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShardSurfaceSettings {
    pub use_mask: bool,
    pub use_bounding_box: bool,
}

impl Default for ShardSurfaceSettings {
    fn default() -> Self {
        Self {
            use_mask: true,
            use_bounding_box: false,
        }
    }
}

/// Top-level JSON configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShardmapConfig {
    pub canvas: Canvas,
    pub shards_dir: PathBuf,
    pub compositor: CompositorSettings,
    pub shard_surfaces: ShardSurfaceSettings,
}

impl Default for ShardmapConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::UHD,
            shards_dir: PathBuf::from("shards"),
            compositor: CompositorSettings::default(),
            shard_surfaces: ShardSurfaceSettings::default(),
        }
    }
}

impl ShardmapConfig {
    pub fn from_json_str(s: &str) -> ShardmapResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| ShardmapError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> ShardmapResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> ShardmapResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ShardmapError::serde(e.to_string()))
    }

    pub fn validate(&self) -> ShardmapResult<()> {
        Canvas::new(self.canvas.width, self.canvas.height)?;
        self.compositor.validate()
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
