use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
    config::ShardSurfaceSettings,
    foundation::{core::Canvas, error::ShardmapResult},
    shard::{
        io::{MASK_SUFFIX, POINTS_SUFFIX},
        model::Shard,
    },
};

#[derive(Default)]
struct StemFiles {
    points: bool,
    mask: bool,
}

/// Ordered set of shards loaded from one directory.
///
/// Insertion order is load order and defines each shard's index.
#[derive(Clone, Debug)]
pub struct ShardRegistry {
    dir: PathBuf,
    canvas: Canvas,
    shards: Vec<Shard>,
}

impl ShardRegistry {
    /// Load every `<name>_points.txt` in `dir` as a shard.
    ///
    /// A missing directory is created and yields an empty registry. Stems
    /// are visited in name order. A stem that fails to load is logged and
    /// skipped without consuming an index.
    #[tracing::instrument(skip_all, fields(dir = %dir.display()))]
    pub fn discover(dir: &Path, canvas: Canvas) -> ShardmapResult<Self> {
        if !dir.exists() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create shard directory {}", dir.display()))?;
            tracing::info!("created empty shard directory");
            return Ok(Self::from_shards(dir, canvas, Vec::new()));
        }

        let mut stems: BTreeMap<String, StemFiles> = BTreeMap::new();
        let entries =
            std::fs::read_dir(dir).with_context(|| format!("list {}", dir.display()))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("list {}", dir.display()))?;
            let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if let Some(stem) = file_name.strip_suffix(POINTS_SUFFIX) {
                stems.entry(stem.to_owned()).or_default().points = true;
            } else if let Some(stem) = file_name.strip_suffix(MASK_SUFFIX) {
                stems.entry(stem.to_owned()).or_default().mask = true;
            }
        }

        let mut shards = Vec::new();
        for (stem, files) in stems {
            if !files.points {
                tracing::warn!(shard = %stem, "mask file without points file, skipping");
                continue;
            }
            if !files.mask {
                tracing::warn!(shard = %stem, "no mask file");
            }
            let mut shard = Shard::new(stem.as_str(), shards.len(), canvas);
            match shard.load(&dir.join(&stem)) {
                Ok(()) => {
                    tracing::info!(
                        shard = %stem,
                        index = shard.index(),
                        ready = shard.is_ready(),
                        "loaded shard"
                    );
                    shards.push(shard);
                }
                Err(err) => tracing::warn!(shard = %stem, error = %err, "failed to load shard"),
            }
        }
        Ok(Self::from_shards(dir, canvas, shards))
    }

    pub fn from_shards(dir: &Path, canvas: Canvas, shards: Vec<Shard>) -> Self {
        Self {
            dir: dir.to_path_buf(),
            canvas,
            shards,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn shards(&self) -> &[Shard] {
        &self.shards
    }

    pub fn shards_mut(&mut self) -> &mut [Shard] {
        &mut self.shards
    }

    pub fn get(&self, name: &str) -> Option<&Shard> {
        self.shards.iter().find(|s| s.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Shard> {
        self.shards.iter_mut().find(|s| s.name() == name)
    }

    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    /// Apply one surface sizing mode to every shard.
    pub fn apply_surface_settings(&mut self, settings: ShardSurfaceSettings) {
        for shard in &mut self.shards {
            shard.set_use_mask(settings.use_mask);
            shard.set_use_bounding_box(settings.use_bounding_box);
        }
    }

    /// Discard all shards and discover the directory again.
    pub fn reload(&mut self) -> ShardmapResult<()> {
        *self = Self::discover(&self.dir, self.canvas)?;
        Ok(())
    }

    /// Write every shard back to `<dir>/<name>_points.txt` and `_mask.txt`.
    pub fn save_all(&self) -> ShardmapResult<()> {
        for shard in &self.shards {
            shard.save(&self.dir.join(shard.name()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/discover.rs"]
mod tests;
