use std::path::Path;

use crate::{
    foundation::{
        core::{Canvas, Point, Rect, Rgba8, Vec2},
        error::{ShardmapError, ShardmapResult},
    },
    geometry::{polygon, raster::rasterize_polygon},
    homography::{
        pose::{Pose3D, extract_pose},
        solver::{Homography, project, solve},
    },
    shard::{
        io::{self, Correspondences},
        quadrant::Quadrant,
        surfaces::{ShardSurfaces, SurfaceRegion},
    },
    surface::{EdgeMode, Surface},
};

/// Which point lists differ from the last committed snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointChanges {
    pub correspondences: bool,
    pub mask: bool,
}

impl PointChanges {
    pub fn any(self) -> bool {
        self.correspondences || self.mask
    }
}

#[derive(Clone, Debug, Default)]
struct PointCache {
    live: Vec<Point>,
    display: Vec<Point>,
    mask: Vec<Point>,
}

/// One physical planar target surface with its calibration, mask and
/// transform.
///
/// `H` maps display-space points onto live-space points; its inverse maps the
/// live-space mask perimeter back into display space.
#[derive(Clone, Debug)]
pub struct Shard {
    name: String,
    index: usize,
    canvas: Canvas,
    color: Rgba8,
    quadrant: Option<Quadrant>,

    live_points: Vec<Point>,
    display_points: Vec<Point>,
    mask_points: Vec<Point>,
    transformed_mask_points: Vec<Point>,
    cache: PointCache,

    homography: Homography,
    ready: bool,
    pose: Option<Pose3D>,
    bounding_box: Option<Rect>,

    use_mask: bool,
    use_bounding_box: bool,
    mask_dirty: bool,
    mask_ready: bool,
    surfaces: ShardSurfaces,
}

impl Shard {
    pub fn new(name: impl Into<String>, index: usize, canvas: Canvas) -> Self {
        Self {
            name: name.into(),
            index,
            canvas,
            color: Self::debug_color(index),
            quadrant: None,
            live_points: Vec::new(),
            display_points: Vec::new(),
            mask_points: Vec::new(),
            transformed_mask_points: Vec::new(),
            cache: PointCache::default(),
            homography: Homography::identity(),
            ready: false,
            pose: None,
            bounding_box: None,
            use_mask: true,
            use_bounding_box: false,
            mask_dirty: false,
            mask_ready: false,
            surfaces: ShardSurfaces::default(),
        }
    }

    /// Deterministic per-index UI color.
    pub fn debug_color(index: usize) -> Rgba8 {
        let channel = |mul: usize, add: usize| ((index * mul + add) % 200) as u8;
        Rgba8::opaque(channel(23, 311), channel(41, 431), channel(33, 197))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn color(&self) -> Rgba8 {
        self.color
    }

    pub fn set_color(&mut self, color: Rgba8) {
        self.color = color;
    }

    pub fn quadrant(&self) -> Option<Quadrant> {
        self.quadrant
    }

    pub fn quadrant_color(&self) -> Option<Rgba8> {
        self.quadrant.map(Quadrant::color)
    }

    pub fn quadrant_offset(&self) -> Option<Vec2> {
        self.quadrant.map(|q| q.offset(self.canvas))
    }

    pub fn live_points(&self) -> &[Point] {
        &self.live_points
    }

    pub fn display_points(&self) -> &[Point] {
        &self.display_points
    }

    pub fn mask_points(&self) -> &[Point] {
        &self.mask_points
    }

    /// Mask perimeter mapped into display space by the inverse homography.
    pub fn transformed_mask_points(&self) -> &[Point] {
        &self.transformed_mask_points
    }

    pub fn homography(&self) -> &Homography {
        &self.homography
    }

    pub fn pose(&self) -> Option<Pose3D> {
        self.pose
    }

    /// Display-space bounding box of the transformed mask from the last
    /// successful mask rebuild.
    pub fn bounding_box(&self) -> Option<Rect> {
        self.bounding_box
    }

    pub fn use_mask(&self) -> bool {
        self.use_mask
    }

    pub fn use_bounding_box(&self) -> bool {
        self.use_bounding_box
    }

    pub fn is_mask_dirty(&self) -> bool {
        self.mask_dirty
    }

    pub fn is_mask_ready(&self) -> bool {
        self.mask_ready
    }

    pub fn has_mask(&self) -> bool {
        self.mask_points.len() >= 3
    }

    pub fn surfaces(&self) -> &ShardSurfaces {
        &self.surfaces
    }

    pub fn is_homography_valid(&self) -> bool {
        self.homography.is_forward_valid()
    }

    pub fn is_inverse_homography_valid(&self) -> bool {
        self.homography.is_inverse_valid()
    }

    pub fn are_transforms_valid(&self) -> bool {
        self.homography.is_valid()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    // --- editing ---

    pub fn set_correspondences(&mut self, live: Vec<Point>, display: Vec<Point>) -> ShardmapResult<()> {
        if live.len() != display.len() {
            return Err(ShardmapError::validation(format!(
                "shard {}: {} live points but {} display points",
                self.name,
                live.len(),
                display.len()
            )));
        }
        self.live_points = live;
        self.display_points = display;
        self.mask_dirty = true;
        Ok(())
    }

    pub fn set_mask_perimeter(&mut self, points: Vec<Point>) {
        self.mask_points = points;
        self.mask_dirty = true;
    }

    /// Move one live-space calibration point. Returns `false` if out of range.
    pub fn set_live_point(&mut self, i: usize, p: Point) -> bool {
        Self::set_point(&mut self.live_points, i, p, &mut self.mask_dirty)
    }

    pub fn set_display_point(&mut self, i: usize, p: Point) -> bool {
        Self::set_point(&mut self.display_points, i, p, &mut self.mask_dirty)
    }

    pub fn set_mask_point(&mut self, i: usize, p: Point) -> bool {
        Self::set_point(&mut self.mask_points, i, p, &mut self.mask_dirty)
    }

    fn set_point(list: &mut [Point], i: usize, p: Point, dirty: &mut bool) -> bool {
        match list.get_mut(i) {
            Some(slot) => {
                *slot = p;
                *dirty = true;
                true
            }
            None => false,
        }
    }

    pub fn set_use_mask(&mut self, on: bool) {
        if self.use_mask != on {
            self.use_mask = on;
            self.mask_dirty = true;
        }
    }

    pub fn set_use_bounding_box(&mut self, on: bool) {
        if self.use_bounding_box != on {
            self.use_bounding_box = on;
            self.mask_dirty = true;
        }
    }

    // --- change detection ---

    pub fn points_changed(&self) -> bool {
        self.live_points != self.cache.live || self.display_points != self.cache.display
    }

    pub fn mask_points_changed(&self) -> bool {
        self.mask_points != self.cache.mask
    }

    /// Commit the current point lists as the comparison snapshot. A changed
    /// mask perimeter marks the mask dirty.
    pub fn update_point_cache(&mut self) {
        if self.mask_points_changed() {
            self.mask_dirty = true;
        }
        self.commit_cache();
    }

    /// Diff against the snapshot and commit in one step.
    pub fn sync_point_cache(&mut self) -> PointChanges {
        let changes = PointChanges {
            correspondences: self.points_changed(),
            mask: self.mask_points_changed(),
        };
        self.update_point_cache();
        changes
    }

    fn commit_cache(&mut self) {
        self.cache.live.clone_from(&self.live_points);
        self.cache.display.clone_from(&self.display_points);
        self.cache.mask.clone_from(&self.mask_points);
    }

    // --- derived state ---

    /// Solve `H` from the first four display→live pairs.
    ///
    /// On failure the previous matrices are kept and the shard is marked not
    /// ready.
    pub fn compute_homography(&mut self) -> bool {
        if self.live_points.len() < 4 || self.display_points.len() < 4 {
            tracing::debug!(shard = %self.name, "not enough points to compute homography");
            self.ready = false;
            return false;
        }

        let n = self.live_points.len().min(self.display_points.len());
        let solved = match solve(&self.display_points[..n], &self.live_points[..n]) {
            Ok(h) => h,
            Err(err) => {
                tracing::warn!(shard = %self.name, error = %err, "homography solve failed");
                self.ready = false;
                return false;
            }
        };
        if !solved.is_valid() {
            tracing::warn!(shard = %self.name, "degenerate calibration points, keeping previous homography");
            self.ready = false;
            return false;
        }

        self.homography = solved;
        self.ready = true;
        self.mask_dirty = true;
        self.extract_pose();

        let centroid = polygon::centroid(&self.display_points).unwrap_or(Point::ZERO);
        let quadrant = Quadrant::from_centroid(centroid, self.canvas);
        self.quadrant = Some(quadrant);
        self.update_transformed_mask_points();

        tracing::debug!(shard = %self.name, %quadrant, "homography\n{}", self.homography);
        true
    }

    /// Re-map the mask perimeter into display space. No-op while the
    /// transforms are invalid.
    pub fn update_transformed_mask_points(&mut self) {
        if !self.are_transforms_valid() {
            return;
        }
        let inv = self.homography.inverse();
        self.transformed_mask_points = self
            .mask_points
            .iter()
            .map(|&p| project(p, inv).unwrap_or(p))
            .collect();
    }

    pub fn extract_pose(&mut self) {
        if !self.ready {
            return;
        }
        self.pose = extract_pose(self.homography.matrix());
    }

    /// Rebuild the display-space mask from the perimeter.
    ///
    /// All intermediate results are computed before anything is committed,
    /// so a failed rebuild leaves the previous mask in effect.
    pub fn rebuild_mask(&mut self) -> bool {
        match self.try_rebuild_mask() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(shard = %self.name, error = %err, "mask rebuild failed");
                false
            }
        }
    }

    fn try_rebuild_mask(&mut self) -> ShardmapResult<()> {
        if self.mask_points.len() < 3 {
            return Err(ShardmapError::validation("mask needs at least 3 points"));
        }
        if !self.ready || !self.are_transforms_valid() {
            return Err(ShardmapError::validation("homography is not ready"));
        }

        let inv = self.homography.inverse();
        let transformed = self
            .mask_points
            .iter()
            .map(|&p| project(p, inv))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ShardmapError::validation("mask point maps to infinity"))?;
        let bbox = polygon::bounding_box(&transformed)
            .ok_or_else(|| ShardmapError::validation("empty mask polygon"))?;

        let full = self.canvas_region();
        let region = if self.use_bounding_box {
            SurfaceRegion::enclosing(bbox, full)
        } else {
            full
        };
        if region.is_empty() {
            return Err(ShardmapError::validation("mask lies outside the canvas"));
        }
        let coverage = rasterize_polygon(region.width, region.height, &transformed, region.origin())?;

        self.surfaces.ensure_region(region)?;
        self.surfaces.mask.data = coverage;
        self.transformed_mask_points = transformed;
        self.bounding_box = Some(bbox);
        self.mask_dirty = false;
        self.mask_ready = true;
        tracing::debug!(
            shard = %self.name,
            covered = self.surfaces.mask.covered_pixels(),
            "mask rebuilt"
        );
        Ok(())
    }

    fn canvas_region(&self) -> SurfaceRegion {
        SurfaceRegion {
            x: 0,
            y: 0,
            width: self.canvas.width,
            height: self.canvas.height,
        }
    }

    /// Per-frame refresh: commit the point snapshot, re-solve when the
    /// calibration moved and keep the transformed mask current.
    pub fn refresh(&mut self) -> PointChanges {
        let changes = self.sync_point_cache();
        if changes.correspondences {
            self.compute_homography();
        }
        if changes.any() {
            self.update_transformed_mask_points();
        }
        changes
    }

    /// Take a new content frame.
    ///
    /// Rebuilds the mask when dirty, then copies `content` into the content
    /// and masked-content surfaces.
    pub fn update(&mut self, content: &Surface) -> ShardmapResult<()> {
        if !content.is_allocated() {
            return Err(ShardmapError::validation("content surface is not allocated"));
        }
        self.refresh();
        if self.mask_dirty && self.has_mask() && self.ready {
            self.rebuild_mask();
        }
        if !self.surfaces.is_allocated() {
            self.surfaces.ensure_region(self.canvas_region())?;
        }

        let region = self.surfaces.region;
        self.surfaces.content.copy_window(content, region.x, region.y);
        self.surfaces.masked.data.clone_from(&self.surfaces.content.data);
        if self.use_mask && self.mask_ready {
            self.surfaces.masked.apply_alpha_mask(&self.surfaces.mask)?;
        }
        Ok(())
    }

    /// Push the content surface through `H⁻¹` (or `H`) into the warp
    /// surface. Returns `false` when there is nothing valid to draw.
    pub fn render_warp(&mut self, use_inverse: bool) -> bool {
        if !self.are_transforms_valid() || !self.surfaces.is_allocated() {
            return false;
        }
        // drawing through M samples the content at M⁻¹(p)
        let sample_matrix = if use_inverse {
            *self.homography.matrix()
        } else {
            *self.homography.inverse()
        };

        let surfaces = &mut self.surfaces;
        let region = surfaces.region;
        for py in 0..region.height {
            for px in 0..region.width {
                let p = Point::new(
                    region.x as f64 + f64::from(px) + 0.5,
                    region.y as f64 + f64::from(py) + 0.5,
                );
                let out = match project(p, &sample_matrix) {
                    Some(q) => {
                        let s = surfaces.content.sample_bilinear(
                            q.x - region.x as f64,
                            q.y - region.y as f64,
                            EdgeMode::Transparent,
                        );
                        s.map(|c| c.round().clamp(0.0, 255.0) as u8)
                    }
                    None => [0; 4],
                };
                surfaces.warp.put(px, py, out);
            }
        }
        if self.use_mask && self.mask_ready {
            if let Err(err) = surfaces.warp.apply_alpha_mask(&surfaces.mask) {
                tracing::warn!(shard = %self.name, error = %err, "warp mask skipped");
            }
        }
        true
    }

    // --- persistence ---

    pub fn save(&self, base: &Path) -> ShardmapResult<()> {
        let c = Correspondences {
            live: self.live_points.clone(),
            display: self.display_points.clone(),
        };
        io::write_points(&io::points_path(base), &c)?;
        io::write_mask(&io::mask_path(base), &self.mask_points)?;
        Ok(())
    }

    /// Load `<base>_points.txt` and, when present, `<base>_mask.txt`, then
    /// derive the homography, transformed mask, pose and mask.
    ///
    /// A degenerate but complete calibration loads successfully and leaves
    /// the shard not ready. A missing or malformed mask file only disables
    /// the mask.
    pub fn load(&mut self, base: &Path) -> ShardmapResult<()> {
        let c = io::read_points(&io::points_path(base))?;
        if c.len() < 4 {
            return Err(ShardmapError::validation(format!(
                "shard {}: need at least 4 correspondences, found {}",
                self.name,
                c.len()
            )));
        }
        let mask_file = io::mask_path(base);
        let mask = match io::read_mask(&mask_file) {
            Ok(Some(points)) => Some(points),
            Ok(None) => {
                tracing::warn!(
                    shard = %self.name,
                    path = %mask_file.display(),
                    "no mask file, mask disabled"
                );
                None
            }
            Err(err) => {
                tracing::warn!(
                    shard = %self.name,
                    path = %mask_file.display(),
                    error = %err,
                    "unreadable mask file, mask disabled"
                );
                None
            }
        };

        self.live_points = c.live;
        self.display_points = c.display;
        match mask {
            Some(points) => self.mask_points = points,
            None => {
                self.mask_points.clear();
                self.transformed_mask_points.clear();
                self.mask_ready = false;
            }
        }

        self.compute_homography();
        self.commit_cache();
        if self.has_mask() {
            self.rebuild_mask();
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shard/model.rs"]
mod tests;
