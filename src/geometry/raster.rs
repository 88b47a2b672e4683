use crate::foundation::{
    core::Point,
    error::{ShardmapError, ShardmapResult},
};

/// Alpha threshold above which an anti-aliased edge pixel counts as inside.
const COVERAGE_THRESHOLD: u8 = 128;

/// Fill a polygon into a `width * height` coverage buffer (0 or 255 per pixel).
///
/// `origin` is the canvas-space position of the buffer's top-left pixel, so a
/// buffer covering only a bounding box can be filled from canvas-space
/// vertices. The fill uses the nonzero winding rule; edge pixels are decided
/// by thresholding the rasterizer's coverage so the result is not
/// anti-aliased.
pub fn rasterize_polygon(
    width: u32,
    height: u32,
    points: &[Point],
    origin: Point,
) -> ShardmapResult<Vec<u8>> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ShardmapError::render("raster width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ShardmapError::render("raster height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(ShardmapError::render("raster target is empty"));
    }

    let mut out = vec![0u8; width as usize * height as usize];
    if points.len() < 3 {
        return Ok(out);
    }

    let mut path = vello_cpu::kurbo::BezPath::new();
    path.move_to(vello_cpu::kurbo::Point::new(
        points[0].x - origin.x,
        points[0].y - origin.y,
    ));
    for p in &points[1..] {
        path.line_to(vello_cpu::kurbo::Point::new(p.x - origin.x, p.y - origin.y));
    }
    path.close_path();

    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
    ctx.fill_path(&path);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);

    for (dst, px) in out
        .iter_mut()
        .zip(pixmap.data_as_u8_slice().chunks_exact(4))
    {
        if px[3] >= COVERAGE_THRESHOLD {
            *dst = 255;
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/raster.rs"]
mod tests;
