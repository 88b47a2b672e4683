use crate::{
    composite::{blend::over, plan::BackgroundOp},
    config::QuadMapping,
    foundation::{
        core::{Affine, Canvas, Point, Rect, Vec2},
        error::{ShardmapError, ShardmapResult},
    },
    surface::{EdgeMode, Surface},
};

/// Canvas transform for output quadrant `quad` (0 = top-left .. 3 =
/// bottom-right).
///
/// Local coordinates span `[-W/4, W/4] x [-H/4, H/4]` centred on the
/// origin; the mapping mirrors/flips, rotates, then moves the result to the
/// quadrant's centre.
pub fn quad_affine(canvas: Canvas, quad: usize, mapping: &QuadMapping) -> Affine {
    let (hw, hh) = (canvas.half_width(), canvas.half_height());
    let origin = Vec2::new(
        if quad % 2 == 1 { hw } else { 0.0 },
        if quad >= 2 { hh } else { 0.0 },
    );
    let centre = origin + Vec2::new(hw / 2.0, hh / 2.0);
    let sx = if mapping.mirror { -1.0 } else { 1.0 };
    let sy = if mapping.flip { -1.0 } else { 1.0 };
    Affine::translate(centre)
        * Affine::rotate(mapping.rotation_deg.to_radians())
        * Affine::scale_non_uniform(sx, sy)
}

/// Canvas-space top-left of the live-frame quadrant `source_quad`.
pub fn source_offset(canvas: Canvas, source_quad: u8) -> Vec2 {
    Vec2::new(
        f64::from(source_quad % 2) * canvas.half_width(),
        if source_quad < 2 { 0.0 } else { canvas.half_height() },
    )
}

/// Fill `target` with the frame background.
///
/// The live frame is addressed in canvas units and rescaled to its actual
/// size, so a live feed smaller than the canvas still covers each quadrant.
pub fn draw_background(target: &mut Surface, op: &BackgroundOp, live: &Surface) -> ShardmapResult<()> {
    if !target.is_allocated() {
        return Err(ShardmapError::render("background target is not allocated"));
    }
    match op {
        BackgroundOp::Flat { color } => {
            target.fill(color.premultiplied());
            Ok(())
        }
        BackgroundOp::Live {
            color,
            opacity,
            mapping,
        } => {
            target.fill(color.premultiplied());
            if !live.is_allocated() || *opacity <= 0.0 {
                return Ok(());
            }
            let canvas = Canvas::new(target.width, target.height)?;
            for (quad, m) in mapping.iter().enumerate() {
                draw_live_quad(target, live, canvas, quad, m, *opacity);
            }
            Ok(())
        }
    }
}

fn draw_live_quad(
    target: &mut Surface,
    live: &Surface,
    canvas: Canvas,
    quad: usize,
    mapping: &QuadMapping,
    opacity: f32,
) {
    let (hw, hh) = (canvas.half_width(), canvas.half_height());
    let local = Rect::new(-hw / 2.0, -hh / 2.0, hw / 2.0, hh / 2.0);
    let a = quad_affine(canvas, quad, mapping);
    let inv = a.inverse();
    let src = source_offset(canvas, mapping.source_quad);
    let scale_x = f64::from(live.width) / f64::from(canvas.width);
    let scale_y = f64::from(live.height) / f64::from(canvas.height);

    let bbox = a.transform_rect_bbox(local).intersect(canvas.rect());
    let (x0, y0) = (bbox.x0.floor().max(0.0) as u32, bbox.y0.floor().max(0.0) as u32);
    let (x1, y1) = (
        (bbox.x1.ceil() as u32).min(target.width),
        (bbox.y1.ceil() as u32).min(target.height),
    );

    for y in y0..y1 {
        for x in x0..x1 {
            let l = inv * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if l.x < local.x0 || l.x >= local.x1 || l.y < local.y0 || l.y >= local.y1 {
                continue;
            }
            let u = (src.x + l.x - local.x0) * scale_x;
            let v = (src.y + l.y - local.y0) * scale_y;
            let s = live.sample_bilinear(u, v, EdgeMode::Clamp);
            let px = s.map(|c| c.round().clamp(0.0, 255.0) as u8);
            if let Some(dst) = target.get(x, y) {
                target.put(x, y, over(dst, px, opacity));
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composite/background.rs"]
mod tests;
