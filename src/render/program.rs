//! The per-pixel shard program, shared by the CPU backend and mirrored by
//! the WGSL shader.

use nalgebra::Matrix4;

use crate::{
    composite::blend::{PremulRgba8, to_premul_u8},
    foundation::core::Point,
    homography::solver::project,
    surface::{EdgeMode, Surface},
};

/// Debug tint per shard ordinal. Ordinals past the table use [`DEBUG_FALLBACK`].
pub const DEBUG_PALETTE: [[f32; 4]; 14] = [
    [1.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 1.0],
    [0.0, 0.0, 1.0, 1.0],
    [1.0, 1.0, 0.0, 1.0],
    [1.0, 0.0, 1.0, 1.0],
    [0.0, 1.0, 1.0, 1.0],
    [1.0, 0.5, 0.0, 1.0],
    [0.5, 0.0, 1.0, 1.0],
    [0.0, 0.5, 0.5, 1.0],
    [0.5, 0.5, 0.0, 1.0],
    [0.5, 0.0, 0.0, 1.0],
    [0.0, 0.5, 0.0, 1.0],
    [0.0, 0.4, 0.2, 1.0],
    [0.0, 0.4, 0.3, 1.0],
];

pub const DEBUG_FALLBACK: [f32; 4] = [0.5, 0.5, 0.5, 1.0];

pub fn debug_tint(ordinal: usize) -> [f32; 4] {
    DEBUG_PALETTE.get(ordinal).copied().unwrap_or(DEBUG_FALLBACK)
}

/// Where in `source` the program reads for canvas pixel `(x, y)`.
///
/// The pixel centre goes through `m`; the result is in canvas units and is
/// rescaled to the source's size.
pub fn source_coord(x: u32, y: u32, m: &Matrix4<f64>, resolution: [f32; 2], source: &Surface) -> Point {
    let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
    let q = project(p, m).unwrap_or(p);
    Point::new(
        q.x * f64::from(source.width) / f64::from(resolution[0]),
        q.y * f64::from(source.height) / f64::from(resolution[1]),
    )
}

/// Premultiplied program output for one pixel, before the opacity-scaled
/// `over` onto the background.
pub fn shade(
    source: &Surface,
    m: &Matrix4<f64>,
    resolution: [f32; 2],
    x: u32,
    y: u32,
    debug_ordinal: Option<usize>,
) -> PremulRgba8 {
    let q = source_coord(x, y, m, resolution, source);
    let s = source.sample_bilinear(q.x, q.y, EdgeMode::Clamp);
    let mut c = s.map(|v| v / 255.0);
    if let Some(ordinal) = debug_ordinal {
        let tint = debug_tint(ordinal);
        for k in 0..4 {
            c[k] = c[k] * 0.5 + tint[k] * 0.5;
        }
    }
    to_premul_u8(c)
}

#[cfg(test)]
#[path = "../../tests/unit/render/program.rs"]
mod tests;
