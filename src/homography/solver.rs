use std::fmt;

use nalgebra::{Matrix4, SMatrix, SVector, Vector4};

use crate::foundation::{
    core::Point,
    error::{ShardmapError, ShardmapResult},
    math::EPSILON,
};

/// Planar homography embedded in a 4×4 matrix, together with its inverse.
///
/// The embedding keeps row and column 2 as the identity so the matrix can be
/// uploaded to a shader and applied to `(x, y, 0, 1)` directly:
///
/// ```text
/// | h11 h12 0 h13 |
/// | h21 h22 0 h23 |
/// |  0   0  1  0  |
/// | h31 h32 0 h33 |
/// ```
///
/// Forward and inverse are validated independently; an invalid direction
/// never transforms points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    forward: Matrix4<f64>,
    inverse: Matrix4<f64>,
}

impl Homography {
    pub fn identity() -> Self {
        Self {
            forward: Matrix4::identity(),
            inverse: Matrix4::identity(),
        }
    }

    /// The zero matrix in both directions, which fails every validity check.
    pub fn invalid() -> Self {
        Self {
            forward: Matrix4::zeros(),
            inverse: Matrix4::zeros(),
        }
    }

    /// Wrap an existing matrix, computing its inverse when it has one.
    pub fn from_matrix(forward: Matrix4<f64>) -> Self {
        if !is_matrix_valid(&forward) {
            return Self::invalid();
        }
        let inverse = forward.try_inverse().unwrap_or_else(Matrix4::zeros);
        Self { forward, inverse }
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.forward
    }

    pub fn inverse(&self) -> &Matrix4<f64> {
        &self.inverse
    }

    pub fn is_forward_valid(&self) -> bool {
        is_matrix_valid(&self.forward)
    }

    pub fn is_inverse_valid(&self) -> bool {
        is_matrix_valid(&self.inverse)
    }

    pub fn is_valid(&self) -> bool {
        self.is_forward_valid() && self.is_inverse_valid()
    }

    /// Map a display-space point into live space.
    pub fn apply(&self, p: Point) -> Point {
        transform_point(p, &self.forward)
    }

    /// Map a live-space point into display space.
    pub fn apply_inverse(&self, p: Point) -> Point {
        transform_point(p, &self.inverse)
    }

    /// Column-major `f32` copy of the forward (or inverse) matrix, laid out
    /// the way WGSL `mat4x4<f32>` expects.
    pub fn matrix_f32(&self, use_inverse: bool) -> [f32; 16] {
        to_cols_f32(if use_inverse {
            &self.inverse
        } else {
            &self.forward
        })
    }
}

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Homography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.forward;
        for r in [0usize, 1, 3] {
            writeln!(
                f,
                "[{:>12.6} {:>12.6} {:>12.6}]",
                m[(r, 0)],
                m[(r, 1)],
                m[(r, 3)]
            )?;
        }
        Ok(())
    }
}

/// `true` when `m` is finite and `|det(m)| > EPSILON`.
pub fn is_matrix_valid(m: &Matrix4<f64>) -> bool {
    m.iter().all(|v| v.is_finite()) && m.determinant().abs() > EPSILON
}

/// Apply `m` to `p` with perspective division.
///
/// Returns `p` unchanged when `m` is singular or the homogeneous `w` is too
/// close to zero to divide by.
pub fn transform_point(p: Point, m: &Matrix4<f64>) -> Point {
    if m.determinant().abs() < EPSILON {
        return p;
    }
    project(p, m).unwrap_or(p)
}

/// Perspective-divided transform without the determinant check, for inner
/// loops where `m` has already been validated.
pub(crate) fn project(p: Point, m: &Matrix4<f64>) -> Option<Point> {
    let v = m * Vector4::new(p.x, p.y, 0.0, 1.0);
    let w = v[3];
    if !w.is_finite() || w.abs() < EPSILON {
        return None;
    }
    Some(Point::new(v[0] / w, v[1] / w))
}

pub(crate) fn to_cols_f32(m: &Matrix4<f64>) -> [f32; 16] {
    let mut out = [0f32; 16];
    for (dst, src) in out.iter_mut().zip(m.as_slice()) {
        *dst = *src as f32;
    }
    out
}

/// Solve the homography mapping `src` onto `dst`.
///
/// Only the first four pairs are used. Mismatched lengths or fewer than four
/// pairs are a validation error; degenerate geometry (three collinear
/// points, a singular system, a non-invertible result) yields
/// [`Homography::invalid`].
pub fn solve(src: &[Point], dst: &[Point]) -> ShardmapResult<Homography> {
    if src.len() != dst.len() {
        return Err(ShardmapError::validation(format!(
            "homography needs matching point lists, got {} and {}",
            src.len(),
            dst.len()
        )));
    }
    if src.len() < 4 {
        return Err(ShardmapError::validation(format!(
            "homography needs at least 4 point pairs, got {}",
            src.len()
        )));
    }

    let (src, dst) = (&src[..4], &dst[..4]);
    if has_collinear_triple(src) || has_collinear_triple(dst) {
        return Ok(Homography::invalid());
    }

    let mut a = [0f64; 64];
    let mut b = [0f64; 8];
    for (i, (s, d)) in src.iter().zip(dst).enumerate() {
        let (x, y, u, v) = (s.x, s.y, d.x, d.y);
        let r0 = 2 * i;
        let r1 = r0 + 1;
        a[r0 * 8..r0 * 8 + 8].copy_from_slice(&[x, y, 1.0, 0.0, 0.0, 0.0, -x * u, -y * u]);
        a[r1 * 8..r1 * 8 + 8].copy_from_slice(&[0.0, 0.0, 0.0, x, y, 1.0, -x * v, -y * v]);
        b[r0] = u;
        b[r1] = v;
    }

    let system = SMatrix::<f64, 8, 8>::from_row_slice(&a);
    let rhs = SVector::<f64, 8>::from_row_slice(&b);
    let Some(h) = system.lu().solve(&rhs) else {
        return Ok(Homography::invalid());
    };
    if h.iter().any(|v| !v.is_finite()) {
        return Ok(Homography::invalid());
    }

    #[rustfmt::skip]
    let forward = Matrix4::new(
        h[0], h[1], 0.0, h[2],
        h[3], h[4], 0.0, h[5],
        0.0,  0.0,  1.0, 0.0,
        h[6], h[7], 0.0, 1.0,
    );
    if !is_matrix_valid(&forward) {
        return Ok(Homography::invalid());
    }
    let Some(inverse) = forward.try_inverse() else {
        return Ok(Homography::invalid());
    };
    Ok(Homography { forward, inverse })
}

fn has_collinear_triple(pts: &[Point]) -> bool {
    let scale = pts
        .iter()
        .map(|p| p.x.abs().max(p.y.abs()))
        .fold(1.0f64, f64::max);
    let tol = EPSILON * scale * scale;
    for i in 0..pts.len() {
        for j in i + 1..pts.len() {
            for k in j + 1..pts.len() {
                let (a, b, c) = (pts[i], pts[j], pts[k]);
                let area2 = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
                if area2.abs() <= tol {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
#[path = "../../tests/unit/homography/solver.rs"]
mod tests;
