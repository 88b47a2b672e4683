use nalgebra::{Matrix4, Vector3};

use crate::foundation::{core::Point, math::EPSILON};

use super::solver::{is_matrix_valid, project};

/// Rough 3D placement of a shard, derived from its homography.
///
/// This is a visualization aid, not a calibrated decomposition.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose3D {
    /// Pitch, yaw and roll in degrees.
    pub orientation: Vector3<f64>,
    pub position: Vector3<f64>,
}

/// Push the unit square through `m` and read orientation off the result.
///
/// Returns `None` for an invalid matrix or when the mapped square collapses.
pub fn extract_pose(m: &Matrix4<f64>) -> Option<Pose3D> {
    if !is_matrix_valid(m) {
        return None;
    }

    let corners = [
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 1.0),
    ];
    let mapped = corners.map(|c| {
        let p = project(c, m).unwrap_or(c);
        Vector3::new(p.x, p.y, 0.0)
    });

    let edge1 = mapped[1] - mapped[0];
    let edge2 = mapped[2] - mapped[0];
    let mut normal = edge1.cross(&edge2);
    if normal.norm() < EPSILON || edge1.norm() < EPSILON {
        return None;
    }
    normal = normal.normalize();
    if normal.z < 0.0 {
        normal = -normal;
    }

    let pitch = normal.y.atan2(normal.z).to_degrees();
    let yaw = normal.x.atan2(normal.z).to_degrees();
    let x_axis = edge1.normalize();
    let roll = x_axis.y.atan2(x_axis.x).to_degrees();

    let position = mapped.iter().fold(Vector3::zeros(), |acc, p| acc + p) / 4.0;
    Some(Pose3D {
        orientation: Vector3::new(pitch, yaw, roll),
        position,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/homography/pose.rs"]
mod tests;
