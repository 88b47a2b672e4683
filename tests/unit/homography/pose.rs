use super::*;

#[test]
fn identity_pose_is_flat_and_centered() {
    let pose = extract_pose(&Matrix4::identity()).unwrap();
    assert!(pose.orientation.norm() < 1e-9);
    assert!((pose.position - Vector3::new(0.5, 0.5, 0.0)).norm() < 1e-9);
}

#[test]
fn quarter_turn_reports_ninety_degree_roll() {
    #[rustfmt::skip]
    let rot = Matrix4::new(
        0.0, -1.0, 0.0, 0.0,
        1.0,  0.0, 0.0, 0.0,
        0.0,  0.0, 1.0, 0.0,
        0.0,  0.0, 0.0, 1.0,
    );
    let pose = extract_pose(&rot).unwrap();
    assert!((pose.orientation.z - 90.0).abs() < 1e-9);
}

#[test]
fn singular_matrix_has_no_pose() {
    assert!(extract_pose(&Matrix4::zeros()).is_none());
}
