use super::*;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src, 1.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_half_opacity_mixes_with_background() {
    let out = over([0, 0, 200, 255], [200, 0, 0, 255], 0.5);
    assert_eq!(out[3], 255);
    assert!((99..=101).contains(&out[0]));
    assert!((98..=101).contains(&out[2]));
}

#[test]
fn to_premul_u8_keeps_color_under_alpha() {
    assert_eq!(to_premul_u8([1.0, 0.5, 0.0, 1.0]), [255, 128, 0, 255]);
    assert_eq!(to_premul_u8([0.9, 0.9, 0.9, 0.5]), [128, 128, 128, 128]);
}
