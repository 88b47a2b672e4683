use super::*;

#[test]
fn default_surface_is_unallocated() {
    assert!(!Surface::default().is_allocated());
    assert!(Surface::new(0, 4).is_err());
    assert!(Surface::new(2, 2).unwrap().is_allocated());
}

#[test]
fn from_straight_premultiplies() {
    let s = Surface::from_straight(1, 1, vec![200, 100, 50, 128]).unwrap();
    assert_eq!(
        s.get(0, 0).unwrap(),
        [
            ((200u16 * 128 + 127) / 255) as u8,
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            128
        ]
    );
    assert!(Surface::from_premul(2, 2, vec![0; 3]).is_err());
}

#[test]
fn bilinear_hits_texel_centers_and_blends_between() {
    let mut s = Surface::new(2, 1).unwrap();
    s.put(0, 0, [0, 0, 0, 255]);
    s.put(1, 0, [200, 0, 0, 255]);
    assert_eq!(s.sample_bilinear(0.5, 0.5, EdgeMode::Clamp), [0.0, 0.0, 0.0, 255.0]);
    assert_eq!(s.sample_bilinear(1.5, 0.5, EdgeMode::Clamp)[0], 200.0);
    assert!((s.sample_bilinear(1.0, 0.5, EdgeMode::Clamp)[0] - 100.0).abs() < 1e-3);
}

#[test]
fn clamp_and_transparent_edge_modes_differ_outside() {
    let s = Surface::solid(2, 2, Rgba8Premul::from_straight_rgba(10, 20, 30, 255)).unwrap();
    assert_eq!(s.sample_bilinear(-5.0, 1.0, EdgeMode::Clamp), [10.0, 20.0, 30.0, 255.0]);
    assert_eq!(s.sample_bilinear(-5.0, 1.0, EdgeMode::Transparent), [0.0; 4]);
    assert_eq!(s.sample_bilinear(f64::NAN, 1.0, EdgeMode::Clamp), [0.0; 4]);
}

#[test]
fn alpha_mask_zeroes_uncovered_pixels() {
    let mut s = Surface::solid(2, 1, Rgba8Premul::from_straight_rgba(255, 255, 255, 255)).unwrap();
    let mut mask = AlphaMask::new(2, 1);
    mask.data[1] = 255;
    s.apply_alpha_mask(&mask).unwrap();
    assert_eq!(s.get(0, 0).unwrap(), [0, 0, 0, 0]);
    assert_eq!(s.get(1, 0).unwrap(), [255, 255, 255, 255]);
    assert_eq!(mask.covered_pixels(), 1);
    assert!(s.apply_alpha_mask(&AlphaMask::new(3, 1)).is_err());
}

#[test]
fn copy_window_pads_out_of_bounds_with_transparent() {
    let s = Surface::solid(2, 2, Rgba8Premul::from_straight_rgba(1, 2, 3, 255)).unwrap();
    let mut c = Surface::solid(2, 2, Rgba8Premul::from_straight_rgba(9, 9, 9, 255)).unwrap();
    c.copy_window(&s, 1, 1);
    assert_eq!(c.get(0, 0).unwrap(), [1, 2, 3, 255]);
    assert_eq!(c.get(1, 0).unwrap(), [0, 0, 0, 0]);
    assert_eq!(c.get(1, 1).unwrap(), [0, 0, 0, 0]);
}

#[test]
fn rgba_image_round_trips_opaque_pixels() {
    let s = Surface::solid(3, 2, Rgba8Premul::from_straight_rgba(9, 8, 7, 255)).unwrap();
    let img = s.to_rgba_image().unwrap();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.get_pixel(2, 1).0, [9, 8, 7, 255]);
}
