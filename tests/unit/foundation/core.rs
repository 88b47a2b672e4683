use super::*;

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    let c = Canvas::new(3840, 2160).unwrap();
    assert_eq!(c, Canvas::UHD);
    assert_eq!(c.half_width(), 1920.0);
    assert_eq!(c.half_height(), 1080.0);
}

#[test]
fn premultiply_scales_color_channels() {
    let p = Rgba8::new(255, 128, 0, 128).premultiplied();
    assert_eq!(p.a, 128);
    assert_eq!(p.r, 128);
    assert_eq!(p.g, 64);
    assert_eq!(p.b, 0);

    let opaque = Rgba8::opaque(10, 20, 30).premultiplied();
    assert_eq!(opaque.to_array(), [10, 20, 30, 255]);
}

#[test]
fn straight_color_normalizes() {
    let c = Rgba8::new(255, 0, 51, 255).to_f32();
    assert_eq!(c, [1.0, 0.0, 0.2, 1.0]);
}
