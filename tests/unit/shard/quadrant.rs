use super::*;

#[test]
fn uhd_corners_classify_to_a_and_d() {
    let canvas = Canvas::UHD;
    let a = Quadrant::from_centroid(Point::new(100.0, 100.0), canvas);
    assert_eq!(a, Quadrant::A);
    assert_eq!(a.offset(canvas), Vec2::new(0.0, 0.0));

    let d = Quadrant::from_centroid(Point::new(3000.0, 2000.0), canvas);
    assert_eq!(d, Quadrant::D);
    assert_eq!(d.offset(canvas), Vec2::new(1920.0, 1080.0));
}

#[test]
fn midlines_belong_to_the_right_and_bottom() {
    let canvas = Canvas::UHD;
    assert_eq!(
        Quadrant::from_centroid(Point::new(1920.0, 10.0), canvas),
        Quadrant::B
    );
    assert_eq!(
        Quadrant::from_centroid(Point::new(10.0, 1080.0), canvas),
        Quadrant::C
    );
}

#[test]
fn colors_follow_the_installation_legend() {
    assert_eq!(Quadrant::A.color(), Rgba8::opaque(255, 0, 0));
    assert_eq!(Quadrant::B.color(), Rgba8::opaque(0, 0, 255));
    assert_eq!(Quadrant::C.color(), Rgba8::opaque(0, 255, 0));
    assert_eq!(Quadrant::D.color(), Rgba8::opaque(0, 0, 0));
    assert_eq!(Quadrant::C.to_string(), "C");
}
