use super::*;

fn region(x: i64, y: i64, width: u32, height: u32) -> SurfaceRegion {
    SurfaceRegion {
        x,
        y,
        width,
        height,
    }
}

#[test]
fn reallocates_only_when_size_changes() {
    let mut s = ShardSurfaces::default();
    assert!(!s.is_allocated());
    assert!(s.ensure_region(region(0, 0, 8, 4)).unwrap());
    assert!(!s.ensure_region(region(10, 3, 8, 4)).unwrap());
    assert_eq!(s.region.x, 10);
    assert_eq!(s.reallocations(), 1);
    assert!(s.ensure_region(region(10, 3, 9, 4)).unwrap());
    assert_eq!(s.reallocations(), 2);
    assert_eq!(s.mask.data.len(), 36);
    assert_eq!(s.warp.width, 9);
}

#[test]
fn enclosing_rounds_outward_and_clips() {
    let bounds = region(0, 0, 100, 50);
    let r = SurfaceRegion::enclosing(Rect::new(10.2, 5.7, 20.1, 9.0), bounds);
    assert_eq!(r, region(10, 5, 11, 4));
    let clipped = SurfaceRegion::enclosing(Rect::new(-5.0, 40.0, 10.0, 80.0), bounds);
    assert_eq!(clipped, region(0, 40, 10, 10));
    assert!(SurfaceRegion::enclosing(Rect::new(200.0, 0.0, 300.0, 10.0), bounds).is_empty());
}
