use super::*;
use crate::foundation::core::Rgba8;

/// 8x4 live frame where every texel encodes its own coordinates.
fn coded_live() -> Surface {
    let mut s = Surface::new(8, 4).unwrap();
    for y in 0..4 {
        for x in 0..8 {
            s.put(x, y, [x as u8 * 10, y as u8 * 10, 0, 255]);
        }
    }
    s
}

fn live_op(mapping: [QuadMapping; 4]) -> BackgroundOp {
    BackgroundOp::Live {
        color: Rgba8::opaque(0, 0, 0),
        opacity: 1.0,
        mapping,
    }
}

#[test]
fn flat_background_fills_every_pixel() {
    let mut target = Surface::new(4, 4).unwrap();
    let op = BackgroundOp::Flat {
        color: Rgba8::opaque(1, 2, 3),
    };
    draw_background(&mut target, &op, &Surface::default()).unwrap();
    assert!(target.data.chunks_exact(4).all(|px| px == [1, 2, 3, 255]));
}

#[test]
fn identity_mapping_reproduces_the_live_frame() {
    let live = coded_live();
    let mut target = Surface::new(8, 4).unwrap();
    draw_background(&mut target, &live_op(QuadMapping::identity_set()), &live).unwrap();
    assert_eq!(target, live);
}

#[test]
fn mirror_and_source_quad_remap_pixels() {
    let live = coded_live();
    let mut mapping = QuadMapping::identity_set();
    mapping[0].mirror = true;
    mapping[1].source_quad = 2;
    let mut target = Surface::new(8, 4).unwrap();
    draw_background(&mut target, &live_op(mapping), &live).unwrap();
    // quadrant 0 mirrored: column 0 shows live column 3
    assert_eq!(target.get(0, 0).unwrap(), [30, 0, 0, 255]);
    // quadrant 1 shows the bottom-left live quadrant
    assert_eq!(target.get(4, 0).unwrap(), [0, 20, 0, 255]);
}

#[test]
fn live_frame_is_rescaled_to_the_canvas() {
    let live = Surface::solid(2, 1, Rgba8::opaque(9, 9, 9).premultiplied()).unwrap();
    let mut target = Surface::new(8, 4).unwrap();
    draw_background(&mut target, &live_op(QuadMapping::identity_set()), &live).unwrap();
    assert!(target.data.chunks_exact(4).all(|px| px == [9, 9, 9, 255]));
}

#[test]
fn quad_affine_places_local_origin_at_quadrant_centre() {
    let canvas = Canvas::new(8, 4).unwrap();
    let a = quad_affine(canvas, 3, &QuadMapping::default());
    assert_eq!(a * Point::ZERO, Point::new(6.0, 3.0));
    assert_eq!(source_offset(canvas, 3), Vec2::new(4.0, 2.0));
}
