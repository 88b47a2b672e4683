use super::*;

fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
    raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

fn triangles_area(points: &[Point], tris: &[[usize; 3]]) -> f64 {
    tris.iter()
        .map(|t| signed_area(&[points[t[0]], points[t[1]], points[t[2]]]).abs())
        .sum()
}

#[test]
fn centroid_and_bounds_of_square() {
    let sq = pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)]);
    assert_eq!(centroid(&sq), Some(Point::new(2.0, 1.0)));
    assert_eq!(bounding_box(&sq), Some(Rect::new(0.0, 0.0, 4.0, 2.0)));
    assert_eq!(centroid(&[]), None);
    assert_eq!(bounding_box(&[]), None);
}

#[test]
fn signed_area_flips_with_orientation() {
    let ccw = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
    let mut cw = ccw.clone();
    cw.reverse();
    assert_eq!(signed_area(&ccw), 1.0);
    assert_eq!(signed_area(&cw), -1.0);
}

#[test]
fn triangulate_square_covers_area() {
    let sq = pts(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
    let tris = triangulate(&sq);
    assert_eq!(tris.len(), 2);
    assert!((triangles_area(&sq, &tris) - 4.0).abs() < 1e-9);
}

#[test]
fn triangulate_concave_l_shape_preserves_area() {
    let l = pts(&[
        (0.0, 0.0),
        (3.0, 0.0),
        (3.0, 1.0),
        (1.0, 1.0),
        (1.0, 3.0),
        (0.0, 3.0),
    ]);
    let tris = triangulate(&l);
    assert_eq!(tris.len(), 4);
    assert!((triangles_area(&l, &tris) - signed_area(&l).abs()).abs() < 1e-9);

    let mut reversed = l.clone();
    reversed.reverse();
    let tris = triangulate(&reversed);
    assert!((triangles_area(&reversed, &tris) - 5.0).abs() < 1e-9);
}

#[test]
fn triangulate_rejects_short_input() {
    assert!(triangulate(&pts(&[(0.0, 0.0), (1.0, 0.0)])).is_empty());
}

#[test]
fn bowtie_is_not_simple() {
    let square = pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
    assert!(is_simple(&square));
    let bowtie = pts(&[(0.0, 0.0), (4.0, 4.0), (4.0, 0.0), (0.0, 4.0)]);
    assert!(!is_simple(&bowtie));
    let touching = pts(&[(0.0, 0.0), (4.0, 0.0), (2.0, 0.0), (2.0, 3.0)]);
    assert!(!is_simple(&touching));
    assert!(!is_simple(&pts(&[(0.0, 0.0), (1.0, 0.0)])));
}
