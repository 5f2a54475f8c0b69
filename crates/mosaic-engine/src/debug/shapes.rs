//! Pure geometry for debug shapes. Angles are in degrees, counter-clockwise.

use glam::Vec2;

/// Segments used to approximate a circle.
pub const CIRCLE_SEGMENTS: usize = 32;

/// Rotates `point` about `center`.
pub fn rotate_about(point: Vec2, center: Vec2, degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let d = point - center;
    center + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// Box corners in outline order, starting bottom-left and going clockwise.
pub fn box_corners(center: Vec2, dimensions: Vec2, rotation: f32) -> [Vec2; 4] {
    let half = dimensions / 2.0;
    let (min, max) = (center - half, center + half);
    let corners = [
        Vec2::new(min.x, min.y),
        Vec2::new(min.x, max.y),
        Vec2::new(max.x, max.y),
        Vec2::new(max.x, min.y),
    ];
    if rotation == 0.0 {
        corners
    } else {
        corners.map(|c| rotate_about(c, center, rotation))
    }
}

/// Vertices of a regular polygon. The first vertex sits at angle `rotation`
/// on the circle of `radius` around `center`.
pub fn polygon_points(center: Vec2, radius: f32, edges: usize, rotation: f32) -> Vec<Vec2> {
    if edges == 0 {
        return Vec::new();
    }
    let increment = 360.0 / edges as f32;
    (0..edges)
        .map(|i| {
            let p = center + rotate_about(Vec2::new(radius, 0.0), Vec2::ZERO, increment * i as f32);
            if rotation == 0.0 {
                p
            } else {
                rotate_about(p, center, rotation)
            }
        })
        .collect()
}

/// Segments joining consecutive points, closing back to the first.
pub fn closed_loop(points: &[Vec2]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    points
        .iter()
        .enumerate()
        .map(|(i, &p)| (p, points[(i + 1) % points.len()]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        a.abs_diff_eq(b, 1e-4)
    }

    #[test]
    fn rotate_quarter_turn() {
        let p = rotate_about(Vec2::new(2.0, 1.0), Vec2::new(1.0, 1.0), 90.0);
        assert!(close(p, Vec2::new(1.0, 2.0)));
    }

    #[test]
    fn axis_aligned_box() {
        let c = box_corners(Vec2::new(10.0, 10.0), Vec2::new(4.0, 2.0), 0.0);
        assert_eq!(
            c,
            [
                Vec2::new(8.0, 9.0),
                Vec2::new(8.0, 11.0),
                Vec2::new(12.0, 11.0),
                Vec2::new(12.0, 9.0),
            ]
        );
    }

    #[test]
    fn rotated_box_keeps_center_distance() {
        let center = Vec2::new(3.0, -2.0);
        for corner in box_corners(center, Vec2::new(6.0, 8.0), 37.0) {
            assert!((corner.distance(center) - 5.0).abs() < 1e-4);
        }
    }

    #[test]
    fn square_polygon_points() {
        let p = polygon_points(Vec2::ZERO, 1.0, 4, 0.0);
        let expected = [Vec2::X, Vec2::Y, -Vec2::X, -Vec2::Y];
        assert!(p.iter().zip(expected).all(|(a, b)| close(*a, b)));
    }

    #[test]
    fn polygon_rotation_moves_first_vertex() {
        let p = polygon_points(Vec2::new(5.0, 5.0), 2.0, 3, 90.0);
        assert!(close(p[0], Vec2::new(5.0, 7.0)));
    }

    #[test]
    fn loop_closes() {
        let pts = [Vec2::ZERO, Vec2::X, Vec2::Y];
        let segs: Vec<_> = closed_loop(&pts).collect();
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[2], (Vec2::Y, Vec2::ZERO));
    }

    #[test]
    fn zero_edges_is_empty() {
        assert!(polygon_points(Vec2::ZERO, 1.0, 0, 0.0).is_empty());
    }
}
