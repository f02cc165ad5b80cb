//! Vector utilities

use glam::Vec3;

/// Calculates the distance between two points
#[inline]
pub fn distance(a: &Vec3, b: &Vec3) -> f32 {
    (*b - *a).length()
}

/// Calculates the squared distance between a point and a line segment
pub fn distance_point_segment_squared(p: &Vec3, a: &Vec3, b: &Vec3) -> f32 {
    (*p - closest_point_on_segment(p, a, b)).length_squared()
}

/// Finds the closest point on a line segment to a given point
pub fn closest_point_on_segment(p: &Vec3, a: &Vec3, b: &Vec3) -> Vec3 {
    let ab = *b - *a;
    let ap = *p - *a;

    let ab_len_sq = ab.length_squared();

    // If the line segment is just a point, return that point
    if ab_len_sq < f32::EPSILON {
        return *a;
    }

    let t = ap.dot(ab) / ab_len_sq;

    if t < 0.0 {
        *a
    } else if t > 1.0 {
        *b
    } else {
        *a + ab * t
    }
}

/// Returns the horizontal (XZ) part of a vector, normalized.
///
/// Returns `None` when the vector has no horizontal extent.
pub fn horizontal_direction(v: &Vec3) -> Option<Vec3> {
    let flat = Vec3::new(v.x, 0.0, v.z);
    let len = flat.length();
    if len <= f32::EPSILON {
        None
    } else {
        Some(flat / len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_point_segment_squared() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(10.0, 0.0, 0.0);

        // Perpendicular projection inside the segment
        let d = distance_point_segment_squared(&Vec3::new(5.0, 3.0, 0.0), &a, &b);
        assert!((d - 9.0).abs() < 1e-5);

        // Beyond the end points
        let d = distance_point_segment_squared(&Vec3::new(-2.0, 0.0, 0.0), &a, &b);
        assert!((d - 4.0).abs() < 1e-5);
        let d = distance_point_segment_squared(&Vec3::new(13.0, 4.0, 0.0), &a, &b);
        assert!((d - 25.0).abs() < 1e-5);

        // Degenerate segment
        let d = distance_point_segment_squared(&Vec3::new(1.0, 1.0, 1.0), &a, &a);
        assert!((d - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_horizontal_direction() {
        let dir = horizontal_direction(&Vec3::new(3.0, 7.0, 4.0)).unwrap();
        assert!((dir - Vec3::new(0.6, 0.0, 0.8)).length() < 1e-6);
        assert!(horizontal_direction(&Vec3::new(0.0, 5.0, 0.0)).is_none());
    }
}
