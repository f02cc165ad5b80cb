//! Scalar math utilities

use glam::{Vec2, Vec3};

/// Linear interpolation between two values
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Vector linear interpolation
#[inline]
pub fn vlerp(v1: &Vec3, v2: &Vec3, t: f32) -> Vec3 {
    v1.lerp(*v2, t)
}

/// Fraction of sample `i` out of `count` evenly spaced samples, in `[0, 1]`.
///
/// A single sample sits at `0.0`.
#[inline]
pub fn sample_fraction(i: usize, count: usize) -> f32 {
    if count < 2 {
        0.0
    } else {
        i as f32 / (count - 1) as f32
    }
}

/// Evaluates a piecewise linear profile at `x`.
///
/// `pts` must be sorted by x. Values outside the profile are clamped to the
/// first or last point.
pub fn profile_height(x: f32, pts: &[Vec2]) -> f32 {
    let (Some(first), Some(last)) = (pts.first(), pts.last()) else {
        return 0.0;
    };

    if x <= first.x {
        return first.y;
    }
    if x >= last.x {
        return last.y;
    }

    for w in pts.windows(2) {
        let (p, q) = (w[0], w[1]);
        if x <= q.x {
            let dx = q.x - p.x;
            if dx <= f32::EPSILON {
                return q.y;
            }
            return lerp(p.y, q.y, (x - p.x) / dx);
        }
    }

    last.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_fraction() {
        assert_eq!(sample_fraction(0, 1), 0.0);
        assert_eq!(sample_fraction(0, 5), 0.0);
        assert_eq!(sample_fraction(4, 5), 1.0);
        assert!((sample_fraction(1, 3) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_profile_height_clamps_and_interpolates() {
        let pts = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(20.0, -10.0),
        ];

        assert_eq!(profile_height(-5.0, &pts), 0.0);
        assert_eq!(profile_height(25.0, &pts), -10.0);
        assert!((profile_height(5.0, &pts) - 5.0).abs() < 1e-6);
        assert!((profile_height(15.0, &pts) - 0.0).abs() < 1e-6);
        assert_eq!(profile_height(3.0, &[]), 0.0);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
        assert_eq!(vlerp(&Vec3::ZERO, &Vec3::new(2.0, 4.0, 6.0), 0.25), Vec3::new(0.5, 1.0, 1.5));
    }
}
