//! Collision sweep of jump trajectories against the solid heightfield

use glam::Vec3;

use super::ground::GroundSegment;
use super::heightfield::Heightfield;
use super::link::JumpAction;
use super::sampler::EdgeSampler;
use super::trajectory::Trajectory2D;
use navlink_common::{sample_fraction, vlerp};

/// Tests whether the agent can follow `trajectory` from `pa` to `pb`.
///
/// The swept line is extended by the trajectory's radius overflow at both
/// ends along `dir`. Each trajectory slice is checked as a vertical range
/// over the interpolated point.
pub fn is_trajectory_clear(
    solid: &Heightfield,
    pa: Vec3,
    pb: Vec3,
    trajectory: &Trajectory2D,
    dir: Vec3,
) -> bool {
    let p = pa - dir * trajectory.radius_overflow;
    let q = pb + dir * trajectory.radius_overflow;
    let n = trajectory.samples.len();

    trajectory.samples.iter().enumerate().all(|(i, sample)| {
        let pt = vlerp(&p, &q, sample_fraction(i, n));
        !solid.check_collision(pt.x, pt.y + sample.ymin, pt.y + sample.ymax, pt.z)
    })
}

/// Marks the start samples whose jump is collision free.
///
/// Returns a copy of the sampler's start segment with `unrestricted` set for
/// every index where both ends found ground and the trajectory between them
/// is clear. Jump-down samples also need the landing strictly below the
/// take-off. Segments with different sample counts are returned unmarked.
pub fn classify_action(solid: &Heightfield, sampler: &EdgeSampler) -> GroundSegment {
    let mut start = sampler.start.clone();
    if start.samples.len() != sampler.end.samples.len() {
        return start;
    }

    for i in 0..start.samples.len() {
        let (Some(pa), Some(pb)) = (start.ground_point(i), sampler.end.ground_point(i)) else {
            continue;
        };
        if sampler.action == JumpAction::Down && pb.y >= pa.y {
            continue;
        }
        start.samples[i].unrestricted =
            is_trajectory_clear(solid, pa, pb, &sampler.trajectory, sampler.rig.ax);
    }

    start
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_SPINE;
    use crate::ground::GroundSample;
    use crate::sampler::Rig;
    use crate::trajectory::TrajectorySample;
    use glam::Vec2;

    fn flat_trajectory(n: usize) -> Trajectory2D {
        Trajectory2D {
            spine: [Vec2::ZERO; MAX_SPINE],
            radius_overflow: 1.0,
            samples: vec![
                TrajectorySample {
                    ymin: 1.0,
                    ymax: 3.0,
                    floor_start: false,
                    floor_end: false,
                };
                n
            ],
        }
    }

    fn solid() -> Heightfield {
        Heightfield::new(
            10,
            10,
            Vec3::ZERO,
            Vec3::new(10.0, 10.0, 10.0),
            1.0,
            1.0,
        )
    }

    #[test]
    fn test_trajectory_clear_and_blocked() {
        let mut hf = solid();
        let traj = flat_trajectory(9);
        let pa = Vec3::new(2.5, 0.0, 5.5);
        let pb = Vec3::new(6.5, 0.0, 5.5);

        assert!(is_trajectory_clear(&hf, pa, pb, &traj, Vec3::X));

        // Obstacle inside the swept band
        hf.add_span(4, 5, 0, 2, 1).unwrap();
        assert!(!is_trajectory_clear(&hf, pa, pb, &traj, Vec3::X));
    }

    #[test]
    fn test_trajectory_overflow_reaches_obstacle() {
        let mut hf = solid();
        // Just behind the take-off point, only reached by the radius overflow
        hf.add_span(1, 5, 2, 2, 1).unwrap();
        let traj = flat_trajectory(9);
        let pa = Vec3::new(2.5, 0.0, 5.5);
        let pb = Vec3::new(6.5, 0.0, 5.5);

        assert!(!is_trajectory_clear(&hf, pa, pb, &traj, Vec3::X));

        let mut short = traj.clone();
        short.radius_overflow = 0.0;
        assert!(is_trajectory_clear(&hf, pa, pb, &short, Vec3::X));
    }

    fn segment(z: f32, heights: &[Option<f32>]) -> GroundSegment {
        GroundSegment {
            p: Vec3::new(2.5, 0.0, z),
            q: Vec3::new(7.5, 0.0, z),
            samples: heights
                .iter()
                .map(|&height| GroundSample {
                    height,
                    unrestricted: false,
                })
                .collect(),
            npass: heights.iter().filter(|h| h.is_some()).count(),
        }
    }

    fn sampler(action: JumpAction, start: &[Option<f32>], end: &[Option<f32>]) -> EdgeSampler {
        EdgeSampler {
            action,
            rig: Rig {
                rigp: Vec3::new(2.5, 0.0, 3.0),
                rigq: Vec3::new(7.5, 0.0, 3.0),
                ax: Vec3::Z,
                ay: Vec3::Y,
                az: Vec3::X,
            },
            trajectory: flat_trajectory(5),
            start: segment(2.5, start),
            end: segment(7.5, end),
            start_range: 1.0,
            end_range: 1.0,
        }
    }

    fn unrestricted(segment: &GroundSegment) -> Vec<bool> {
        segment.samples.iter().map(|s| s.unrestricted).collect()
    }

    #[test]
    fn test_classify_action_requires_ground_on_both_ends() {
        let hf = solid();
        let sampler = sampler(
            JumpAction::Down,
            &[Some(0.0), Some(0.0), None],
            &[Some(-1.0), None, Some(-1.0)],
        );

        let classified = classify_action(&hf, &sampler);
        assert_eq!(unrestricted(&classified), vec![true, false, false]);
        // The sampler itself is not modified
        assert!(sampler.start.samples.iter().all(|s| !s.unrestricted));

        let mut mismatched = sampler.clone();
        mismatched.end.samples.pop();
        assert_eq!(classify_action(&hf, &mismatched), mismatched.start);
    }

    #[test]
    fn test_jump_down_needs_lower_landing() {
        let hf = solid();
        let start = [Some(0.0), Some(0.0), Some(0.0)];
        let end = [Some(-1.0), Some(0.0), Some(1.5)];

        let down = classify_action(&hf, &sampler(JumpAction::Down, &start, &end));
        assert_eq!(unrestricted(&down), vec![true, false, false]);

        // Jumps over a gap may land at any height
        let over = classify_action(&hf, &sampler(JumpAction::Over, &start, &end));
        assert_eq!(unrestricted(&over), vec![true, true, true]);
    }
}
