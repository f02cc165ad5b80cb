//! Per-edge sampling: rig setup, ground sampling and trajectory refinement
//!
//! An `EdgeSampler` places the jump trajectory of one action on one edge.
//! The rig frame has `az` running along the edge, `ay` pointing up and `ax`
//! pointing away from the walkable side, so spine x maps onto `ax` and spine
//! y onto `ay`.

use glam::Vec3;

use super::action::classify_action;
use super::compact_heightfield::CompactHeightfield;
use super::config::{ActionConfig, LinkBuilderConfig};
use super::edge::Edge;
use super::ground::{ground_sample_count, sample_ground_segment, GroundSegment};
use super::heightfield::Heightfield;
use super::link::JumpAction;
use super::trajectory::{update_trajectory_samples, Trajectory2D};
use navlink_common::{horizontal_direction, Error, Result};

/// Local frame of an edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rig {
    /// Edge start
    pub rigp: Vec3,
    /// Edge end
    pub rigq: Vec3,
    /// Outward axis, away from the walkable side
    pub ax: Vec3,
    /// Up axis
    pub ay: Vec3,
    /// Axis along the edge
    pub az: Vec3,
}

impl Rig {
    /// Builds the frame of an edge.
    ///
    /// Fails for edges without horizontal extent.
    pub fn from_edge(edge: &Edge) -> Result<Self> {
        let az = horizontal_direction(&(edge.sq - edge.sp)).ok_or_else(|| {
            Error::InvalidInput(format!(
                "edge {:?} -> {:?} has no horizontal extent",
                edge.sp, edge.sq
            ))
        })?;
        let ay = Vec3::Y;
        let ax = az.cross(ay);

        Ok(Self {
            rigp: edge.sp,
            rigq: edge.sq,
            ax,
            ay,
            az,
        })
    }

    /// Offsets both rig points by `x` along `ax` and `y` along `ay`
    pub fn offset(&self, x: f32, y: f32) -> (Vec3, Vec3) {
        let delta = self.ax * x + self.ay * y;
        (self.rigp + delta, self.rigq + delta)
    }
}

/// Transient sampling state of one edge for one action
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSampler {
    /// Action being sampled
    pub action: JumpAction,
    /// Edge frame
    pub rig: Rig,
    /// Jump trajectory with its clearance samples
    pub trajectory: Trajectory2D,
    /// Ground under the take-off points
    pub start: GroundSegment,
    /// Ground under the landing points
    pub end: GroundSegment,
    /// Vertical search range of the take-off ground
    pub start_range: f32,
    /// Vertical search range of the landing ground
    pub end_range: f32,
}

impl EdgeSampler {
    /// Places the trajectory of `action` on `edge`.
    ///
    /// The start and end segments are positioned but not sampled yet.
    pub fn new(edge: &Edge, action: &ActionConfig, config: &LinkBuilderConfig) -> Result<Self> {
        let rig = Rig::from_edge(edge)?;

        let mut trajectory = Trajectory2D::from_action(action, config.agent_radius);
        let (start_range, end_y, end_range) = match action {
            ActionConfig::JumpDown(c) => {
                let s = c.settings();
                let half_depth = s.jump_max_depth * 0.5;
                (
                    s.jump_ends_height_tolerance,
                    -half_depth,
                    half_depth + 2.0 * config.cell_height,
                )
            }
            ActionConfig::JumpOver(c) => {
                let s = c.settings();
                (
                    s.jump_ends_height_tolerance,
                    0.0,
                    s.jump_gap_height_tolerance,
                )
            }
        };
        trajectory.init_trajectory_samples(start_range, config);

        let (sp, sq) = rig.offset(trajectory.start().x, 0.0);
        let (ep, eq) = rig.offset(trajectory.end().x, end_y);

        Ok(Self {
            action: action.action(),
            rig,
            trajectory,
            start: empty_segment(sp, sq),
            end: empty_segment(ep, eq),
            start_range,
            end_range,
        })
    }

    /// Number of ground samples on each segment
    pub fn sample_count(&self) -> usize {
        self.start.samples.len()
    }

    /// Horizontal distance between neighbouring ground samples
    pub fn sample_spacing(&self) -> f32 {
        self.start.spacing()
    }
}

fn empty_segment(p: Vec3, q: Vec3) -> GroundSegment {
    GroundSegment {
        p,
        q,
        samples: Vec::new(),
        npass: 0,
    }
}

/// Runs the sampling pipeline of one edge.
///
/// Samples the ground at both ends of the jump, refines the trajectory
/// clearance with the ground heights and marks the start samples whose jump
/// is clear of the solid heightfield.
pub fn sample_edge(
    chf: &CompactHeightfield,
    solid: &Heightfield,
    edge: &Edge,
    action: &ActionConfig,
    config: &LinkBuilderConfig,
) -> Result<EdgeSampler> {
    let mut sampler = EdgeSampler::new(edge, action, config)?;

    let n = ground_sample_count(
        edge.length(),
        action.sampling_separation_factor(),
        config.cell_size,
    );
    let start = sample_ground_segment(
        chf,
        sampler.start.p,
        sampler.start.q,
        n,
        sampler.start_range,
    );
    let end = sample_ground_segment(chf, sampler.end.p, sampler.end.q, n, sampler.end_range);
    debug_assert_eq!(start.samples.len(), end.samples.len());

    sampler.trajectory =
        update_trajectory_samples(&sampler.trajectory, &start, &end, config.agent_climb);
    sampler.start = start;
    sampler.end = end;
    sampler.start = classify_action(solid, &sampler);

    log::trace!(
        "sample_edge: {:?} {} samples, ground {}/{}",
        sampler.action,
        n,
        sampler.start.npass,
        sampler.end.npass
    );

    Ok(sampler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JumpDownConfig, JumpDownSettings, JumpOverConfig, JumpOverSettings};

    fn edge_along_x() -> Edge {
        Edge {
            sp: Vec3::new(0.0, 10.0, 100.0),
            sq: Vec3::new(300.0, 10.0, 100.0),
        }
    }

    #[test]
    fn test_rig_axes() {
        let rig = Rig::from_edge(&edge_along_x()).unwrap();
        assert_eq!(rig.az, Vec3::X);
        assert_eq!(rig.ay, Vec3::Y);
        // Walkable side is to the left, so outward points to +z
        assert!(rig.ax.abs_diff_eq(Vec3::Z, 1e-6));

        let degenerate = Edge {
            sp: Vec3::new(1.0, 0.0, 1.0),
            sq: Vec3::new(1.0, 5.0, 1.0),
        };
        assert!(matches!(
            Rig::from_edge(&degenerate),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_jump_down_sampler_layout() {
        let action: ActionConfig = JumpDownConfig::new(JumpDownSettings::default())
            .unwrap()
            .into();
        let config = LinkBuilderConfig::default();
        let sampler = EdgeSampler::new(&edge_along_x(), &action, &config).unwrap();

        assert_eq!(sampler.action, JumpAction::Down);
        assert!(sampler.start.p.abs_diff_eq(Vec3::new(0.0, 10.0, 90.0), 1e-3));
        assert!(sampler.start.q.abs_diff_eq(Vec3::new(300.0, 10.0, 90.0), 1e-3));
        assert!(sampler.end.p.abs_diff_eq(Vec3::new(0.0, -65.0, 240.0), 1e-2));
        assert_eq!(sampler.start_range, 80.0);
        assert_eq!(sampler.end_range, 85.0);
        assert!(!sampler.trajectory.samples.is_empty());
        assert_eq!(sampler.sample_count(), 0);
    }

    #[test]
    fn test_jump_over_sampler_layout() {
        let action: ActionConfig = JumpOverConfig::new(JumpOverSettings::default())
            .unwrap()
            .into();
        let config = LinkBuilderConfig::default();
        let sampler = EdgeSampler::new(&edge_along_x(), &action, &config).unwrap();

        assert_eq!(sampler.action, JumpAction::Over);
        assert!(sampler.start.p.abs_diff_eq(Vec3::new(0.0, 10.0, 70.0), 1e-3));
        assert!(sampler.end.q.abs_diff_eq(Vec3::new(300.0, 10.0, 230.0), 1e-3));
        assert_eq!(sampler.end_range, 50.0);
    }
}
