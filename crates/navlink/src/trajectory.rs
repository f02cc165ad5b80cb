//! Jump trajectories in the local 2D frame of an edge
//!
//! A trajectory is described by a spine of `MAX_SPINE` points, with x the
//! distance from the edge along the outward axis and y the height relative to
//! the take-off. The spine is resampled into clearance samples that give, for
//! each slice of the jump, the vertical band the agent sweeps through.

use glam::Vec2;

use super::config::{ActionConfig, JumpDownConfig, JumpOverConfig, LinkBuilderConfig, MAX_SPINE};
use super::ground::GroundSegment;
use navlink_common::{lerp, profile_height, sample_fraction};

/// Clearance band of one trajectory slice, relative to the straight line
/// between the take-off and landing ground points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    /// Bottom of the swept band
    pub ymin: f32,
    /// Top of the swept band
    pub ymax: f32,
    /// The slice stands on the take-off floor
    pub floor_start: bool,
    /// The slice may stand on the landing floor
    pub floor_end: bool,
}

/// Height profile of a jump together with its clearance samples
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory2D {
    /// Spine points sorted by x
    pub spine: [Vec2; MAX_SPINE],
    /// Distance added before and after the spine when sweeping the agent
    pub radius_overflow: f32,
    /// Clearance samples, empty until `init_trajectory_samples` runs
    pub samples: Vec<TrajectorySample>,
}

impl Trajectory2D {
    /// Builds the parabolic spine of a jump-down action
    pub fn jump_down(config: &JumpDownConfig, radius_overflow: f32) -> Self {
        let settings = config.settings();
        let spine = std::array::from_fn(|i| {
            let u = sample_fraction(i, MAX_SPINE) * settings.jump_length;
            let x = u - settings.jump_distance_from_edge;
            Vec2::new(x, config.height_at(x))
        });

        Self {
            spine,
            radius_overflow,
            samples: Vec::new(),
        }
    }

    /// Builds the symmetric arc of a jump-over action
    pub fn jump_over(config: &JumpOverConfig, radius_overflow: f32) -> Self {
        let reach = config.settings().jump_distance_from_gap_center;
        let x0 = config.gap_center() - reach;
        let x1 = config.gap_center() + reach;
        let spine = std::array::from_fn(|i| {
            let x = lerp(x0, x1, sample_fraction(i, MAX_SPINE));
            Vec2::new(x, config.height_at(x))
        });

        Self {
            spine,
            radius_overflow,
            samples: Vec::new(),
        }
    }

    /// Builds the spine matching an action configuration
    pub fn from_action(action: &ActionConfig, radius_overflow: f32) -> Self {
        match action {
            ActionConfig::JumpDown(config) => Self::jump_down(config, radius_overflow),
            ActionConfig::JumpOver(config) => Self::jump_over(config, radius_overflow),
        }
    }

    /// First spine point (take-off)
    pub fn start(&self) -> Vec2 {
        self.spine[0]
    }

    /// Last spine point (landing)
    pub fn end(&self) -> Vec2 {
        self.spine[MAX_SPINE - 1]
    }

    /// Spine height at `x`, clamped to the end points outside the spine
    pub fn height_at(&self, x: f32) -> f32 {
        profile_height(x, &self.spine)
    }

    /// Resamples the spine into clearance samples.
    ///
    /// Samples cover `[x0 - r, xN + r]` with `r = radius_overflow`, at least
    /// two of them and roughly one per cell. `ground_range` is how far above
    /// the landing height ground can still be expected.
    pub fn init_trajectory_samples(&mut self, ground_range: f32, config: &LinkBuilderConfig) {
        let r = self.radius_overflow;
        let start = self.start();
        let end = self.end();
        let xa = start.x - r;
        let xb = end.x + r;
        let extent = xb - xa;

        let n = ((extent / config.cell_size).ceil() as usize).max(2);
        let dx = extent / (n - 1) as f32;
        let floor_reach = if dx > 0.0 { (r / dx).ceil() * dx } else { 0.0 };

        self.samples = (0..n)
            .map(|i| {
                let t = sample_fraction(i, n);
                let x = lerp(xa, xb, t);
                let base = lerp(start.y, end.y, t);

                let probes = [self.height_at(x - r), self.height_at(x), self.height_at(x + r)];
                let lo = probes.iter().copied().fold(f32::INFINITY, f32::min);
                let hi = probes.iter().copied().fold(f32::NEG_INFINITY, f32::max);

                TrajectorySample {
                    ymin: lo - base + config.agent_climb,
                    ymax: hi - base + config.agent_height,
                    floor_start: x <= start.x + floor_reach,
                    floor_end: x >= end.x - floor_reach || lo < end.y + ground_range,
                }
            })
            .collect();
    }
}

/// Refines the clearance samples of `trajectory` with the ground found at the
/// start and end of the jump.
///
/// Samples standing on a floor get their bottom lifted (or lowered) to
/// `agent_climb` above the sampled ground, taking the highest requirement
/// over every sample pair where both ends found ground. Segments with
/// different sample counts leave the trajectory unchanged.
pub fn update_trajectory_samples(
    trajectory: &Trajectory2D,
    start: &GroundSegment,
    end: &GroundSegment,
    agent_climb: f32,
) -> Trajectory2D {
    let mut refined = trajectory.clone();
    if start.samples.len() != end.samples.len() {
        return refined;
    }

    let pairs: Vec<(f32, f32)> = start
        .samples
        .iter()
        .zip(&end.samples)
        .filter_map(|(s, e)| Some((s.height?, e.height?)))
        .collect();
    if pairs.is_empty() {
        return refined;
    }

    let n = refined.samples.len();
    for (j, sample) in refined.samples.iter_mut().enumerate() {
        if !sample.floor_start && !sample.floor_end {
            continue;
        }

        let t = sample_fraction(j, n);
        let mut ymin = f32::NEG_INFINITY;
        for &(hs, he) in &pairs {
            let line = lerp(hs, he, t);
            if sample.floor_start {
                ymin = ymin.max(hs - line + agent_climb);
            }
            if sample.floor_end {
                ymin = ymin.max(he - line + agent_climb);
            }
        }

        sample.ymin = ymin;
        sample.ymax = sample.ymax.max(ymin);
    }

    refined
}
