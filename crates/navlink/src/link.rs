//! Jump links and their construction from classified edge samples

use std::ops::Range;

use glam::Vec3;

use super::config::{LinkBuilderConfig, MAX_SPINE};
use super::sampler::EdgeSampler;
use navlink_common::{distance, lerp, vlerp};

/// Radius of the median filter smoothing the clear flags
const MEDIAN_RADIUS: usize = 2;

/// Kind of jump a link represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum JumpAction {
    /// Drop down from a ledge
    Down,
    /// Jump across a gap
    Over,
}

/// Whether a link survived overlap filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum LinkState {
    /// The link is usable
    Valid,
    /// The link duplicates a wider one
    Filtered,
}

/// A jump link bounded by two parallel spines
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct JumpLink {
    /// Spine along the near lateral bound of the link
    pub spine0: [Vec3; MAX_SPINE],
    /// Spine along the far lateral bound of the link
    pub spine1: [Vec3; MAX_SPINE],
    /// Filtering state
    pub state: LinkState,
    /// Jump kind
    pub action: JumpAction,
    /// Index of the edge the link was built from
    pub source_edge: Option<usize>,
}

impl JumpLink {
    /// Whether the link is still valid
    pub fn is_valid(&self) -> bool {
        self.state == LinkState::Valid
    }

    /// Lateral width of the link at its take-off
    pub fn width(&self) -> f32 {
        distance(&self.spine0[0], &self.spine1[0])
    }

    /// Midpoint of the take-off
    pub fn start_center(&self) -> Vec3 {
        vlerp(&self.spine0[0], &self.spine1[0], 0.5)
    }

    /// Midpoint of the landing
    pub fn end_center(&self) -> Vec3 {
        vlerp(&self.spine0[MAX_SPINE - 1], &self.spine1[MAX_SPINE - 1], 0.5)
    }
}

/// Median filter over boolean flags.
///
/// Each output flag is the majority of the `2 * radius + 1` input flags
/// centred on it, with indices clamped to the slice.
pub fn median_filter(flags: &[bool], radius: usize) -> Vec<bool> {
    let n = flags.len();
    if n == 0 {
        return Vec::new();
    }

    (0..n)
        .map(|i| {
            let set = (0..=2 * radius)
                .filter(|&k| {
                    let j = (i + k).saturating_sub(radius).min(n - 1);
                    flags[j]
                })
                .count();
            set > radius
        })
        .collect()
}

/// Maximal runs of set flags
pub fn find_runs(flags: &[bool]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = None;

    for (i, &flag) in flags.iter().enumerate() {
        match (flag, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(s..flags.len());
    }

    runs
}

/// Converts the clear runs of a sampled edge into jump links.
///
/// Runs are trimmed to samples with ground at both ends, and only runs at
/// least `agent_radius` wide produce a link.
pub fn build_edge_links(sampler: &EdgeSampler, config: &LinkBuilderConfig) -> Vec<JumpLink> {
    let n = sampler.start.samples.len();
    if n < 2 || n != sampler.end.samples.len() {
        return Vec::new();
    }

    let flags: Vec<bool> = sampler.start.samples.iter().map(|s| s.unrestricted).collect();
    let smoothed = median_filter(&flags, MEDIAN_RADIUS);
    let spacing = sampler.sample_spacing();

    let has_ground = |i: usize| {
        sampler.start.samples[i].has_ground() && sampler.end.samples[i].has_ground()
    };

    let mut links = Vec::new();
    for run in find_runs(&smoothed) {
        let Some(first) = run.clone().find(|&i| has_ground(i)) else {
            continue;
        };
        let Some(last) = run.clone().rev().find(|&i| has_ground(i)) else {
            continue;
        };

        let width = (last - first) as f32 * spacing;
        if width < config.agent_radius {
            continue;
        }

        if let (Some(spine0), Some(spine1)) = (
            link_spine(sampler, first, config.agent_climb),
            link_spine(sampler, last, config.agent_climb),
        ) {
            links.push(JumpLink {
                spine0,
                spine1,
                state: LinkState::Valid,
                action: sampler.action,
                source_edge: None,
            });
        }
    }

    links
}

/// Places the trajectory spine between the ground points of sample `i`
fn link_spine(sampler: &EdgeSampler, i: usize, climb: f32) -> Option<[Vec3; MAX_SPINE]> {
    let sp = sampler.start.ground_point(i)?;
    let ep = sampler.end.ground_point(i)?;

    let traj = &sampler.trajectory;
    let (start, end) = (traj.start(), traj.end());
    let dx = end.x - start.x;

    Some(std::array::from_fn(|k| {
        let pt = traj.spine[k];
        let t = if dx.abs() > f32::EPSILON {
            (pt.x - start.x) / dx
        } else {
            0.0
        };
        let lift = pt.y - lerp(start.y, end.y, t) + climb;
        vlerp(&sp, &ep, t) + sampler.rig.ay * lift
    }))
}
