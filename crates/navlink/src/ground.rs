//! Ground sampling along straight segments

use glam::Vec3;

use super::compact_heightfield::CompactHeightfield;
use navlink_common::{sample_fraction, vlerp};

/// One probed point along a ground segment
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroundSample {
    /// Height of the ground found under the point
    pub height: Option<f32>,
    /// The jump starting at this sample is clear of obstacles
    pub unrestricted: bool,
}

impl GroundSample {
    /// Whether ground was found for this sample
    pub fn has_ground(&self) -> bool {
        self.height.is_some()
    }
}

/// Ground samples taken along the segment `p..q`
#[derive(Debug, Clone, PartialEq)]
pub struct GroundSegment {
    /// Segment start
    pub p: Vec3,
    /// Segment end
    pub q: Vec3,
    /// Samples evenly spaced from `p` to `q`
    pub samples: Vec<GroundSample>,
    /// Number of samples that found ground
    pub npass: usize,
}

impl GroundSegment {
    /// Position of sample `i` with its height replaced by the sampled ground.
    ///
    /// Returns None when the sample found no ground.
    pub fn ground_point(&self, i: usize) -> Option<Vec3> {
        let height = self.samples.get(i)?.height?;
        let mut point = vlerp(&self.p, &self.q, sample_fraction(i, self.samples.len()));
        point.y = height;
        Some(point)
    }

    /// Horizontal distance between two neighbouring samples
    pub fn spacing(&self) -> f32 {
        let len = Vec3::new(self.q.x - self.p.x, 0.0, self.q.z - self.p.z).length();
        if self.samples.len() < 2 {
            0.0
        } else {
            len / (self.samples.len() - 1) as f32
        }
    }
}

/// Number of ground samples for an edge of length `edge_len`
pub fn ground_sample_count(edge_len: f32, separation_factor: f32, cell_size: f32) -> usize {
    let spacing = separation_factor * cell_size;
    if spacing <= 0.0 {
        return 2;
    }
    ((edge_len / spacing).ceil() as usize).max(2)
}

/// Samples the ground at `n` evenly spaced points from `p` to `q`, looking
/// within `range` above and below each point.
pub fn sample_ground_segment(
    chf: &CompactHeightfield,
    p: Vec3,
    q: Vec3,
    n: usize,
    range: f32,
) -> GroundSegment {
    let samples: Vec<_> = (0..n)
        .map(|i| {
            let point = vlerp(&p, &q, sample_fraction(i, n));
            GroundSample {
                height: chf.find_ground_height(point, range),
                unrestricted: false,
            }
        })
        .collect();
    let npass = samples.iter().filter(|s| s.has_ground()).count();

    GroundSegment {
        p,
        q,
        samples,
        npass,
    }
}
