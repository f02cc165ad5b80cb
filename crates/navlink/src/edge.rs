//! Boundary edge extraction from a contour set

use glam::Vec3;

use super::contour::{ContourSet, ContourVertex};
use navlink_common::{Error, Result};

/// A world-space boundary segment that may start a jump
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Edge {
    /// Segment start
    pub sp: Vec3,
    /// Segment end
    pub sq: Vec3,
}

impl Edge {
    /// Horizontal length of the edge
    pub fn length(&self) -> f32 {
        Vec3::new(self.sq.x - self.sp.x, 0.0, self.sq.z - self.sp.z).length()
    }
}

/// World position of a contour vertex, raised two voxels above the floor
fn edge_point(cset: &ContourSet, v: &ContourVertex) -> Vec3 {
    Vec3::new(
        cset.bmin.x + v.x as f32 * cset.cs,
        cset.bmin.y + (v.y + 2) as f32 * cset.ch,
        cset.bmin.z + v.z as f32 * cset.cs,
    )
}

/// Extracts the solid boundary segments of a contour set.
///
/// A segment qualifies when it is not a portal and no other contour has a
/// segment with the same end points. Segments without horizontal extent are
/// skipped.
pub fn find_edges(cset: &ContourSet) -> Result<Vec<Edge>> {
    if cset.vertex_count() == 0 {
        log::error!("find_edges: contour set has no vertices");
        return Err(Error::NoContours);
    }

    let mut edges = Vec::new();

    for (ci, contour) in cset.contours.iter().enumerate() {
        for (vk, vj) in contour.segments() {
            if vk.is_portal() {
                continue;
            }

            let shared = cset
                .contours
                .iter()
                .enumerate()
                .any(|(oi, other)| oi != ci && other.has_segment(vk, vj));
            if shared {
                continue;
            }

            let edge = Edge {
                sp: edge_point(cset, vk),
                sq: edge_point(cset, vj),
            };
            if edge.length() <= f32::EPSILON {
                continue;
            }
            edges.push(edge);
        }
    }

    if edges.is_empty() {
        log::error!(
            "find_edges: no boundary edges in {} contours",
            cset.contours.len()
        );
        return Err(Error::NoEdges);
    }

    log::debug!(
        "find_edges: {} edges from {} contours",
        edges.len(),
        cset.contours.len()
    );

    Ok(edges)
}
