//! Conversion of jump links into off-mesh connections
//!
//! Navigation mesh bakers consume links as point-to-point connections with a
//! radius, poly flags and an area id per traversal direction.

use glam::Vec3;

use super::config::{JumpDownConfig, LinkBuilderFlags, MAX_SPINE};
use super::link::{JumpAction, JumpLink};

/// Traversal direction of an off-mesh connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum LinkDirection {
    /// From the take-off down to the landing
    Down,
    /// From the landing back up to the take-off
    Up,
}

/// A one-way point-to-point connection
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct OffMeshLink {
    /// Where the connection is entered
    pub start: Vec3,
    /// Where the connection is left
    pub end: Vec3,
    /// Connection radius
    pub radius: f32,
    /// Poly flags of the connection
    pub flags: u16,
    /// Area id of the connection
    pub area: u8,
    /// Traversal direction
    pub direction: LinkDirection,
    /// Index of the jump link in the exported slice
    pub user_id: u32,
}

/// Exports the valid jump-down links as off-mesh connections.
///
/// `link_builder_flags` selects a connection through the middle of each link
/// and/or one along each of its spines. With `BIDIRECTIONAL` every downward
/// connection gets an upward twin.
pub fn export_off_mesh_links(
    links: &[JumpLink],
    config: &JumpDownConfig,
    agent_radius: f32,
) -> Vec<OffMeshLink> {
    let settings = config.settings();
    let flags = settings.link_builder_flags;
    let mut out = Vec::new();

    for (index, link) in links.iter().enumerate() {
        if !link.is_valid() || link.action != JumpAction::Down {
            continue;
        }

        let mut segments = Vec::with_capacity(3);
        if flags.contains(LinkBuilderFlags::CREATE_CENTER_POINT_LINK) {
            segments.push((link.start_center(), link.end_center()));
        }
        if flags.contains(LinkBuilderFlags::CREATE_EXTREMITY_LINK) {
            for spine in [&link.spine0, &link.spine1] {
                segments.push((spine[0], spine[MAX_SPINE - 1]));
            }
        }

        for (start, end) in segments {
            let user_id = index as u32;
            out.push(OffMeshLink {
                start,
                end,
                radius: agent_radius,
                flags: settings.down_dir_poly_flag,
                area: settings.down_dir_area,
                direction: LinkDirection::Down,
                user_id,
            });

            if flags.contains(LinkBuilderFlags::BIDIRECTIONAL) {
                out.push(OffMeshLink {
                    start: end,
                    end: start,
                    radius: agent_radius,
                    flags: settings.up_dir_poly_flag,
                    area: settings.up_dir_area,
                    direction: LinkDirection::Up,
                    user_id,
                });
            }
        }
    }

    log::debug!(
        "export_off_mesh_links: {} connections from {} links",
        out.len(),
        links.len()
    );

    out
}
