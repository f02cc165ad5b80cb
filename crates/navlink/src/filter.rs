//! Suppression of near-duplicate jump links

use glam::Vec3;

use super::config::MAX_SPINE;
use super::link::{JumpAction, JumpLink, LinkState};
use navlink_common::distance_point_segment_squared;

/// Whether both points lie within `sqr_threshold` of the segment `a..b`
fn near_segment(p0: &Vec3, p1: &Vec3, a: &Vec3, b: &Vec3, sqr_threshold: f32) -> bool {
    distance_point_segment_squared(p0, a, b) < sqr_threshold
        && distance_point_segment_squared(p1, a, b) < sqr_threshold
}

/// Whether the ends of `other` lie along the ends of `link`
fn overlaps(link: &JumpLink, other: &JumpLink, sqr_threshold: f32) -> bool {
    let last = MAX_SPINE - 1;
    near_segment(
        &other.spine0[0],
        &other.spine1[0],
        &link.spine0[0],
        &link.spine1[0],
        sqr_threshold,
    ) && near_segment(
        &other.spine0[last],
        &other.spine1[last],
        &link.spine0[last],
        &link.spine1[last],
        sqr_threshold,
    )
}

/// Marks links that overlap a wider link as filtered.
///
/// Links are compared pairwise in order. When the take-off and landing of a
/// later link both lie within `distance_threshold` of an earlier one, the
/// narrower of the two is filtered, the later one on ties. Filtered links
/// stay in the slice. Returns the number of newly filtered links.
pub fn filter_overlapping_links(links: &mut [JumpLink], distance_threshold: f32) -> usize {
    let indices: Vec<usize> = (0..links.len()).collect();
    filter_indices(links, &indices, distance_threshold)
}

/// Same as `filter_overlapping_links`, restricted to the links of `action`.
///
/// Links of other actions are neither compared nor modified.
pub fn filter_action_links(
    links: &mut [JumpLink],
    action: JumpAction,
    distance_threshold: f32,
) -> usize {
    let indices: Vec<usize> = links
        .iter()
        .enumerate()
        .filter(|(_, link)| link.action == action)
        .map(|(i, _)| i)
        .collect();
    filter_indices(links, &indices, distance_threshold)
}

fn filter_indices(links: &mut [JumpLink], indices: &[usize], distance_threshold: f32) -> usize {
    let sqr_threshold = distance_threshold * distance_threshold;
    let mut filtered = 0;

    for (a, &i) in indices.iter().enumerate() {
        if !links[i].is_valid() {
            continue;
        }

        for &j in &indices[a + 1..] {
            if !links[j].is_valid() {
                continue;
            }
            if !overlaps(&links[i], &links[j], sqr_threshold) {
                continue;
            }

            filtered += 1;
            if links[i].width() > links[j].width() {
                links[j].state = LinkState::Filtered;
            } else if links[i].width() < links[j].width() {
                links[i].state = LinkState::Filtered;
                break;
            } else {
                links[j].state = LinkState::Filtered;
            }
        }
    }

    if filtered > 0 {
        log::debug!("filter_overlapping_links: filtered {} links", filtered);
    }

    filtered
}
