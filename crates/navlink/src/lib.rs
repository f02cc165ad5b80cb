//! Jump-link generation for navigation meshes
//!
//! Finds places where an agent can jump down from a ledge or jump over a gap
//! between walkable surfaces of a voxelized scene, and describes each such
//! place as a `JumpLink`. The inputs are the solid heightfield, its compact
//! walkable floors and the contours of the walkable regions.

mod action;
mod builder;
mod compact_heightfield;
mod config;
mod context;
mod contour;
mod edge;
mod filter;
mod ground;
mod heightfield;
mod link;
mod off_mesh;
mod sampler;
mod scene;
mod trajectory;

pub use action::{classify_action, is_trajectory_clear};
pub use builder::{BuilderState, NavLinkBuilder};
pub use compact_heightfield::{
    CompactCell, CompactHeightfield, CompactSpan, NULL_AREA, WALKABLE_AREA,
};
pub use config::{
    ActionConfig, JumpDownConfig, JumpDownSettings, JumpOverConfig, JumpOverSettings,
    LinkBuilderConfig, LinkBuilderFlags, MAX_SPINE,
};
pub use context::{
    BuildContext, BuildCounters, LogEntry, LogLevel, ProgressInfo, TimerCategory, TimerEntry,
};
pub use contour::{Contour, ContourSet, ContourVertex, CONTOUR_DIR_MASK};
pub use edge::{find_edges, Edge};
pub use filter::{filter_action_links, filter_overlapping_links};
pub use ground::{ground_sample_count, sample_ground_segment, GroundSample, GroundSegment};
pub use heightfield::{ColumnIter, Heightfield, Span};
pub use link::{build_edge_links, find_runs, median_filter, JumpAction, JumpLink, LinkState};
pub use off_mesh::{export_off_mesh_links, LinkDirection, OffMeshLink};
pub use sampler::{sample_edge, EdgeSampler, Rig};
pub use scene::{BoxScene, Platform, SceneData};
pub use trajectory::{update_trajectory_samples, Trajectory2D, TrajectorySample};
