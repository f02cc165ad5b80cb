//! Common utilities and error types shared by the navigation link crates

mod math;
mod vector;

pub use math::*;
pub use vector::*;

/// Represents a 3D position
pub type Vec3 = glam::Vec3;

/// Error types for the library
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid builder state: {0}")]
    InvalidState(String),

    #[error("contour set has no vertices")]
    NoContours,

    #[error("no boundary edges found in contour set")]
    NoEdges,

    #[error("link build cancelled after {processed} of {total} edges")]
    Cancelled { processed: usize, total: usize },
}

/// Result type for link generation operations
pub type Result<T> = std::result::Result<T, Error>;
