//! Box platform scenes
//!
//! Builds the three link builder inputs for a scene made of axis-aligned
//! boxes. Each box becomes solid spans, its top becomes a walkable floor and a
//! rectangular contour is traced around that floor.

use glam::Vec3;

use super::compact_heightfield::{CompactHeightfield, WALKABLE_AREA};
use super::contour::{Contour, ContourSet};
use super::heightfield::Heightfield;
use navlink_common::{Error, Result};

/// An axis-aligned box standing in the scene
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Platform {
    /// Lower corner
    pub min: Vec3,
    /// Upper corner, `max.y` is the walkable top
    pub max: Vec3,
}

impl Platform {
    /// Creates a platform from its corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }
}

/// Voxel grid and platforms of a scene
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct BoxScene {
    /// Minimum bounds of the grid
    pub bmin: Vec3,
    /// Maximum bounds of the grid
    pub bmax: Vec3,
    /// Cell size
    pub cell_size: f32,
    /// Cell height
    pub cell_height: f32,
    /// Boxes of the scene
    pub platforms: Vec<Platform>,
}

/// Link builder inputs of a voxelized scene
#[derive(Debug, Clone)]
pub struct SceneData {
    /// Solid heightfield of all boxes
    pub solid: Heightfield,
    /// Walkable floors
    pub chf: CompactHeightfield,
    /// One contour per platform top
    pub cset: ContourSet,
}

impl BoxScene {
    /// Grid size in cells along x and z
    pub fn grid_size(&self) -> (i32, i32) {
        let width = ((self.bmax.x - self.bmin.x) / self.cell_size).ceil() as i32;
        let height = ((self.bmax.z - self.bmin.z) / self.cell_size).ceil() as i32;
        (width, height)
    }

    /// Voxelizes the scene.
    ///
    /// `agent_height` and `agent_climb` are stored on the compact heightfield
    /// in voxel units.
    pub fn build(&self, agent_height: f32, agent_climb: f32) -> Result<SceneData> {
        if self.cell_size <= 0.0 || self.cell_height <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "Invalid scene cell size {} / height {}",
                self.cell_size, self.cell_height
            )));
        }

        let (width, height) = self.grid_size();
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidInput(format!(
                "Empty scene bounds {:?} .. {:?}",
                self.bmin, self.bmax
            )));
        }

        let mut solid = Heightfield::new(
            width,
            height,
            self.bmin,
            self.bmax,
            self.cell_size,
            self.cell_height,
        );
        for platform in &self.platforms {
            solid.rasterize_box(platform.min, platform.max, WALKABLE_AREA)?;
        }

        let walkable_height = (agent_height / self.cell_height).ceil() as i32;
        let walkable_climb = (agent_climb / self.cell_height).floor() as i32;
        let chf =
            CompactHeightfield::build_from_heightfield(&solid, walkable_height, walkable_climb)?;

        let mut cset = ContourSet::from_compact_heightfield(&chf);
        for (i, platform) in self.platforms.iter().enumerate() {
            cset.add_contour(self.top_contour(platform, (i + 1) as u16));
        }

        log::debug!(
            "Scene: {}x{} cells, {} platforms, {} spans",
            width,
            height,
            self.platforms.len(),
            solid.span_count()
        );

        Ok(SceneData { solid, chf, cset })
    }

    /// Rectangle around the top of a platform, walkable side on the left
    fn top_contour(&self, platform: &Platform, region: u16) -> Contour {
        let x0 = ((platform.min.x - self.bmin.x) / self.cell_size).floor() as i32;
        let z0 = ((platform.min.z - self.bmin.z) / self.cell_size).floor() as i32;
        let x1 = ((platform.max.x - self.bmin.x) / self.cell_size).ceil() as i32;
        let z1 = ((platform.max.z - self.bmin.z) / self.cell_size).ceil() as i32;
        let y = ((platform.max.y - self.bmin.y) / self.cell_height).ceil() as i32;

        let mut contour = Contour::new(region, WALKABLE_AREA);
        contour.add_vertex(x0, y, z0, 0);
        contour.add_vertex(x0, y, z1, 0);
        contour.add_vertex(x1, y, z1, 0);
        contour.add_vertex(x1, y, z0, 0);
        contour
    }
}
