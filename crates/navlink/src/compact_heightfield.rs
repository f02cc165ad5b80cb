//! Compact heightfield representation
//!
//! The compact heightfield keeps only the walkable floors of the solid
//! heightfield: one compact span per walkable solid span, with its floor
//! height, the free space above it and its area id. The link builder uses it
//! to find ground under candidate jump start and landing points.

use glam::Vec3;

use super::heightfield::Heightfield;
use navlink_common::{Error, Result};

/// Area id of spans that cannot be walked on
pub const NULL_AREA: u8 = 0;
/// Default area id of walkable spans
pub const WALKABLE_AREA: u8 = 63;

const MAX_HEIGHT: i32 = 0xffff;

/// A compact cell in the heightfield
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactCell {
    /// Index of the first span in the cell
    pub index: usize,
    /// Number of spans in the cell
    pub count: usize,
}

/// A walkable floor in the compact heightfield
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactSpan {
    /// Floor height of the span (voxels)
    pub y: u16,
    /// Free space above the floor (voxels)
    pub h: u16,
    /// Region ID (0 = not in region)
    pub reg: u16,
}

/// Compact heightfield structure
#[derive(Debug, Clone)]
pub struct CompactHeightfield {
    /// Width of the heightfield along the x-axis
    pub width: i32,
    /// Height (depth) of the heightfield along the z-axis
    pub height: i32,

    /// The minimum bounds of the heightfield's AABB
    pub bmin: Vec3,
    /// The maximum bounds of the heightfield's AABB
    pub bmax: Vec3,

    /// Cell size (horizontal resolution)
    pub cs: f32,
    /// Cell height (vertical resolution)
    pub ch: f32,

    /// Minimum floor to ceiling height used when the field was built (voxels)
    pub walkable_height: i32,
    /// Maximum ledge height used when the field was built (voxels)
    pub walkable_climb: i32,

    /// Grid of compact cells, indexed by `x + z * width`
    pub cells: Vec<CompactCell>,
    /// Array of compact spans
    pub spans: Vec<CompactSpan>,
    /// Array of area IDs for each span
    pub areas: Vec<u8>,
}

impl CompactHeightfield {
    /// Builds a compact heightfield from the walkable spans of a solid heightfield
    pub fn build_from_heightfield(
        heightfield: &Heightfield,
        walkable_height: i32,
        walkable_climb: i32,
    ) -> Result<Self> {
        if heightfield.width <= 0 || heightfield.height <= 0 {
            return Err(Error::InvalidInput(format!(
                "Invalid heightfield size: {}x{}",
                heightfield.width, heightfield.height
            )));
        }

        let width = heightfield.width;
        let height = heightfield.height;

        let mut cells = Vec::with_capacity((width * height) as usize);
        let mut spans = Vec::new();
        let mut areas = Vec::new();

        for z in 0..height {
            for x in 0..width {
                let index = spans.len();
                let mut column = heightfield.column(x, z).peekable();

                while let Some(span) = column.next() {
                    if span.area == NULL_AREA {
                        continue;
                    }

                    let bot = span.max as i32;
                    let top = column.peek().map_or(MAX_HEIGHT, |next| next.min as i32);

                    spans.push(CompactSpan {
                        y: bot.clamp(0, MAX_HEIGHT) as u16,
                        h: (top - bot).clamp(0, MAX_HEIGHT) as u16,
                        reg: 0,
                    });
                    areas.push(span.area);
                }

                cells.push(CompactCell {
                    index,
                    count: spans.len() - index,
                });
            }
        }

        log::debug!(
            "Compact heightfield: {}x{} cells, {} walkable spans",
            width,
            height,
            spans.len()
        );

        Ok(Self {
            width,
            height,
            bmin: heightfield.bmin,
            bmax: heightfield.bmax,
            cs: heightfield.cs,
            ch: heightfield.ch,
            walkable_height,
            walkable_climb,
            cells,
            spans,
            areas,
        })
    }

    /// Returns the cell at `(x, z)`, or None when out of bounds
    pub fn cell(&self, x: i32, z: i32) -> Option<&CompactCell> {
        if x < 0 || z < 0 || x >= self.width || z >= self.height {
            return None;
        }
        self.cells.get((x + z * self.width) as usize)
    }

    /// World-space floor height of the span at `index`
    pub fn span_floor(&self, index: usize) -> f32 {
        self.bmin.y + self.spans[index].y as f32 * self.ch
    }

    /// Finds the walkable floor closest to `point` vertically.
    ///
    /// Scans all cells within one cell size of `point` in the XZ plane and
    /// returns the floor height with the smallest vertical distance to
    /// `point.y`, provided that distance is below `vertical_range`.
    pub fn find_ground_height(&self, point: Vec3, vertical_range: f32) -> Option<f32> {
        let range = self.cs;
        let to_cell = |v: f32, origin: f32| ((v - origin) / self.cs).floor() as i32;

        let ix0 = to_cell(point.x - range, self.bmin.x).max(0);
        let iz0 = to_cell(point.z - range, self.bmin.z).max(0);
        let ix1 = to_cell(point.x + range, self.bmin.x).min(self.width - 1);
        let iz1 = to_cell(point.z + range, self.bmin.z).min(self.height - 1);

        let mut best: Option<(f32, f32)> = None;

        for z in iz0..=iz1 {
            for x in ix0..=ix1 {
                let Some(cell) = self.cell(x, z) else {
                    continue;
                };

                for i in cell.index..cell.index + cell.count {
                    if self.areas[i] == NULL_AREA {
                        continue;
                    }

                    let floor = self.span_floor(i);
                    let dist = (floor - point.y).abs();
                    if dist < vertical_range && best.map_or(true, |(d, _)| dist < d) {
                        best = Some((dist, floor));
                    }
                }
            }
        }

        best.map(|(_, floor)| floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_heightfield() -> Heightfield {
        Heightfield::new(
            5,
            5,
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(5.0, 10.0, 5.0),
            1.0,
            0.5,
        )
    }

    #[test]
    fn test_compact_heightfield_creation() {
        let mut heightfield = make_heightfield();
        heightfield.add_span(1, 1, 0, 2, WALKABLE_AREA).unwrap();
        heightfield.add_span(1, 1, 8, 10, WALKABLE_AREA).unwrap();
        heightfield.add_span(2, 1, 0, 4, NULL_AREA).unwrap();

        let chf = CompactHeightfield::build_from_heightfield(&heightfield, 2, 1).unwrap();

        assert_eq!(chf.cells.len(), 25);
        assert_eq!(chf.spans.len(), 2);

        let cell = chf.cell(1, 1).unwrap();
        assert_eq!(cell.count, 2);
        assert_eq!(chf.spans[cell.index].y, 2);
        assert_eq!(chf.spans[cell.index].h, 6);
        assert_eq!(chf.spans[cell.index + 1].y, 10);

        // Unwalkable spans are left out
        assert_eq!(chf.cell(2, 1).unwrap().count, 0);
        assert!(chf.cell(5, 0).is_none());
    }

    #[test]
    fn test_find_ground_height() {
        let mut heightfield = make_heightfield();
        heightfield.add_span(2, 2, 0, 4, WALKABLE_AREA).unwrap();
        heightfield.add_span(2, 2, 10, 12, WALKABLE_AREA).unwrap();

        let chf = CompactHeightfield::build_from_heightfield(&heightfield, 2, 1).unwrap();

        // Floors at y = 2.0 and y = 6.0
        let h = chf.find_ground_height(Vec3::new(2.5, 2.4, 2.5), 1.0);
        assert_eq!(h, Some(2.0));
        let h = chf.find_ground_height(Vec3::new(2.5, 5.0, 2.5), 3.5);
        assert_eq!(h, Some(6.0));

        // Neighbouring cell is within one cell size
        let h = chf.find_ground_height(Vec3::new(1.5, 2.0, 2.5), 1.0);
        assert_eq!(h, Some(2.0));

        // Out of vertical range
        assert_eq!(chf.find_ground_height(Vec3::new(2.5, 4.0, 2.5), 1.0), None);
        // Too far horizontally
        assert_eq!(chf.find_ground_height(Vec3::new(0.2, 2.0, 0.2), 1.0), None);
        // Outside the grid
        assert_eq!(chf.find_ground_height(Vec3::new(-8.0, 2.0, 2.5), 1.0), None);
    }

    #[test]
    fn test_find_ground_height_ignores_grid_border_far_away() {
        let mut heightfield = make_heightfield();
        heightfield.add_span(0, 2, 0, 4, WALKABLE_AREA).unwrap();

        let chf = CompactHeightfield::build_from_heightfield(&heightfield, 2, 1).unwrap();
        assert!(chf.find_ground_height(Vec3::new(0.5, 2.0, 2.5), 1.0).is_some());
        assert!(chf.find_ground_height(Vec3::new(-20.0, 2.0, 2.5), 1.0).is_none());
    }

    #[test]
    fn test_find_ground_height_skips_null_area() {
        let mut heightfield = make_heightfield();
        heightfield.add_span(2, 2, 0, 4, WALKABLE_AREA).unwrap();

        let mut chf = CompactHeightfield::build_from_heightfield(&heightfield, 2, 1).unwrap();
        assert!(chf.find_ground_height(Vec3::new(2.5, 2.0, 2.5), 1.0).is_some());

        let index = chf.cell(2, 2).unwrap().index;
        chf.areas[index] = NULL_AREA;
        assert!(chf.find_ground_height(Vec3::new(2.5, 2.0, 2.5), 1.0).is_none());
    }
}
