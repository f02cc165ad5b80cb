//! Solid heightfield representation
//!
//! The solid heightfield is a 2D grid of span columns describing the occupied
//! vertical space of the voxelized scene. The link builder only reads it, to
//! test candidate jump trajectories for collisions.

use glam::Vec3;

use navlink_common::{Error, Result};

/// A span in the heightfield, representing a vertical segment of solid space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// The minimum height of the span (voxels)
    pub min: i16,
    /// The maximum height of the span (voxels)
    pub max: i16,
    /// Area ID (0 = not walkable)
    pub area: u8,
    /// Index of the next span up the column, or None if this is the last span
    pub next: Option<usize>,
}

impl Span {
    /// Creates a new span
    pub fn new(min: i16, max: i16, area: u8) -> Self {
        Self {
            min,
            max,
            area,
            next: None,
        }
    }
}

/// Iterator over the spans of one column, bottom to top
pub struct ColumnIter<'a> {
    pool: &'a [Span],
    current: Option<usize>,
}

impl<'a> Iterator for ColumnIter<'a> {
    type Item = &'a Span;

    fn next(&mut self) -> Option<Self::Item> {
        let span = self.pool.get(self.current?)?;
        self.current = span.next;
        Some(span)
    }
}

/// Heightfield structure holding a grid of span columns
#[derive(Debug, Clone)]
pub struct Heightfield {
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

    /// First span of each column, indexed by `x + z * width`
    columns: Vec<Option<usize>>,
    /// Span storage shared by all columns
    pool: Vec<Span>,
    /// Pool slots released by span merging
    free: Vec<usize>,
}

impl Heightfield {
    /// Creates a new empty heightfield
    pub fn new(width: i32, height: i32, bmin: Vec3, bmax: Vec3, cs: f32, ch: f32) -> Self {
        let cells = (width.max(0) * height.max(0)) as usize;

        Self {
            width,
            height,
            bmin,
            bmax,
            cs,
            ch,
            columns: vec![None; cells],
            pool: Vec::new(),
            free: Vec::new(),
        }
    }

    fn column_index(&self, x: i32, z: i32) -> Option<usize> {
        if x < 0 || z < 0 || x >= self.width || z >= self.height {
            None
        } else {
            Some((x + z * self.width) as usize)
        }
    }

    /// Returns the spans of the column at `(x, z)`, bottom to top.
    ///
    /// Out of bounds columns are empty.
    pub fn column(&self, x: i32, z: i32) -> ColumnIter<'_> {
        ColumnIter {
            pool: &self.pool,
            current: self.column_index(x, z).and_then(|i| self.columns[i]),
        }
    }

    /// Converts a world position to the grid cell that contains it
    pub fn cell_at(&self, x: f32, z: f32) -> Option<(i32, i32)> {
        let ix = ((x - self.bmin.x) / self.cs).floor() as i32;
        let iz = ((z - self.bmin.z) / self.cs).floor() as i32;
        self.column_index(ix, iz).map(|_| (ix, iz))
    }

    /// Add a span to the heightfield, merging it with any span it overlaps
    pub fn add_span(&mut self, x: i32, z: i32, min: i16, max: i16, area: u8) -> Result<()> {
        let Some(ci) = self.column_index(x, z) else {
            return Err(Error::InvalidInput(format!(
                "Span position out of bounds: ({}, {})",
                x, z
            )));
        };

        if min > max {
            return Err(Error::InvalidInput(format!(
                "Invalid span height: min ({}) > max ({})",
                min, max
            )));
        }

        let mut merged = Span::new(min, max, area);
        let mut kept = Vec::new();
        let mut current = self.columns[ci];

        while let Some(i) = current {
            let span = &self.pool[i];
            current = span.next;

            if span.max < merged.min || span.min > merged.max {
                kept.push(i);
                continue;
            }

            // The area of the span with the higher top wins
            if span.max > merged.max {
                merged.area = span.area;
            } else if span.max == merged.max {
                merged.area = merged.area.max(span.area);
            }
            merged.min = merged.min.min(span.min);
            merged.max = merged.max.max(span.max);
            self.free.push(i);
        }

        let new_index = self.alloc_span(merged);
        kept.push(new_index);
        kept.sort_by_key(|&i| self.pool[i].min);

        for pair in kept.windows(2) {
            self.pool[pair[0]].next = Some(pair[1]);
        }
        if let Some(&last) = kept.last() {
            self.pool[last].next = None;
        }
        self.columns[ci] = kept.first().copied();

        Ok(())
    }

    fn alloc_span(&mut self, span: Span) -> usize {
        match self.free.pop() {
            Some(i) => {
                self.pool[i] = span;
                i
            }
            None => {
                self.pool.push(span);
                self.pool.len() - 1
            }
        }
    }

    /// Fills every cell covered by an axis-aligned box with a solid span
    pub fn rasterize_box(&mut self, bmin: Vec3, bmax: Vec3, area: u8) -> Result<()> {
        if bmin.cmpgt(bmax).any() {
            return Err(Error::InvalidInput(format!(
                "Invalid box bounds: {:?} > {:?}",
                bmin, bmax
            )));
        }

        // Convert world coordinates to cell coordinates
        let min_x = (((bmin.x - self.bmin.x) / self.cs).floor() as i32).max(0);
        let min_z = (((bmin.z - self.bmin.z) / self.cs).floor() as i32).max(0);
        let max_x = (((bmax.x - self.bmin.x) / self.cs).ceil() as i32).min(self.width);
        let max_z = (((bmax.z - self.bmin.z) / self.cs).ceil() as i32).min(self.height);

        // Convert Y bounds to span units
        let min_y = ((bmin.y - self.bmin.y) / self.ch).floor() as i16;
        let max_y = ((bmax.y - self.bmin.y) / self.ch).ceil() as i16;

        for z in min_z..max_z {
            for x in min_x..max_x {
                self.add_span(x, z, min_y, max_y, area)?;
            }
        }

        Ok(())
    }

    /// Number of spans in the heightfield
    pub fn span_count(&self) -> usize {
        self.pool.len() - self.free.len()
    }

    /// World-space vertical extent of a span
    pub fn span_extent(&self, span: &Span) -> (f32, f32) {
        (
            self.bmin.y + span.min as f32 * self.ch,
            self.bmin.y + span.max as f32 * self.ch,
        )
    }

    /// Tests whether the vertical range `[ymin, ymax]` at `(x, z)` overlaps
    /// any solid span.
    ///
    /// Columns outside the grid and empty columns never collide.
    pub fn check_collision(&self, x: f32, ymin: f32, ymax: f32, z: f32) -> bool {
        let Some((ix, iz)) = self.cell_at(x, z) else {
            return false;
        };

        self.column(ix, iz).any(|span| {
            let (smin, smax) = self.span_extent(span);
            overlap_range(ymin, ymax, smin, smax)
        })
    }
}

#[inline]
fn overlap_range(amin: f32, amax: f32, bmin: f32, bmax: f32) -> bool {
    !(amin > bmax || amax < bmin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_heightfield() -> Heightfield {
        Heightfield::new(
            10,
            10,
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 10.0, 10.0),
            1.0,
            1.0,
        )
    }

    #[test]
    fn test_heightfield_creation() {
        let heightfield = make_heightfield();

        assert_eq!(heightfield.width, 10);
        assert_eq!(heightfield.height, 10);
        assert_eq!(heightfield.span_count(), 0);
        assert_eq!(heightfield.column(3, 3).count(), 0);
    }

    #[test]
    fn test_add_span() {
        let mut heightfield = make_heightfield();
        heightfield.add_span(5, 5, 3, 6, 1).unwrap();

        let spans: Vec<_> = heightfield.column(5, 5).collect();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].min, 3);
        assert_eq!(spans[0].max, 6);
        assert_eq!(spans[0].area, 1);
        assert!(spans[0].next.is_none());

        assert!(heightfield.add_span(10, 0, 0, 1, 1).is_err());
        assert!(heightfield.add_span(0, 0, 4, 1, 1).is_err());
    }

    #[test]
    fn test_add_span_keeps_order_and_merges() {
        let mut heightfield = make_heightfield();
        heightfield.add_span(2, 2, 10, 12, 1).unwrap();
        heightfield.add_span(2, 2, 0, 2, 1).unwrap();
        heightfield.add_span(2, 2, 5, 6, 1).unwrap();

        let mins: Vec<_> = heightfield.column(2, 2).map(|s| s.min).collect();
        assert_eq!(mins, vec![0, 5, 10]);

        // Bridges the two upper spans; the top area belongs to the highest span
        heightfield.add_span(2, 2, 6, 10, 0).unwrap();
        let spans: Vec<_> = heightfield.column(2, 2).cloned().collect();
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[1].min, spans[1].max, spans[1].area), (5, 12, 1));
        assert_eq!(heightfield.span_count(), 2);
    }

    #[test]
    fn test_rasterize_box() {
        let mut heightfield = make_heightfield();
        heightfield
            .rasterize_box(Vec3::new(2.0, 1.0, 3.0), Vec3::new(4.0, 3.0, 5.0), 1)
            .unwrap();

        assert_eq!(heightfield.column(2, 3).count(), 1);
        assert_eq!(heightfield.column(3, 4).count(), 1);
        assert_eq!(heightfield.column(4, 4).count(), 0);
        assert_eq!(heightfield.column(1, 3).count(), 0);

        let span = heightfield.column(3, 3).next().unwrap();
        assert_eq!((span.min, span.max), (1, 3));
    }

    #[test]
    fn test_check_collision() {
        let mut heightfield = make_heightfield();
        heightfield.add_span(4, 4, 2, 5, 1).unwrap();

        // Fully containing the span
        assert!(heightfield.check_collision(4.5, 0.0, 9.0, 4.5));
        // Partial overlaps, including touching end points
        assert!(heightfield.check_collision(4.5, 4.0, 9.0, 4.5));
        assert!(heightfield.check_collision(4.5, 5.0, 9.0, 4.5));
        // Above and below
        assert!(!heightfield.check_collision(4.5, 5.5, 9.0, 4.5));
        assert!(!heightfield.check_collision(4.5, 0.0, 1.5, 4.5));
        // Empty column and out of bounds
        assert!(!heightfield.check_collision(1.5, -100.0, 100.0, 1.5));
        assert!(!heightfield.check_collision(-3.0, -100.0, 100.0, 4.5));
        assert!(!heightfield.check_collision(4.5, -100.0, 100.0, 12.0));
    }
}
