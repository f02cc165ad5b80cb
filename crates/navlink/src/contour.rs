//! Contour set representation
//!
//! Contours are the traced boundaries of walkable regions, in voxel
//! coordinates. Each vertex carries the connection flags of the segment that
//! starts at it, so consumers can tell portal segments (shared with a
//! neighbouring region) from solid boundaries.

use glam::Vec3;

use super::compact_heightfield::CompactHeightfield;

/// Mask of the direction bits marking a segment as a portal to another region
pub const CONTOUR_DIR_MASK: u32 = 0xf;

/// A vertex in a contour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ContourVertex {
    /// X-coordinate (cell units)
    pub x: i32,
    /// Y-coordinate (height units)
    pub y: i32,
    /// Z-coordinate (cell units)
    pub z: i32,
    /// Connection flags of the segment leaving this vertex
    pub flags: u32,
}

impl ContourVertex {
    /// Creates a new contour vertex
    pub fn new(x: i32, y: i32, z: i32, flags: u32) -> Self {
        Self { x, y, z, flags }
    }

    /// Whether the segment leaving this vertex connects to another region
    pub fn is_portal(&self) -> bool {
        self.flags & CONTOUR_DIR_MASK != 0
    }

    /// Whether two vertices share the same grid position
    pub fn same_position(&self, other: &ContourVertex) -> bool {
        self.x == other.x && self.y == other.y && self.z == other.z
    }
}

/// A closed contour around one walkable region
#[derive(Debug, Clone, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Contour {
    /// Vertices of the contour, wound so the walkable region lies to the
    /// left of each segment when seen from above
    pub vertices: Vec<ContourVertex>,
    /// Region ID of the contour
    pub region: u16,
    /// Area ID of the contour
    pub area: u8,
}

impl Contour {
    /// Creates a new contour
    pub fn new(region: u16, area: u8) -> Self {
        Self {
            vertices: Vec::new(),
            region,
            area,
        }
    }

    /// Adds a vertex to the contour
    pub fn add_vertex(&mut self, x: i32, y: i32, z: i32, flags: u32) {
        self.vertices.push(ContourVertex::new(x, y, z, flags));
    }

    /// Iterates the segments of the closed contour as `(start, end)` pairs,
    /// starting with the segment that closes the loop.
    pub fn segments(&self) -> impl Iterator<Item = (&ContourVertex, &ContourVertex)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |j| {
            let k = if j == 0 { n - 1 } else { j - 1 };
            (&self.vertices[k], &self.vertices[j])
        })
    }

    /// Whether the contour has a segment joining `a` and `b`, in either order
    pub fn has_segment(&self, a: &ContourVertex, b: &ContourVertex) -> bool {
        self.segments().any(|(p, q)| {
            (p.same_position(a) && q.same_position(b)) || (p.same_position(b) && q.same_position(a))
        })
    }
}

/// A set of contours
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ContourSet {
    /// Contours in the set
    pub contours: Vec<Contour>,
    /// Width of the heightfield
    pub width: i32,
    /// Height of the heightfield
    pub height: i32,
    /// The minimum bounds of the heightfield's AABB
    pub bmin: Vec3,
    /// The maximum bounds of the heightfield's AABB
    pub bmax: Vec3,
    /// Cell size (horizontal resolution)
    pub cs: f32,
    /// Cell height (vertical resolution)
    pub ch: f32,
    /// Border size used during generation
    pub border_size: i32,
}

impl ContourSet {
    /// Creates an empty contour set sharing the grid of a compact heightfield
    pub fn from_compact_heightfield(chf: &CompactHeightfield) -> Self {
        Self {
            contours: Vec::new(),
            width: chf.width,
            height: chf.height,
            bmin: chf.bmin,
            bmax: chf.bmax,
            cs: chf.cs,
            ch: chf.ch,
            border_size: 0,
        }
    }

    /// Adds a contour to the set
    pub fn add_contour(&mut self, contour: Contour) {
        self.contours.push(contour);
    }

    /// Total number of vertices over all contours
    pub fn vertex_count(&self) -> usize {
        self.contours.iter().map(|c| c.vertices.len()).sum()
    }

    /// Converts a contour vertex to world space
    pub fn world_position(&self, v: &ContourVertex) -> Vec3 {
        Vec3::new(
            self.bmin.x + v.x as f32 * self.cs,
            self.bmin.y + v.y as f32 * self.ch,
            self.bmin.z + v.z as f32 * self.cs,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contour_segments_wrap() {
        let mut contour = Contour::new(1, 63);
        contour.add_vertex(0, 0, 0, 0);
        contour.add_vertex(0, 0, 4, 0);
        contour.add_vertex(4, 0, 4, 1);

        let segments: Vec<_> = contour
            .segments()
            .map(|(a, b)| ((a.x, a.z), (b.x, b.z)))
            .collect();
        assert_eq!(
            segments,
            vec![((4, 4), (0, 0)), ((0, 0), (0, 4)), ((0, 4), (4, 4))]
        );
        assert!(contour.vertices[2].is_portal());
        assert!(!contour.vertices[0].is_portal());
    }

    #[test]
    fn test_has_segment_either_order() {
        let mut contour = Contour::new(1, 63);
        contour.add_vertex(0, 0, 0, 0);
        contour.add_vertex(0, 0, 4, 0);
        contour.add_vertex(4, 0, 4, 0);

        let a = ContourVertex::new(0, 0, 4, 0);
        let b = ContourVertex::new(4, 0, 4, 2);
        assert!(contour.has_segment(&a, &b));
        assert!(contour.has_segment(&b, &a));
        assert!(!contour.has_segment(&a, &ContourVertex::new(9, 0, 9, 0)));
    }

    #[test]
    fn test_world_position() {
        let cset = ContourSet {
            contours: Vec::new(),
            width: 10,
            height: 10,
            bmin: Vec3::new(-5.0, 1.0, 2.0),
            bmax: Vec3::new(5.0, 11.0, 12.0),
            cs: 0.5,
            ch: 0.25,
            border_size: 0,
        };
        let p = cset.world_position(&ContourVertex::new(2, 4, 6, 0));
        assert_eq!(p, Vec3::new(-4.0, 2.0, 5.0));
        assert_eq!(cset.vertex_count(), 0);
    }
}
