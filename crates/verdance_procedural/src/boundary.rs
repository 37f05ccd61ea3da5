//! # Boundary Walls
//!
//! Four invisible, collidable slabs just outside the map edges. They run
//! past the corners by their own thickness and reach `overhang` beyond the
//! volume's floor and ceiling, so nothing can go around, over or under.

use verdance_core::{Finish, Part, PartShape, SceneObject};
use verdance_shared::{Transform, Vec3};

use crate::config::{BoundaryConfig, MapConfig};

/// Map edge a wall guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// `+Z` edge.
    North,
    /// `-Z` edge.
    South,
    /// `+X` edge.
    East,
    /// `-X` edge.
    West,
}

impl Edge {
    /// All four edges.
    pub const ALL: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];

    const fn name(self) -> &'static str {
        match self {
            Self::North => "boundary_north",
            Self::South => "boundary_south",
            Self::East => "boundary_east",
            Self::West => "boundary_west",
        }
    }
}

/// One boundary slab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryWall {
    /// Guarded edge.
    pub edge: Edge,
    /// Slab centre.
    pub center: Vec3,
    /// Full extents.
    pub size: Vec3,
}

impl BoundaryWall {
    /// Minimum corner.
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.center - self.size * 0.5
    }

    /// Maximum corner.
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.center + self.size * 0.5
    }

    /// Invisible collidable scene object for the slab.
    #[must_use]
    pub fn to_scene_object(&self) -> SceneObject {
        SceneObject {
            name: self.edge.name().to_owned(),
            transform: Transform::from_position(self.center),
            parts: vec![Part::new(
                "slab",
                PartShape::Block { size: self.size },
                Transform::IDENTITY,
                [0.0, 0.0, 0.0],
            )
            .with_finish(Finish::Invisible)],
            lights: Vec::new(),
        }
    }
}

/// The four walls around `map`.
#[must_use]
pub fn boundary_walls(map: &MapConfig, config: &BoundaryConfig) -> [BoundaryWall; 4] {
    let [hx, hz] = map.half_extents();
    let t = config.thickness;
    let bottom = map.floor_y - config.overhang;
    let top = map.ceiling_y + config.overhang;
    let mid_y = (bottom + top) * 0.5;
    let height = top - bottom;

    Edge::ALL.map(|edge| {
        let (center, size) = match edge {
            Edge::North => ([0.0, hz + t * 0.5], [2.0 * (hx + t), t]),
            Edge::South => ([0.0, -hz - t * 0.5], [2.0 * (hx + t), t]),
            Edge::East => ([hx + t * 0.5, 0.0], [t, 2.0 * (hz + t)]),
            Edge::West => ([-hx - t * 0.5, 0.0], [t, 2.0 * (hz + t)]),
        };
        BoundaryWall {
            edge,
            center: Vec3::new(center[0] as f32, mid_y as f32, center[1] as f32),
            size: Vec3::new(size[0] as f32, height as f32, size[1] as f32),
        }
    })
}
