//! Tree factories.

use std::f32::consts::TAU;

use rand::Rng;
use verdance_core::{Finish, Part, PartShape};
use verdance_shared::{Quaternion, Transform, Vec3};

use super::{jitter_color, PropModel};

const BARK: [f32; 3] = [0.40, 0.26, 0.13];
const DEAD_BARK: [f32; 3] = [0.35, 0.31, 0.27];
const LEAVES: [f32; 3] = [0.22, 0.52, 0.18];
const NEEDLES: [f32; 3] = [0.12, 0.36, 0.20];

/// Size variation for trees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    /// Smallest scale factor.
    pub scale_min: f32,
    /// Largest scale factor.
    pub scale_max: f32,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            scale_min: 0.8,
            scale_max: 1.3,
        }
    }
}

impl TreeParams {
    fn scale<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.scale_max > self.scale_min {
            rng.gen_range(self.scale_min..=self.scale_max)
        } else {
            self.scale_min
        }
    }
}

fn trunk(height: f32, radius: f32, color: [f32; 3]) -> Part {
    Part::new(
        "trunk",
        PartShape::Cylinder { radius, height },
        Transform::from_position(Vec3::new(0.0, height * 0.5, 0.0)),
        color,
    )
    .with_finish(Finish::Wood)
}

/// Broad-leaf tree: trunk plus two or three overlapping foliage balls.
pub fn broadleaf<R: Rng + ?Sized>(rng: &mut R, params: &TreeParams) -> PropModel {
    let scale = params.scale(rng);
    let trunk_height = 4.0 * scale;
    let mut model = PropModel::new();
    model.parts.push(trunk(trunk_height, 0.35 * scale, BARK));

    let balls = rng.gen_range(2..=3);
    let mut top = trunk_height;
    let mut reach = 0.0f32;
    for _ in 0..balls {
        let radius = 2.2 * scale * rng.gen_range(0.8..=1.2);
        let offset = Vec3::new(
            rng.gen_range(-0.8..=0.8) * scale,
            trunk_height + radius * rng.gen_range(0.3..=0.7),
            rng.gen_range(-0.8..=0.8) * scale,
        );
        model.parts.push(
            Part::new(
                "foliage",
                PartShape::Ball { radius },
                Transform::from_position(offset),
                jitter_color(rng, LEAVES, 0.06),
            )
            .with_finish(Finish::Leaves)
            .with_collision(false),
        );
        top = top.max(offset.y + radius);
        reach = reach.max(offset.x.hypot(offset.z) + radius);
    }
    model.footprint = reach;
    model.height = top;
    model
}

/// Conifer: trunk plus three or four cones that narrow toward the top.
pub fn conifer<R: Rng + ?Sized>(rng: &mut R, params: &TreeParams) -> PropModel {
    let scale = params.scale(rng);
    let trunk_height = 3.0 * scale;
    let mut model = PropModel::new();
    model.parts.push(trunk(trunk_height, 0.3 * scale, BARK));

    let tiers = rng.gen_range(3..=4);
    let tier_height = 2.4 * scale;
    let base_radius = 2.6 * scale;
    let color = jitter_color(rng, NEEDLES, 0.05);
    let mut top = trunk_height;
    for i in 0..tiers {
        let shrink = 1.0 - 0.2 * i as f32;
        let y = trunk_height * 0.6 + i as f32 * 1.5 * scale;
        model.parts.push(
            Part::new(
                "tier",
                PartShape::Cone {
                    radius: base_radius * shrink,
                    height: tier_height,
                },
                Transform::from_position(Vec3::new(0.0, y, 0.0)),
                color,
            )
            .with_finish(Finish::Leaves)
            .with_collision(false),
        );
        top = top.max(y + tier_height);
    }
    model.footprint = base_radius;
    model.height = top;
    model
}

/// Dead tree: bare trunk with two or three branches angled outward.
pub fn dead_tree<R: Rng + ?Sized>(rng: &mut R, params: &TreeParams) -> PropModel {
    let scale = params.scale(rng);
    let trunk_height = 5.0 * scale;
    let color = jitter_color(rng, DEAD_BARK, 0.05);
    let mut model = PropModel::new();
    model.parts.push(trunk(trunk_height, 0.25 * scale, color));

    let branches = rng.gen_range(2..=3);
    let mut reach = 0.25 * scale;
    for _ in 0..branches {
        let length = 1.8 * scale * rng.gen_range(0.8..=1.2);
        let yaw = rng.gen_range(0.0..TAU);
        let tilt = rng.gen_range(0.6..=1.1);
        // Tilt about Z leans local +Y toward -X, then yaw spreads branches around.
        let rotation = Quaternion::from_yaw(yaw) * Quaternion::from_axis_angle(Vec3::Z, tilt);
        let attach = Vec3::new(0.0, trunk_height * rng.gen_range(0.45..=0.85), 0.0);
        let center = attach + rotation.rotate(Vec3::new(0.0, length * 0.5, 0.0));
        model.parts.push(
            Part::new(
                "branch",
                PartShape::Cylinder {
                    radius: 0.1 * scale,
                    height: length,
                },
                Transform::new(center, rotation, 1.0),
                color,
            )
            .with_finish(Finish::Wood),
        );
        let tip = attach + rotation.rotate(Vec3::new(0.0, length, 0.0));
        reach = reach.max(tip.x.hypot(tip.z));
    }
    model.footprint = reach;
    model.height = trunk_height;
    model
}
