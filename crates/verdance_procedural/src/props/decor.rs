//! Rocks, signposts and torches.

use rand::Rng;
use verdance_core::{Finish, Part, PartShape, PointLight};
use verdance_shared::{Quaternion, Transform, Vec3};

use super::{jitter_color, PropModel};

const STONE: [f32; 3] = [0.50, 0.49, 0.47];
const POST: [f32; 3] = [0.45, 0.32, 0.18];
const BOARD: [f32; 3] = [0.62, 0.47, 0.28];
const FLAME: [f32; 3] = [1.0, 0.62, 0.22];

/// Rock size variation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RockParams {
    /// Smallest half-extent.
    pub size_min: f32,
    /// Largest half-extent.
    pub size_max: f32,
}

impl Default for RockParams {
    fn default() -> Self {
        Self {
            size_min: 0.6,
            size_max: 2.2,
        }
    }
}

/// Rock: an irregular block or a squat ball, with size and colour jitter.
pub fn rock<R: Rng + ?Sized>(rng: &mut R, params: &RockParams) -> PropModel {
    let size = if params.size_max > params.size_min {
        rng.gen_range(params.size_min..=params.size_max)
    } else {
        params.size_min
    };
    let color = jitter_color(rng, STONE, 0.08);
    let mut model = PropModel::new();
    if rng.gen_bool(0.5) {
        let extents = Vec3::new(
            size * rng.gen_range(1.2..=2.0),
            size * rng.gen_range(0.8..=1.4),
            size * rng.gen_range(1.2..=2.0),
        );
        let rotation = Quaternion::from_yaw(rng.gen_range(0.0..std::f32::consts::TAU));
        model.parts.push(
            Part::new(
                "stone",
                PartShape::Block { size: extents },
                Transform::new(Vec3::new(0.0, extents.y * 0.5, 0.0), rotation, 1.0),
                color,
            )
            .with_finish(Finish::Stone),
        );
        model.footprint = extents.x.hypot(extents.z) * 0.5;
        model.height = extents.y;
    } else {
        model.parts.push(
            Part::new(
                "stone",
                PartShape::Ball { radius: size },
                Transform::new(Vec3::new(0.0, size * 0.5, 0.0), Quaternion::IDENTITY, 1.0),
                color,
            )
            .with_finish(Finish::Stone),
        );
        model.footprint = size;
        model.height = size * 1.5;
    }
    model
}

/// Signpost parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SignpostParams {
    /// Board text.
    pub label: String,
    /// Post height.
    pub post_height: f32,
    /// Board width.
    pub board_width: f32,
}

impl SignpostParams {
    /// Default-sized signpost showing `label`.
    #[must_use]
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            post_height: 3.0,
            board_width: 2.0,
        }
    }
}

/// Signpost: a post with a labelled board near the top.
pub fn signpost<R: Rng + ?Sized>(rng: &mut R, params: &SignpostParams) -> PropModel {
    let h = params.post_height;
    let mut model = PropModel::new();
    model.parts.push(
        Part::new(
            "post",
            PartShape::Cylinder { radius: 0.1, height: h },
            Transform::from_position(Vec3::new(0.0, h * 0.5, 0.0)),
            POST,
        )
        .with_finish(Finish::Wood),
    );
    model.parts.push(
        Part::new(
            "board",
            PartShape::Block {
                size: Vec3::new(params.board_width, 0.5, 0.08),
            },
            Transform::from_position(Vec3::new(params.board_width * 0.3, h * 0.85, 0.0)),
            jitter_color(rng, BOARD, 0.04),
        )
        .with_finish(Finish::Wood),
    );
    model.label = Some(params.label.clone());
    model.footprint = params.board_width * 0.8;
    model.height = h;
    model
}

/// Torch parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorchParams {
    /// Post height.
    pub post_height: f32,
    /// Light reach.
    pub light_range: f32,
    /// Light brightness.
    pub brightness: f32,
}

impl Default for TorchParams {
    fn default() -> Self {
        Self {
            post_height: 2.5,
            light_range: 18.0,
            brightness: 2.0,
        }
    }
}

/// Torch: post, emissive head and a point light at the head.
pub fn torch<R: Rng + ?Sized>(rng: &mut R, params: &TorchParams) -> PropModel {
    let h = params.post_height;
    let head = Vec3::new(0.0, h + 0.2, 0.0);
    let flame = jitter_color(rng, FLAME, 0.05);
    let mut model = PropModel::new();
    model.parts.push(
        Part::new(
            "post",
            PartShape::Cylinder { radius: 0.08, height: h },
            Transform::from_position(Vec3::new(0.0, h * 0.5, 0.0)),
            POST,
        )
        .with_finish(Finish::Wood),
    );
    model.parts.push(
        Part::new(
            "head",
            PartShape::Ball { radius: 0.2 },
            Transform::from_position(head),
            flame,
        )
        .with_finish(Finish::Emissive)
        .with_collision(false),
    );
    model.lights.push(PointLight {
        offset: head,
        color: flame,
        brightness: params.brightness,
        range: params.light_range,
    });
    model.footprint = 0.2;
    model.height = h + 0.4;
    model
}
