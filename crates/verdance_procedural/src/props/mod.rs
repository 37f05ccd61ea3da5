//! # Prop Factories
//!
//! Pure constructors for everything the pipeline places on the terrain.
//! Each factory takes an explicit random source and a parameter struct and
//! returns a [`PropModel`]: primitive parts around a pivot at the base
//! centre (deck top centre for bridges). Factories know nothing about
//! placement.

mod bridge;
mod decor;
mod trees;

pub use bridge::{bridge, BridgeParams};
pub use decor::{rock, signpost, torch, RockParams, SignpostParams, TorchParams};
pub use trees::{broadleaf, conifer, dead_tree, TreeParams};

use rand::Rng;
use verdance_core::{ObjectId, Part, PointLight, SceneObject};
use verdance_shared::Transform;

use crate::geometry::Point2;

/// Tree species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TreeSpecies {
    /// Trunk with round foliage.
    Broadleaf,
    /// Trunk with stacked cones.
    Conifer,
    /// Bare trunk with branches.
    Dead,
}

impl TreeSpecies {
    /// Builds a tree of this species.
    pub fn build<R: Rng + ?Sized>(self, rng: &mut R, params: &TreeParams) -> PropModel {
        match self {
            Self::Broadleaf => broadleaf(rng, params),
            Self::Conifer => conifer(rng, params),
            Self::Dead => dead_tree(rng, params),
        }
    }
}

/// What a placed prop is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropKind {
    /// A tree.
    Tree(TreeSpecies),
    /// A rock.
    Rock,
    /// A signpost at a road junction.
    Signpost,
    /// A roadside torch.
    Torch,
    /// A bridge over a road/river crossing.
    Bridge,
}

impl PropKind {
    /// Returns true for trees and rocks, the props that keep clear of
    /// roads and water and are cleared by area flattening.
    #[must_use]
    pub const fn is_natural(self) -> bool {
        matches!(self, Self::Tree(_) | Self::Rock)
    }

    /// Short name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tree(TreeSpecies::Broadleaf) => "broadleaf",
            Self::Tree(TreeSpecies::Conifer) => "conifer",
            Self::Tree(TreeSpecies::Dead) => "dead_tree",
            Self::Rock => "rock",
            Self::Signpost => "signpost",
            Self::Torch => "torch",
            Self::Bridge => "bridge",
        }
    }
}

/// A generated structure, ready to be placed.
#[derive(Debug, Clone, PartialEq)]
pub struct PropModel {
    /// Primitives relative to the pivot.
    pub parts: Vec<Part>,
    /// Attached lights.
    pub lights: Vec<PointLight>,
    /// Text shown on the model, if any.
    pub label: Option<String>,
    /// Horizontal radius of the footprint.
    pub footprint: f32,
    /// Height above the pivot.
    pub height: f32,
}

impl PropModel {
    fn new() -> Self {
        Self {
            parts: Vec::new(),
            lights: Vec::new(),
            label: None,
            footprint: 0.0,
            height: 0.0,
        }
    }

    /// Finds the first part with the given name.
    #[must_use]
    pub fn part(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.name == name)
    }

    /// Counts parts with the given name.
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.parts.iter().filter(|p| p.name == name).count()
    }
}

/// A prop placed in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedProp {
    /// What it is.
    pub kind: PropKind,
    /// Pivot transform in world space.
    pub transform: Transform,
    /// How far the pivot sits below the detected surface.
    pub embed_depth: f32,
    /// Surface height the placement was resolved against.
    pub surface_y: f64,
    /// Generated structure.
    pub model: PropModel,
    /// Id in the world's props container, once attached.
    pub object: Option<ObjectId>,
}

impl PlacedProp {
    /// Planar position `(x, z)`.
    #[must_use]
    pub fn position_xz(&self) -> Point2 {
        [
            f64::from(self.transform.position.x),
            f64::from(self.transform.position.z),
        ]
    }

    /// Scene projection of this prop.
    #[must_use]
    pub fn to_scene_object(&self) -> SceneObject {
        let name = match &self.model.label {
            Some(label) => format!("{} ({label})", self.kind.name()),
            None => self.kind.name().to_owned(),
        };
        SceneObject {
            name,
            transform: self.transform,
            parts: self.model.parts.clone(),
            lights: self.model.lights.clone(),
        }
    }
}

/// Jitters each channel of `base` by up to `amount`, clamped to [0, 1].
fn jitter_color<R: Rng + ?Sized>(rng: &mut R, base: [f32; 3], amount: f32) -> [f32; 3] {
    let shift = rng.gen_range(-amount..=amount);
    base.map(|c| (c + shift).clamp(0.0, 1.0))
}
