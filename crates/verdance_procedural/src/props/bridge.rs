//! Bridge factory.
//!
//! The deck runs along local X; the pivot is the centre of the deck top, so
//! a bridge is positioned by its walking surface rather than its base.

use rand::Rng;
use verdance_core::{Finish, Part, PartShape};
use verdance_shared::{Transform, Vec3};

use super::{jitter_color, PropModel};

const PLANKS: [f32; 3] = [0.52, 0.36, 0.20];
const STONEWORK: [f32; 3] = [0.46, 0.45, 0.43];

/// Bridge dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BridgeParams {
    /// Deck length along the road.
    pub span: f32,
    /// Deck width across the road.
    pub deck_width: f32,
    /// Deck thickness.
    pub thickness: f32,
    /// Railing height above the deck.
    pub railing_height: f32,
    /// How far the supports reach below the deck.
    pub pillar_depth: f32,
}

impl BridgeParams {
    /// Spacing between support pillars.
    const PILLAR_SPACING: f32 = 10.0;

    /// Bridge of the given span and width with default proportions.
    #[must_use]
    pub fn new(span: f32, deck_width: f32) -> Self {
        Self {
            span,
            deck_width,
            thickness: 0.8,
            railing_height: 1.1,
            pillar_depth: 14.0,
        }
    }
}

/// Bridge: deck, two railings, four corner posts, evenly spaced support
/// pillars and a wider keystone support under the centre.
pub fn bridge<R: Rng + ?Sized>(rng: &mut R, params: &BridgeParams) -> PropModel {
    let BridgeParams {
        span,
        deck_width,
        thickness,
        railing_height,
        pillar_depth,
    } = *params;
    let wood = jitter_color(rng, PLANKS, 0.04);
    let stone = jitter_color(rng, STONEWORK, 0.04);
    let half_span = span * 0.5;
    let edge = deck_width * 0.5 - 0.1;
    let mut model = PropModel::new();

    model.parts.push(
        Part::new(
            "deck",
            PartShape::Block {
                size: Vec3::new(span, thickness, deck_width),
            },
            Transform::from_position(Vec3::new(0.0, -thickness * 0.5, 0.0)),
            wood,
        )
        .with_finish(Finish::Wood),
    );

    for side in [-1.0, 1.0] {
        model.parts.push(
            Part::new(
                "railing",
                PartShape::Block {
                    size: Vec3::new(span, 0.12, 0.12),
                },
                Transform::from_position(Vec3::new(0.0, railing_height, side * edge)),
                wood,
            )
            .with_finish(Finish::Wood),
        );
    }

    let post_height = railing_height + 0.3;
    for x in [-half_span, half_span] {
        for z in [-edge, edge] {
            model.parts.push(
                Part::new(
                    "corner_post",
                    PartShape::Block {
                        size: Vec3::new(0.3, post_height, 0.3),
                    },
                    Transform::from_position(Vec3::new(x, post_height * 0.5, z)),
                    wood,
                )
                .with_finish(Finish::Wood),
            );
        }
    }

    // Pillars pair up at both sides of the deck; the centre gets the keystone.
    let bays = ((span / BridgeParams::PILLAR_SPACING).ceil() as i32).max(2);
    let pillar_y = -thickness - pillar_depth * 0.5;
    for i in 1..bays {
        let x = -half_span + span * i as f32 / bays as f32;
        if x.abs() < 1e-3 {
            continue;
        }
        for z in [-edge, edge] {
            model.parts.push(
                Part::new(
                    "pillar",
                    PartShape::Block {
                        size: Vec3::new(0.6, pillar_depth, 0.6),
                    },
                    Transform::from_position(Vec3::new(x, pillar_y, z)),
                    stone,
                )
                .with_finish(Finish::Stone),
            );
        }
    }
    model.parts.push(
        Part::new(
            "keystone",
            PartShape::Block {
                size: Vec3::new(1.6, pillar_depth, deck_width),
            },
            Transform::from_position(Vec3::new(0.0, pillar_y, 0.0)),
            stone,
        )
        .with_finish(Finish::Stone),
    );

    model.footprint = half_span.hypot(deck_width * 0.5);
    model.height = post_height;
    model
}
