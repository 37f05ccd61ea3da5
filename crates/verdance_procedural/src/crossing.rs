//! # Road/River Crossings
//!
//! Rivers are carved after roads, so every place a road meets the river has
//! lost its paving. Each crossing is found by intersecting road segments
//! with river segments and gets a bridge laid along the road.

use rand::Rng;
use verdance_shared::{Quaternion, Transform, Vec3};

use crate::config::{BridgeConfig, RiverPath, RoadPath};
use crate::geometry::{direction, distance, segment_intersection, yaw_for_direction, Point2};
use crate::height::HeightField;
use crate::props::{bridge, BridgeParams, PlacedProp, PropKind};

/// Where a road meets the river.
#[derive(Debug, Clone, PartialEq)]
pub struct Crossing {
    /// Intersection of the two centrelines.
    pub position: Point2,
    /// Unit direction of the road segment.
    pub direction: Point2,
    /// Yaw turning a bridge's local X onto the road.
    pub yaw: f32,
    /// `|sin|` of the road/river angle.
    pub sin_angle: f64,
    /// Deck length needed to clear the channel.
    pub span: f64,
    /// Deck width.
    pub deck_width: f64,
    /// Name of the crossing road.
    pub road: String,
}

/// Every road/river intersection.
///
/// `span = river_width / max(sin(angle), min_crossing_sin) + margin`. A road
/// passing through a river waypoint touches two segments at one point; such
/// hits on the same road are counted once.
#[must_use]
pub fn find_crossings(roads: &[RoadPath], river: &RiverPath, config: &BridgeConfig) -> Vec<Crossing> {
    let mut crossings: Vec<Crossing> = Vec::new();
    for road in roads {
        let first = crossings.len();
        for r in road.waypoints.windows(2) {
            for w in river.waypoints.windows(2) {
                let Some(hit) = segment_intersection(r[0], r[1], w[0], w[1]) else {
                    continue;
                };
                let duplicate = crossings[first..]
                    .iter()
                    .any(|c| distance(c.position, hit.point) < river.width * 0.5);
                if duplicate {
                    continue;
                }
                let dir = direction(r[0], r[1]);
                let sin = hit.sin_angle.max(config.min_crossing_sin);
                crossings.push(Crossing {
                    position: hit.point,
                    direction: dir,
                    yaw: yaw_for_direction(dir[0], dir[1]),
                    sin_angle: hit.sin_angle,
                    span: river.width / sin + config.margin,
                    deck_width: road.width + config.extra_width,
                    road: road.name.clone(),
                });
            }
        }
    }
    crossings
}

/// Builds and positions the bridge for `crossing`.
///
/// The deck top sits `deck_clearance` above the height field at the
/// crossing, the elevation the road was carved at. The channel below is
/// open water, so no ray is cast.
pub fn place_bridge<R: Rng + ?Sized>(
    crossing: &Crossing,
    height: &HeightField,
    config: &BridgeConfig,
    rng: &mut R,
) -> PlacedProp {
    let [x, z] = crossing.position;
    let bank = height.height(x, z);
    let params = BridgeParams::new(crossing.span as f32, crossing.deck_width as f32);
    PlacedProp {
        kind: PropKind::Bridge,
        transform: Transform::new(
            Vec3::new(x as f32, (bank + config.deck_clearance) as f32, z as f32),
            Quaternion::from_yaw(crossing.yaw),
            1.0,
        ),
        embed_depth: -config.deck_clearance as f32,
        surface_y: bank,
        model: bridge(rng, &params),
        object: None,
    }
}
