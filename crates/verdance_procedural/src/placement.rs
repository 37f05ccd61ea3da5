//! # Surface Placement
//!
//! Finds the ground with a downward ray and stands a prop on it. Sites are
//! screened first: trees and rocks keep clear of road centrelines, river
//! banks and lake shores, and of each other.

use std::collections::HashMap;
use std::f32::consts::TAU;

use rand::Rng;
use verdance_core::{RayFilter, VoxelVolume};
use verdance_shared::{Quaternion, Transform, Vec3};

use crate::config::{PlacementConfig, RoadPath, WorldConfig};
use crate::geometry::{distance, distance_to_polyline, Point2};
use crate::props::{rock, PlacedProp, PropKind, PropModel, RockParams, TreeParams, TreeSpecies};
use crate::terrain::Terrain;
use crate::zone::Zone;

/// Casts a ray down through the whole volume at `(x, z)` and, on a hit,
/// places `model` with its pivot `embed_depth` below the surface.
///
/// Water is transparent to the ray. Returns `None` on a miss.
pub fn place_on_surface<V: VoxelVolume + ?Sized>(
    volume: &V,
    x: f64,
    z: f64,
    kind: PropKind,
    model: PropModel,
    embed_depth: f64,
) -> Option<PlacedProp> {
    let surface = surface_height(volume, x, z)?;
    let y = surface - embed_depth;
    Some(PlacedProp {
        kind,
        transform: Transform::from_position(Vec3::new(x as f32, y as f32, z as f32)),
        embed_depth: embed_depth as f32,
        surface_y: surface,
        model,
        object: None,
    })
}

/// Height of the first solid surface below the top of the volume.
pub fn surface_height<V: VoxelVolume + ?Sized>(volume: &V, x: f64, z: f64) -> Option<f64> {
    let bounds = volume.bounds();
    let size = volume.voxel_size();
    let top = f64::from(bounds.max[1]) * size;
    let reach = f64::from(bounds.max[1] - bounds.min[1]) * size;
    volume
        .raycast_down(x, z, top, reach, RayFilter::IGNORE_WATER)
        .map(|hit| hit.position[1])
}

#[derive(Debug, Clone)]
struct Corridor {
    waypoints: Vec<Point2>,
    half_width: f64,
}

/// Sites carved by roads and water.
#[derive(Debug, Clone)]
pub struct ExclusionMap {
    roads: Vec<Corridor>,
    rivers: Vec<Corridor>,
    lakes: Vec<(Point2, f64)>,
    road_exclusion: f64,
    water_exclusion: f64,
}

impl ExclusionMap {
    /// Collects the corridors of `roads` and of the configured water.
    #[must_use]
    pub fn new(config: &WorldConfig, roads: &[RoadPath]) -> Self {
        Self {
            roads: roads
                .iter()
                .map(|road| Corridor {
                    waypoints: road.waypoints.clone(),
                    half_width: road.width * 0.5,
                })
                .collect(),
            rivers: config
                .river
                .iter()
                .map(|river| Corridor {
                    waypoints: river.waypoints.clone(),
                    half_width: river.width * 0.5,
                })
                .collect(),
            lakes: config.lakes.iter().map(|l| (l.center, l.radius)).collect(),
            road_exclusion: config.placement.road_exclusion,
            water_exclusion: config.placement.water_exclusion,
        }
    }

    /// Distance to the nearest road centreline.
    #[must_use]
    pub fn road_distance(&self, p: Point2) -> f64 {
        self.roads
            .iter()
            .map(|r| distance_to_polyline(p, &r.waypoints))
            .fold(f64::INFINITY, f64::min)
    }

    /// Signed distance to the nearest river bank or lake shore; negative
    /// over water.
    #[must_use]
    pub fn water_distance(&self, p: Point2) -> f64 {
        let rivers = self
            .rivers
            .iter()
            .map(|r| distance_to_polyline(p, &r.waypoints) - r.half_width);
        let lakes = self.lakes.iter().map(|(c, radius)| distance(p, *c) - radius);
        rivers.chain(lakes).fold(f64::INFINITY, f64::min)
    }

    /// Returns true if `p` lies on a road's paved surface.
    #[must_use]
    pub fn on_road(&self, p: Point2) -> bool {
        self.roads
            .iter()
            .any(|r| distance_to_polyline(p, &r.waypoints) <= r.half_width)
    }

    /// Returns true if `p` is within the water exclusion distance of a bank
    /// or shore, or over water.
    #[must_use]
    pub fn near_water(&self, p: Point2) -> bool {
        self.water_distance(p) < self.water_exclusion
    }

    /// Returns true if trees and rocks may not stand at `p`.
    #[must_use]
    pub fn excludes_natural(&self, p: Point2) -> bool {
        self.near_water(p)
            || self.roads.iter().any(|r| {
                distance_to_polyline(p, &r.waypoints) < self.road_exclusion.max(r.half_width)
            })
    }
}

/// Planar hash enforcing a minimum distance between props.
#[derive(Debug, Clone)]
pub struct SpacingHash {
    cell: f64,
    min_spacing: f64,
    buckets: HashMap<(i64, i64), Vec<Point2>>,
}

impl SpacingHash {
    /// Hash for a minimum spacing; zero disables the check.
    #[must_use]
    pub fn new(min_spacing: f64) -> Self {
        Self {
            cell: min_spacing.max(1.0),
            min_spacing,
            buckets: HashMap::new(),
        }
    }

    fn key(&self, p: Point2) -> (i64, i64) {
        (
            (p[0] / self.cell).floor() as i64,
            (p[1] / self.cell).floor() as i64,
        )
    }

    /// Returns true if nothing recorded lies closer than the minimum spacing.
    #[must_use]
    pub fn is_clear(&self, p: Point2) -> bool {
        if self.min_spacing <= 0.0 {
            return true;
        }
        let (kx, kz) = self.key(p);
        let reach = (self.min_spacing / self.cell).ceil() as i64;
        for dz in -reach..=reach {
            for dx in -reach..=reach {
                if let Some(points) = self.buckets.get(&(kx + dx, kz + dz)) {
                    if points.iter().any(|q| distance(p, *q) < self.min_spacing) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Records a prop position.
    pub fn insert(&mut self, p: Point2) {
        let key = self.key(p);
        self.buckets.entry(key).or_default().push(p);
    }
}

/// Natural prop families scattered per zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaturalProp {
    /// Trees; species depends on the zone.
    Trees,
    /// Rocks.
    Rocks,
}

impl NaturalProp {
    /// Plural name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Trees => "trees",
            Self::Rocks => "rocks",
        }
    }
}

/// Result of scattering one family over one zone.
#[derive(Debug, Clone, Default)]
pub struct ScatterOutcome {
    /// Props that found ground.
    pub props: Vec<PlacedProp>,
    /// `round(area * density)`.
    pub requested: usize,
    /// Requested props that ran out of attempts.
    pub exhausted: usize,
}

/// Per-zone scattering of trees and rocks.
pub struct Scatter<'a, V: ?Sized> {
    /// Height field and zones.
    pub terrain: &'a Terrain,
    /// The carved volume.
    pub volume: &'a V,
    /// Road and water sites.
    pub exclusion: &'a ExclusionMap,
    /// Embedding depths and attempt budget.
    pub placement: &'a PlacementConfig,
}

impl<V: VoxelVolume + ?Sized> Scatter<'_, V> {
    /// Props requested for `family` in `zone`.
    #[must_use]
    pub fn requested(&self, zone: Zone, family: NaturalProp) -> usize {
        let density = match family {
            NaturalProp::Trees => self.terrain.zones.tree_density(zone),
            NaturalProp::Rocks => self.terrain.zones.rock_density(zone),
        };
        (self.terrain.zones.area(zone) * density).round() as usize
    }

    /// Scatters `family` over `zone`.
    ///
    /// Each requested prop gets `attempts_per_prop` candidate sites; a
    /// candidate is dropped if it is excluded, too close to a previous prop
    /// or the ray misses.
    pub fn run<R: Rng + ?Sized>(
        &self,
        zone: Zone,
        family: NaturalProp,
        spacing: &mut SpacingHash,
        rng: &mut R,
    ) -> ScatterOutcome {
        let mut outcome = ScatterOutcome {
            requested: self.requested(zone, family),
            ..ScatterOutcome::default()
        };
        let attempts = self.placement.attempts_per_prop.max(1);
        for _ in 0..outcome.requested {
            let placed = (0..attempts).find_map(|_| {
                let p = self.terrain.zones.sample_point(zone, rng)?;
                if self.exclusion.excludes_natural(p) || !spacing.is_clear(p) {
                    return None;
                }
                let (kind, model, embed) = self.model(zone, family, rng);
                let mut prop = place_on_surface(self.volume, p[0], p[1], kind, model, embed)?;
                prop.transform.rotation = Quaternion::from_yaw(rng.gen_range(0.0..TAU));
                Some(prop)
            });
            match placed {
                Some(prop) => {
                    spacing.insert(prop.position_xz());
                    outcome.props.push(prop);
                }
                None => outcome.exhausted += 1,
            }
        }
        if outcome.exhausted > 0 {
            tracing::warn!(
                "{} zone: {} of {} {} exhausted their placement attempts",
                zone.name(),
                outcome.exhausted,
                outcome.requested,
                family.name()
            );
        }
        outcome
    }

    fn model<R: Rng + ?Sized>(
        &self,
        zone: Zone,
        family: NaturalProp,
        rng: &mut R,
    ) -> (PropKind, PropModel, f64) {
        match family {
            NaturalProp::Trees => {
                let species = match zone {
                    Zone::Core => TreeSpecies::Broadleaf,
                    Zone::Restricted => TreeSpecies::Dead,
                    Zone::Open if rng.gen_bool(0.5) => TreeSpecies::Broadleaf,
                    Zone::Open => TreeSpecies::Conifer,
                };
                let model = species.build(rng, &TreeParams::default());
                (PropKind::Tree(species), model, self.placement.tree_embed)
            }
            NaturalProp::Rocks => (
                PropKind::Rock,
                rock(rng, &RockParams::default()),
                self.placement.rock_embed,
            ),
        }
    }
}
