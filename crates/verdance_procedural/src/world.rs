//! # World Builder
//!
//! Runs the passes in order, one unit of work per [`WorldBuilder::step`]:
//!
//! ```text
//! Terrain -> Roads -> Rivers -> Lakes -> Trees -> Decorations -> Bridges -> Boundary
//! ```
//!
//! The host decides pacing. `step` reports a yield point after every
//! `yield_every_chunks` terrain chunks and after every carved path, and
//! plain progress otherwise. There is no cancellation: drop the builder,
//! or destroy the finished world, and start again.
//!
//! A volume write failure aborts the pass and the build; the builder
//! refuses further steps.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use verdance_core::{ChunkedVolume, ContainerRef, ObjectId, SceneSink, VolumeError, VoxelRegion, VoxelVolume};

use crate::boundary::{boundary_walls, BoundaryWall};
use crate::carve::{ChannelCarver, ChannelProfile, RoadCarver};
use crate::config::{RoadPath, WorldConfig};
use crate::crossing::{find_crossings, place_bridge, Crossing};
use crate::decorations::{find_junctions, place_signposts, place_torches};
use crate::error::{TerrainError, TerrainResult};
use crate::geometry::{Point2, Rect};
use crate::noise::{purpose, WorldSeed};
use crate::placement::{surface_height, ExclusionMap, NaturalProp, Scatter, SpacingHash};
use crate::props::{PlacedProp, PropKind};
use crate::terrain::Terrain;
use crate::writer::{VoxelWriter, WriterStep};
use crate::zone::Zone;

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuildStage {
    /// Height field into the volume, chunk by chunk.
    Terrain,
    /// Road slabs.
    Roads,
    /// River channel.
    Rivers,
    /// Lake basins.
    Lakes,
    /// Trees per zone.
    Trees,
    /// Rocks, signposts and torches.
    Decorations,
    /// Bridges at road/river crossings.
    Bridges,
    /// Boundary walls.
    Boundary,
    /// Everything is built.
    Done,
    /// Post-build area flattening.
    Flatten,
}

/// Outcome of one [`WorldBuilder::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    /// Work was done; keep going.
    Progress(BuildStage),
    /// A natural pause point; the host may hand control elsewhere.
    Yield(BuildStage),
    /// The world is complete.
    Finished,
}

/// Counts gathered while building.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Terrain chunks written.
    pub chunks_written: u32,
    /// Columns whose surface was clamped to the volume ceiling.
    pub clipped_columns: u64,
    /// Road segments carved.
    pub road_segments: usize,
    /// River segments carved.
    pub river_segments: usize,
    /// Lakes carved.
    pub lakes: usize,
    /// Columns rewritten by all carvers.
    pub carved_columns: usize,
    /// Trees placed.
    pub trees: usize,
    /// Rocks placed.
    pub rocks: usize,
    /// Signposts placed.
    pub signposts: usize,
    /// Torches placed.
    pub torches: usize,
    /// Bridges placed.
    pub bridges: usize,
    /// Requested trees and rocks that found no site.
    pub exhausted_placements: usize,
    /// Yield points reported.
    pub yields: u32,
}

impl BuildStats {
    fn count(&mut self, kind: PropKind) {
        match kind {
            PropKind::Tree(_) => self.trees += 1,
            PropKind::Rock => self.rocks += 1,
            PropKind::Signpost => self.signposts += 1,
            PropKind::Torch => self.torches += 1,
            PropKind::Bridge => self.bridges += 1,
        }
    }

    fn uncount(&mut self, kind: PropKind) {
        match kind {
            PropKind::Tree(_) => self.trees -= 1,
            PropKind::Rock => self.rocks -= 1,
            PropKind::Signpost => self.signposts -= 1,
            PropKind::Torch => self.torches -= 1,
            PropKind::Bridge => self.bridges -= 1,
        }
    }
}

/// Result of [`WorldHandle::flatten_area`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlattenReport {
    /// The single surface height of the square.
    pub height: f64,
    /// Columns rewritten.
    pub columns: usize,
    /// Trees and rocks removed.
    pub removed_props: usize,
    /// Other props moved onto the new surface.
    pub regrounded_props: usize,
}

/// Step-by-step world construction.
pub struct WorldBuilder<V: VoxelVolume = ChunkedVolume> {
    config: WorldConfig,
    terrain: Terrain,
    volume: V,
    roads: Vec<RoadPath>,
    road_segments: Vec<(usize, Point2, Point2)>,
    river_segments: Vec<(Point2, Point2)>,
    exclusion: ExclusionMap,
    spacing: SpacingHash,
    writer: VoxelWriter,
    stage: BuildStage,
    cursor: usize,
    since_yield: u32,
    failed: bool,
    stats: BuildStats,
    props: Vec<PlacedProp>,
    crossings: Vec<Crossing>,
    walls: Vec<BoundaryWall>,
    scene: ContainerRef,
    props_container: ContainerRef,
    tree_rng: ChaCha8Rng,
    rock_rng: ChaCha8Rng,
    decor_rng: ChaCha8Rng,
}

impl WorldBuilder<ChunkedVolume> {
    /// Validates `config` and prepares a build into a fresh in-memory volume.
    ///
    /// # Errors
    ///
    /// Returns `TerrainError::Config` if validation fails.
    pub fn new(config: WorldConfig) -> TerrainResult<Self> {
        config.validate()?;
        let terrain = Terrain::new(&config);
        let volume = ChunkedVolume::new(terrain.grid.bounds, terrain.grid.voxel_size);
        Ok(Self::assemble(config, terrain, volume))
    }
}

impl<V: VoxelVolume> WorldBuilder<V> {
    /// Validates `config` and prepares a build into `volume`.
    ///
    /// # Errors
    ///
    /// Returns `TerrainError::Config` if validation fails,
    /// `TerrainError::VolumeNotEmpty` if the volume still holds a previous
    /// world and `TerrainError::VoxelSizeMismatch` if its cells differ
    /// from the configuration.
    pub fn with_volume(config: WorldConfig, volume: V) -> TerrainResult<Self> {
        config.validate()?;
        if !volume.is_empty() {
            return Err(TerrainError::VolumeNotEmpty);
        }
        if (volume.voxel_size() - config.map.voxel_size).abs() > f64::EPSILON {
            return Err(TerrainError::VoxelSizeMismatch {
                config: config.map.voxel_size,
                volume: volume.voxel_size(),
            });
        }
        let terrain = Terrain::new(&config);
        Ok(Self::assemble(config, terrain, volume))
    }

    fn assemble(config: WorldConfig, terrain: Terrain, volume: V) -> Self {
        let roads = config.all_roads();
        let road_segments = roads
            .iter()
            .enumerate()
            .flat_map(|(i, road)| road.waypoints.windows(2).map(move |w| (i, w[0], w[1])))
            .collect();
        let river_segments = config
            .river
            .iter()
            .flat_map(|river| river.waypoints.windows(2).map(|w| (w[0], w[1])))
            .collect();
        let props_seed = WorldSeed::new(config.props_seed());
        let rng = |p| ChaCha8Rng::seed_from_u64(props_seed.derive(p).value());

        Self {
            exclusion: ExclusionMap::new(&config, &roads),
            spacing: SpacingHash::new(config.placement.min_spacing),
            writer: VoxelWriter::new(&terrain, config.map.chunk_cells),
            tree_rng: rng(purpose::TREES),
            rock_rng: rng(purpose::ROCKS),
            decor_rng: rng(purpose::DECORATIONS),
            roads,
            road_segments,
            river_segments,
            terrain,
            volume,
            stage: BuildStage::Terrain,
            cursor: 0,
            since_yield: 0,
            failed: false,
            stats: BuildStats::default(),
            props: Vec::new(),
            crossings: Vec::new(),
            walls: Vec::new(),
            scene: ContainerRef::new("terrain"),
            props_container: ContainerRef::new("props"),
            config,
        }
    }

    /// Current stage.
    #[inline]
    #[must_use]
    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    /// Counts so far.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Terrain chunks written and total.
    #[must_use]
    pub fn chunk_progress(&self) -> (u32, u32) {
        (self.writer.chunks_written(), self.writer.total_chunks())
    }

    /// Performs one unit of work.
    ///
    /// # Errors
    ///
    /// Returns `TerrainError::Volume` if the volume rejects a write; the
    /// build is then aborted. Returns `TerrainError::AlreadyFinished` when
    /// called after completion or after a failure.
    pub fn step(&mut self) -> TerrainResult<BuildStep> {
        if self.failed || self.stage == BuildStage::Done {
            return Err(TerrainError::AlreadyFinished);
        }
        let result = self.advance();
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    /// Steps until the world is complete.
    ///
    /// # Errors
    ///
    /// Propagates the first failed step.
    pub fn finish(mut self) -> TerrainResult<WorldHandle<V>> {
        while self.stage != BuildStage::Done {
            self.step()?;
        }
        let stats = &self.stats;
        tracing::info!(
            "world built: {} chunks, {} road and {} river segments, {} lakes, {} trees, {} rocks, {} signposts, {} torches, {} bridges",
            stats.chunks_written,
            stats.road_segments,
            stats.river_segments,
            stats.lakes,
            stats.trees,
            stats.rocks,
            stats.signposts,
            stats.torches,
            stats.bridges
        );
        Ok(WorldHandle {
            config: self.config,
            terrain: self.terrain,
            volume: self.volume,
            props: self.props,
            crossings: self.crossings,
            walls: self.walls,
            stats: self.stats,
            scene: self.scene,
            props_container: self.props_container,
        })
    }

    fn advance(&mut self) -> TerrainResult<BuildStep> {
        let stage = self.stage;
        let fail = |source: VolumeError| TerrainError::Volume { stage, source };
        match stage {
            BuildStage::Terrain => match self.writer.next_chunk(&self.terrain, &mut self.volume).map_err(fail)? {
                WriterStep::Written { .. } => {
                    self.stats.chunks_written += 1;
                    self.since_yield += 1;
                    if self.since_yield >= self.config.pacing.yield_every_chunks {
                        self.since_yield = 0;
                        tracing::debug!(
                            "terrain: {}/{} chunks written",
                            self.writer.chunks_written(),
                            self.writer.total_chunks()
                        );
                        return Ok(self.yield_point());
                    }
                    Ok(BuildStep::Progress(stage))
                }
                WriterStep::Done => {
                    self.stats.clipped_columns = self.writer.clipped_columns();
                    Ok(self.enter(BuildStage::Roads))
                }
            },
            BuildStage::Roads => {
                let Some(&(index, a, b)) = self.road_segments.get(self.cursor) else {
                    return Ok(self.enter(BuildStage::Rivers));
                };
                let road = &self.roads[index];
                let carved = RoadCarver::new(road.width, &self.config.roads)
                    .carve_segment(&self.terrain, &mut self.volume, a, b)
                    .map_err(fail)?;
                tracing::debug!("carved {}: {} columns", road.name, carved.columns);
                self.cursor += 1;
                self.stats.road_segments += 1;
                self.stats.carved_columns += carved.columns;
                Ok(self.yield_point())
            }
            BuildStage::Rivers => {
                let (Some(river), Some(&(a, b))) = (&self.config.river, self.river_segments.get(self.cursor)) else {
                    return Ok(self.enter(BuildStage::Lakes));
                };
                let carved = ChannelCarver::new(ChannelProfile::river(river), self.config.roads.step)
                    .carve_segment(&self.terrain, &mut self.volume, a, b)
                    .map_err(fail)?;
                tracing::debug!("carved {}: {} columns", river.name, carved.columns);
                self.cursor += 1;
                self.stats.river_segments += 1;
                self.stats.carved_columns += carved.columns;
                Ok(self.yield_point())
            }
            BuildStage::Lakes => {
                let Some(lake) = self.config.lakes.get(self.cursor) else {
                    return Ok(self.enter(BuildStage::Trees));
                };
                let carved = ChannelCarver::new(ChannelProfile::lake(lake), self.config.roads.step)
                    .carve_lake(&self.terrain, &mut self.volume, lake.center)
                    .map_err(fail)?;
                tracing::debug!("carved lake at {:?}: {} columns", lake.center, carved.columns);
                self.cursor += 1;
                self.stats.lakes += 1;
                self.stats.carved_columns += carved.columns;
                Ok(self.yield_point())
            }
            BuildStage::Trees => {
                let Some(&zone) = Zone::ALL.get(self.cursor) else {
                    return Ok(self.enter(BuildStage::Decorations));
                };
                self.scatter(zone, NaturalProp::Trees);
                self.cursor += 1;
                Ok(BuildStep::Progress(stage))
            }
            BuildStage::Decorations => {
                match self.cursor {
                    0..=2 => self.scatter(Zone::ALL[self.cursor], NaturalProp::Rocks),
                    3 => {
                        let junctions = find_junctions(&self.roads);
                        let signposts = place_signposts(
                            &self.volume,
                            &junctions,
                            &self.exclusion,
                            &self.config.placement,
                            &mut self.decor_rng,
                        );
                        self.record(signposts);
                    }
                    4 => {
                        let torches = place_torches(
                            &self.volume,
                            &self.config.roads.main,
                            &self.exclusion,
                            &self.config.placement,
                            &mut self.decor_rng,
                        );
                        self.record(torches);
                    }
                    _ => return Ok(self.enter(BuildStage::Bridges)),
                }
                self.cursor += 1;
                Ok(BuildStep::Progress(stage))
            }
            BuildStage::Bridges => {
                if let Some(river) = &self.config.river {
                    let map = &self.config.map;
                    self.crossings = find_crossings(&self.roads, river, &self.config.bridge)
                        .into_iter()
                        .filter(|c| map.contains(c.position[0], c.position[1]))
                        .collect();
                }
                let bridges = self
                    .crossings
                    .iter()
                    .map(|c| place_bridge(c, &self.terrain.height, &self.config.bridge, &mut self.decor_rng))
                    .collect();
                self.record(bridges);
                Ok(self.enter(BuildStage::Boundary))
            }
            BuildStage::Boundary => {
                for wall in boundary_walls(&self.config.map, &self.config.boundary) {
                    self.scene.attach(wall.to_scene_object());
                    self.walls.push(wall);
                }
                Ok(self.enter(BuildStage::Done))
            }
            BuildStage::Done | BuildStage::Flatten => Err(TerrainError::AlreadyFinished),
        }
    }

    fn scatter(&mut self, zone: Zone, family: NaturalProp) {
        let rng = match family {
            NaturalProp::Trees => &mut self.tree_rng,
            NaturalProp::Rocks => &mut self.rock_rng,
        };
        let outcome = Scatter {
            terrain: &self.terrain,
            volume: &self.volume,
            exclusion: &self.exclusion,
            placement: &self.config.placement,
        }
        .run(zone, family, &mut self.spacing, rng);
        tracing::debug!(
            "{} zone: placed {}/{} {}",
            zone.name(),
            outcome.props.len(),
            outcome.requested,
            family.name()
        );
        self.stats.exhausted_placements += outcome.exhausted;
        self.record(outcome.props);
    }

    fn record(&mut self, props: Vec<PlacedProp>) {
        for mut prop in props {
            if self.config.placement.attach_props {
                prop.object = Some(self.props_container.attach(prop.to_scene_object()));
            }
            self.stats.count(prop.kind);
            self.props.push(prop);
        }
    }

    fn yield_point(&mut self) -> BuildStep {
        self.stats.yields += 1;
        BuildStep::Yield(self.stage)
    }

    fn enter(&mut self, next: BuildStage) -> BuildStep {
        tracing::info!("{:?} complete, entering {:?}", self.stage, next);
        self.stage = next;
        self.cursor = 0;
        if next == BuildStage::Done {
            BuildStep::Finished
        } else {
            BuildStep::Progress(next)
        }
    }
}

/// A built world: the volume, the placed-entity records and the containers
/// they were attached to.
pub struct WorldHandle<V: VoxelVolume = ChunkedVolume> {
    config: WorldConfig,
    terrain: Terrain,
    volume: V,
    props: Vec<PlacedProp>,
    crossings: Vec<Crossing>,
    walls: Vec<BoundaryWall>,
    stats: BuildStats,
    scene: ContainerRef,
    props_container: ContainerRef,
}

impl<V: VoxelVolume> WorldHandle<V> {
    /// Configuration the world was built from.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Height field, zones and grid.
    #[inline]
    #[must_use]
    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    /// Height-field elevation at `(x, z)`.
    #[must_use]
    pub fn height(&self, x: f64, z: f64) -> f64 {
        self.terrain.height.height(x, z)
    }

    /// The generated volume.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> &V {
        &self.volume
    }

    /// Build counts.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Every placed prop, in placement order.
    #[inline]
    #[must_use]
    pub fn props(&self) -> &[PlacedProp] {
        &self.props
    }

    /// Props of one kind.
    pub fn props_of(&self, kind: PropKind) -> impl Iterator<Item = &PlacedProp> {
        self.props.iter().filter(move |p| p.kind == kind)
    }

    /// Road/river crossings that received bridges.
    #[inline]
    #[must_use]
    pub fn crossings(&self) -> &[Crossing] {
        &self.crossings
    }

    /// Boundary walls.
    #[inline]
    #[must_use]
    pub fn boundary(&self) -> &[BoundaryWall] {
        &self.walls
    }

    /// Container holding the boundary walls; downstream systems attach
    /// their own world-relative objects here.
    #[must_use]
    pub fn scene_container(&self) -> ContainerRef {
        self.scene.clone()
    }

    /// Container holding the placed props.
    #[must_use]
    pub fn props_container(&self) -> ContainerRef {
        self.props_container.clone()
    }

    /// Attaches every wall and prop record to `sink`.
    pub fn project(&self, sink: &mut dyn SceneSink) -> Vec<ObjectId> {
        self.walls
            .iter()
            .map(BoundaryWall::to_scene_object)
            .chain(self.props.iter().map(PlacedProp::to_scene_object))
            .map(|object| sink.attach(object))
            .collect()
    }

    /// Re-carves the square of edge `size` centred on `(x, z)` to one flat
    /// surface at the height-field elevation of its centre, topped with the
    /// centre's zone material.
    ///
    /// Columns whose centre lies in the square are rewritten over the full
    /// vertical range. Trees and rocks in the square are removed; signposts
    /// and torches are moved onto the new surface. Bridges are left alone.
    ///
    /// # Errors
    ///
    /// Returns `TerrainError::InvalidFlattenArea` for a non-positive size
    /// or a centre off the map, and `TerrainError::Volume` if the rewrite
    /// is rejected.
    pub fn flatten_area(&mut self, x: f64, z: f64, size: f64) -> TerrainResult<FlattenReport> {
        let valid = size.is_finite() && size > 0.0 && self.config.map.contains(x, z);
        if !valid {
            return Err(TerrainError::InvalidFlattenArea { x, z, size });
        }
        let half = size * 0.5;
        let square = Rect::new([x - half, z - half], [x + half, z + half]);
        let target = self.terrain.height.height(x, z);
        let top = self.terrain.zones.surface_material_at(x, z);
        let grid = self.terrain.grid;

        let (min, max) = grid.columns_in(&square);
        let mut columns = 0;
        if min[0] < max[0] && min[1] < max[1] {
            let region = VoxelRegion::new(
                [min[0], grid.bounds.min[1], min[1]],
                [max[0], grid.bounds.max[1], max[1]],
            );
            let fail = |source| TerrainError::Volume { stage: BuildStage::Flatten, source };
            let mut buffer = self.volume.read_region(region).map_err(fail)?;
            for cz in min[1]..max[1] {
                for cx in min[0]..max[0] {
                    if square.contains(grid.column_center(cx, cz)) {
                        self.terrain.fill_column(&mut buffer, cx, cz, target, top);
                        columns += 1;
                    }
                }
            }
            self.volume.write_region(&buffer).map_err(fail)?;
        }

        let mut removed = 0;
        let mut regrounded = 0;
        let mut kept = Vec::with_capacity(self.props.len());
        for mut prop in std::mem::take(&mut self.props) {
            if prop.kind == PropKind::Bridge || !square.contains(prop.position_xz()) {
                kept.push(prop);
                continue;
            }
            if prop.kind.is_natural() {
                if let Some(id) = prop.object {
                    self.props_container.write().remove(id);
                }
                self.stats.uncount(prop.kind);
                removed += 1;
                continue;
            }
            let [px, pz] = prop.position_xz();
            let surface = surface_height(&self.volume, px, pz).unwrap_or(target);
            prop.surface_y = surface;
            prop.transform.position.y = (surface - f64::from(prop.embed_depth)) as f32;
            if let Some(id) = prop.object {
                if let Some(object) = self.props_container.write().get_mut(id) {
                    object.transform = prop.transform;
                }
            }
            regrounded += 1;
            kept.push(prop);
        }
        self.props = kept;

        tracing::info!(
            "flattened {size}-unit square at ({x}, {z}) to {target:.2}: {columns} columns, {removed} props removed"
        );
        Ok(FlattenReport {
            height: target,
            columns,
            removed_props: removed,
            regrounded_props: regrounded,
        })
    }

    /// Removes every generated cell, prop and attached object and hands the
    /// emptied volume back for a fresh build.
    #[must_use]
    pub fn destroy(mut self) -> V {
        self.volume.clear();
        self.scene.write().clear();
        self.props_container.write().clear();
        tracing::info!("world destroyed: {} props dropped", self.props.len());
        self.volume
    }
}

/// Builds a world into a fresh in-memory volume.
///
/// # Errors
///
/// See [`WorldBuilder::new`] and [`WorldBuilder::step`].
pub fn build(config: WorldConfig) -> TerrainResult<WorldHandle> {
    WorldBuilder::new(config)?.finish()
}

/// Builds a world into a caller-supplied, empty volume.
///
/// # Errors
///
/// See [`WorldBuilder::with_volume`] and [`WorldBuilder::step`].
pub fn build_with_volume<V: VoxelVolume>(config: WorldConfig, volume: V) -> TerrainResult<WorldHandle<V>> {
    WorldBuilder::with_volume(config, volume)?.finish()
}
