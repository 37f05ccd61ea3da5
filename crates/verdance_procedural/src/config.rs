//! World configuration.
//!
//! Everything the pipeline needs is in [`WorldConfig`]. `Default` is the
//! reference map: 2000 x 2000 units at voxel size 4, an east-west and a
//! north-south main road through the centre, and a river crossing both.
//!
//! Coordinates are world units on the XZ plane with the map centred on the
//! origin; Y is up.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Complete static input for one world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Map extents and voxel grid.
    pub map: MapConfig,
    /// Height-field seed.
    pub seed: u64,
    /// Seed for prop jitter and placement. Defaults to `seed`.
    pub props_seed: Option<u64>,
    /// Noise octaves.
    pub noise: NoiseConfig,
    /// Zone rectangles, shaping and densities.
    pub zones: ZonesConfig,
    /// Road network.
    pub roads: RoadsConfig,
    /// The river, if any.
    pub river: Option<RiverPath>,
    /// Lakes.
    pub lakes: Vec<LakeConfig>,
    /// Prop placement rules.
    pub placement: PlacementConfig,
    /// Bridge geometry.
    pub bridge: BridgeConfig,
    /// Boundary walls.
    pub boundary: BoundaryConfig,
    /// Cooperative pacing.
    pub pacing: PacingConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            seed: 0x5EED_0F_7E44A1,
            props_seed: None,
            noise: NoiseConfig::default(),
            zones: ZonesConfig::default(),
            roads: RoadsConfig::default(),
            river: Some(RiverPath::default()),
            lakes: vec![LakeConfig::default()],
            placement: PlacementConfig::default(),
            bridge: BridgeConfig::default(),
            boundary: BoundaryConfig::default(),
            pacing: PacingConfig::default(),
        }
    }
}

/// Map extents and voxel grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Extent along X.
    pub width: f64,
    /// Extent along Z.
    pub depth: f64,
    /// Voxel edge length.
    pub voxel_size: f64,
    /// Columns per planar chunk edge in the voxel writer.
    pub chunk_cells: u32,
    /// Lowest world Y the volume holds.
    pub floor_y: f64,
    /// Highest world Y the volume holds.
    pub ceiling_y: f64,
    /// Thickness of the zone surface material.
    pub surface_layer: f64,
    /// Soil between the surface layer and bedrock.
    pub soil_depth: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 2000.0,
            depth: 2000.0,
            voxel_size: 4.0,
            chunk_cells: 16,
            floor_y: -48.0,
            ceiling_y: 192.0,
            surface_layer: 4.0,
            soil_depth: 8.0,
        }
    }
}

impl MapConfig {
    /// Half extents `(x, z)`.
    #[must_use]
    pub fn half_extents(&self) -> [f64; 2] {
        [self.width * 0.5, self.depth * 0.5]
    }

    /// Returns true if `(x, z)` lies on the map.
    #[must_use]
    pub fn contains(&self, x: f64, z: f64) -> bool {
        let [hx, hz] = self.half_extents();
        x >= -hx && x < hx && z >= -hz && z < hz
    }
}

/// One noise layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Octave {
    /// Spatial frequency in cycles per world unit.
    pub frequency: f64,
    /// Peak contribution in world units.
    pub amplitude: f64,
}

/// Layered noise parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Constant added to every sample.
    pub base_height: f64,
    /// Offset added to noise-space coordinates.
    pub seed_offset: f64,
    /// Octaves, summed in order.
    pub octaves: Vec<Octave>,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            base_height: 24.0,
            seed_offset: 1731.0,
            octaves: vec![
                Octave { frequency: 0.0035, amplitude: 16.0 },
                Octave { frequency: 0.011, amplitude: 6.0 },
                Octave { frequency: 0.037, amplitude: 1.5 },
            ],
        }
    }
}

/// Vegetation and rock densities, in props per square world unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneDensity {
    /// Trees per square unit.
    pub trees: f64,
    /// Rocks per square unit.
    pub rocks: f64,
}

impl Default for ZoneDensity {
    fn default() -> Self {
        Self { trees: 0.0, rocks: 0.0 }
    }
}

/// Core (safe) zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreZone {
    /// Rectangle minimum corner `(x, z)`.
    pub min: [f64; 2],
    /// Rectangle maximum corner `(x, z)`.
    pub max: [f64; 2],
    /// Radius of the flattened disc around the rectangle centre.
    pub flatten_radius: f64,
    /// Flattening at the centre, in [0, 1].
    pub flatten_strength: f64,
    /// Prop densities.
    pub density: ZoneDensity,
}

impl Default for CoreZone {
    fn default() -> Self {
        Self {
            min: [-150.0, -150.0],
            max: [150.0, 150.0],
            flatten_radius: 220.0,
            flatten_strength: 0.85,
            density: ZoneDensity { trees: 0.000_05, rocks: 0.000_02 },
        }
    }
}

impl CoreZone {
    /// Rectangle centre `(x, z)`.
    #[must_use]
    pub fn center(&self) -> [f64; 2] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        ]
    }
}

/// Restricted (forbidden) zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestrictedZone {
    /// Rectangle minimum corner `(x, z)`.
    pub min: [f64; 2],
    /// Rectangle maximum corner `(x, z)`.
    pub max: [f64; 2],
    /// Elevation added deep inside the rectangle.
    pub boost: f64,
    /// Distance from the edge over which the boost ramps in.
    pub transition_width: f64,
    /// Prop densities. Trees here are always dead.
    pub density: ZoneDensity,
}

impl Default for RestrictedZone {
    fn default() -> Self {
        Self {
            min: [300.0, -900.0],
            max: [900.0, -300.0],
            boost: 30.0,
            transition_width: 80.0,
            density: ZoneDensity { trees: 0.000_2, rocks: 0.000_3 },
        }
    }
}

/// Open wilderness: everything that is neither core nor restricted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenZone {
    /// Prop densities.
    pub density: ZoneDensity,
}

impl Default for OpenZone {
    fn default() -> Self {
        Self {
            density: ZoneDensity { trees: 0.000_4, rocks: 0.000_1 },
        }
    }
}

/// All zones.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZonesConfig {
    /// Core zone.
    pub core: CoreZone,
    /// Restricted zone.
    pub restricted: RestrictedZone,
    /// Open wilderness.
    pub open: OpenZone,
}

/// A road polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadPath {
    /// Name, shown on signposts.
    pub name: String,
    /// Ordered waypoints `(x, z)`.
    pub waypoints: Vec<[f64; 2]>,
    /// Full width.
    pub width: f64,
}

/// Road network parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadsConfig {
    /// Main roads.
    pub main: Vec<RoadPath>,
    /// Spacing of an optional secondary grid of straight roads.
    pub grid_spacing: Option<f64>,
    /// Width of secondary grid roads.
    pub grid_width: f64,
    /// Walk step along and across a path.
    pub step: f64,
    /// Open space kept above the road surface.
    pub clearance: f64,
    /// Thickness of the road slab.
    pub slab_thickness: f64,
}

impl Default for RoadsConfig {
    fn default() -> Self {
        Self {
            main: vec![
                RoadPath {
                    name: "King's Road".to_owned(),
                    waypoints: vec![[-1000.0, 0.0], [1000.0, 0.0]],
                    width: 12.0,
                },
                RoadPath {
                    name: "Pilgrim Way".to_owned(),
                    waypoints: vec![[0.0, -1000.0], [0.0, 1000.0]],
                    width: 12.0,
                },
            ],
            grid_spacing: None,
            grid_width: 8.0,
            step: 2.0,
            clearance: 16.0,
            slab_thickness: 2.0,
        }
    }
}

/// A river polyline with a parabolic channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiverPath {
    /// Name.
    pub name: String,
    /// Ordered waypoints `(x, z)`.
    pub waypoints: Vec<[f64; 2]>,
    /// Full channel width.
    pub width: f64,
    /// Depth of the bed below the bank at the centreline.
    pub max_depth: f64,
    /// Water surface height above the deepest point of the bed.
    pub water_level: f64,
}

impl Default for RiverPath {
    fn default() -> Self {
        Self {
            name: "Silverrun".to_owned(),
            waypoints: vec![[-500.0, -1000.0], [-500.0, 500.0], [1000.0, 500.0]],
            width: 40.0,
            max_depth: 10.0,
            water_level: 7.0,
        }
    }
}

/// A round lake with the river's parabolic profile applied radially.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LakeConfig {
    /// Centre `(x, z)`.
    pub center: [f64; 2],
    /// Shore radius.
    pub radius: f64,
    /// Depth at the centre.
    pub max_depth: f64,
    /// Water surface height above the deepest point.
    pub water_level: f64,
}

impl Default for LakeConfig {
    fn default() -> Self {
        Self {
            center: [600.0, -200.0],
            radius: 70.0,
            max_depth: 12.0,
            water_level: 9.0,
        }
    }
}

/// Prop placement rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Tree embedding depth.
    pub tree_embed: f64,
    /// Rock embedding depth.
    pub rock_embed: f64,
    /// Signpost embedding depth.
    pub signpost_embed: f64,
    /// Torch embedding depth.
    pub torch_embed: f64,
    /// Minimum lateral distance from any road centreline.
    pub road_exclusion: f64,
    /// Minimum lateral distance from the river or lake boundary.
    pub water_exclusion: f64,
    /// Minimum distance between trees and rocks.
    pub min_spacing: f64,
    /// Candidate sites tried per requested prop.
    pub attempts_per_prop: u32,
    /// Distance between torches along main roads.
    pub torch_spacing: f64,
    /// Distance of torches beyond the road edge.
    pub torch_offset: f64,
    /// Distance of signposts beyond both road edges.
    pub signpost_offset: f64,
    /// Attach placed props to the world's props container.
    pub attach_props: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            tree_embed: 0.6,
            rock_embed: 0.8,
            signpost_embed: 0.5,
            torch_embed: 0.4,
            road_exclusion: 10.0,
            water_exclusion: 4.0,
            min_spacing: 6.0,
            attempts_per_prop: 8,
            torch_spacing: 60.0,
            torch_offset: 1.5,
            signpost_offset: 2.5,
            attach_props: true,
        }
    }
}

/// Bridge geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Length added to the crossing span so the deck lands on both banks.
    pub margin: f64,
    /// Deck top above the bank elevation.
    pub deck_clearance: f64,
    /// Deck width beyond the road width.
    pub extra_width: f64,
    /// Floor on `sin(angle)` between road and river.
    pub min_crossing_sin: f64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            margin: 8.0,
            deck_clearance: 0.5,
            extra_width: 2.0,
            min_crossing_sin: 0.25,
        }
    }
}

/// Boundary walls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Wall thickness.
    pub thickness: f64,
    /// Extension beyond the volume's floor and ceiling.
    pub overhang: f64,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            thickness: 10.0,
            overhang: 64.0,
        }
    }
}

/// Cooperative pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Chunks written between yield points.
    pub yield_every_chunks: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self { yield_every_chunks: 8 }
    }
}

impl WorldConfig {
    /// Parses a configuration from TOML. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` on malformed TOML.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read and
    /// `ConfigError::Parse` on malformed TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Seed for prop jitter.
    #[must_use]
    pub fn props_seed(&self) -> u64 {
        self.props_seed.unwrap_or(self.seed)
    }

    /// All roads: the main roads followed by the secondary grid.
    #[must_use]
    pub fn all_roads(&self) -> Vec<RoadPath> {
        let mut roads = self.roads.main.clone();
        let Some(spacing) = self.roads.grid_spacing.filter(|s| *s > 0.0) else {
            return roads;
        };
        let [hx, hz] = self.map.half_extents();

        let mut k = 1;
        loop {
            let offset = spacing * f64::from(k);
            if offset >= hx && offset >= hz {
                break;
            }
            for sign in [-1.0, 1.0] {
                let d = sign * offset;
                if d.abs() < hz {
                    roads.push(RoadPath {
                        name: format!("Row {}{}", if sign < 0.0 { "S" } else { "N" }, k),
                        waypoints: vec![[-hx, d], [hx, d]],
                        width: self.roads.grid_width,
                    });
                }
                if d.abs() < hx {
                    roads.push(RoadPath {
                        name: format!("Lane {}{}", if sign < 0.0 { "W" } else { "E" }, k),
                        waypoints: vec![[d, -hz], [d, hz]],
                        width: self.roads.grid_width,
                    });
                }
            }
            k += 1;
        }
        roads
    }

    /// Checks every field the pipeline relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> ConfigResult<()> {
        let map = &self.map;
        positive("map.width", map.width)?;
        positive("map.depth", map.depth)?;
        positive("map.voxel_size", map.voxel_size)?;
        positive("map.chunk_cells", f64::from(map.chunk_cells))?;
        finite("map.floor_y", map.floor_y)?;
        finite("map.ceiling_y", map.ceiling_y)?;
        if map.ceiling_y <= map.floor_y {
            return Err(ConfigError::EmptyVerticalRange {
                floor: map.floor_y,
                ceiling: map.ceiling_y,
            });
        }
        non_negative("map.surface_layer", map.surface_layer)?;
        non_negative("map.soil_depth", map.soil_depth)?;

        finite("noise.base_height", self.noise.base_height)?;
        finite("noise.seed_offset", self.noise.seed_offset)?;
        for (i, octave) in self.noise.octaves.iter().enumerate() {
            non_negative(&format!("noise.octaves[{i}].frequency"), octave.frequency)?;
            finite(&format!("noise.octaves[{i}].amplitude"), octave.amplitude)?;
        }

        let core = &self.zones.core;
        rect("core", core.min, core.max)?;
        positive("zones.core.flatten_radius", core.flatten_radius)?;
        in_range("zones.core.flatten_strength", core.flatten_strength, 0.0, 1.0)?;
        let restricted = &self.zones.restricted;
        rect("restricted", restricted.min, restricted.max)?;
        finite("zones.restricted.boost", restricted.boost)?;
        positive("zones.restricted.transition_width", restricted.transition_width)?;
        density("core", &core.density)?;
        density("restricted", &restricted.density)?;
        density("open", &self.zones.open.density)?;

        positive("roads.step", self.roads.step)?;
        non_negative("roads.clearance", self.roads.clearance)?;
        positive("roads.slab_thickness", self.roads.slab_thickness)?;
        if let Some(spacing) = self.roads.grid_spacing {
            positive("roads.grid_width", self.roads.grid_width)?;
            // Grid roads may touch but never overlap.
            let min = 2.0 * self.roads.grid_width;
            finite("roads.grid_spacing", spacing)?;
            if spacing < min {
                return Err(ConfigError::OutOfRange {
                    field: "roads.grid_spacing".to_owned(),
                    value: spacing,
                    min,
                    max: f64::INFINITY,
                });
            }
        }
        for road in self.all_roads() {
            path(&road.name, &road.waypoints, road.width)?;
        }

        if let Some(river) = &self.river {
            path(&river.name, &river.waypoints, river.width)?;
            positive(&format!("river '{}'.max_depth", river.name), river.max_depth)?;
            non_negative(&format!("river '{}'.water_level", river.name), river.water_level)?;
            water_below_bank(&format!("river '{}'", river.name), river.water_level, river.max_depth)?;
        }
        for (i, lake) in self.lakes.iter().enumerate() {
            finite(&format!("lakes[{i}].center.x"), lake.center[0])?;
            finite(&format!("lakes[{i}].center.z"), lake.center[1])?;
            positive(&format!("lakes[{i}].radius"), lake.radius)?;
            positive(&format!("lakes[{i}].max_depth"), lake.max_depth)?;
            non_negative(&format!("lakes[{i}].water_level"), lake.water_level)?;
            water_below_bank(&format!("lakes[{i}]"), lake.water_level, lake.max_depth)?;
        }

        let p = &self.placement;
        non_negative("placement.road_exclusion", p.road_exclusion)?;
        non_negative("placement.water_exclusion", p.water_exclusion)?;
        non_negative("placement.min_spacing", p.min_spacing)?;
        positive("placement.attempts_per_prop", f64::from(p.attempts_per_prop))?;
        positive("placement.torch_spacing", p.torch_spacing)?;
        for (field, value) in [
            ("placement.tree_embed", p.tree_embed),
            ("placement.rock_embed", p.rock_embed),
            ("placement.signpost_embed", p.signpost_embed),
            ("placement.torch_embed", p.torch_embed),
            ("placement.torch_offset", p.torch_offset),
            ("placement.signpost_offset", p.signpost_offset),
        ] {
            non_negative(field, value)?;
        }

        non_negative("bridge.margin", self.bridge.margin)?;
        finite("bridge.deck_clearance", self.bridge.deck_clearance)?;
        non_negative("bridge.extra_width", self.bridge.extra_width)?;
        in_range("bridge.min_crossing_sin", self.bridge.min_crossing_sin, 0.01, 1.0)?;

        positive("boundary.thickness", self.boundary.thickness)?;
        non_negative("boundary.overhang", self.boundary.overhang)?;
        positive("pacing.yield_every_chunks", f64::from(self.pacing.yield_every_chunks))?;
        Ok(())
    }
}

fn finite(field: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field: field.to_owned() })
    }
}

fn positive(field: &str, value: f64) -> ConfigResult<()> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field: field.to_owned(), value })
    }
}

fn non_negative(field: &str, value: f64) -> ConfigResult<()> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field: field.to_owned(),
            value,
            min: 0.0,
            max: f64::INFINITY,
        })
    }
}

fn in_range(field: &str, value: f64, min: f64, max: f64) -> ConfigResult<()> {
    finite(field, value)?;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field: field.to_owned(), value, min, max })
    }
}

fn density(zone: &'static str, density: &ZoneDensity) -> ConfigResult<()> {
    for (kind, value) in [("tree", density.trees), ("rock", density.rocks)] {
        if !value.is_finite() {
            return Err(ConfigError::NonFinite {
                field: format!("zones.{zone}.density.{kind}s"),
            });
        }
        if value < 0.0 {
            return Err(ConfigError::NegativeDensity { zone, kind, value });
        }
    }
    Ok(())
}

fn rect(zone: &'static str, min: [f64; 2], max: [f64; 2]) -> ConfigResult<()> {
    for (axis, lo, hi) in [("x", min[0], max[0]), ("z", min[1], max[1])] {
        finite(&format!("zones.{zone}.min.{axis}"), lo)?;
        finite(&format!("zones.{zone}.max.{axis}"), hi)?;
    }
    if min[0] < max[0] && min[1] < max[1] {
        Ok(())
    } else {
        Err(ConfigError::InvertedRect { zone, min, max })
    }
}

fn water_below_bank(body: &str, water_level: f64, max_depth: f64) -> ConfigResult<()> {
    if water_level <= max_depth {
        Ok(())
    } else {
        Err(ConfigError::WaterAboveBank {
            body: body.to_owned(),
            water_level,
            max_depth,
        })
    }
}

fn path(name: &str, waypoints: &[[f64; 2]], width: f64) -> ConfigResult<()> {
    if waypoints.len() < 2 {
        return Err(ConfigError::TooFewWaypoints {
            path: name.to_owned(),
            count: waypoints.len(),
        });
    }
    for (i, [x, z]) in waypoints.iter().enumerate() {
        finite(&format!("'{name}'.waypoints[{i}].x"), *x)?;
        finite(&format!("'{name}'.waypoints[{i}].z"), *z)?;
    }
    finite(&format!("'{name}'.width"), width)?;
    if width <= 0.0 {
        return Err(ConfigError::ZeroWidth { path: name.to_owned() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        WorldConfig::default().validate().unwrap();
    }

    #[test]
    fn test_zero_width_road_rejected() {
        let mut config = WorldConfig::default();
        config.roads.main[0].width = 0.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::ZeroWidth { ref path } if path == "King's Road"));
    }

    #[test]
    fn test_zero_width_river_rejected() {
        let mut config = WorldConfig::default();
        if let Some(river) = config.river.as_mut() {
            river.width = 0.0;
        }
        assert!(matches!(config.validate(), Err(ConfigError::ZeroWidth { .. })));
    }

    #[test]
    fn test_negative_density_rejected() {
        let mut config = WorldConfig::default();
        config.zones.open.density.trees = -0.1;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NegativeDensity { zone: "open", kind: "tree", .. }
        ));
    }

    #[test]
    fn test_single_waypoint_rejected() {
        let mut config = WorldConfig::default();
        config.roads.main[1].waypoints.truncate(1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooFewWaypoints { count: 1, .. })
        ));
    }

    #[test]
    fn test_inverted_vertical_range_rejected() {
        let mut config = WorldConfig::default();
        config.map.ceiling_y = config.map.floor_y;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyVerticalRange { .. })
        ));
    }

    #[test]
    fn test_inverted_zone_rect_rejected() {
        let mut config = WorldConfig::default();
        config.zones.restricted.min = [900.0, -300.0];
        config.zones.restricted.max = [300.0, -900.0];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRect { zone: "restricted", .. })
        ));
    }

    #[test]
    fn test_nan_zone_corner_rejected() {
        let mut config = WorldConfig::default();
        config.zones.core.max[1] = f64::NAN;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::NonFinite { ref field } if field == "zones.core.max.z"));
    }

    #[test]
    fn test_nan_lake_center_rejected() {
        let mut config = WorldConfig::default();
        config.lakes[0].center[0] = f64::INFINITY;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::NonFinite { ref field } if field == "lakes[0].center.x"));
    }

    #[test]
    fn test_river_water_above_bank_rejected() {
        let mut config = WorldConfig::default();
        if let Some(river) = config.river.as_mut() {
            river.water_level = river.max_depth + 1.0;
        }
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WaterAboveBank { ref body, .. }) if body == "river 'Silverrun'"
        ));
    }

    #[test]
    fn test_lake_water_above_bank_rejected() {
        let mut config = WorldConfig::default();
        config.lakes[0].water_level = 20.0;
        assert!(matches!(config.validate(), Err(ConfigError::WaterAboveBank { .. })));
    }

    #[test]
    fn test_tiny_grid_spacing_rejected() {
        let mut config = WorldConfig::default();
        config.roads.grid_spacing = Some(1e-9);
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange { ref field, min, .. }
                if field == "roads.grid_spacing" && min == 2.0 * config.roads.grid_width
        ));

        config.roads.grid_spacing = Some(2.0 * config.roads.grid_width);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = WorldConfig::from_toml_str(
            r#"
            seed = 7

            [map]
            width = 512.0
            depth = 256.0

            [roads]
            grid_spacing = 100.0
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.map.width, 512.0);
        assert_eq!(config.map.voxel_size, 4.0);
        assert_eq!(config.roads.main.len(), 2);
        assert_eq!(config.props_seed(), 7);
    }

    #[test]
    fn test_toml_round_trip_of_default() {
        let text = toml::to_string(&WorldConfig::default()).unwrap();
        let parsed = WorldConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, WorldConfig::default());
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = WorldConfig::from_toml_str("map = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_secondary_grid_roads() {
        let mut config = WorldConfig::default();
        config.map.width = 400.0;
        config.map.depth = 400.0;
        config.roads.grid_spacing = Some(100.0);
        let roads = config.all_roads();
        // Two main roads plus offsets +-100 on each axis; 200 is on the edge.
        assert_eq!(roads.len(), 2 + 4);
        assert!(roads[2..].iter().all(|r| r.width == config.roads.grid_width));
    }
}
