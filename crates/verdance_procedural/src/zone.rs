//! # Zone Classification
//!
//! Splits the map into three named regions with a fixed priority:
//! core beats restricted, restricted beats open wilderness.

use rand::Rng;
use verdance_core::Material;

use crate::config::{WorldConfig, ZoneDensity};
use crate::geometry::{Point2, Rect};

/// Named map region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Zone {
    /// Safe, flattened build area around the map centre.
    Core = 0,
    /// Raised, forbidden ground with dead vegetation.
    Restricted = 1,
    /// Everything else.
    Open = 2,
}

impl Zone {
    /// All zones, in priority order.
    pub const ALL: [Self; 3] = [Self::Core, Self::Restricted, Self::Open];

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Restricted => "restricted",
            Self::Open => "open",
        }
    }

    /// Surface material for this zone.
    #[must_use]
    pub const fn surface_material(self) -> Material {
        match self {
            Self::Core => Material::Grass,
            Self::Restricted => Material::Basalt,
            Self::Open => Material::LeafyGrass,
        }
    }
}

/// Point-to-zone lookup plus per-zone parameters.
#[derive(Debug, Clone)]
pub struct ZoneClassifier {
    map: Rect,
    core: Rect,
    restricted: Rect,
    densities: [ZoneDensity; 3],
}

impl ZoneClassifier {
    /// Rejection-sampling budget for zones that share their bounding box
    /// with a higher-priority zone.
    const SAMPLE_TRIES: u32 = 32;

    /// Builds the classifier from a configuration.
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        let [hx, hz] = config.map.half_extents();
        let zones = &config.zones;
        Self {
            map: Rect::new([-hx, -hz], [hx, hz]),
            core: Rect::new(zones.core.min, zones.core.max),
            restricted: Rect::new(zones.restricted.min, zones.restricted.max),
            densities: [
                zones.core.density,
                zones.restricted.density,
                zones.open.density,
            ],
        }
    }

    /// Zone containing `(x, z)`.
    #[must_use]
    pub fn classify(&self, x: f64, z: f64) -> Zone {
        let p = [x, z];
        if self.core.contains(p) {
            Zone::Core
        } else if self.restricted.contains(p) {
            Zone::Restricted
        } else {
            Zone::Open
        }
    }

    /// Surface material at `(x, z)`.
    #[must_use]
    pub fn surface_material_at(&self, x: f64, z: f64) -> Material {
        self.classify(x, z).surface_material()
    }

    /// Trees per square unit in `zone`.
    #[must_use]
    pub fn tree_density(&self, zone: Zone) -> f64 {
        self.densities[zone as usize].trees
    }

    /// Rocks per square unit in `zone`.
    #[must_use]
    pub fn rock_density(&self, zone: Zone) -> f64 {
        self.densities[zone as usize].rocks
    }

    /// Area of `zone` that lies on the map.
    #[must_use]
    pub fn area(&self, zone: Zone) -> f64 {
        let core = self.core.intersect(&self.map);
        let restricted = self.restricted.intersect(&self.map);
        let overlap = core.intersect(&restricted).area();
        match zone {
            Zone::Core => core.area(),
            Zone::Restricted => restricted.area() - overlap,
            Zone::Open => (self.map.area() - core.area() - restricted.area() + overlap).max(0.0),
        }
    }

    /// Uniformly samples a point of `zone`.
    ///
    /// Returns `None` if the zone has no area or rejection sampling runs
    /// out of tries.
    pub fn sample_point<R: Rng + ?Sized>(&self, zone: Zone, rng: &mut R) -> Option<Point2> {
        let bounds = match zone {
            Zone::Core => self.core.intersect(&self.map),
            Zone::Restricted => self.restricted.intersect(&self.map),
            Zone::Open => self.map,
        };
        if bounds.area() <= 0.0 {
            return None;
        }
        (0..Self::SAMPLE_TRIES).find_map(|_| {
            let p = [
                rng.gen_range(bounds.min[0]..bounds.max[0]),
                rng.gen_range(bounds.min[1]..bounds.max[1]),
            ];
            (self.classify(p[0], p[1]) == zone).then_some(p)
        })
    }
}
