//! # Height Field
//!
//! The single source of truth for ground elevation. Every pass that needs
//! "where is the ground" calls [`HeightField::height`]; nothing caches it.
//!
//! `height = base + sum(amplitude * simplex(x * frequency + offset, ...))`,
//! then shaped by the zones:
//!
//! - core: inside `flatten_radius` of the core centre the raw height is
//!   scaled by `1 - (1 - t^2) * strength`, `t = dist / radius`
//! - restricted: `boost * clamp(edge_distance / transition_width, 0, 1)`
//!   is added inside the rectangle
//!
//! Both factors are zero at their boundary, so the field stays continuous.

use crate::config::{Octave, WorldConfig};
use crate::geometry::{Point2, Rect};
use crate::noise::{purpose, SimplexNoise, WorldSeed};

/// Deterministic elevation function.
pub struct HeightField {
    noise: SimplexNoise,
    base_height: f64,
    seed_offset: f64,
    octaves: Vec<Octave>,
    core_center: Point2,
    flatten_radius: f64,
    flatten_strength: f64,
    restricted: Rect,
    boost: f64,
    transition_width: f64,
}

impl HeightField {
    /// Builds the field for a configuration.
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        let zones = &config.zones;
        Self {
            noise: SimplexNoise::new(WorldSeed::new(config.seed).derive(purpose::HEIGHT)),
            base_height: config.noise.base_height,
            seed_offset: config.noise.seed_offset,
            octaves: config.noise.octaves.clone(),
            core_center: zones.core.center(),
            flatten_radius: zones.core.flatten_radius,
            flatten_strength: zones.core.flatten_strength.clamp(0.0, 1.0),
            restricted: Rect::new(zones.restricted.min, zones.restricted.max),
            boost: zones.restricted.boost,
            transition_width: zones.restricted.transition_width,
        }
    }

    /// Summed octaves before zone shaping.
    #[must_use]
    pub fn raw_height(&self, x: f64, z: f64) -> f64 {
        let offset = self.seed_offset;
        self.octaves.iter().fold(self.base_height, |acc, octave| {
            let nx = x * octave.frequency + offset;
            let nz = z * octave.frequency + offset;
            acc + octave.amplitude * self.noise.sample(nx, nz)
        })
    }

    /// Core flattening at `(x, z)`, in [0, 1].
    #[must_use]
    pub fn flatten_factor(&self, x: f64, z: f64) -> f64 {
        let dx = x - self.core_center[0];
        let dz = z - self.core_center[1];
        let dist = dx.hypot(dz);
        if dist >= self.flatten_radius {
            return 0.0;
        }
        let t = dist / self.flatten_radius;
        ((1.0 - t * t) * self.flatten_strength).clamp(0.0, 1.0)
    }

    /// Restricted-zone boost at `(x, z)`.
    #[must_use]
    pub fn restricted_boost(&self, x: f64, z: f64) -> f64 {
        let edge = self.restricted.edge_distance([x, z]);
        if edge <= 0.0 {
            return 0.0;
        }
        self.boost * (edge / self.transition_width).clamp(0.0, 1.0)
    }

    /// Shaped ground elevation at `(x, z)`.
    #[must_use]
    pub fn height(&self, x: f64, z: f64) -> f64 {
        let raw = self.raw_height(x, z);
        raw * (1.0 - self.flatten_factor(x, z)) + self.restricted_boost(x, z)
    }
}
