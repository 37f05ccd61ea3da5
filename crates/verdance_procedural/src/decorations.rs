//! Road furniture: signposts at junctions and torches along main roads.

use rand::Rng;
use verdance_core::VoxelVolume;
use verdance_shared::Quaternion;

use crate::config::{PlacementConfig, RoadPath};
use crate::geometry::{direction, distance, point_along, polyline_length, segment_intersection, yaw_for_direction, Point2};
use crate::placement::{place_on_surface, ExclusionMap};
use crate::props::{signpost, torch, PlacedProp, PropKind, SignpostParams, TorchParams};

/// Where two roads meet.
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    /// Intersection of the centrelines.
    pub position: Point2,
    /// Direction of the first road's segment.
    pub first: Point2,
    /// Direction of the second road's segment.
    pub second: Point2,
    /// Half widths of the two roads.
    pub half_widths: [f64; 2],
    /// `"first / second"` road names.
    pub label: String,
}

impl Junction {
    /// Signpost site: off the corner between the two roads' positive
    /// directions, `offset` beyond both edges.
    #[must_use]
    pub fn corner(&self, offset: f64) -> Point2 {
        let a = self.half_widths[1] + offset;
        let b = self.half_widths[0] + offset;
        [
            self.position[0] + self.first[0] * a + self.second[0] * b,
            self.position[1] + self.first[1] * a + self.second[1] * b,
        ]
    }
}

/// Intersections between every pair of distinct roads.
#[must_use]
pub fn find_junctions(roads: &[RoadPath]) -> Vec<Junction> {
    let mut junctions: Vec<Junction> = Vec::new();
    for (i, a) in roads.iter().enumerate() {
        for b in &roads[i + 1..] {
            for sa in a.waypoints.windows(2) {
                for sb in b.waypoints.windows(2) {
                    let Some(hit) = segment_intersection(sa[0], sa[1], sb[0], sb[1]) else {
                        continue;
                    };
                    let label = format!("{} / {}", a.name, b.name);
                    let duplicate = junctions
                        .iter()
                        .any(|j| j.label == label && distance(j.position, hit.point) < 1e-6);
                    if !duplicate {
                        junctions.push(Junction {
                            position: hit.point,
                            first: direction(sa[0], sa[1]),
                            second: direction(sb[0], sb[1]),
                            half_widths: [a.width * 0.5, b.width * 0.5],
                            label,
                        });
                    }
                }
            }
        }
    }
    junctions
}

/// One signpost per junction, skipped when the corner lands on a road or
/// by the water.
pub fn place_signposts<V: VoxelVolume + ?Sized, R: Rng + ?Sized>(
    volume: &V,
    junctions: &[Junction],
    exclusion: &ExclusionMap,
    placement: &PlacementConfig,
    rng: &mut R,
) -> Vec<PlacedProp> {
    let mut props = Vec::new();
    for junction in junctions {
        let site = junction.corner(placement.signpost_offset);
        if exclusion.on_road(site) || exclusion.near_water(site) {
            continue;
        }
        let model = signpost(rng, &SignpostParams::labelled(junction.label.clone()));
        if let Some(mut prop) =
            place_on_surface(volume, site[0], site[1], PropKind::Signpost, model, placement.signpost_embed)
        {
            prop.transform.rotation =
                Quaternion::from_yaw(yaw_for_direction(junction.first[0], junction.first[1]));
            props.push(prop);
        }
    }
    props
}

/// Torches every `torch_spacing` along each road, alternating sides, just
/// beyond the edge. Sites on another road or by the water are skipped.
pub fn place_torches<V: VoxelVolume + ?Sized, R: Rng + ?Sized>(
    volume: &V,
    roads: &[RoadPath],
    exclusion: &ExclusionMap,
    placement: &PlacementConfig,
    rng: &mut R,
) -> Vec<PlacedProp> {
    let params = TorchParams::default();
    let mut props = Vec::new();
    for road in roads {
        let length = polyline_length(&road.waypoints);
        let reach = road.width * 0.5 + placement.torch_offset;
        let mut k = 0u32;
        loop {
            let s = placement.torch_spacing * (f64::from(k) + 0.5);
            if s > length {
                break;
            }
            let side = if k % 2 == 0 { 1.0 } else { -1.0 };
            k += 1;
            let Some((p, dir)) = point_along(&road.waypoints, s) else {
                break;
            };
            let site = [p[0] - dir[1] * reach * side, p[1] + dir[0] * reach * side];
            if exclusion.on_road(site) || exclusion.near_water(site) {
                continue;
            }
            let model = torch(rng, &params);
            if let Some(prop) =
                place_on_surface(volume, site[0], site[1], PropKind::Torch, model, placement.torch_embed)
            {
                props.push(prop);
            }
        }
    }
    props
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;

    #[test]
    fn test_main_roads_meet_once() {
        let config = WorldConfig::default();
        let junctions = find_junctions(&config.all_roads());
        assert_eq!(junctions.len(), 1);
        assert_eq!(junctions[0].label, "King's Road / Pilgrim Way");
        assert!(distance(junctions[0].position, [0.0, 0.0]) < 1e-9);
        let corner = junctions[0].corner(2.5);
        assert!((corner[0] - 8.5).abs() < 1e-9 && (corner[1] - 8.5).abs() < 1e-9);
    }

    #[test]
    fn test_secondary_grid_junctions() {
        let mut config = WorldConfig::default();
        config.map.width = 400.0;
        config.map.depth = 400.0;
        config.roads.main.truncate(0);
        config.roads.grid_spacing = Some(100.0);
        // Two rows and two lanes cross four times.
        assert_eq!(find_junctions(&config.all_roads()).len(), 4);
    }
}
