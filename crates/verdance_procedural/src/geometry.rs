//! Planar geometry on the XZ plane.
//!
//! Points are `[x, z]` pairs in world units.

/// A point on the map plane.
pub type Point2 = [f64; 2];

/// Axis-aligned rectangle, `min` inclusive, `max` exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Minimum corner.
    pub min: Point2,
    /// Maximum corner.
    pub max: Point2,
}

impl Rect {
    /// Creates a rectangle from its corners.
    #[must_use]
    pub const fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// Returns true if the point lies inside.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: Point2) -> bool {
        p[0] >= self.min[0] && p[0] < self.max[0] && p[1] >= self.min[1] && p[1] < self.max[1]
    }

    /// Distance from an interior point to the nearest edge; zero outside.
    #[must_use]
    pub fn edge_distance(&self, p: Point2) -> f64 {
        if !self.contains(p) {
            return 0.0;
        }
        (p[0] - self.min[0])
            .min(self.max[0] - p[0])
            .min(p[1] - self.min[1])
            .min(self.max[1] - p[1])
    }

    /// Overlap with another rectangle; zero-sized if disjoint.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let min = [self.min[0].max(other.min[0]), self.min[1].max(other.min[1])];
        let max = [
            self.max[0].min(other.max[0]).max(min[0]),
            self.max[1].min(other.max[1]).max(min[1]),
        ];
        Self { min, max }
    }

    /// Area in square units.
    #[must_use]
    pub fn area(&self) -> f64 {
        (self.max[0] - self.min[0]).max(0.0) * (self.max[1] - self.min[1]).max(0.0)
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> Point2 {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        ]
    }
}

/// Euclidean distance between two points.
#[inline]
#[must_use]
pub fn distance(a: Point2, b: Point2) -> f64 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

/// Closest point on segment `a -> b` to `p`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// Distance from `p` to the segment.
    pub distance: f64,
    /// Position of the foot along the segment, in [0, 1].
    pub t: f64,
    /// The foot point.
    pub foot: Point2,
}

/// Projects `p` onto segment `a -> b`.
#[must_use]
pub fn project_onto_segment(p: Point2, a: Point2, b: Point2) -> SegmentProjection {
    let d = [b[0] - a[0], b[1] - a[1]];
    let len2 = d[0] * d[0] + d[1] * d[1];
    let t = if len2 > 0.0 {
        (((p[0] - a[0]) * d[0] + (p[1] - a[1]) * d[1]) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let foot = [a[0] + d[0] * t, a[1] + d[1] * t];
    SegmentProjection {
        distance: distance(p, foot),
        t,
        foot,
    }
}

/// Shortest distance from `p` to a polyline.
#[must_use]
pub fn distance_to_polyline(p: Point2, waypoints: &[Point2]) -> f64 {
    match waypoints {
        [] => f64::INFINITY,
        [only] => distance(p, *only),
        _ => waypoints
            .windows(2)
            .map(|w| project_onto_segment(p, w[0], w[1]).distance)
            .fold(f64::INFINITY, f64::min),
    }
}

/// Intersection of two segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Intersection point.
    pub point: Point2,
    /// Parameter along the first segment.
    pub t: f64,
    /// Parameter along the second segment.
    pub u: f64,
    /// `|sin|` of the angle between the segments.
    pub sin_angle: f64,
}

/// Intersects segment `a1 -> a2` with `b1 -> b2`.
///
/// Parallel and collinear segments never intersect.
#[must_use]
pub fn segment_intersection(a1: Point2, a2: Point2, b1: Point2, b2: Point2) -> Option<SegmentHit> {
    let r = [a2[0] - a1[0], a2[1] - a1[1]];
    let s = [b2[0] - b1[0], b2[1] - b1[1]];
    let denom = cross(r, s);
    let len = (r[0].hypot(r[1])) * (s[0].hypot(s[1]));
    if len == 0.0 || (denom / len).abs() < 1e-9 {
        return None;
    }
    let q = [b1[0] - a1[0], b1[1] - a1[1]];
    let t = cross(q, s) / denom;
    let u = cross(q, r) / denom;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }
    Some(SegmentHit {
        point: [a1[0] + r[0] * t, a1[1] + r[1] * t],
        t,
        u,
        sin_angle: (denom / len).abs(),
    })
}

#[inline]
fn cross(a: Point2, b: Point2) -> f64 {
    a[0] * b[1] - a[1] * b[0]
}

/// Unit direction of `a -> b`, or +X for a degenerate segment.
#[must_use]
pub fn direction(a: Point2, b: Point2) -> Point2 {
    let d = [b[0] - a[0], b[1] - a[1]];
    let len = d[0].hypot(d[1]);
    if len > 0.0 {
        [d[0] / len, d[1] / len]
    } else {
        [1.0, 0.0]
    }
}

/// Yaw that turns local +X onto the planar direction `(dx, dz)`.
///
/// Positive yaw turns +X toward -Z.
#[must_use]
pub fn yaw_for_direction(dx: f64, dz: f64) -> f32 {
    (-dz).atan2(dx) as f32
}

/// Total length of a polyline.
#[must_use]
pub fn polyline_length(waypoints: &[Point2]) -> f64 {
    waypoints.windows(2).map(|w| distance(w[0], w[1])).sum()
}

/// Point at arc length `s` along a polyline and the direction of the
/// segment it lies on. `None` past either end.
#[must_use]
pub fn point_along(waypoints: &[Point2], s: f64) -> Option<(Point2, Point2)> {
    if s < 0.0 {
        return None;
    }
    let mut walked = 0.0;
    for w in waypoints.windows(2) {
        let length = distance(w[0], w[1]);
        if s <= walked + length && length > 0.0 {
            let dir = direction(w[0], w[1]);
            let along = s - walked;
            return Some(([w[0][0] + dir[0] * along, w[0][1] + dir[1] * along], dir));
        }
        walked += length;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edge_distance() {
        let rect = Rect::new([0.0, 0.0], [100.0, 50.0]);
        assert_eq!(rect.edge_distance([50.0, 25.0]), 25.0);
        assert_eq!(rect.edge_distance([5.0, 25.0]), 5.0);
        assert_eq!(rect.edge_distance([-5.0, 25.0]), 0.0);
        assert_eq!(rect.area(), 5000.0);
    }

    #[test]
    fn test_rect_intersect_disjoint_is_empty() {
        let a = Rect::new([0.0, 0.0], [10.0, 10.0]);
        let b = Rect::new([20.0, 20.0], [30.0, 30.0]);
        assert_eq!(a.intersect(&b).area(), 0.0);
        let c = Rect::new([5.0, -5.0], [15.0, 5.0]);
        assert_eq!(a.intersect(&c).area(), 25.0);
    }

    #[test]
    fn test_projection_clamps_to_segment() {
        let p = project_onto_segment([-5.0, 3.0], [0.0, 0.0], [10.0, 0.0]);
        assert_eq!(p.t, 0.0);
        assert!((p.distance - 34f64.sqrt()).abs() < 1e-12);

        let p = project_onto_segment([4.0, -3.0], [0.0, 0.0], [10.0, 0.0]);
        assert!((p.t - 0.4).abs() < 1e-12);
        assert_eq!(p.distance, 3.0);
    }

    #[test]
    fn test_perpendicular_intersection() {
        let hit = segment_intersection([-10.0, 0.0], [10.0, 0.0], [3.0, -5.0], [3.0, 5.0])
            .expect("segments cross");
        assert!((hit.point[0] - 3.0).abs() < 1e-12 && hit.point[1].abs() < 1e-12);
        assert!((hit.sin_angle - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_and_disjoint_segments() {
        assert!(segment_intersection([0.0, 0.0], [10.0, 0.0], [0.0, 1.0], [10.0, 1.0]).is_none());
        assert!(segment_intersection([0.0, 0.0], [1.0, 0.0], [3.0, -5.0], [3.0, 5.0]).is_none());
    }

    #[test]
    fn test_oblique_intersection_angle() {
        let hit = segment_intersection([0.0, 0.0], [10.0, 0.0], [0.0, -5.0], [10.0, 5.0]).unwrap();
        assert!((hit.sin_angle - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
        assert!((hit.point[0] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_yaw_convention() {
        assert_eq!(yaw_for_direction(1.0, 0.0), 0.0);
        let yaw = yaw_for_direction(0.0, -1.0);
        assert!((f64::from(yaw) - std::f64::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_polyline_distance_and_length() {
        let line = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]];
        assert_eq!(distance_to_polyline([12.0, 5.0], &line), 2.0);
        assert_eq!(polyline_length(&line), 20.0);
    }

    #[test]
    fn test_point_along_turns_corners() {
        let line = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]];
        assert_eq!(point_along(&line, 4.0), Some(([4.0, 0.0], [1.0, 0.0])));
        assert_eq!(point_along(&line, 15.0), Some(([10.0, 5.0], [0.0, 1.0])));
        assert_eq!(point_along(&line, 20.5), None);
        assert_eq!(point_along(&line, -1.0), None);
    }
}
