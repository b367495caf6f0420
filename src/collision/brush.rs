// src/collision/brush.rs

use std::collections::BTreeSet;

use crate::collision::PlaneIndex;
use crate::utils::Vec3;

/// Six one-sided slab extents. `positive` bounds +X/+Y/+Z, `negative`
/// holds the negated minimums so that every value is a distance along its
/// outward direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SixDop {
    pub positive: Vec3,
    pub negative: Vec3,
}

impl SixDop {
    /// Tightest slab around `points`.
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Vec3>,
    {
        let inf = f64::INFINITY;
        let (max, min) = points.into_iter().fold(
            (Vec3::new(-inf, -inf, -inf), Vec3::new(inf, inf, inf)),
            |(max, min), p| (max.max(p), min.min(p)),
        );
        SixDop {
            positive: max,
            negative: -min,
        }
    }

    /// Non-strict containment: `p <= positive` and `-p <= negative`.
    pub fn contains(&self, point: &Vec3, epsilon: f64) -> bool {
        (0..3).all(|axis| {
            point.get(axis) <= self.positive.get(axis) + epsilon
                && -point.get(axis) <= self.negative.get(axis) + epsilon
        })
    }

    /// `[+x, +y, +z, -x, -y, -z]`, the serialized order.
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.positive.x,
            self.positive.y,
            self.positive.z,
            self.negative.x,
            self.negative.y,
            self.negative.z,
        ]
    }
}

/// Convex region around one mesh face.
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    pub sixdop: SixDop,
    pub plane_indices: BTreeSet<PlaneIndex>,
}
