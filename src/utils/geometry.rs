// src/utils/geometry.rs
use std::ops::{Add, Mul, Neg, Sub};

use crate::utils::util::approx_eq;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Component by axis index (0 = x, 1 = y, 2 = z).
    pub fn get(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn dot(&self, other: &Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction. A zero vector is returned unchanged.
    pub fn normalize(&self) -> Vec3 {
        let length = self.length();
        if length == 0.0 {
            return *self;
        }
        Vec3::new(self.x / length, self.y / length, self.z / length)
    }

    pub fn min(&self, other: &Vec3) -> Vec3 {
        Vec3::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    pub fn max(&self, other: &Vec3) -> Vec3 {
        Vec3::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// True when one of the components has magnitude 1 within `epsilon`.
    pub fn is_axis_aligned(&self, epsilon: f64) -> bool {
        [self.x, self.y, self.z]
            .iter()
            .any(|c| (c.abs() - 1.0).abs() <= epsilon)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// An infinite plane `dot(normal, x) = distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f64,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f64) -> Self {
        Self { normal, distance }
    }

    /// Plane with the given normal passing through `point`.
    pub fn through_point(normal: Vec3, point: &Vec3) -> Self {
        Self {
            normal,
            distance: normal.dot(point),
        }
    }

    /// Same surface, opposite orientation.
    pub fn flipped(&self) -> Plane {
        Plane::new(-self.normal, -self.distance)
    }

    /// Positive in front of the plane, negative behind it.
    pub fn signed_distance(&self, point: &Vec3) -> f64 {
        self.normal.dot(point) - self.distance
    }

    /// Component-wise comparison of all four values with an absolute tolerance.
    pub fn approx_eq(&self, other: &Plane, epsilon: f64) -> bool {
        self.as_array()
            .iter()
            .zip(other.as_array().iter())
            .all(|(&a, &b)| approx_eq(a, b, epsilon))
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.distance]
    }
}
