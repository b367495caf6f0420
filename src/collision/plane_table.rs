// src/collision/plane_table.rs

use std::fmt;

use crate::utils::Plane;

/// Signed reference into a [`PlaneTable`].
///
/// `i >= 0` is stored plane `i`; `-(i + 1)` is stored plane `i` with its
/// normal and distance negated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaneIndex(pub i32);

impl PlaneIndex {
    pub fn stored(index: usize) -> Self {
        PlaneIndex(index as i32)
    }

    pub fn flipped_of(index: usize) -> Self {
        PlaneIndex(-(index as i32 + 1))
    }

    pub fn is_flipped(self) -> bool {
        self.0 < 0
    }

    /// Position of the referenced entry in the table.
    pub fn slot(self) -> usize {
        if self.0 < 0 {
            (-(self.0 + 1)) as usize
        } else {
            self.0 as usize
        }
    }

    /// Reference to the same slot with the opposite orientation.
    pub fn flip(self) -> Self {
        PlaneIndex(-(self.0 + 1))
    }
}

impl fmt::Display for PlaneIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Insertion-ordered store of distinct planes. A plane and its flip share
/// one entry.
#[derive(Debug, Clone)]
pub struct PlaneTable {
    planes: Vec<Plane>,
    epsilon: f64,
}

impl PlaneTable {
    pub fn new(epsilon: f64) -> Self {
        PlaneTable {
            planes: Vec::new(),
            epsilon,
        }
    }

    /// Returns the reference for `candidate`, appending it only when no
    /// stored plane matches it directly or flipped.
    ///
    /// Entries are scanned in insertion order and each is tested for a
    /// direct match before its flip, so the first matching entry decides
    /// the sign of the result.
    pub fn add_plane(&mut self, candidate: Plane) -> PlaneIndex {
        let flipped = candidate.flipped();
        for (i, stored) in self.planes.iter().enumerate() {
            if candidate.approx_eq(stored, self.epsilon) {
                return PlaneIndex::stored(i);
            }
            if flipped.approx_eq(stored, self.epsilon) {
                return PlaneIndex::flipped_of(i);
            }
        }
        self.planes.push(candidate);
        PlaneIndex::stored(self.planes.len() - 1)
    }

    /// The plane `index` denotes, with the flip applied.
    pub fn resolve(&self, index: PlaneIndex) -> Option<Plane> {
        let plane = self.planes.get(index.slot())?;
        Some(if index.is_flipped() { plane.flipped() } else { *plane })
    }

    pub fn contains(&self, index: PlaneIndex) -> bool {
        index.slot() < self.planes.len()
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }
}
