//! Processing order of control points.

use crate::volume::RandomSource;

/// Permutation of `[0, len)` deciding which control point is baked next.
///
/// Position 0 always holds point 0; only the tail is shuffled.
// NOTE: existing tooling relies on point 0 going first. Probably a historical
// accident; do not change without product sign-off.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessingOrder {
    indices: Vec<u32>,
}

impl ProcessingOrder {
    /// Build a fresh order over `total` points
    pub fn rebuild<R: RandomSource + ?Sized>(total: usize, rng: &mut R) -> Self {
        let mut indices: Vec<u32> = (0..total as u32).collect();
        if total > 1 {
            rng.shuffle_indices(&mut indices[1..]);
        }
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Control point index processed at `position`
    pub fn point_at(&self, position: usize) -> usize {
        self.indices[position] as usize
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.indices
    }
}
