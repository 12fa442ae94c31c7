use std::fmt::Debug;

use super::factor::Factor;
use crate::{Key, Permutation};

/// A conditional distribution P(frontals | parents).
///
/// The frontal set is never empty; the parent set (the separator, when the
/// conditional sits in a clique) may be.
pub trait Conditional: Clone + Debug {
    type Factor: Factor;

    fn frontals(&self) -> &[Key];

    fn parents(&self) -> &[Key];

    /// Frontal keys followed by parent keys.
    fn keys(&self) -> Vec<Key> {
        let mut keys = Vec::with_capacity(self.frontals().len() + self.parents().len());
        keys.extend_from_slice(self.frontals());
        keys.extend_from_slice(self.parents());
        keys
    }

    fn nr_frontals(&self) -> usize {
        self.frontals().len()
    }

    fn nr_parents(&self) -> usize {
        self.parents().len()
    }

    /// Dimension of frontal variable `key`.
    fn dim(&self, key: Key) -> usize;

    /// Equality within `tol`.
    fn equals(&self, other: &Self, tol: f64) -> bool;

    /// This conditional as a plain factor, for recombination during queries.
    fn to_factor(&self) -> Self::Factor;

    /// Replace every key `j` (frontal and parent) by `inverse.apply(j)`.
    fn permute_with_inverse(&mut self, inverse: &Permutation);

    /// Relabel only the separator. Frontal keys must be fixed points of
    /// `inverse`. Returns whether any parent key changed.
    fn permute_separator_with_inverse(&mut self, inverse: &Permutation) -> bool {
        debug_assert!(
            self.frontals().iter().all(|&k| inverse.apply(k) == k),
            "frontal keys must be fixed points of a separator permutation"
        );
        let changed = self.parents().iter().any(|&k| inverse.apply(k) != k);
        if changed {
            self.permute_with_inverse(inverse);
        }
        changed
    }
}
