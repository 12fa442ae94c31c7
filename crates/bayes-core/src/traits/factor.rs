use std::fmt::Debug;

use crate::{Key, Permutation};

/// A local factor over a set of variables.
pub trait Factor: Clone + Debug {
    /// Variables this factor involves.
    fn keys(&self) -> &[Key];

    /// Equality within `tol`.
    fn equals(&self, other: &Self, tol: f64) -> bool;

    /// Replace every key `j` by `inverse.apply(j)`.
    fn permute_with_inverse(&mut self, inverse: &Permutation);

    fn involves(&self, key: Key) -> bool {
        self.keys().contains(&key)
    }
}

/// An ordered product of factors.
pub type FactorGraph<F> = Vec<F>;
