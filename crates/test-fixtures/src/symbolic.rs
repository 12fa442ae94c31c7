//! Symbolic conditionals and factors: pure variable structure, no numbers.
//!
//! Eliminating a symbolic factor graph yields the same tree shape a numeric
//! one would, which is all the tree algorithms care about.

use std::fmt;

use bayes_core::errors::EliminationError;
use bayes_core::{Conditional, Eliminated, Factor, Key, Permutation};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub type KeyVec = SmallVec<[Key; 4]>;

/// A factor that only records which variables it touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolicFactor {
    keys: KeyVec,
}

impl SymbolicFactor {
    /// Keys are sorted and de-duplicated.
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        let mut keys: KeyVec = keys.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();
        Self { keys }
    }
}

impl Factor for SymbolicFactor {
    fn keys(&self) -> &[Key] {
        &self.keys
    }

    fn equals(&self, other: &Self, _tol: f64) -> bool {
        let mut a = self.keys.clone();
        let mut b = other.keys.clone();
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }

    fn permute_with_inverse(&mut self, inverse: &Permutation) {
        inverse.apply_all(&mut self.keys);
    }
}

/// P(frontals | parents) with no numeric content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolicConditional {
    frontals: KeyVec,
    parents: KeyVec,
    #[serde(default = "default_dim")]
    dim: usize,
}

fn default_dim() -> usize {
    1
}

impl SymbolicConditional {
    pub fn new(frontals: &[Key], parents: &[Key]) -> Self {
        debug_assert!(!frontals.is_empty(), "a conditional needs a frontal variable");
        Self {
            frontals: frontals.iter().copied().collect(),
            parents: parents.iter().copied().collect(),
            dim: default_dim(),
        }
    }

    /// Shorthand for a single-frontal conditional.
    pub fn single(frontal: Key, parents: &[Key]) -> Self {
        Self::new(&[frontal], parents)
    }

    /// Every frontal variable gets dimension `dim`.
    pub fn with_dim(mut self, dim: usize) -> Self {
        self.dim = dim;
        self
    }
}

impl Conditional for SymbolicConditional {
    type Factor = SymbolicFactor;

    fn frontals(&self) -> &[Key] {
        &self.frontals
    }

    fn parents(&self) -> &[Key] {
        &self.parents
    }

    fn dim(&self, _key: Key) -> usize {
        self.dim
    }

    fn equals(&self, other: &Self, _tol: f64) -> bool {
        self.frontals == other.frontals && self.parents == other.parents && self.dim == other.dim
    }

    fn to_factor(&self) -> SymbolicFactor {
        SymbolicFactor::new(self.keys())
    }

    fn permute_with_inverse(&mut self, inverse: &Permutation) {
        inverse.apply_all(&mut self.frontals);
        inverse.apply_all(&mut self.parents);
    }
}

impl fmt::Display for SymbolicConditional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P(")?;
        for k in &self.frontals {
            write!(f, " {k}")?;
        }
        if !self.parents.is_empty() {
            write!(f, " |")?;
            for k in &self.parents {
                write!(f, " {k}")?;
            }
        }
        write!(f, " )")
    }
}

/// Symbolic elimination: the conditional's parents are every other variable
/// touched by `factors`, and the remaining factor is over those parents.
pub fn eliminate_symbolic(
    factors: &[SymbolicFactor],
    frontals: &[Key],
) -> Result<Eliminated<SymbolicConditional>, EliminationError> {
    if frontals.is_empty() {
        return Err(EliminationError::EmptyResult { keys: Vec::new() });
    }

    let mut all: Vec<Key> = factors.iter().flat_map(|f| f.keys().iter().copied()).collect();
    all.sort_unstable();
    all.dedup();

    let missing: Vec<Key> = frontals
        .iter()
        .copied()
        .filter(|k| all.binary_search(k).is_err())
        .collect();
    if !missing.is_empty() {
        return Err(EliminationError::MissingVariables { keys: missing });
    }

    let parents: Vec<Key> = all.into_iter().filter(|k| !frontals.contains(k)).collect();
    let remaining = (!parents.is_empty()).then(|| SymbolicFactor::new(parents.iter().copied()));

    Ok(Eliminated {
        conditional: SymbolicConditional::new(frontals, &parents),
        remaining,
    })
}
