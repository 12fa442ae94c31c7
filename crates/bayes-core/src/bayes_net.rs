//! An ordered chain of conditionals.

use std::sync::Arc;

use crate::traits::Conditional;

/// Ordered list of shared conditionals.
///
/// Conditionals are held behind `Arc` so they can be handed between nets and
/// trees without copying; nothing mutates a conditional through a shared
/// handle.
#[derive(Debug, Clone)]
pub struct BayesNet<C> {
    conditionals: Vec<Arc<C>>,
}

impl<C> Default for BayesNet<C> {
    fn default() -> Self {
        Self {
            conditionals: Vec::new(),
        }
    }
}

impl<C: Conditional> BayesNet<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_shared(conditionals: Vec<Arc<C>>) -> Self {
        Self { conditionals }
    }

    pub fn push(&mut self, conditional: impl Into<Arc<C>>) {
        self.conditionals.push(conditional.into());
    }

    pub fn push_front(&mut self, conditional: impl Into<Arc<C>>) {
        self.conditionals.insert(0, conditional.into());
    }

    pub fn extend(&mut self, other: BayesNet<C>) {
        self.conditionals.extend(other.conditionals);
    }

    pub fn len(&self) -> usize {
        self.conditionals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditionals.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<C>> {
        self.conditionals.iter()
    }

    pub fn get(&self, i: usize) -> Option<&Arc<C>> {
        self.conditionals.get(i)
    }

    /// Element-wise equality within `tol`.
    pub fn equals(&self, other: &Self, tol: f64) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.equals(b, tol))
    }

    /// The factors of every conditional, in order.
    pub fn to_factors(&self) -> Vec<C::Factor> {
        self.iter().map(|c| c.to_factor()).collect()
    }

    pub fn into_vec(self) -> Vec<Arc<C>> {
        self.conditionals
    }
}

impl<C: Conditional> FromIterator<C> for BayesNet<C> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self {
            conditionals: iter.into_iter().map(Arc::new).collect(),
        }
    }
}

impl<C> IntoIterator for BayesNet<C> {
    type Item = Arc<C>;
    type IntoIter = std::vec::IntoIter<Arc<C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditionals.into_iter()
    }
}

impl<'a, C> IntoIterator for &'a BayesNet<C> {
    type Item = &'a Arc<C>;
    type IntoIter = std::slice::Iter<'a, Arc<C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditionals.iter()
    }
}
