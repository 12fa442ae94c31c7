//! Per-variable dimensions gathered over a tree, for sizing a companion
//! numeric buffer.

use bayes_core::{Conditional, Key};
use serde::{Deserialize, Serialize};

use crate::tree::BayesTree;

/// One contiguous zero-initialized buffer split into per-key slices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorValues {
    dims: Vec<usize>,
    offsets: Vec<usize>,
    values: Vec<f64>,
}

impl VectorValues {
    /// Zero vectors with `dims[key]` entries for each key.
    pub fn zero(dims: Vec<usize>) -> Self {
        let mut offsets = Vec::with_capacity(dims.len());
        let mut total = 0;
        for &d in &dims {
            offsets.push(total);
            total += d;
        }
        Self {
            dims,
            offsets,
            values: vec![0.0; total],
        }
    }

    /// Number of keys (including zero-dimensional ones).
    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn dim(&self, key: Key) -> Option<usize> {
        self.dims.get(key).copied()
    }

    pub fn total_dim(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, key: Key) -> Option<&[f64]> {
        let start = *self.offsets.get(key)?;
        self.values.get(start..start + self.dims[key])
    }

    pub fn get_mut(&mut self, key: Key) -> Option<&mut [f64]> {
        let start = *self.offsets.get(key)?;
        let end = start + self.dims[key];
        self.values.get_mut(start..end)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Zero-filled values sized by the dimension of every frontal variable.
///
/// Keys the index does not hold get dimension zero.
pub fn allocate_vector_values<C: Conditional>(tree: &BayesTree<C>) -> VectorValues {
    let mut dims = vec![0; tree.nodes().len()];
    let Some(root) = tree.root() else {
        return VectorValues::zero(dims);
    };
    let mut stack = vec![root];
    while let Some(clique) = stack.pop() {
        let conditional = clique.conditional();
        for &key in conditional.frontals() {
            if let Some(slot) = dims.get_mut(key) {
                *slot = conditional.dim(key);
            }
        }
        stack.extend(clique.children());
    }
    VectorValues::zero(dims)
}
