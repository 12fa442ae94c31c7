//! Aggregate views over cliques: detached subtree collections and size
//! statistics.

use std::fmt;

use bayes_core::Conditional;
use serde::{Deserialize, Serialize};

use crate::tree::BayesTree;

/// An ordered collection of standalone subtrees, e.g. the orphans of a cut.
#[derive(Debug, Clone)]
pub struct Cliques<C: Conditional> {
    trees: Vec<BayesTree<C>>,
}

impl<C: Conditional> Default for Cliques<C> {
    fn default() -> Self {
        Self { trees: Vec::new() }
    }
}

impl<C: Conditional> Cliques<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tree: BayesTree<C>) {
        self.trees.push(tree);
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BayesTree<C>> {
        self.trees.iter()
    }

    /// Pairwise tree equality, in order.
    pub fn equals(&self, other: &Self, tol: f64) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.equals(b, tol))
    }

    pub fn into_vec(self) -> Vec<BayesTree<C>> {
        self.trees
    }
}

impl<C: Conditional> IntoIterator for Cliques<C> {
    type Item = BayesTree<C>;
    type IntoIter = std::vec::IntoIter<BayesTree<C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.trees.into_iter()
    }
}

impl<C: Conditional> FromIterator<BayesTree<C>> for Cliques<C> {
    fn from_iter<I: IntoIterator<Item = BayesTree<C>>>(iter: I) -> Self {
        Self {
            trees: iter.into_iter().collect(),
        }
    }
}

impl<C: Conditional> fmt::Display for Cliques<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tree) in self.trees.iter().enumerate() {
            writeln!(f, "subtree {i}:")?;
            f.write_str(&tree.print_tree())?;
        }
        Ok(())
    }
}

/// Per-clique frontal and separator sizes, in depth-first order from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliqueData {
    pub conditional_sizes: Vec<usize>,
    pub separator_sizes: Vec<usize>,
}

impl CliqueData {
    pub fn stats(&self) -> CliqueStats {
        let (avg_conditional_size, max_conditional_size) = avg_max(&self.conditional_sizes);
        let (avg_separator_size, max_separator_size) = avg_max(&self.separator_sizes);
        CliqueStats {
            avg_conditional_size,
            max_conditional_size,
            avg_separator_size,
            max_separator_size,
        }
    }
}

fn avg_max(sizes: &[usize]) -> (f64, usize) {
    if sizes.is_empty() {
        return (0.0, 0);
    }
    let sum: usize = sizes.iter().sum();
    let max = sizes.iter().copied().max().unwrap_or(0);
    (sum as f64 / sizes.len() as f64, max)
}

/// Summary of a tree's clique shapes. All zeros for an empty tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CliqueStats {
    pub avg_conditional_size: f64,
    pub max_conditional_size: usize,
    pub avg_separator_size: f64,
    pub max_separator_size: usize,
}

impl fmt::Display for CliqueStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "avg Conditional Size: {}", self.avg_conditional_size)?;
        writeln!(f, "max Conditional Size: {}", self.max_conditional_size)?;
        writeln!(f, "avg Separator Size: {}", self.avg_separator_size)?;
        write!(f, "max Separator Size: {}", self.max_separator_size)
    }
}

impl<C: Conditional> BayesTree<C> {
    /// Frontal and separator sizes of every clique reachable from the root.
    pub fn clique_data(&self) -> CliqueData {
        let mut data = CliqueData::default();
        let Some(root) = self.root_id() else {
            return data;
        };
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Ok(clique) = self.clique(id) {
                data.conditional_sizes.push(clique.conditional().nr_frontals());
                data.separator_sizes.push(clique.conditional().nr_parents());
            }
            stack.extend(self.children_ids(id).into_iter().rev());
        }
        data
    }

    pub fn clique_stats(&self) -> CliqueStats {
        self.clique_data().stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_fixtures::nets;
    use test_fixtures::SymbolicConditional;

    #[test]
    fn stats_of_empty_tree_are_zero() {
        let tree: BayesTree<SymbolicConditional> = BayesTree::new();
        assert_eq!(tree.clique_stats(), CliqueStats::default());
    }

    #[test]
    fn asia_clique_data() {
        let tree = BayesTree::from_bayes_net(&nets::asia()).unwrap();
        let data = tree.clique_data();
        // B, L, E, X, T, S in depth-first order.
        assert_eq!(data.conditional_sizes, vec![1; 6]);
        assert_eq!(data.separator_sizes, vec![0, 1, 2, 1, 2, 2]);

        let stats = data.stats();
        assert_eq!(stats.max_conditional_size, 1);
        assert_eq!(stats.avg_conditional_size, 1.0);
        assert_eq!(stats.max_separator_size, 2);
        assert!((stats.avg_separator_size - 8.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn multifrontal_sizes_are_counted() {
        let net: bayes_core::BayesNet<SymbolicConditional> = [
            SymbolicConditional::new(&[2, 3], &[]),
            SymbolicConditional::new(&[0, 1], &[2]),
        ]
        .into_iter()
        .collect();
        let stats = BayesTree::from_bayes_net(&net).unwrap().clique_stats();
        assert_eq!(stats.max_conditional_size, 2);
        assert_eq!(stats.avg_separator_size, 0.5);
    }

    #[test]
    fn cliques_equality_is_ordered() {
        let a = BayesTree::from_bayes_net(&nets::chain(2)).unwrap();
        let b = BayesTree::from_bayes_net(&nets::scenario_a()).unwrap();
        let first: Cliques<_> = [a.clone(), b.clone()].into_iter().collect();
        let second: Cliques<_> = [b, a].into_iter().collect();
        assert!(first.equals(&first.clone(), 1e-9));
        assert!(!first.equals(&second, 1e-9));
        assert!(first.to_string().starts_with("subtree 0:\n"));
    }
}
