//! The Bayes tree: clique arena, variable index, and structural accessors.
//!
//! Construction lives in `build`, cutting and grafting in `maintenance`,
//! marginal/joint queries in `query`, relabelling in `permute`.

mod build;
mod maintenance;
mod permute;
mod query;

use std::fmt;
use std::sync::Arc;

use bayes_core::{Conditional, Key, TreeConfig, TreeError, TreeResult};
use petgraph::stable_graph::StableDiGraph;
use petgraph::Direction;
use tracing::debug;

use crate::clique::{Clique, CliqueId, CliqueRef};

pub use maintenance::Removal;

/// A rooted tree of cliques, each holding one conditional.
///
/// Edges of the arena run parent to child. `nodes[key]` is the clique in
/// which `key` is frontal. Cloning deep-copies every conditional.
#[derive(Debug, Clone)]
pub struct BayesTree<C: Conditional> {
    pub(crate) graph: StableDiGraph<Clique<C>, ()>,
    pub(crate) root: Option<CliqueId>,
    pub(crate) nodes: Vec<Option<CliqueId>>,
    pub(crate) config: TreeConfig,
}

impl<C: Conditional> Default for BayesTree<C> {
    fn default() -> Self {
        Self::with_config(TreeConfig::default())
    }
}

impl<C: Conditional> BayesTree<C> {
    /// An empty tree with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            graph: StableDiGraph::default(),
            root: None,
            nodes: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Number of cliques.
    pub fn size(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn root(&self) -> Option<CliqueRef<'_, C>> {
        self.root.and_then(|id| self.clique(id).ok())
    }

    pub fn root_id(&self) -> Option<CliqueId> {
        self.root
    }

    /// The variable index: entry `key` is the clique where `key` is frontal.
    pub fn nodes(&self) -> &[Option<CliqueId>] {
        &self.nodes
    }

    /// Keys currently registered in the index, ascending.
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(key, id)| id.map(|_| key))
    }

    /// The clique in which `key` is frontal.
    pub fn get(&self, key: Key) -> TreeResult<CliqueRef<'_, C>> {
        let id = self.owner(key)?;
        self.clique(id)
    }

    pub fn clique(&self, id: CliqueId) -> TreeResult<CliqueRef<'_, C>> {
        let clique = self.weight(id)?;
        Ok(CliqueRef::new(self, id, clique))
    }

    /// Every clique, in arena order.
    pub fn cliques(&self) -> impl Iterator<Item = CliqueRef<'_, C>> + '_ {
        self.graph
            .node_indices()
            .filter_map(move |id| self.clique(id).ok())
    }

    /// Release every clique and empty the index.
    pub fn clear(&mut self) {
        debug!(cliques = self.size(), "clearing tree");
        self.graph.clear();
        self.root = None;
        self.nodes.clear();
    }

    /// Structural equality within `tol`: same registered keys, and for every
    /// key the owning cliques and their parents hold equal conditionals.
    /// Child order is not compared.
    pub fn equals(&self, other: &Self, tol: f64) -> bool {
        if self.size() != other.size() {
            return false;
        }
        let len = self.nodes.len().max(other.nodes.len());
        (0..len).all(|key| {
            match (self.owner(key).ok(), other.owner(key).ok()) {
                (None, None) => true,
                (Some(a), Some(b)) => {
                    self.same_conditional(Some(a), other, Some(b), tol)
                        && self.same_conditional(self.parent_id(a), other, other.parent_id(b), tol)
                }
                _ => false,
            }
        })
    }

    fn same_conditional(
        &self,
        a: Option<CliqueId>,
        other: &Self,
        b: Option<CliqueId>,
        tol: f64,
    ) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => match (self.weight(a), other.weight(b)) {
                (Ok(a), Ok(b)) => a.equals(b, tol),
                _ => false,
            },
            _ => false,
        }
    }

    /// Create a clique under `parent`, or as the root when `parent` is `None`.
    ///
    /// Fails when asked for a second root or an unknown parent. The caller
    /// is responsible for the new clique's separator being covered by its
    /// ancestors.
    pub fn add_clique(
        &mut self,
        conditional: impl Into<Arc<C>>,
        parent: Option<CliqueId>,
    ) -> TreeResult<CliqueId> {
        let conditional = conditional.into();
        self.check_unregistered(conditional.frontals())?;
        match parent {
            Some(p) => {
                self.weight(p)?;
            }
            None if self.root.is_some() => {
                return Err(TreeError::structural(format!(
                    "conditional on {:?} has an empty separator but the tree already has a root",
                    conditional.frontals()
                )));
            }
            None => {}
        }

        let previous_root = self.root;
        let id = self.graph.add_node(Clique::new(conditional));
        match parent {
            Some(p) => {
                self.graph.add_edge(p, id, ());
            }
            None => self.root = Some(id),
        }
        self.register(id);
        self.commit_or_rollback(&[id], previous_root)?;
        Ok(id)
    }

    /// Bottom-up creation: a new clique adopting parentless `children`.
    ///
    /// The new clique becomes the root if the tree had none or if it adopts
    /// the current root. Otherwise it stays detached until a later call
    /// adopts it; the tree must be fully assembled before it is queried.
    /// With `validate_after_mutation` set, such detached states are rejected.
    pub fn add_clique_with_children(
        &mut self,
        conditional: impl Into<Arc<C>>,
        children: &[CliqueId],
    ) -> TreeResult<CliqueId> {
        let conditional = conditional.into();
        self.check_unregistered(conditional.frontals())?;
        for &child in children {
            self.weight(child)?;
            if self.parent_id(child).is_some() {
                return Err(TreeError::structural(format!(
                    "clique {} already has a parent",
                    child.index()
                )));
            }
        }

        let previous_root = self.root;
        let becomes_root =
            self.root.is_none() || children.iter().any(|&c| Some(c) == self.root);
        let id = self.graph.add_node(Clique::new(conditional));
        for &child in children {
            self.graph.add_edge(id, child, ());
        }
        if becomes_root {
            self.root = Some(id);
        }
        self.register(id);
        self.commit_or_rollback(&[id], previous_root)?;
        Ok(id)
    }

    /// Deep copy of the subtree rooted at `id` as a standalone tree.
    /// Conditionals and memoized shortcuts are copied.
    pub fn clone_subtree(&self, id: CliqueId) -> TreeResult<BayesTree<C>> {
        self.weight(id)?;
        let mut out = BayesTree::with_config(self.config.clone());
        let mut stack: Vec<(CliqueId, Option<CliqueId>)> = vec![(id, None)];
        while let Some((src, new_parent)) = stack.pop() {
            let copy = self.weight(src)?.clone();
            let new_id = out.graph.add_node(copy);
            match new_parent {
                Some(p) => {
                    out.graph.add_edge(p, new_id, ());
                }
                None => out.root = Some(new_id),
            }
            out.register(new_id);
            // Reverse so children are re-created in their original order.
            let children = self.children_ids(src);
            stack.extend(children.into_iter().rev().map(|c| (c, Some(new_id))));
        }
        Ok(out)
    }

    /// Indented rendering of the whole tree.
    pub fn print_tree(&self) -> String {
        self.root()
            .map(|root| root.print_tree("  "))
            .unwrap_or_default()
    }

    // --- arena helpers ---

    pub(crate) fn weight(&self, id: CliqueId) -> TreeResult<&Clique<C>> {
        self.graph
            .node_weight(id)
            .ok_or(TreeError::StaleClique { id: id.index() })
    }

    pub(crate) fn owner(&self, key: Key) -> TreeResult<CliqueId> {
        self.nodes
            .get(key)
            .copied()
            .flatten()
            .ok_or(TreeError::OutOfRange {
                key,
                len: self.nodes.len(),
            })
    }

    pub(crate) fn parent_id(&self, id: CliqueId) -> Option<CliqueId> {
        self.graph
            .neighbors_directed(id, Direction::Incoming)
            .next()
    }

    /// Children in insertion order (petgraph walks edges newest first).
    pub(crate) fn children_ids(&self, id: CliqueId) -> Vec<CliqueId> {
        let mut children: Vec<CliqueId> = self
            .graph
            .neighbors_directed(id, Direction::Outgoing)
            .collect();
        children.reverse();
        children
    }

    /// Clique ids from `id` up to the root, `id` first.
    pub(crate) fn path_to_root(&self, id: CliqueId) -> Vec<CliqueId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent_id(current) {
            path.push(parent);
            current = parent;
        }
        path
    }

    pub(crate) fn check_unregistered(&self, keys: &[Key]) -> TreeResult<()> {
        match keys.iter().find(|&&k| self.owner(k).is_ok()) {
            Some(key) => Err(TreeError::structural(format!(
                "key {key} is already frontal in another clique"
            ))),
            None => Ok(()),
        }
    }

    /// Point every frontal key of `id` at it.
    pub(crate) fn register(&mut self, id: CliqueId) {
        let Some(clique) = self.graph.node_weight(id) else {
            return;
        };
        for &key in clique.frontals() {
            if key >= self.nodes.len() {
                self.nodes.resize(key + 1, None);
            }
            self.nodes[key] = Some(id);
        }
    }

    pub(crate) fn unregister(&mut self, frontals: &[Key]) {
        for &key in frontals {
            if let Some(slot) = self.nodes.get_mut(key) {
                *slot = None;
            }
        }
    }

    pub(crate) fn after_mutation(&self) -> TreeResult<()> {
        if self.config.validate_after_mutation {
            self.validate()?;
        }
        Ok(())
    }

    /// Validate after adding `added`; on failure remove them again (their
    /// edges go with them) and restore the previous root.
    pub(crate) fn commit_or_rollback(
        &mut self,
        added: &[CliqueId],
        previous_root: Option<CliqueId>,
    ) -> TreeResult<()> {
        let Err(err) = self.after_mutation() else {
            return Ok(());
        };
        for &id in added {
            if let Some(clique) = self.graph.remove_node(id) {
                self.unregister(clique.frontals());
            }
        }
        self.root = previous_root;
        debug!(removed = added.len(), "mutation rejected by validation, rolled back");
        Err(err)
    }
}

/// [`BayesTree::equals`] at the configured `equality_tolerance`.
impl<C: Conditional> PartialEq for BayesTree<C> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, self.config.equality_tolerance)
    }
}

impl<C: Conditional> fmt::Display for BayesTree<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print_tree())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_fixtures::SymbolicConditional;

    fn chain_of_three() -> (BayesTree<SymbolicConditional>, [CliqueId; 3]) {
        let mut tree = BayesTree::new();
        let a = tree.add_clique(SymbolicConditional::single(2, &[]), None).unwrap();
        let b = tree.add_clique(SymbolicConditional::single(1, &[2]), Some(a)).unwrap();
        let c = tree.add_clique(SymbolicConditional::single(0, &[1]), Some(b)).unwrap();
        (tree, [a, b, c])
    }

    #[test]
    fn empty_tree_has_no_root() {
        let tree: BayesTree<SymbolicConditional> = BayesTree::new();
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert!(matches!(tree.get(0), Err(TreeError::OutOfRange { key: 0, len: 0 })));
    }

    #[test]
    fn add_clique_links_and_registers() {
        let (tree, [a, b, c]) = chain_of_three();
        assert_eq!(tree.size(), 3);
        assert_eq!(tree.root_id(), Some(a));
        assert_eq!(tree.get(1).unwrap().id(), b);
        assert_eq!(tree.get(0).unwrap().parent().unwrap().id(), b);
        assert_eq!(tree.path_to_root(c), vec![c, b, a]);
        assert_eq!(tree.root().unwrap().tree_size(), 3);
    }

    #[test]
    fn second_root_is_rejected() {
        let (mut tree, _) = chain_of_three();
        let err = tree
            .add_clique(SymbolicConditional::single(7, &[]), None)
            .unwrap_err();
        assert!(matches!(err, TreeError::StructuralViolation { .. }));
        assert_eq!(tree.size(), 3);
    }

    #[test]
    fn duplicate_frontal_is_rejected() {
        let (mut tree, [a, ..]) = chain_of_three();
        let err = tree
            .add_clique(SymbolicConditional::single(1, &[2]), Some(a))
            .unwrap_err();
        assert!(matches!(err, TreeError::StructuralViolation { .. }));
    }

    #[test]
    fn bottom_up_construction_moves_the_root() {
        let mut tree: BayesTree<SymbolicConditional> = BayesTree::new();
        let x = tree.add_clique_with_children(SymbolicConditional::single(0, &[2]), &[]).unwrap();
        let y = tree.add_clique_with_children(SymbolicConditional::single(1, &[2]), &[]).unwrap();
        assert_eq!(tree.root_id(), Some(x));
        let top = tree
            .add_clique_with_children(SymbolicConditional::single(2, &[]), &[x, y])
            .unwrap();
        assert_eq!(tree.root_id(), Some(top));
        assert_eq!(tree.root().unwrap().tree_size(), 3);
        let children: Vec<CliqueId> = tree.root().unwrap().children().iter().map(|c| c.id()).collect();
        assert_eq!(children, vec![x, y]);
    }

    #[test]
    fn clone_is_deep_and_equal() {
        let (tree, _) = chain_of_three();
        let copy = tree.clone();
        assert!(copy.equals(&tree, 1e-9));
        let a = tree.get(1).unwrap().conditional();
        let b = copy.get(1).unwrap().conditional();
        assert!(!Arc::ptr_eq(a, b));
    }

    #[test]
    fn eq_uses_configured_tolerance() {
        let (tree, _) = chain_of_three();
        assert_eq!(tree, tree.clone());
        let (mut other, [_, b, _]) = chain_of_three();
        other.add_clique(SymbolicConditional::single(5, &[1]), Some(b)).unwrap();
        assert_ne!(tree, other);
    }

    #[test]
    fn clone_subtree_copies_below_a_clique() {
        let (tree, [_, b, _]) = chain_of_three();
        let sub = tree.clone_subtree(b).unwrap();
        assert_eq!(sub.size(), 2);
        assert_eq!(sub.root().unwrap().frontals(), &[1]);
        assert!(sub.get(2).is_err());
    }

    #[test]
    fn clear_empties_everything() {
        let (mut tree, _) = chain_of_three();
        tree.clear();
        assert!(tree.is_empty());
        assert!(tree.nodes().is_empty());
        assert!(tree.root_id().is_none());
    }

    #[test]
    fn print_tree_indents_children() {
        let (tree, _) = chain_of_three();
        assert_eq!(tree.print_tree(), "2 : \n  1 : 2\n    0 : 1\n");
    }
}
