//! Clique storage and the borrowed clique view.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use bayes_core::{Conditional, Factor, Key, Permutation};
use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::tree::BayesTree;

/// Stable handle of a clique inside one tree's arena.
///
/// Handles survive removal of other cliques but are meaningless across trees.
pub type CliqueId = NodeIndex;

/// A memoized shortcut: the factors of P(separator | ancestor), tagged with
/// the ancestor they were computed against (its first frontal key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedFactor<F> {
    pub relative_to: Key,
    pub factors: Vec<F>,
}

impl<F: Factor> CachedFactor<F> {
    pub(crate) fn permute_with_inverse(&mut self, inverse: &Permutation) {
        self.relative_to = inverse.apply(self.relative_to);
        for factor in &mut self.factors {
            factor.permute_with_inverse(inverse);
        }
    }
}

/// Node weight of the clique arena: one conditional plus an optional memo.
///
/// Parent and children are edges of the arena, not fields.
#[derive(Debug)]
pub struct Clique<C: Conditional> {
    conditional: Arc<C>,
    cached: RefCell<Option<CachedFactor<C::Factor>>>,
}

impl<C: Conditional> Clique<C> {
    pub fn new(conditional: impl Into<Arc<C>>) -> Self {
        Self {
            conditional: conditional.into(),
            cached: RefCell::new(None),
        }
    }

    pub fn conditional(&self) -> &Arc<C> {
        &self.conditional
    }

    pub fn frontals(&self) -> &[Key] {
        self.conditional.frontals()
    }

    pub fn separator(&self) -> &[Key] {
        self.conditional.parents()
    }

    /// Conditional equality within `tol`; tree structure is not compared.
    pub fn equals(&self, other: &Self, tol: f64) -> bool {
        self.conditional.equals(&other.conditional, tol)
    }

    pub fn cached_factor(&self) -> Option<CachedFactor<C::Factor>> {
        self.cached.borrow().clone()
    }

    pub(crate) fn cached_for(&self, ancestor: Key) -> Option<Vec<C::Factor>> {
        self.cached
            .borrow()
            .as_ref()
            .filter(|c| c.relative_to == ancestor)
            .map(|c| c.factors.clone())
    }

    pub(crate) fn set_cached(&self, cached: Option<CachedFactor<C::Factor>>) {
        *self.cached.borrow_mut() = cached;
    }

    pub(crate) fn clear_cache(&self) {
        self.set_cached(None);
    }

    pub(crate) fn into_conditional(self) -> Arc<C> {
        self.conditional
    }

    pub(crate) fn permute_with_inverse(&mut self, inverse: &Permutation) {
        Arc::make_mut(&mut self.conditional).permute_with_inverse(inverse);
        self.permute_cache(inverse);
    }

    pub(crate) fn permute_separator_with_inverse(&mut self, inverse: &Permutation) -> bool {
        let changed = Arc::make_mut(&mut self.conditional).permute_separator_with_inverse(inverse);
        if changed {
            self.permute_cache(inverse);
        }
        changed
    }

    fn permute_cache(&mut self, inverse: &Permutation) {
        if let Some(cached) = self.cached.get_mut() {
            cached.permute_with_inverse(inverse);
        }
    }
}

/// Deep copy: the conditional object itself is cloned, not just its handle,
/// so independently mutated trees never alias.
impl<C: Conditional> Clone for Clique<C> {
    fn clone(&self) -> Self {
        Self {
            conditional: Arc::new(C::clone(&self.conditional)),
            cached: RefCell::new(self.cached_factor()),
        }
    }
}

/// Label used by `Display` and graph export: `"1,2 : 3,4"`.
pub(crate) fn clique_label(frontals: &[Key], separator: &[Key]) -> String {
    let join = |keys: &[Key]| {
        keys.iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(",")
    };
    format!("{} : {}", join(frontals), join(separator))
}

impl<C: Conditional> fmt::Display for Clique<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&clique_label(self.frontals(), self.separator()))
    }
}

/// Borrowed view of one clique together with the tree it lives in.
pub struct CliqueRef<'a, C: Conditional> {
    tree: &'a BayesTree<C>,
    id: CliqueId,
    clique: &'a Clique<C>,
}

impl<'a, C: Conditional> Clone for CliqueRef<'a, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, C: Conditional> Copy for CliqueRef<'a, C> {}

impl<'a, C: Conditional> CliqueRef<'a, C> {
    pub(crate) fn new(tree: &'a BayesTree<C>, id: CliqueId, clique: &'a Clique<C>) -> Self {
        Self { tree, id, clique }
    }

    pub fn id(&self) -> CliqueId {
        self.id
    }

    pub fn clique(&self) -> &'a Clique<C> {
        self.clique
    }

    pub fn conditional(&self) -> &'a Arc<C> {
        self.clique.conditional()
    }

    pub fn frontals(&self) -> &'a [Key] {
        self.clique.frontals()
    }

    pub fn separator(&self) -> &'a [Key] {
        self.clique.separator()
    }

    pub fn cached_factor(&self) -> Option<CachedFactor<C::Factor>> {
        self.clique.cached_factor()
    }

    pub fn parent(&self) -> Option<CliqueRef<'a, C>> {
        let parent = self.tree.parent_id(self.id)?;
        self.tree.clique(parent).ok()
    }

    /// Children in insertion order.
    pub fn children(&self) -> Vec<CliqueRef<'a, C>> {
        self.tree
            .children_ids(self.id)
            .into_iter()
            .filter_map(|child| self.tree.clique(child).ok())
            .collect()
    }

    pub fn is_root(&self) -> bool {
        self.tree.parent_id(self.id).is_none()
    }

    /// Number of cliques in the subtree rooted here, this one included.
    pub fn tree_size(&self) -> usize {
        let mut size = 0;
        let mut stack = vec![self.id];
        while let Some(id) = stack.pop() {
            size += 1;
            stack.extend(self.tree.children_ids(id));
        }
        size
    }

    /// Indented rendering of the subtree rooted here, one clique per line.
    pub fn print_tree(&self, indent: &str) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.id, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            if let Ok(clique) = self.tree.clique(id) {
                for _ in 0..depth {
                    out.push_str(indent);
                }
                out.push_str(&clique.to_string());
                out.push('\n');
            }
            let children = self.tree.children_ids(id);
            stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
        }
        out
    }
}

impl<C: Conditional> fmt::Display for CliqueRef<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.clique, f)
    }
}

impl<C: Conditional> fmt::Debug for CliqueRef<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliqueRef")
            .field("id", &self.id.index())
            .field("frontals", &self.frontals())
            .field("separator", &self.separator())
            .finish()
    }
}
