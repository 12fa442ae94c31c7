//! Debug-only consistency checks. Nothing on the query or maintenance path
//! calls these unless `validate_after_mutation` is set.

use bayes_core::{Conditional, Key, TreeError, TreeResult};
use petgraph::Direction;
use rustc_hash::FxHashSet;

use crate::clique::CliqueId;
use crate::tree::BayesTree;

impl<C: Conditional> BayesTree<C> {
    /// Check the variable index, the parent/child links, that every clique
    /// hangs off the single root, and the running-intersection property.
    pub fn validate(&self) -> TreeResult<()> {
        self.validate_links()?;
        self.validate_index()?;
        self.validate_running_intersection()
    }

    fn validate_links(&self) -> TreeResult<()> {
        let Some(root) = self.root else {
            if self.is_empty() {
                return Ok(());
            }
            return Err(TreeError::structural(format!(
                "{} cliques but no root",
                self.size()
            )));
        };
        self.weight(root)?;
        if self.parent_id(root).is_some() {
            return Err(TreeError::structural("the root has a parent"));
        }

        for id in self.graph.node_indices() {
            let parents = self
                .graph
                .neighbors_directed(id, Direction::Incoming)
                .count();
            if parents > 1 {
                return Err(TreeError::structural(format!(
                    "clique {} has {parents} parents",
                    id.index()
                )));
            }
        }

        let reachable = self.root().map(|r| r.tree_size()).unwrap_or(0);
        if reachable != self.size() {
            return Err(TreeError::structural(format!(
                "{} of {} cliques are detached from the root",
                self.size() - reachable,
                self.size()
            )));
        }
        Ok(())
    }

    fn validate_index(&self) -> TreeResult<()> {
        for (key, entry) in self.nodes.iter().enumerate() {
            if let Some(id) = *entry {
                let clique = self.weight(id)?;
                if !clique.frontals().contains(&key) {
                    return Err(TreeError::structural(format!(
                        "index maps key {key} to clique {}, which does not hold it",
                        id.index()
                    )));
                }
            }
        }
        for id in self.graph.node_indices() {
            for &key in self.weight(id)?.frontals() {
                if self.nodes.get(key).copied().flatten() != Some(id) {
                    return Err(TreeError::structural(format!(
                        "frontal key {key} of clique {} is not indexed to it",
                        id.index()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Every separator key must be frontal in a proper ancestor. Keys of the
    /// root's own separator (a detached subtree's context) are exempt.
    fn validate_running_intersection(&self) -> TreeResult<()> {
        let context: &[Key] = match self.root {
            Some(root) => self.weight(root)?.separator(),
            None => &[],
        };
        for id in self.graph.node_indices() {
            let ancestors: FxHashSet<CliqueId> =
                self.path_to_root(id).into_iter().skip(1).collect();
            for &key in self.weight(id)?.separator() {
                let covered = match self.owner(key) {
                    Ok(owner) => ancestors.contains(&owner),
                    Err(_) => context.contains(&key),
                };
                if !covered {
                    return Err(TreeError::structural(format!(
                        "separator key {key} of clique {} is not frontal in any ancestor",
                        id.index()
                    )));
                }
            }
        }
        Ok(())
    }
}
