use std::sync::Arc;

use bayes_core::{maintenance_span, BayesNet, Conditional, Key, TreeError, TreeResult};
use rustc_hash::FxHashSet;
use tracing::debug;

use super::BayesTree;
use crate::clique::CliqueId;
use crate::cliques::Cliques;

/// What a cut leaves behind: the conditionals to re-eliminate, root first,
/// and the detached subtrees to re-insert afterwards.
#[derive(Debug)]
pub struct Removal<C: Conditional> {
    pub conditionals: BayesNet<C>,
    pub orphans: Cliques<C>,
}

impl<C: Conditional> BayesTree<C> {
    /// Graft a standalone subtree.
    ///
    /// An empty tree simply becomes `subtree`. Otherwise a root with an empty
    /// separator can only replace a missing root, and any other root is
    /// attached under `find_parent_clique` of its separator. Memoized
    /// shortcuts of the grafted cliques are dropped since their ancestry
    /// changed. If post-mutation validation rejects the result, the grafted
    /// cliques are dropped and the tree is left as it was.
    pub fn insert(&mut self, mut subtree: BayesTree<C>) -> TreeResult<()> {
        let Some(sub_root) = subtree.root else {
            return Ok(());
        };
        let span = maintenance_span!("insert", subtree.size());
        let _guard = span.enter();

        if let Some(key) = subtree.keys().find(|&k| self.owner(k).is_ok()) {
            return Err(TreeError::structural(format!(
                "cannot insert subtree: key {key} is already frontal in the tree"
            )));
        }

        let parent = if self.is_empty() {
            None
        } else {
            let separator = subtree.weight(sub_root)?.separator().to_vec();
            if separator.is_empty() {
                return Err(TreeError::structural(
                    "cannot insert a second root into a non-empty tree",
                ));
            }
            Some(self.find_parent_clique(&separator)?)
        };

        let previous_root = self.root;
        let mut moved = Vec::with_capacity(subtree.size());
        let mut stack = vec![(sub_root, parent)];
        while let Some((src, new_parent)) = stack.pop() {
            let children = subtree.children_ids(src);
            let Some(clique) = subtree.graph.remove_node(src) else {
                continue;
            };
            clique.clear_cache();
            let id = self.graph.add_node(clique);
            match new_parent {
                Some(p) => {
                    self.graph.add_edge(p, id, ());
                }
                None => self.root = Some(id),
            }
            self.register(id);
            moved.push(id);
            stack.extend(children.into_iter().rev().map(|c| (c, Some(id))));
        }

        debug!(cliques = moved.len(), parent = ?parent.map(|p| p.index()), "inserted subtree");
        self.commit_or_rollback(&moved, previous_root)
    }

    /// Remove `id` and every ancestor up to the root.
    ///
    /// Children hanging off the removed path become orphans. The source tree
    /// is left empty of the path; orphans are returned as standalone trees.
    pub fn remove_path(&mut self, id: CliqueId) -> TreeResult<Removal<C>> {
        self.weight(id)?;
        let span = maintenance_span!("remove_path", 1usize);
        let _guard = span.enter();

        let mut conditionals = Vec::new();
        let mut orphans = Vec::new();
        self.cut_path(id, &mut conditionals, &mut orphans);
        self.finish_removal(conditionals, orphans)
    }

    /// Remove the union of the paths from every key's clique to the root.
    ///
    /// Keys that are not registered, or whose clique an earlier path already
    /// removed, are skipped, so each clique is processed at most once. An
    /// orphan of an earlier path that lies on a later one is taken off the
    /// orphan list and removed with that path.
    pub fn remove_top(&mut self, keys: &[Key]) -> TreeResult<Removal<C>> {
        let span = maintenance_span!("remove_top", keys.len());
        let _guard = span.enter();

        let mut conditionals = Vec::new();
        let mut orphans = Vec::new();
        for &key in keys {
            match self.owner(key) {
                Ok(id) => self.cut_path(id, &mut conditionals, &mut orphans),
                Err(_) => debug!(key, "key not in tree, skipping"),
            }
        }
        self.finish_removal(conditionals, orphans)
    }

    /// Cut one path. Conditionals are appended root first; each path
    /// clique's remaining children are put in front of `orphans`.
    fn cut_path(
        &mut self,
        id: CliqueId,
        conditionals: &mut Vec<Arc<C>>,
        orphans: &mut Vec<CliqueId>,
    ) {
        let path = self.path_to_root(id);
        let on_path: FxHashSet<CliqueId> = path.iter().copied().collect();
        orphans.retain(|o| !on_path.contains(o));

        for &clique_id in path.iter().rev() {
            let children: Vec<CliqueId> = self
                .children_ids(clique_id)
                .into_iter()
                .filter(|c| !on_path.contains(c))
                .collect();
            orphans.splice(0..0, children);

            if self.root == Some(clique_id) {
                self.root = None;
            }
            if let Some(clique) = self.graph.remove_node(clique_id) {
                self.unregister(clique.frontals());
                conditionals.push(clique.into_conditional());
            }
        }
        debug!(removed = path.len(), orphans = orphans.len(), "cut path to root");
    }

    fn finish_removal(
        &mut self,
        conditionals: Vec<Arc<C>>,
        orphan_ids: Vec<CliqueId>,
    ) -> TreeResult<Removal<C>> {
        let mut orphans = Cliques::new();
        for id in orphan_ids {
            orphans.push(self.detach_subtree(id)?);
        }
        debug!(
            conditionals = conditionals.len(),
            orphans = orphans.len(),
            remaining = self.size(),
            "removal finished"
        );
        self.after_mutation()?;
        Ok(Removal {
            conditionals: BayesNet::from_shared(conditionals),
            orphans,
        })
    }

    /// Move the subtree rooted at `id` out into a standalone tree with its
    /// own index. Memoized shortcuts are dropped.
    pub(crate) fn detach_subtree(&mut self, id: CliqueId) -> TreeResult<BayesTree<C>> {
        self.weight(id)?;
        let mut out = BayesTree::with_config(self.config.clone());
        let mut stack: Vec<(CliqueId, Option<CliqueId>)> = vec![(id, None)];
        while let Some((src, new_parent)) = stack.pop() {
            let children = self.children_ids(src);
            if self.root == Some(src) {
                self.root = None;
            }
            let Some(clique) = self.graph.remove_node(src) else {
                continue;
            };
            self.unregister(clique.frontals());
            clique.clear_cache();
            let new_id = out.graph.add_node(clique);
            match new_parent {
                Some(p) => {
                    out.graph.add_edge(p, new_id, ());
                }
                None => out.root = Some(new_id),
            }
            out.register(new_id);
            stack.extend(children.into_iter().rev().map(|c| (c, Some(new_id))));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_fixtures::nets::{self, asia};
    use test_fixtures::SymbolicConditional;

    fn first_frontals(net: &BayesNet<SymbolicConditional>) -> Vec<Key> {
        net.iter().map(|c| c.frontals()[0]).collect()
    }

    fn orphan_roots(orphans: &Cliques<SymbolicConditional>) -> Vec<Key> {
        orphans
            .iter()
            .map(|t| t.root().unwrap().frontals()[0])
            .collect()
    }

    #[test]
    fn remove_top_on_chain_leaves_one_orphan() {
        let mut tree = BayesTree::from_bayes_net(&nets::scenario_a()).unwrap();
        let removal = tree.remove_top(&[2]).unwrap();
        assert_eq!(first_frontals(&removal.conditionals), vec![1, 2]);
        assert_eq!(orphan_roots(&removal.orphans), vec![3]);
        assert!(tree.is_empty());
        assert!(tree.root_id().is_none());
        assert!(tree.get(1).is_err());
    }

    #[test]
    fn remove_top_on_asia_collects_path_root_first() {
        let mut tree = BayesTree::from_bayes_net(&nets::asia()).unwrap();
        let removal = tree.remove_top(&[asia::T]).unwrap();
        assert_eq!(
            first_frontals(&removal.conditionals),
            vec![asia::B, asia::L, asia::E, asia::T]
        );
        assert_eq!(orphan_roots(&removal.orphans), vec![asia::X, asia::S]);
        for orphan in removal.orphans.iter() {
            assert_eq!(orphan.size(), 1);
        }
    }

    #[test]
    fn remove_top_processes_shared_ancestors_once() {
        let mut tree = BayesTree::from_bayes_net(&nets::asia()).unwrap();
        let removal = tree.remove_top(&[asia::T, asia::S, asia::E, asia::T]).unwrap();
        assert_eq!(
            first_frontals(&removal.conditionals),
            vec![asia::B, asia::L, asia::E, asia::T, asia::S]
        );
        assert_eq!(orphan_roots(&removal.orphans), vec![asia::X]);
    }

    #[test]
    fn remove_top_skips_unknown_keys() {
        let mut tree = BayesTree::from_bayes_net(&nets::chain(3)).unwrap();
        let removal = tree.remove_top(&[17]).unwrap();
        assert!(removal.conditionals.is_empty());
        assert!(removal.orphans.is_empty());
        assert_eq!(tree.size(), 3);
    }

    #[test]
    fn remove_path_from_root_orphans_every_child() {
        let mut tree = BayesTree::from_bayes_net(&nets::asia()).unwrap();
        let l = tree.get(asia::L).unwrap().id();
        let removal = tree.remove_path(l).unwrap();
        assert_eq!(first_frontals(&removal.conditionals), vec![asia::B, asia::L]);
        assert_eq!(orphan_roots(&removal.orphans), vec![asia::E, asia::S]);
        assert_eq!(removal.orphans.iter().next().unwrap().size(), 3);
    }

    #[test]
    fn removed_cliques_can_be_reinserted() {
        let original = BayesTree::from_bayes_net(&nets::asia()).unwrap();
        let mut tree = original.clone();
        let removal = tree.remove_top(&[asia::X]).unwrap();

        let mut rebuilt = BayesTree::from_bayes_net(&removal.conditionals).unwrap();
        for orphan in removal.orphans {
            rebuilt.insert(orphan).unwrap();
        }
        assert!(rebuilt.equals(&original, 1e-9));
    }

    #[test]
    fn insert_into_empty_tree_adopts_subtree() {
        let mut source = BayesTree::from_bayes_net(&nets::asia()).unwrap();
        let removal = source.remove_top(&[asia::L]).unwrap();
        let mut tree = BayesTree::new();
        let e_branch = removal.orphans.into_vec().remove(0);
        tree.insert(e_branch).unwrap();
        assert_eq!(tree.size(), 3);
        assert_eq!(tree.root().unwrap().frontals(), &[asia::E]);
    }

    #[test]
    fn insert_rejects_second_root() {
        let mut tree = BayesTree::from_bayes_net(&nets::chain(2)).unwrap();
        let net: BayesNet<SymbolicConditional> =
            [SymbolicConditional::single(10, &[])].into_iter().collect();
        let other = BayesTree::from_bayes_net(&net).unwrap();
        let err = tree.insert(other).unwrap_err();
        assert!(matches!(err, TreeError::StructuralViolation { .. }));
    }

    #[test]
    fn insert_clears_grafted_caches() {
        let mut tree = BayesTree::from_bayes_net(&nets::asia()).unwrap();
        tree.marginal_factor(asia::X, &test_fixtures::eliminate_symbolic)
            .unwrap();
        let x = tree.get(asia::X).unwrap().id();
        assert!(tree.clique(x).unwrap().cached_factor().is_some());

        let removal = tree.remove_top(&[asia::E]).unwrap();
        let mut rebuilt = BayesTree::from_bayes_net(&removal.conditionals).unwrap();
        for orphan in removal.orphans {
            for clique in orphan.cliques() {
                assert!(clique.cached_factor().is_none());
            }
            rebuilt.insert(orphan).unwrap();
        }
        assert!(rebuilt.get(asia::X).unwrap().cached_factor().is_none());
    }
}
