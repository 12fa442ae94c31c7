use std::sync::Arc;

use bayes_core::{build_span, BayesNet, Conditional, Key, TreeConfig, TreeError, TreeResult};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::BayesTree;
use crate::clique::CliqueId;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Pending,
    InProgress,
    Placed,
}

impl<C: Conditional> BayesTree<C> {
    /// Build a tree from a Bayes net, one clique per conditional.
    ///
    /// Conditionals may come in any order: each is placed once every one of
    /// its separator variables is frontal in a placed clique, under the
    /// parent chosen by [`find_parent_clique`](Self::find_parent_clique).
    pub fn from_bayes_net(net: &BayesNet<C>) -> TreeResult<Self> {
        Self::from_bayes_net_with_config(net, TreeConfig::default())
    }

    pub fn from_bayes_net_with_config(net: &BayesNet<C>, config: TreeConfig) -> TreeResult<Self> {
        let mut tree = Self::with_config(config);
        tree.insert_net(net)?;
        Ok(tree)
    }

    /// Build from a net, then graft each subtree under the new cliques.
    pub fn with_subtrees(net: &BayesNet<C>, subtrees: Vec<BayesTree<C>>) -> TreeResult<Self> {
        let mut tree = Self::from_bayes_net(net)?;
        for subtree in subtrees {
            tree.insert(subtree)?;
        }
        Ok(tree)
    }

    /// Place one conditional top-down: as the root when its separator is
    /// empty, otherwise under the clique chosen by `find_parent_clique`.
    pub fn insert_conditional(&mut self, conditional: impl Into<Arc<C>>) -> TreeResult<CliqueId> {
        let conditional = conditional.into();
        let parent = if conditional.parents().is_empty() {
            None
        } else {
            Some(self.find_parent_clique(conditional.parents())?)
        };
        trace!(frontals = ?conditional.frontals(), parent = ?parent.map(|p| p.index()), "placing conditional");
        self.add_clique(conditional, parent)
    }

    /// Among `parents`, the owning clique closest to being eliminated next.
    ///
    /// That is the deepest owning clique; with ancestors carrying higher keys
    /// it is the clique of the lowest key. Equal depths resolve to the lowest
    /// key.
    pub fn find_parent_clique(&self, parents: &[Key]) -> TreeResult<CliqueId> {
        let mut depths: FxHashMap<CliqueId, usize> = FxHashMap::default();
        let mut best: Option<(usize, Key, CliqueId)> = None;
        for &key in parents {
            let id = self.owner(key)?;
            let depth = *depths
                .entry(id)
                .or_insert_with(|| self.path_to_root(id).len());
            let better = match best {
                None => true,
                Some((d, k, _)) => depth > d || (depth == d && key < k),
            };
            if better {
                best = Some((depth, key, id));
            }
        }
        best.map(|(_, _, id)| id)
            .ok_or_else(|| TreeError::structural("cannot choose a parent from an empty separator"))
    }

    /// Place every conditional of `net`, dependencies first.
    pub(crate) fn insert_net(&mut self, net: &BayesNet<C>) -> TreeResult<()> {
        let span = build_span!(net.len());
        let _guard = span.enter();

        let conditionals: Vec<&Arc<C>> = net.iter().collect();
        let mut owner: FxHashMap<Key, usize> = FxHashMap::default();
        for (i, conditional) in conditionals.iter().enumerate() {
            for &key in conditional.frontals() {
                if owner.insert(key, i).is_some() {
                    return Err(TreeError::structural(format!(
                        "key {key} is frontal in more than one conditional"
                    )));
                }
            }
        }

        let mut state = vec![Visit::Pending; conditionals.len()];
        for start in 0..conditionals.len() {
            let mut stack = vec![(start, false)];
            while let Some((i, expanded)) = stack.pop() {
                if expanded {
                    self.insert_conditional(Arc::clone(conditionals[i]))?;
                    state[i] = Visit::Placed;
                    continue;
                }
                match state[i] {
                    Visit::Placed => continue,
                    Visit::InProgress => return Err(cyclic(conditionals[i].frontals())),
                    Visit::Pending => {}
                }
                state[i] = Visit::InProgress;
                stack.push((i, true));
                for &key in conditionals[i].parents().iter().rev() {
                    if self.owner(key).is_ok() {
                        continue;
                    }
                    match owner.get(&key) {
                        Some(&j) if state[j] == Visit::InProgress => {
                            return Err(cyclic(conditionals[j].frontals()))
                        }
                        Some(&j) if state[j] == Visit::Pending => stack.push((j, false)),
                        Some(_) => {}
                        None => {
                            return Err(TreeError::OutOfRange {
                                key,
                                len: self.nodes.len(),
                            })
                        }
                    }
                }
            }
        }

        debug!(cliques = self.size(), "built tree from bayes net");
        Ok(())
    }
}

fn cyclic(frontals: &[Key]) -> TreeError {
    TreeError::structural(format!(
        "separators of the conditional on {frontals:?} depend on it"
    ))
}
