use bayes_core::errors::EliminationError;
use bayes_core::{
    query_span, BayesNet, Conditional, Eliminate, FactorGraph, Key, TreeError, TreeResult,
};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use super::BayesTree;
use crate::clique::{CachedFactor, CliqueId};
use crate::elimination::{joint_bayes_net, joint_factor_graph};

impl<C: Conditional> BayesTree<C> {
    /// P(S \ C_A | C_A) for the separator S of `id`, as factors, where C_A are
    /// the variables of `ancestor`.
    ///
    /// Empty when `id` is `ancestor` or its child. Computed bottom-up along
    /// the path, starting from the nearest clique whose memo is relative to
    /// `ancestor`; every shortcut computed on the way is memoized when
    /// `cache_shortcuts` is set.
    pub fn shortcut<E: Eliminate<C>>(
        &self,
        id: CliqueId,
        ancestor: CliqueId,
        eliminate: &E,
    ) -> TreeResult<FactorGraph<C::Factor>> {
        let ancestor_clique = self.weight(ancestor)?;
        self.weight(id)?;
        if id == ancestor {
            return Ok(Vec::new());
        }

        // Cliques strictly below the ancestor, `id` first.
        let mut below = Vec::new();
        let mut current = id;
        loop {
            below.push(current);
            match self.parent_id(current) {
                Some(p) if p == ancestor => break,
                Some(p) => current = p,
                None => {
                    return Err(TreeError::structural(format!(
                        "clique {} is not an ancestor of clique {}",
                        ancestor.index(),
                        id.index()
                    )))
                }
            }
        }

        let tag = ancestor_clique.frontals().first().copied().unwrap_or_default();
        let mut ancestor_keys = ancestor_clique.conditional().keys();
        ancestor_keys.sort_unstable();

        // The topmost clique's shortcut is always empty.
        let mut start = below.len() - 1;
        let mut parent_shortcut = Vec::new();
        for (i, &clique_id) in below.iter().enumerate().take(below.len() - 1) {
            if let Some(factors) = self.weight(clique_id)?.cached_for(tag) {
                trace!(clique = clique_id.index(), "shortcut memo hit");
                if i == 0 {
                    return Ok(factors);
                }
                start = i;
                parent_shortcut = factors;
                break;
            }
        }
        debug!(steps = start, "computing shortcut");

        for i in (0..start).rev() {
            let child = self.weight(below[i])?;
            let parent = self.weight(below[i + 1])?;

            let mut factors = Vec::with_capacity(parent_shortcut.len() + 2);
            factors.push(ancestor_clique.conditional().to_factor());
            factors.extend(parent_shortcut);
            factors.push(parent.conditional().to_factor());

            let mut eliminated: Vec<Key> = child
                .separator()
                .iter()
                .copied()
                .filter(|k| ancestor_keys.binary_search(k).is_err())
                .collect();
            eliminated.sort_unstable();

            let shortcut = if eliminated.is_empty() {
                Vec::new()
            } else {
                let mut ordering = eliminated.clone();
                ordering.extend_from_slice(&ancestor_keys);
                joint_bayes_net::<C, E>(factors, &ordering, eliminate)?
                    .iter()
                    .filter(|c| c.frontals().iter().all(|k| eliminated.contains(k)))
                    .map(|c| c.to_factor())
                    .collect()
            };

            if self.config.cache_shortcuts {
                child.set_cached(Some(CachedFactor {
                    relative_to: tag,
                    factors: shortcut.clone(),
                }));
            }
            parent_shortcut = shortcut;
        }
        Ok(parent_shortcut)
    }

    /// Marginal over the variables of clique `id`, as factors.
    pub fn marginal<E: Eliminate<C>>(
        &self,
        id: CliqueId,
        eliminate: &E,
    ) -> TreeResult<FactorGraph<C::Factor>> {
        let root = self.root.ok_or(TreeError::EmptyTree)?;
        let clique = self.weight(id)?;
        if id == root {
            return Ok(vec![clique.conditional().to_factor()]);
        }

        let mut factors = vec![clique.conditional().to_factor()];
        factors.extend(self.shortcut(id, root, eliminate)?);
        factors.push(self.weight(root)?.conditional().to_factor());
        Ok(joint_factor_graph::<C, E>(
            factors,
            &clique.conditional().keys(),
            eliminate,
        )?)
    }

    /// Joint over the variables of two cliques, as factors.
    ///
    /// Goes through the lowest common ancestor A: each clique other than A
    /// contributes its conditional and its shortcut relative to A, and A
    /// contributes its marginal.
    pub fn clique_joint<E: Eliminate<C>>(
        &self,
        c1: CliqueId,
        c2: CliqueId,
        eliminate: &E,
    ) -> TreeResult<FactorGraph<C::Factor>> {
        if c1 == c2 {
            return self.marginal(c1, eliminate);
        }
        let ancestor = self.common_ancestor(c1, c2)?;

        let mut factors = Vec::new();
        for id in [c1, c2] {
            if id != ancestor {
                factors.push(self.weight(id)?.conditional().to_factor());
                factors.extend(self.shortcut(id, ancestor, eliminate)?);
            }
        }
        factors.extend(self.marginal(ancestor, eliminate)?);

        let mut keep = self.weight(c1)?.conditional().keys();
        keep.extend(self.weight(c2)?.conditional().keys());
        keep.sort_unstable();
        keep.dedup();
        Ok(joint_factor_graph::<C, E>(factors, &keep, eliminate)?)
    }

    /// Marginal on the single variable `key`, as one factor.
    pub fn marginal_factor<E: Eliminate<C>>(
        &self,
        key: Key,
        eliminate: &E,
    ) -> TreeResult<C::Factor> {
        let span = query_span!("marginal", key);
        let _guard = span.enter();

        let id = self.owner(key)?;
        let marginal = self.marginal(id, eliminate)?;
        let mut reduced = joint_factor_graph::<C, E>(marginal, &[key], eliminate)?;
        match reduced.len() {
            0 => Err(EliminationError::EmptyResult { keys: vec![key] }.into()),
            1 => Ok(reduced.remove(0)),
            _ => Ok(eliminate.eliminate(&reduced, &[key])?.conditional.to_factor()),
        }
    }

    /// Marginal on `key` as a one-conditional Bayes net.
    pub fn marginal_bayes_net<E: Eliminate<C>>(
        &self,
        key: Key,
        eliminate: &E,
    ) -> TreeResult<BayesNet<C>> {
        let factor = self.marginal_factor(key, eliminate)?;
        let eliminated = eliminate.eliminate(&[factor], &[key])?;
        let mut net = BayesNet::new();
        net.push(eliminated.conditional);
        Ok(net)
    }

    /// Joint on `key1` and `key2`, as factors.
    pub fn joint<E: Eliminate<C>>(
        &self,
        key1: Key,
        key2: Key,
        eliminate: &E,
    ) -> TreeResult<FactorGraph<C::Factor>> {
        let span = query_span!("joint", key1);
        let _guard = span.enter();

        let fg = self.clique_joint(self.owner(key1)?, self.owner(key2)?, eliminate)?;
        Ok(joint_factor_graph::<C, E>(fg, &pair(key1, key2), eliminate)?)
    }

    /// Joint on `key1` and `key2` as a Bayes net, `key1` eliminated first.
    pub fn joint_bayes_net<E: Eliminate<C>>(
        &self,
        key1: Key,
        key2: Key,
        eliminate: &E,
    ) -> TreeResult<BayesNet<C>> {
        let span = query_span!("joint_bayes_net", key1);
        let _guard = span.enter();

        let fg = self.clique_joint(self.owner(key1)?, self.owner(key2)?, eliminate)?;
        let ordering = if key1 == key2 { vec![key1] } else { vec![key1, key2] };
        Ok(joint_bayes_net::<C, E>(fg, &ordering, eliminate)?)
    }

    /// Lowest clique that is an ancestor of (or equal to) both.
    pub fn common_ancestor(&self, c1: CliqueId, c2: CliqueId) -> TreeResult<CliqueId> {
        self.weight(c1)?;
        self.weight(c2)?;
        let above_c1: FxHashSet<CliqueId> = self.path_to_root(c1).into_iter().collect();
        self.path_to_root(c2)
            .into_iter()
            .find(|id| above_c1.contains(id))
            .ok_or_else(|| {
                TreeError::structural(format!(
                    "cliques {} and {} are not in the same tree",
                    c1.index(),
                    c2.index()
                ))
            })
    }

    /// Drop every memoized shortcut.
    pub fn clear_cached_factors(&self) {
        for id in self.graph.node_indices() {
            if let Some(clique) = self.graph.node_weight(id) {
                clique.clear_cache();
            }
        }
    }
}

fn pair(key1: Key, key2: Key) -> Vec<Key> {
    if key1 == key2 {
        vec![key1]
    } else {
        vec![key1.min(key2), key1.max(key2)]
    }
}
