use bayes_core::{Conditional, Permutation, TreeResult};
use tracing::debug;

use super::BayesTree;
use crate::clique::CliqueId;

impl<C: Conditional> BayesTree<C> {
    /// Relabel every key of every clique (conditionals and memoized
    /// shortcuts) by `inverse`, then rebuild the variable index.
    pub fn permute_with_inverse(&mut self, inverse: &Permutation) -> TreeResult<()> {
        if inverse.is_identity() {
            return Ok(());
        }
        self.relabel(inverse);
        debug!(cliques = self.size(), "permuted tree");
        if let Err(err) = self.after_mutation() {
            self.relabel(&inverse.inverse());
            return Err(err);
        }
        Ok(())
    }

    fn relabel(&mut self, inverse: &Permutation) {
        let ids: Vec<CliqueId> = self.graph.node_indices().collect();
        for &id in &ids {
            if let Some(clique) = self.graph.node_weight_mut(id) {
                clique.permute_with_inverse(inverse);
            }
        }
        self.nodes.clear();
        for id in ids {
            self.register(id);
        }
    }

    /// Relabel only separator keys in the subtree rooted at `id`.
    ///
    /// Frontal keys must be fixed points of `inverse`. Descent stops at any
    /// clique whose separator did not change: by running intersection its
    /// descendants cannot reference a relabelled key. Returns whether the
    /// separator of `id` itself changed.
    pub fn permute_separator_with_inverse(
        &mut self,
        id: CliqueId,
        inverse: &Permutation,
    ) -> TreeResult<bool> {
        self.weight(id)?;
        let mut top_changed = None;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let changed = match self.graph.node_weight_mut(current) {
                Some(clique) => clique.permute_separator_with_inverse(inverse),
                None => false,
            };
            top_changed.get_or_insert(changed);
            if changed {
                stack.extend(self.children_ids(current));
            }
        }
        Ok(top_changed.unwrap_or(false))
    }
}
