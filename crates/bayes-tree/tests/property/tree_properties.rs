//! Property tests for bayes-tree: structure, cloning, memoization, cut and
//! rebuild, parent selection, permutation, persistence.

use proptest::prelude::*;

use bayes_core::{BayesNet, Conditional, Factor, Key, Permutation, TreeConfig};
use bayes_tree::BayesTree;
use test_fixtures::nets::eliminate_in_order;
use test_fixtures::{eliminate_symbolic, SymbolicConditional};

type Tree = BayesTree<SymbolicConditional>;

/// A random factor graph over `0..n`, eliminated in key order.
fn net_strategy() -> impl Strategy<Value = (usize, BayesNet<SymbolicConditional>)> {
    (2usize..12).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec(0..n, 1..4), 0..n * 2)
            .prop_map(move |factors| (n, eliminate_in_order(n, &factors)))
    })
}

fn build(net: &BayesNet<SymbolicConditional>) -> Tree {
    BayesTree::from_bayes_net(net).expect("eliminated nets always form one tree")
}

fn distinct_indexed_cliques(tree: &Tree) -> usize {
    let mut ids: Vec<_> = tree.nodes().iter().flatten().copied().collect();
    ids.sort();
    ids.dedup();
    ids.len()
}

// =============================================================================
// Size agrees with the root subtree and the index
// =============================================================================
proptest! {
    #[test]
    fn size_matches_root_subtree_and_index((n, net) in net_strategy()) {
        let tree = build(&net);
        prop_assert_eq!(tree.size(), n);
        prop_assert_eq!(tree.root().unwrap().tree_size(), tree.size());
        prop_assert_eq!(distinct_indexed_cliques(&tree), tree.size());
        prop_assert!(tree.validate().is_ok());
    }
}

// =============================================================================
// Clones are equal and independent
// =============================================================================
proptest! {
    #[test]
    fn clone_is_equal_and_independent((n, net) in net_strategy()) {
        let original = build(&net);
        let mut copy = original.clone();
        prop_assert!(copy.equals(&original, 1e-9));

        let reversed: Vec<Key> = (0..n).rev().collect();
        copy.permute_with_inverse(&Permutation::try_from_vec(reversed).unwrap()).unwrap();
        prop_assert!(original.equals(&build(&net), 1e-9));
    }
}

// =============================================================================
// Memoization never changes query results
// =============================================================================
proptest! {
    #[test]
    fn queries_are_idempotent((n, net) in net_strategy(), a in 0usize..12, b in 0usize..12) {
        let (a, b) = (a % n, b % n);
        let tree = build(&net);
        let uncached = BayesTree::from_bayes_net_with_config(
            &net,
            TreeConfig { cache_shortcuts: false, ..TreeConfig::default() },
        ).unwrap();

        let first = tree.joint(a, b, &eliminate_symbolic).unwrap();
        let second = tree.joint(a, b, &eliminate_symbolic).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &uncached.joint(a, b, &eliminate_symbolic).unwrap());

        let m1 = tree.marginal_factor(a, &eliminate_symbolic).unwrap();
        let m2 = tree.marginal_factor(a, &eliminate_symbolic).unwrap();
        prop_assert_eq!(&m1, &m2);
        prop_assert_eq!(m1.keys(), &[a]);
    }
}

// =============================================================================
// Cut then rebuild restores the tree
// =============================================================================
proptest! {
    #[test]
    fn remove_top_then_reinsert_restores_tree(
        (n, net) in net_strategy(),
        keys in prop::collection::vec(0usize..12, 1..4),
    ) {
        let keys: Vec<Key> = keys.into_iter().map(|k| k % n).collect();
        let original = build(&net);
        let mut tree = original.clone();
        let removal = tree.remove_top(&keys).unwrap();
        prop_assert!(tree.is_empty());

        let mut removed: Vec<Key> = removal
            .conditionals
            .iter()
            .flat_map(|c| c.frontals().to_vec())
            .collect();
        removed.sort_unstable();
        removed.dedup();
        prop_assert_eq!(removed.len(), removal.conditionals.len());

        let mut rebuilt = BayesTree::from_bayes_net(&removal.conditionals).unwrap();
        for orphan in removal.orphans {
            rebuilt.insert(orphan).unwrap();
        }
        prop_assert!(rebuilt.equals(&original, 1e-9));
    }
}

// =============================================================================
// Parent selection picks the lowest separator key
// =============================================================================
proptest! {
    #[test]
    fn parent_is_clique_of_lowest_separator_key((_n, net) in net_strategy()) {
        let tree = build(&net);
        for conditional in net.iter() {
            let parents = conditional.parents();
            let Some(&lowest) = parents.iter().min() else { continue };
            let chosen = tree.find_parent_clique(parents).unwrap();
            prop_assert_eq!(chosen, tree.get(lowest).unwrap().id());
            let actual = tree.get(conditional.frontals()[0]).unwrap().parent().unwrap().id();
            prop_assert_eq!(chosen, actual);
        }
    }
}

// =============================================================================
// Permutation round trip
// =============================================================================
proptest! {
    #[test]
    fn permute_then_inverse_restores_labels(
        (n, net) in net_strategy(),
        seed in Just((0usize..12).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        let map: Vec<Key> = seed.into_iter().filter(|&k| k < n).collect();
        let p = Permutation::try_from_vec(map).unwrap();
        let original = build(&net);

        let mut tree = original.clone();
        tree.permute_with_inverse(&Permutation::identity(n)).unwrap();
        prop_assert!(tree.equals(&original, 1e-9));

        tree.permute_with_inverse(&p).unwrap();
        prop_assert_eq!(distinct_indexed_cliques(&tree), n);
        tree.permute_with_inverse(&p.inverse()).unwrap();
        prop_assert!(tree.equals(&original, 1e-9));
    }
}

// =============================================================================
// Snapshot round trip
// =============================================================================
proptest! {
    #[test]
    fn snapshot_roundtrip((_n, net) in net_strategy()) {
        let tree = build(&net);
        let restored: Tree = BayesTree::from_json(&tree.to_json().unwrap(), TreeConfig::default()).unwrap();
        prop_assert!(restored.equals(&tree, 1e-9));
        prop_assert_eq!(restored.clique_data(), tree.clique_data());
    }
}
