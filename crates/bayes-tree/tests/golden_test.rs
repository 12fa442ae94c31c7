//! Golden dataset tests for bayes-tree.
//!
//! Each file under `test-fixtures/golden/bayes_tree/` holds a symbolic Bayes
//! net and the tree shape, statistics, shortcuts, joints and cut that
//! building it must produce.

use bayes_core::{BayesNet, Conditional, Factor, Key};
use bayes_tree::{BayesTree, CliqueStats};
use serde::Deserialize;
use test_fixtures::{eliminate_symbolic, list_fixtures, load_fixture, SymbolicConditional};

// ---------------------------------------------------------------------------
// Fixture schema
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GoldenTree {
    name: String,
    conditionals: Vec<SymbolicConditional>,
    expected: Expected,
}

#[derive(Debug, Deserialize)]
struct Expected {
    size: usize,
    root: Key,
    parents: Vec<(Key, Key)>,
    stats: CliqueStats,
    shortcuts: Vec<ShortcutCase>,
    joints: Vec<JointCase>,
    remove_top: RemoveTopCase,
}

#[derive(Debug, Deserialize)]
struct ShortcutCase {
    key: Key,
    factors: Vec<Vec<Key>>,
}

#[derive(Debug, Deserialize)]
struct JointCase {
    keys: (Key, Key),
    factors: Vec<Vec<Key>>,
}

#[derive(Debug, Deserialize)]
struct RemoveTopCase {
    keys: Vec<Key>,
    conditionals: Vec<Key>,
    orphans: Vec<Key>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_all() -> Vec<GoldenTree> {
    let files = list_fixtures("golden/bayes_tree");
    assert!(!files.is_empty(), "no golden bayes_tree fixtures found");
    files
        .iter()
        .map(|path| {
            let name = path.file_name().unwrap().to_str().unwrap();
            load_fixture(&format!("golden/bayes_tree/{name}"))
        })
        .collect()
}

fn build(golden: &GoldenTree) -> BayesTree<SymbolicConditional> {
    let net: BayesNet<SymbolicConditional> = golden.conditionals.iter().cloned().collect();
    BayesTree::from_bayes_net(&net)
        .unwrap_or_else(|e| panic!("{}: failed to build: {e}", golden.name))
}

fn key_sets<F: Factor>(factors: &[F]) -> Vec<Vec<Key>> {
    factors.iter().map(|f| f.keys().to_vec()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn golden_tree_shape() {
    for golden in load_all() {
        let tree = build(&golden);
        assert_eq!(tree.size(), golden.expected.size, "{}: size", golden.name);
        assert_eq!(
            tree.root().unwrap().frontals(),
            &[golden.expected.root],
            "{}: root",
            golden.name
        );
        for &(key, parent) in &golden.expected.parents {
            let actual = tree.get(key).unwrap().parent().map(|p| p.frontals()[0]);
            assert_eq!(actual, Some(parent), "{}: parent of {key}", golden.name);
        }
        tree.validate().unwrap();
    }
}

#[test]
fn golden_clique_stats() {
    for golden in load_all() {
        let stats = build(&golden).clique_stats();
        let expected = golden.expected.stats;
        assert_eq!(stats.max_conditional_size, expected.max_conditional_size);
        assert_eq!(stats.max_separator_size, expected.max_separator_size);
        assert!((stats.avg_conditional_size - expected.avg_conditional_size).abs() < 1e-9);
        assert!(
            (stats.avg_separator_size - expected.avg_separator_size).abs() < 1e-9,
            "{}: avg separator {} vs {}",
            golden.name,
            stats.avg_separator_size,
            expected.avg_separator_size
        );
    }
}

#[test]
fn golden_shortcuts_and_joints() {
    for golden in load_all() {
        let tree = build(&golden);
        let root = tree.root_id().unwrap();
        for case in &golden.expected.shortcuts {
            let id = tree.get(case.key).unwrap().id();
            let shortcut = tree.shortcut(id, root, &eliminate_symbolic).unwrap();
            assert_eq!(key_sets(&shortcut), case.factors, "{}: shortcut of {}", golden.name, case.key);
        }
        for case in &golden.expected.joints {
            let (k1, k2) = case.keys;
            let joint = tree.joint(k1, k2, &eliminate_symbolic).unwrap();
            assert_eq!(key_sets(&joint), case.factors, "{}: joint of {k1}, {k2}", golden.name);
        }
    }
}

#[test]
fn golden_remove_top() {
    for golden in load_all() {
        let mut tree = build(&golden);
        let case = &golden.expected.remove_top;
        let removal = tree.remove_top(&case.keys).unwrap();

        let conditionals: Vec<Key> = removal.conditionals.iter().map(|c| c.frontals()[0]).collect();
        assert_eq!(conditionals, case.conditionals, "{}: removed conditionals", golden.name);

        let orphans: Vec<Key> = removal
            .orphans
            .iter()
            .map(|t| t.root().unwrap().frontals()[0])
            .collect();
        assert_eq!(orphans, case.orphans, "{}: orphans", golden.name);
        assert!(tree.is_empty());
    }
}
