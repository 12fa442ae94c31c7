//! Persisted tree snapshots.
//!
//! A snapshot lists every clique with its conditional, parent, children and
//! memoized shortcut, plus the root and the variable index, all as positions
//! into the clique list. Loading checks that every link agrees before a tree
//! is rebuilt.

use std::path::Path;
use std::sync::Arc;

use bayes_core::constants::SNAPSHOT_FORMAT_VERSION;
use bayes_core::errors::PersistError;
use bayes_core::{Conditional, TreeConfig};
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clique::{CachedFactor, Clique, CliqueId};
use crate::tree::BayesTree;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "C: Serialize, C::Factor: Serialize",
    deserialize = "C: Deserialize<'de>, C::Factor: Deserialize<'de>"
))]
pub struct CliqueRecord<C: Conditional> {
    pub conditional: C,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    #[serde(default)]
    pub cached_factor: Option<CachedFactor<C::Factor>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "C: Serialize, C::Factor: Serialize",
    deserialize = "C: Deserialize<'de>, C::Factor: Deserialize<'de>"
))]
pub struct TreeSnapshot<C: Conditional> {
    pub format_version: u32,
    pub cliques: Vec<CliqueRecord<C>>,
    pub root: Option<usize>,
    pub nodes: Vec<Option<usize>>,
}

impl<C: Conditional> BayesTree<C> {
    /// Capture the whole tree, cliques in arena order.
    pub fn to_snapshot(&self) -> TreeSnapshot<C> {
        let ids: Vec<CliqueId> = self.graph.node_indices().collect();
        let position: FxHashMap<CliqueId, usize> =
            ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let pos = |id: CliqueId| position.get(&id).copied();

        let cliques = ids
            .iter()
            .filter_map(|&id| {
                let clique = self.graph.node_weight(id)?;
                Some(CliqueRecord {
                    conditional: C::clone(clique.conditional()),
                    parent: self.parent_id(id).and_then(pos),
                    children: self.children_ids(id).into_iter().filter_map(pos).collect(),
                    cached_factor: clique.cached_factor(),
                })
            })
            .collect();

        TreeSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            cliques,
            root: self.root.and_then(pos),
            nodes: self.nodes.iter().map(|id| id.and_then(pos)).collect(),
        }
    }

    /// Rebuild a tree from a snapshot, rejecting any inconsistency.
    pub fn from_snapshot(snapshot: TreeSnapshot<C>, config: TreeConfig) -> Result<Self, PersistError> {
        check_snapshot(&snapshot)?;

        let mut tree = BayesTree::with_config(config);
        let mut ids = Vec::with_capacity(snapshot.cliques.len());
        let mut links = Vec::with_capacity(snapshot.cliques.len());
        for record in snapshot.cliques {
            let clique = Clique::new(Arc::new(record.conditional));
            clique.set_cached(record.cached_factor);
            ids.push(tree.graph.add_node(clique));
            links.push(record.children);
        }
        for (parent, children) in links.into_iter().enumerate() {
            for child in children {
                tree.graph.add_edge(ids[parent], ids[child], ());
            }
        }
        tree.root = snapshot.root.map(|r| ids[r]);
        tree.nodes = snapshot.nodes.iter().map(|n| n.map(|i| ids[i])).collect();

        debug!(cliques = tree.size(), "restored tree from snapshot");
        Ok(tree)
    }

    pub fn to_json(&self) -> Result<String, PersistError>
    where
        C: Serialize,
        C::Factor: Serialize,
    {
        Ok(serde_json::to_string_pretty(&self.to_snapshot())?)
    }

    pub fn from_json(json: &str, config: TreeConfig) -> Result<Self, PersistError>
    where
        C: DeserializeOwned,
        C::Factor: DeserializeOwned,
    {
        let snapshot: TreeSnapshot<C> = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot, config)
    }

    /// Write the JSON snapshot to `path`, replacing any existing file.
    pub fn save_snapshot(&self, path: &Path) -> Result<(), PersistError>
    where
        C: Serialize,
        C::Factor: Serialize,
    {
        std::fs::write(path, self.to_json()?)?;
        debug!(path = %path.display(), cliques = self.size(), "saved tree snapshot");
        Ok(())
    }

    pub fn load_snapshot(path: &Path, config: TreeConfig) -> Result<Self, PersistError>
    where
        C: DeserializeOwned,
        C::Factor: DeserializeOwned,
    {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, config)
    }
}

/// Every link and index entry must agree with the clique list.
fn check_snapshot<C: Conditional>(snapshot: &TreeSnapshot<C>) -> Result<(), PersistError> {
    if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(PersistError::UnsupportedVersion {
            expected: SNAPSHOT_FORMAT_VERSION,
            found: snapshot.format_version,
        });
    }

    let len = snapshot.cliques.len();
    let mut parent_of: Vec<Option<usize>> = vec![None; len];
    for (i, record) in snapshot.cliques.iter().enumerate() {
        for &child in &record.children {
            if child >= len || child == i {
                return Err(PersistError::mismatch(format!(
                    "clique {i} lists invalid child {child}"
                )));
            }
            if parent_of[child].replace(i).is_some() {
                return Err(PersistError::mismatch(format!(
                    "clique {child} is listed as a child more than once"
                )));
            }
        }
    }
    for (i, record) in snapshot.cliques.iter().enumerate() {
        if record.parent != parent_of[i] {
            return Err(PersistError::mismatch(format!(
                "clique {i} parent {:?} disagrees with child lists ({:?})",
                record.parent, parent_of[i]
            )));
        }
    }

    let roots: Vec<usize> = (0..len).filter(|&i| parent_of[i].is_none()).collect();
    match (snapshot.root, roots.as_slice()) {
        (None, []) => {}
        (Some(r), [only]) if r == *only => {}
        (root, found) => {
            return Err(PersistError::mismatch(format!(
                "root {root:?} does not match parentless cliques {found:?}"
            )))
        }
    }

    // Every parentless clique is the root, so reaching it from each clique
    // rules out cycles.
    for start in 0..len {
        let mut current = start;
        let mut steps = 0;
        while let Some(p) = parent_of[current] {
            current = p;
            steps += 1;
            if steps > len {
                return Err(PersistError::mismatch(format!(
                    "clique {start} sits on a parent cycle"
                )));
            }
        }
    }

    for (key, entry) in snapshot.nodes.iter().enumerate() {
        if let Some(i) = *entry {
            let owns = snapshot
                .cliques
                .get(i)
                .is_some_and(|r| r.conditional.frontals().contains(&key));
            if !owns {
                return Err(PersistError::mismatch(format!(
                    "index maps key {key} to clique {i}, which does not hold it"
                )));
            }
        }
    }
    for (i, record) in snapshot.cliques.iter().enumerate() {
        for &key in record.conditional.frontals() {
            if snapshot.nodes.get(key).copied().flatten() != Some(i) {
                return Err(PersistError::mismatch(format!(
                    "frontal key {key} of clique {i} is missing from the index"
                )));
            }
        }
    }
    Ok(())
}
