//! Relabelling of variable keys.
//!
//! A [`Permutation`] maps every key `j < len` to `p[j]`; keys at or beyond
//! `len` are fixed points. Trees, conditionals, and factors are relabelled
//! with `permute_with_inverse(p)`, which replaces each key `j` by `p.apply(j)`.
//!
//! ```
//! use bayes_core::Permutation;
//!
//! let p = Permutation::try_from_vec(vec![2, 0, 1]).unwrap();
//! assert_eq!(p.apply(0), 2);
//! assert_eq!(p.inverse().apply(2), 0);
//! assert_eq!(p.apply(7), 7);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::PermutationError;
use crate::Key;

/// Serialized as its image vector; deserialization rejects non-bijections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Key>", into = "Vec<Key>")]
pub struct Permutation {
    map: Vec<Key>,
}

impl Permutation {
    /// The identity on `0..len`.
    pub fn identity(len: usize) -> Self {
        Self {
            map: (0..len).collect(),
        }
    }

    /// Build a permutation from its image vector, rejecting non-bijections.
    pub fn try_from_vec(map: Vec<Key>) -> Result<Self, PermutationError> {
        let len = map.len();
        let mut seen = vec![false; len];
        for &target in &map {
            if target >= len {
                return Err(PermutationError::TargetOutOfRange { target, len });
            }
            if std::mem::replace(&mut seen[target], true) {
                return Err(PermutationError::DuplicateTarget { target });
            }
        }
        Ok(Self { map })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Image of `key`.
    #[inline]
    pub fn apply(&self, key: Key) -> Key {
        self.map.get(key).copied().unwrap_or(key)
    }

    pub fn inverse(&self) -> Self {
        let mut map = vec![0; self.map.len()];
        for (source, &target) in self.map.iter().enumerate() {
            map[target] = source;
        }
        Self { map }
    }

    pub fn is_identity(&self) -> bool {
        self.map.iter().enumerate().all(|(j, &p)| j == p)
    }

    /// Relabel a key list in place.
    pub fn apply_all(&self, keys: &mut [Key]) {
        for key in keys.iter_mut() {
            *key = self.apply(*key);
        }
    }
}

impl TryFrom<Vec<Key>> for Permutation {
    type Error = PermutationError;

    fn try_from(map: Vec<Key>) -> Result<Self, Self::Error> {
        Self::try_from_vec(map)
    }
}

impl From<Permutation> for Vec<Key> {
    fn from(p: Permutation) -> Self {
        p.map
    }
}
