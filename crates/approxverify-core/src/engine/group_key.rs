use crate::value::{StableHash, Value, stable_hash_values};
use std::collections::HashMap;

///
/// GroupKey
///
/// GroupKey is the canonical equality/hash substrate for grouping and
/// distinct execution. Null components are ordinary values here: two keys
/// with null in the same position are equal when the other components are.
///

#[derive(Clone, Debug)]
pub struct GroupKey {
    values: Vec<Value>,
    hash: StableHash,
}

impl GroupKey {
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        let hash = stable_hash_values(&values);

        Self { values, hash }
    }

    #[must_use]
    pub const fn hash(&self) -> StableHash {
        self.hash
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Canonical key equality; the hash is only a bucket hint.
    #[must_use]
    pub fn canonical_eq(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(left, right)| left.canonical_eq(right))
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.canonical_eq(other)
    }
}

impl Eq for GroupKey {}

///
/// GroupKeyMap
///
/// Insertion-ordered map from canonical group key to per-group state.
/// Keys are bucketed by stable hash and confirmed by canonical equality
/// inside the bucket, so hash collisions never merge distinct groups.
///

#[derive(Debug)]
pub struct GroupKeyMap<S> {
    buckets: HashMap<StableHash, Vec<usize>>,
    entries: Vec<(GroupKey, S)>,
}

impl<S> Default for GroupKeyMap<S> {
    fn default() -> Self {
        Self {
            buckets: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<S> GroupKeyMap<S> {
    /// Return the state for `key`, creating it with `init` on first sight.
    pub fn entry_or_insert_with(&mut self, key: GroupKey, init: impl FnOnce() -> S) -> &mut S {
        let bucket = self.buckets.entry(key.hash()).or_default();
        let found = bucket
            .iter()
            .copied()
            .find(|&slot| self.entries[slot].0.canonical_eq(&key));

        let slot = if let Some(slot) = found {
            slot
        } else {
            let slot = self.entries.len();
            bucket.push(slot);
            self.entries.push((key, init()));
            slot
        };

        &mut self.entries[slot].1
    }

    #[must_use]
    pub fn get(&self, key: &GroupKey) -> Option<&S> {
        self.buckets.get(&key.hash()).and_then(|bucket| {
            bucket
                .iter()
                .map(|&slot| &self.entries[slot])
                .find(|(existing, _)| existing.canonical_eq(key))
                .map(|(_, state)| state)
        })
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the map, yielding groups in first-seen order.
    pub fn into_entries(self) -> impl Iterator<Item = (GroupKey, S)> {
        self.entries.into_iter()
    }
}

///
/// DistinctValues
///
/// Canonical value set used by `count(distinct ..)`.
///

#[derive(Debug, Default)]
pub struct DistinctValues {
    seen: GroupKeyMap<()>,
}

impl DistinctValues {
    /// Insert one value and return true if it was newly observed.
    pub fn insert(&mut self, value: &Value) -> bool {
        let before = self.seen.len();
        self.seen
            .entry_or_insert_with(GroupKey::new(vec![value.clone()]), || ());

        self.seen.len() > before
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

///
/// TESTS
///
