//! # Quadratic Probing Hash Map
//!
//! This module provides a **HashMap** using *open addressing* with *quadratic probing*. All entries
//! live directly in one contiguous slot array; a key whose home slot is taken is placed at the first
//! free position of the sequence `(home + i*i) mod capacity` for `i = 0, 1, 2, …`.
//!
//! ## Key Features
//! - **Generic** key-value pairs (`K: Hash + Eq, V`), no bounds on the value type for storage.
//! - **Pluggable hashing** through `BuildHasher` (`RandomState` by default, or the deterministic
//!   [`FnvBuildHasher`](super::fnv::FnvBuildHasher)).
//! - **Automatic Growth**: before inserting a new key, if `len >= capacity / 2` the table doubles
//!   its capacity and rehashes every entry. Updating a present key never rebuilds.
//! - **Tombstones**: removal leaves a marker so probe chains through the removed slot stay intact.
//!   Tombstones are reused by later inserts and dropped whenever the table is rebuilt.
//! - **Fallible insert**: if a full pass over the probe sequence finds neither a free slot nor the
//!   key, `insert` returns [`Error::CapacityExhausted`] and leaves the table unchanged.
//!
//! ## Probe coverage
//! `i*i mod capacity` does not reach every offset. Modulo a power of two only a small fraction of
//! slots is ever probed (4 of 16, 7 of 32), and doubling keeps a power of two a power of two, so
//! such capacities exhaust a probe sequence long before the table is half full. Prefer starting
//! capacities with an odd factor, such as the default of 10. With a prime capacity the first
//! `capacity / 2 + 1` probes are all distinct.
//!
//! **Note**: the table does no internal locking. Wrap it in a mutex to share it between threads.
//!
//! ## Example
//! ```rust
//! use quadmap::hashing::quadratic::QuadraticHashMap;
//!
//! let mut map = QuadraticHashMap::new(10);
//! map.insert(1, "Masha").unwrap();
//! map.insert(2, "Sasha").unwrap();
//! map.insert(3, "Pasha").unwrap();
//! assert_eq!(map.get(&2), Some(&"Sasha"));
//!
//! assert_eq!(map.remove(&2), Some("Sasha"));
//! assert_eq!(map.get(&2), None);
//! assert_eq!(map.len(), 2);
//! ```

use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::mem;

use log::{debug, trace, warn};

use super::fnv::FnvBuildHasher;
use crate::error::{Error, Result};

/// Initial capacity used by the builder and `Default` when none is given.
const DEFAULT_INITIAL_CAPACITY: usize = 10;

#[derive(Debug, Clone)]
enum Slot<K, V> {
    Empty,
    Tombstone,
    Occupied(K, V),
}

impl<K, V> Default for Slot<K, V> {
    fn default() -> Self {
        Slot::Empty
    }
}

/// Public view of a single slot, as returned by [`QuadraticHashMap::dump`].
#[derive(Debug, PartialEq, Eq)]
pub enum SlotState<'a, K, V> {
    /// Never used since the last rebuild.
    Empty,
    /// Held an entry that has since been removed.
    Deleted,
    /// Holds a live entry.
    Occupied(&'a K, &'a V),
}

/// Outcome of walking a key's probe sequence.
enum Probe {
    /// The key lives in this slot.
    Found(usize),
    /// The key is absent; this is where it should go.
    Vacant(usize),
    /// The key is absent and every probed slot holds another key.
    Exhausted,
}

/// A builder for [`QuadraticHashMap`], allowing you to specify the initial capacity and hasher.
#[derive(Debug)]
pub struct QuadraticHashMapBuilder<S> {
    capacity: usize,
    hasher: S,
}

impl Default for QuadraticHashMapBuilder<RandomState> {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_INITIAL_CAPACITY,
            hasher: RandomState::new(),
        }
    }
}

impl QuadraticHashMapBuilder<RandomState> {
    /// Create a new builder with the default capacity and a `RandomState` hasher.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: BuildHasher> QuadraticHashMapBuilder<S> {
    /// Sets the initial number of slots. Zero is raised to one.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the hasher used to compute home slots.
    pub fn with_hasher<T: BuildHasher>(self, hasher: T) -> QuadraticHashMapBuilder<T> {
        QuadraticHashMapBuilder {
            capacity: self.capacity,
            hasher,
        }
    }

    /// Finalize building the map.
    pub fn build<K: Hash + Eq, V>(self) -> QuadraticHashMap<K, V, S> {
        if self.capacity == 0 {
            trace!("requested capacity 0, using 1");
        }
        let capacity = self.capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, Default::default);

        QuadraticHashMap {
            slots,
            len: 0,
            tombstones: 0,
            build_hasher: self.hasher,
        }
    }
}

/// An open addressing hash map resolving collisions by quadratic probing.
#[derive(Debug, Clone)]
pub struct QuadraticHashMap<K, V, S = RandomState> {
    slots: Vec<Slot<K, V>>,
    /// Number of occupied slots.
    len: usize,
    /// Number of tombstone slots.
    tombstones: usize,
    build_hasher: S,
}

/// A [`QuadraticHashMap`] with deterministic FNV-1a hashing.
pub type FnvQuadraticHashMap<K, V> = QuadraticHashMap<K, V, FnvBuildHasher>;

impl<K: Hash + Eq, V> QuadraticHashMap<K, V, RandomState> {
    /// Creates an empty map with `capacity` slots (at least one) and a `RandomState` hasher.
    pub fn new(capacity: usize) -> Self {
        QuadraticHashMapBuilder::new().with_capacity(capacity).build()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher + Default> Default for QuadraticHashMap<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(DEFAULT_INITIAL_CAPACITY, S::default())
    }
}

impl<K, V, S> QuadraticHashMap<K, V, S> {
    /// Returns the number of key-value pairs in the map.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the current number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.build_hasher
    }

    /// Removes every entry and tombstone, keeping the current capacity.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Slot::Empty;
        }
        self.len = 0;
        self.tombstones = 0;
    }

    /// Returns an iterator over all (key, value) pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(k, v) => Some((k, v)),
            _ => None,
        })
    }

    /// Lists every slot index in order together with its state.
    pub fn dump(&self) -> Vec<(usize, SlotState<'_, K, V>)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(idx, slot)| {
                let state = match slot {
                    Slot::Empty => SlotState::Empty,
                    Slot::Tombstone => SlotState::Deleted,
                    Slot::Occupied(k, v) => SlotState::Occupied(k, v),
                };
                (idx, state)
            })
            .collect()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> QuadraticHashMap<K, V, S> {
    /// Creates an empty map with `capacity` slots (at least one) hashing keys with `hasher`.
    pub fn with_hasher(capacity: usize, hasher: S) -> Self {
        QuadraticHashMapBuilder { capacity, hasher }.build()
    }

    /// Inserts a key-value pair, returning the previous value if the key was present.
    ///
    /// Updating a present key never rebuilds the table. A new key first grows the table when
    /// `len >= capacity / 2`, or rebuilds it at the same capacity when live entries plus
    /// tombstones reach that threshold. A rebuild is only kept if it leaves the new key a free
    /// slot; otherwise the key goes into the free slot of the current layout.
    ///
    /// # Errors
    /// [`Error::CapacityExhausted`] if no slot on the key's probe sequence is free in either
    /// layout. The map is unchanged in that case.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        let vacant = match self.locate(&key) {
            Probe::Found(idx) => match &mut self.slots[idx] {
                Slot::Occupied(_, v) => return Ok(Some(mem::replace(v, value))),
                _ => unreachable!("located slot holds the key"),
            },
            Probe::Vacant(idx) => Some(idx),
            Probe::Exhausted => None,
        };

        let capacity = self.capacity();
        let target = if self.len >= capacity / 2 {
            self.rebuild_for(&key, capacity * 2).or(vacant)
        } else if self.tombstones > 0 && self.len + self.tombstones >= capacity / 2 {
            self.rebuild_for(&key, capacity).or(vacant)
        } else {
            vacant
        };

        match target {
            Some(idx) => {
                if let Slot::Tombstone = self.slots[idx] {
                    self.tombstones -= 1;
                }
                self.slots[idx] = Slot::Occupied(key, value);
                self.len += 1;
                Ok(None)
            }
            None => {
                let capacity = self.capacity();
                warn!(
                    "insert failed: probe sequence exhausted (capacity {}, len {})",
                    capacity, self.len
                );
                Err(Error::CapacityExhausted { capacity })
            }
        }
    }

    /// Retrieve a reference to the value for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        match self.locate(key) {
            Probe::Found(idx) => match &self.slots[idx] {
                Slot::Occupied(_, v) => Some(v),
                _ => None,
            },
            _ => None,
        }
    }

    /// Retrieve a mutable reference to the value for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.locate(key) {
            Probe::Found(idx) => match &mut self.slots[idx] {
                Slot::Occupied(_, v) => Some(v),
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns true if `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        matches!(self.locate(key), Probe::Found(_))
    }

    /// Removes `key`, returning its value if it was present. Absent keys are a no-op.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let Probe::Found(idx) = self.locate(key) else {
            return None;
        };
        match mem::replace(&mut self.slots[idx], Slot::Tombstone) {
            Slot::Occupied(_, v) => {
                self.len -= 1;
                self.tombstones += 1;
                Some(v)
            }
            _ => unreachable!("located slot holds the key"),
        }
    }

    /// Walks the probe sequence of `key`. Tombstones are skipped but the first one seen is
    /// remembered as the insertion point; an empty slot ends the walk.
    fn locate(&self, key: &K) -> Probe {
        let capacity = self.capacity();
        let home = home_slot(&self.build_hasher, key, capacity);
        let mut vacant = None;

        for i in 0..capacity {
            let idx = probe(home, i, capacity);
            match &self.slots[idx] {
                Slot::Empty => return Probe::Vacant(vacant.unwrap_or(idx)),
                Slot::Tombstone => {
                    vacant.get_or_insert(idx);
                }
                Slot::Occupied(k, _) => {
                    if k == key {
                        return Probe::Found(idx);
                    }
                }
            }
        }

        vacant.map_or(Probe::Exhausted, Probe::Vacant)
    }

    /// Rebuilds the table with `new_capacity` slots for an insert of the absent `key`, dropping
    /// tombstones. Returns the slot the key should take in the new layout. The table is left
    /// untouched (and `None` returned) if some entry cannot be placed or if the new layout
    /// has no free slot on the key's probe sequence.
    fn rebuild_for(&mut self, key: &K, new_capacity: usize) -> Option<usize> {
        let Some(layout) = self.plan(new_capacity) else {
            debug!(
                "rebuild to capacity {} skipped: an entry has no free slot",
                new_capacity
            );
            return None;
        };

        let home = home_slot(&self.build_hasher, key, new_capacity);
        let Some(target) = first_free(&layout, home) else {
            debug!(
                "rebuild to capacity {} skipped: it would leave no slot for the new key",
                new_capacity
            );
            return None;
        };

        debug!(
            "rebuild: capacity {} -> {}, len {}, dropping {} tombstones",
            self.capacity(),
            new_capacity,
            self.len,
            self.tombstones
        );
        self.apply(layout);
        Some(target)
    }

    /// Plans where every entry lands in a table of `new_capacity` slots, visiting entries in
    /// slot order. Each planned slot holds the entry's current index.
    fn plan(&self, new_capacity: usize) -> Option<Vec<Option<usize>>> {
        let mut layout: Vec<Option<usize>> = vec![None; new_capacity];

        for (old_idx, slot) in self.slots.iter().enumerate() {
            if let Slot::Occupied(k, _) = slot {
                let home = home_slot(&self.build_hasher, k, new_capacity);
                let idx = first_free(&layout, home)?;
                layout[idx] = Some(old_idx);
            }
        }

        Some(layout)
    }

    /// Moves the entries into the planned layout.
    fn apply(&mut self, layout: Vec<Option<usize>>) {
        let mut old_slots = mem::take(&mut self.slots);
        self.slots = layout
            .into_iter()
            .map(|src| match src {
                Some(old_idx) => mem::take(&mut old_slots[old_idx]),
                None => Slot::Empty,
            })
            .collect();
        self.tombstones = 0;
    }
}

impl<K: fmt::Display, V: fmt::Display, S> fmt::Display for QuadraticHashMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "HashTable contents:")?;
        for (idx, slot) in self.slots.iter().enumerate() {
            match slot {
                Slot::Empty => writeln!(f, "Index {}: [empty]", idx)?,
                Slot::Tombstone => writeln!(f, "Index {}: [deleted]", idx)?,
                Slot::Occupied(k, v) => writeln!(f, "Index {}: Key: {}, Value: {}", idx, k, v)?,
            }
        }
        Ok(())
    }
}

/// Home slot of `key`: its hash reduced modulo `capacity`.
fn home_slot<K: Hash + ?Sized, S: BuildHasher>(
    build_hasher: &S,
    key: &K,
    capacity: usize,
) -> usize {
    let mut hasher = build_hasher.build_hasher();
    key.hash(&mut hasher);
    (hasher.finish() % capacity as u64) as usize
}

/// First unplanned slot on the probe sequence starting at `home`.
fn first_free(layout: &[Option<usize>], home: usize) -> Option<usize> {
    let capacity = layout.len();
    (0..capacity)
        .map(|i| probe(home, i, capacity))
        .find(|&idx| layout[idx].is_none())
}

/// The `i`-th probe position: `(home + i^2) mod capacity`.
fn probe(home: usize, i: usize, capacity: usize) -> usize {
    (home + (i * i) % capacity) % capacity
}
