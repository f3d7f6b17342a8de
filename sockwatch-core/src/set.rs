//! Handle bookkeeping.
//!
//! [`HandleSet`] is the set of watched handles together with the
//! high-water mark the readiness calls need as a scan bound. [`ReadyList`]
//! is the snapshot produced by the most recent wait.
//!
//! The ready snapshot is kept as a sorted vector instead of being re-scanned
//! from zero up to the high-water mark on every lookup. Indexing is therefore
//! O(1) while enumeration order (ascending handle value) is unchanged.

use crate::handle::{is_valid_handle, Handle, INVALID_HANDLE};
use std::collections::BTreeSet;

/// The set of handles registered for readiness monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandleSet {
    /// Registered handles, ordered ascending.
    handles: BTreeSet<Handle>,

    /// Largest handle inserted since the last clear.
    high_water_mark: Handle,
}

impl HandleSet {
    /// Creates an empty set with a high-water mark of zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `handle`. Returns `false` if it was already present or is
    /// not a valid handle.
    ///
    /// The high-water mark grows to cover every valid `handle`.
    pub fn insert(&mut self, handle: Handle) -> bool {
        if !is_valid_handle(handle) {
            return false;
        }
        self.high_water_mark = self.high_water_mark.max(handle);
        self.handles.insert(handle)
    }

    /// Removes `handle`. Returns `false` if it was not present.
    ///
    /// The high-water mark is left untouched.
    pub fn remove(&mut self, handle: Handle) -> bool {
        self.handles.remove(&handle)
    }

    /// Removes every handle and resets the high-water mark to zero.
    pub fn clear(&mut self) {
        self.handles.clear();
        self.high_water_mark = 0;
    }

    /// Returns `true` if `handle` is registered.
    pub fn contains(&self, handle: Handle) -> bool {
        self.handles.contains(&handle)
    }

    /// Number of registered handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if no handle is registered.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Largest handle inserted since the last clear.
    pub fn high_water_mark(&self) -> Handle {
        self.high_water_mark
    }

    /// Largest handle currently registered.
    pub fn last(&self) -> Option<Handle> {
        self.handles.last().copied()
    }

    /// Iterates over registered handles in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Handle> + '_ {
        self.handles.iter().copied()
    }
}

/// Handles found readable by the most recent wait, in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadyList {
    handles: Vec<Handle>,
}

impl ReadyList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot with `ready`.
    ///
    /// Input that is not already ascending is sorted and deduplicated.
    pub fn replace<I>(&mut self, ready: I)
    where
        I: IntoIterator<Item = Handle>,
    {
        self.handles.clear();
        self.handles.extend(ready);
        if !self.handles.windows(2).all(|pair| pair[0] < pair[1]) {
            self.handles.sort_unstable();
            self.handles.dedup();
        }
    }

    /// Empties the snapshot.
    pub fn clear(&mut self) {
        self.handles.clear();
    }

    /// Returns the `index`-th ready handle, or [`INVALID_HANDLE`] when out
    /// of range.
    pub fn get(&self, index: usize) -> Handle {
        self.handles.get(index).copied().unwrap_or(INVALID_HANDLE)
    }

    /// Returns `true` if `handle` was ready at the last wait.
    pub fn contains(&self, handle: Handle) -> bool {
        self.handles.binary_search(&handle).is_ok()
    }

    /// Number of ready handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if nothing was ready.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Iterates over ready handles in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Handle> + '_ {
        self.handles.iter().copied()
    }
}
