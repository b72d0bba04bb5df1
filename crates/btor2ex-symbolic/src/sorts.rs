//! Sort table: BTOR2 sort lids mapped to backend sort handles.

use btor2ex_ir::Lid;
use indexmap::IndexMap;

/// A registered bitvector sort.
#[derive(Debug, Clone, PartialEq)]
pub struct BvSort<T> {
    pub width: u32,
    pub handle: T,
}

/// Sorts in registration order, keyed by the lid of their `sort` line.
#[derive(Debug, Clone)]
pub struct SortTable<T> {
    entries: IndexMap<Lid, BvSort<T>>,
}

impl<T> Default for SortTable<T> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<T> SortTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sort. A lid that is already present keeps its first entry.
    ///
    /// Returns true if the sort was newly inserted.
    pub fn register(&mut self, lid: Lid, width: u32, handle: T) -> bool {
        if self.entries.contains_key(&lid) {
            return false;
        }
        self.entries.insert(lid, BvSort { width, handle });
        true
    }

    pub fn get(&self, lid: Lid) -> Option<&BvSort<T>> {
        self.entries.get(&lid)
    }

    pub fn contains(&self, lid: Lid) -> bool {
        self.entries.contains_key(&lid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Lid, &BvSort<T>)> {
        self.entries.iter().map(|(lid, sort)| (*lid, sort))
    }
}
