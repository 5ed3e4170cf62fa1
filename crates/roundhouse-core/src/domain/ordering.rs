//! Sparse sort keys for user-orderable lists.
//!
//! Models within a purchase and members of a train are kept in the order the
//! collector chose. Instead of storing dense positions (which would rewrite
//! every row after an insertion), each item carries an integer key spaced
//! `baseline` apart. Inserting between two neighbours takes the midpoint of
//! their keys, so normally only the new item is written. When two neighbours
//! are adjacent integers the list is respaced once, leaving a gap at the
//! insertion point.
//!
//! All functions here assume the slice is already in key order; a slice that
//! is not falls through to renumbering, which restores a consistent order.

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Spacing used when none is configured.
pub const DEFAULT_BASELINE: i64 = 64;

/// Largest accepted spacing. Keeps `(position + 1) * baseline` well inside
/// `i64` for any list that fits in memory.
pub const MAX_BASELINE: i64 = 1 << 32;

/// An item that carries a sparse sort key.
pub trait IndexSortable {
    fn sort_index(&self) -> i64;
    fn set_sort_index(&mut self, index: i64);
}

/// Result of a key allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    /// Key to assign to the new or moved item.
    pub index: i64,
    /// Whether the existing items were renumbered to make room.
    pub renumbered: bool,
}

impl Allocation {
    const fn fits(index: i64) -> Self {
        Self {
            index,
            renumbered: false,
        }
    }

    const fn renumbered(index: i64) -> Self {
        Self {
            index,
            renumbered: true,
        }
    }
}

/// Allocator for sparse sort keys with a fixed spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct SparseIndex {
    baseline: i64,
}

impl SparseIndex {
    /// Create an allocator with the given spacing.
    ///
    /// # Panics
    /// Panics if `baseline` is outside `2..=MAX_BASELINE` (use `try_new` for fallible).
    pub fn new(baseline: i64) -> Self {
        assert!(
            (2..=MAX_BASELINE).contains(&baseline),
            "sort index baseline must be between 2 and {MAX_BASELINE}"
        );
        Self { baseline }
    }

    /// Fallible constructor.
    pub fn try_new(baseline: i64) -> Result<Self, DomainError> {
        if !(2..=MAX_BASELINE).contains(&baseline) {
            Err(DomainError::InvalidBaseline { baseline })
        } else {
            Ok(Self { baseline })
        }
    }

    pub const fn baseline(&self) -> i64 {
        self.baseline
    }

    /// Key for an item appended after `items`.
    ///
    /// An empty list starts at the baseline; otherwise the key is the last
    /// item's key plus the baseline. If that would overflow, `items` is
    /// renumbered first.
    pub fn index_for_appending<T: IndexSortable>(&self, items: &mut [T]) -> i64 {
        self.allocate_append(items).index
    }

    /// Key for an item inserted so that it ends up at position `at`.
    ///
    /// `at == items.len()` appends. Otherwise the key is the floor of the
    /// midpoint between the neighbours (`0` stands in for the missing left
    /// neighbour when `at == 0`); when no integer lies strictly between them,
    /// every item is respaced and the key is taken from the respaced gap.
    ///
    /// # Panics
    /// Panics if `at > items.len()`.
    pub fn index_for_inserting<T: IndexSortable>(&self, items: &mut [T], at: usize) -> i64 {
        self.allocate_insert(items, at).index
    }

    /// Key for moving the item at `from` so that it ends up at position `to`
    /// once the list is re-sorted.
    ///
    /// The moved item is ignored when looking for neighbours, and is not
    /// written by a respace; the caller assigns the returned key to it.
    ///
    /// # Panics
    /// Panics if `from` or `to` is not a valid position.
    pub fn index_for_moving<T: IndexSortable>(&self, items: &mut [T], from: usize, to: usize) -> i64 {
        self.allocate_move(items, from, to).index
    }

    /// Like [`Self::index_for_appending`], reporting whether a respace happened.
    pub fn allocate_append<T: IndexSortable>(&self, items: &mut [T]) -> Allocation {
        let Some(last) = items.last() else {
            return Allocation::fits(self.baseline);
        };

        match last.sort_index().checked_add(self.baseline) {
            Some(index) => Allocation::fits(index),
            None => {
                let len = items.len();
                Allocation::renumbered(self.respace_around(items, None, len))
            }
        }
    }

    /// Like [`Self::index_for_inserting`], reporting whether a respace happened.
    pub fn allocate_insert<T: IndexSortable>(&self, items: &mut [T], at: usize) -> Allocation {
        assert!(
            at <= items.len(),
            "insertion position {at} out of range for {} items",
            items.len()
        );

        if at == items.len() {
            return self.allocate_append(items);
        }

        let lo = if at == 0 { 0 } else { items[at - 1].sort_index() };
        let hi = items[at].sort_index();

        match midpoint(lo, hi) {
            Some(index) => Allocation::fits(index),
            None => Allocation::renumbered(self.respace_around(items, None, at)),
        }
    }

    /// Like [`Self::index_for_moving`], reporting whether a respace happened.
    pub fn allocate_move<T: IndexSortable>(&self, items: &mut [T], from: usize, to: usize) -> Allocation {
        let len = items.len();
        assert!(from < len, "move source {from} out of range for {len} items");
        assert!(to < len, "move target {to} out of range for {len} items");

        if from == to {
            return Allocation::fits(items[from].sort_index());
        }

        // Positions in the list with the moved item taken out.
        let original = |position: usize| if position < from { position } else { position + 1 };

        let lo = if to == 0 {
            0
        } else {
            items[original(to - 1)].sort_index()
        };

        let fitted = if to == len - 1 {
            lo.checked_add(self.baseline)
        } else {
            midpoint(lo, items[original(to)].sort_index())
        };

        match fitted {
            Some(index) => Allocation::fits(index),
            None => Allocation::renumbered(self.respace_around(items, Some(from), to)),
        }
    }

    /// Respace `items` to consecutive multiples of the baseline.
    pub fn respace<T: IndexSortable>(&self, items: &mut [T]) {
        for (position, item) in items.iter_mut().enumerate() {
            item.set_sort_index(self.slot(position));
        }
    }

    /// Insert `item` at position `at`, allocating its key.
    ///
    /// Keeps `items` in key order. Out-of-range positions are reported rather
    /// than panicking.
    pub fn insert<T: IndexSortable>(
        &self,
        items: &mut Vec<T>,
        mut item: T,
        at: usize,
    ) -> Result<Allocation, DomainError> {
        if at > items.len() {
            return Err(DomainError::PositionOutOfRange {
                position: at,
                len: items.len(),
            });
        }

        let allocation = self.allocate_insert(items, at);
        item.set_sort_index(allocation.index);
        items.insert(at, item);
        Ok(allocation)
    }

    /// Append `item`, allocating its key.
    pub fn push<T: IndexSortable>(&self, items: &mut Vec<T>, mut item: T) -> Allocation {
        let allocation = self.allocate_append(items);
        item.set_sort_index(allocation.index);
        items.push(item);
        allocation
    }

    /// Move the item at `from` to position `to`, allocating its new key.
    pub fn move_item<T: IndexSortable>(
        &self,
        items: &mut [T],
        from: usize,
        to: usize,
    ) -> Result<Allocation, DomainError> {
        let len = items.len();
        if let Some(position) = [from, to].into_iter().find(|p| *p >= len) {
            return Err(DomainError::PositionOutOfRange { position, len });
        }

        let allocation = self.allocate_move(items, from, to);
        items[from].set_sort_index(allocation.index);
        sort_by_index(items);
        Ok(allocation)
    }

    /// Respace every item except `skip`, leaving slot `gap_at` free, and
    /// return the key of that slot.
    fn respace_around<T: IndexSortable>(&self, items: &mut [T], skip: Option<usize>, gap_at: usize) -> i64 {
        let mut slot = 0;
        for (position, item) in items.iter_mut().enumerate() {
            if Some(position) == skip {
                continue;
            }
            if slot == gap_at {
                slot += 1;
            }
            item.set_sort_index(self.slot(slot));
            slot += 1;
        }
        self.slot(gap_at)
    }

    fn slot(&self, position: usize) -> i64 {
        i64::try_from(position)
            .unwrap_or(i64::MAX)
            .saturating_add(1)
            .saturating_mul(self.baseline)
    }
}

impl Default for SparseIndex {
    fn default() -> Self {
        Self {
            baseline: DEFAULT_BASELINE,
        }
    }
}

impl TryFrom<i64> for SparseIndex {
    type Error = DomainError;

    fn try_from(baseline: i64) -> Result<Self, Self::Error> {
        Self::try_new(baseline)
    }
}

impl From<SparseIndex> for i64 {
    fn from(index: SparseIndex) -> Self {
        index.baseline
    }
}

/// Stable sort by key; equal keys keep their relative order.
pub fn sort_by_index<T: IndexSortable>(items: &mut [T]) {
    items.sort_by_key(|item| item.sort_index());
}

/// Whether keys are strictly increasing.
pub fn is_strictly_ordered<T: IndexSortable>(items: &[T]) -> bool {
    items
        .windows(2)
        .all(|pair| pair[0].sort_index() < pair[1].sort_index())
}

/// Floor of the midpoint of `lo` and `hi`, if an integer lies strictly
/// between them.
fn midpoint(lo: i64, hi: i64) -> Option<i64> {
    match hi.checked_sub(lo) {
        Some(gap) if gap > 1 => Some(lo + gap / 2),
        _ => None,
    }
}
