//! Rank model for reorderable entities.
//!
//! Every reorderable entity lives in an ordering *scope*: one global scope for
//! categories, one scope per category for text banners. Within a scope ranks
//! are unique and, because deletes compact the scope, zero-based and contiguous.
//!
//! A move never renumbers a scope. It exchanges the ranks of two adjacent
//! entries, described by a [`RankSwap`]:
//!
//! ```text
//!   before            swap(B, up)          after
//!   A  rank 0   ──┐                        B  rank 0
//!   B  rank 1   ──┘  exchange 0 <-> 1      A  rank 1
//!   C  rank 2                              C  rank 2
//! ```
//!
//! [`OrderedScope`] is the owned, in-memory form of one scope. It refuses to
//! hold duplicate ranks, so every plan it produces preserves uniqueness.

use crate::types::{Category, CategoryId, Direction, Rank, TextBanner, TextBannerId};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use thiserror::Error;

/// An entity family that takes part in the reorder protocol.
pub trait RankedEntity: Send + Sync + 'static {
    /// Entity id.
    type Id: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;
    /// Partition key of the ordering scope (`()` for a single global scope).
    type Scope: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;
    /// Resource label used in errors and logs.
    const RESOURCE: &'static str;
}

impl RankedEntity for Category {
    type Id = CategoryId;
    type Scope = ();
    const RESOURCE: &'static str = "Category";
}

impl RankedEntity for TextBanner {
    type Id = TextBannerId;
    type Scope = CategoryId;
    const RESOURCE: &'static str = "Text banner";
}

/// The rank-bearing projection of an entity: what the reorder protocol reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedEntry<Id, Scope> {
    /// Entity id.
    pub id: Id,
    /// Scope the entity is ordered in.
    pub scope: Scope,
    /// Current rank.
    pub rank: Rank,
}

/// An exchange of ranks between two entries of the same scope.
///
/// The recorded ranks are the *expected prior* ranks. Stores apply a swap only
/// if both rows still hold them, which turns a lost update into a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankSwap<Id> {
    /// Entity being moved.
    pub target: Id,
    /// Rank the target holds before the swap.
    pub target_rank: Rank,
    /// Adjacent entity that trades places with the target.
    pub neighbor: Id,
    /// Rank the neighbour holds before the swap.
    pub neighbor_rank: Rank,
}

impl<Id: Copy> RankSwap<Id> {
    /// Swap the ranks of `target` and `neighbor`.
    #[must_use]
    pub const fn between<Scope>(
        target: &RankedEntry<Id, Scope>,
        neighbor: &RankedEntry<Id, Scope>,
    ) -> Self {
        Self {
            target: target.id,
            target_rank: target.rank,
            neighbor: neighbor.id,
            neighbor_rank: neighbor.rank,
        }
    }

    /// The swap that undoes this one once it has been applied.
    #[must_use]
    pub const fn reversed(&self) -> Self {
        Self {
            target: self.target,
            target_rank: self.neighbor_rank,
            neighbor: self.neighbor,
            neighbor_rank: self.target_rank,
        }
    }

    /// `(id, expected rank, new rank)` for both rows, target first.
    #[must_use]
    pub const fn assignments(&self) -> [(Id, Rank, Rank); 2] {
        [
            (self.target, self.target_rank, self.neighbor_rank),
            (self.neighbor, self.neighbor_rank, self.target_rank),
        ]
    }
}

/// Rank for an entity appended to a scope: `max + 1`, or `0` for an empty scope.
///
/// ```
/// use linkboard_core::ordering::next_rank;
///
/// assert_eq!(next_rank([]), 0);
/// assert_eq!(next_rank([0, 1, 2]), 3);
/// assert_eq!(next_rank([4, 1]), 5);
/// ```
#[must_use]
pub fn next_rank(ranks: impl IntoIterator<Item = Rank>) -> Rank {
    ranks
        .into_iter()
        .max()
        .map_or(0, |max| max.saturating_add(1))
}

/// Integrity violations detected while building or mutating an [`OrderedScope`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderingError {
    /// Two entries claim the same rank.
    #[error("rank {0} is held by more than one entry")]
    DuplicateRank(Rank),
    /// The same id appears twice.
    #[error("entry {0} appears more than once")]
    DuplicateId(String),
    /// The id is not part of this scope.
    #[error("entry {0} is not part of this scope")]
    UnknownId(String),
    /// A swap no longer matches the scope it is applied to.
    #[error("swap of {0} does not match the current ranks")]
    StaleSwap(String),
}

/// One ordering scope as an owned, rank-sorted sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedScope<Id> {
    entries: Vec<(Id, Rank)>,
}

impl<Id> Default for OrderedScope<Id> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<Id> OrderedScope<Id>
where
    Id: Copy + Eq + Hash + fmt::Display,
{
    /// Build a scope from `(id, rank)` pairs in any order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::DuplicateRank`] or [`OrderingError::DuplicateId`]
    /// if the pairs violate uniqueness.
    pub fn from_entries(entries: impl IntoIterator<Item = (Id, Rank)>) -> Result<Self, OrderingError> {
        let mut entries: Vec<(Id, Rank)> = entries.into_iter().collect();
        entries.sort_by_key(|&(_, rank)| rank);

        if let Some(pair) = entries.windows(2).find(|pair| pair[0].1 == pair[1].1) {
            return Err(OrderingError::DuplicateRank(pair[0].1));
        }

        let mut seen = HashSet::with_capacity(entries.len());
        for &(id, _) in &entries {
            if !seen.insert(id) {
                return Err(OrderingError::DuplicateId(id.to_string()));
            }
        }

        Ok(Self { entries })
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the scope holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids in rank order.
    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.entries.iter().map(|&(id, _)| id)
    }

    /// `(id, rank)` pairs in rank order.
    #[must_use]
    pub fn entries(&self) -> &[(Id, Rank)] {
        &self.entries
    }

    /// Rank currently held by `id`.
    #[must_use]
    pub fn rank_of(&self, id: Id) -> Option<Rank> {
        self.entries
            .iter()
            .find(|&&(entry, _)| entry == id)
            .map(|&(_, rank)| rank)
    }

    /// Entry holding `rank`, if any.
    #[must_use]
    pub fn at_rank(&self, rank: Rank) -> Option<Id> {
        self.entries
            .binary_search_by_key(&rank, |&(_, r)| r)
            .ok()
            .map(|index| self.entries[index].0)
    }

    /// Rank the next appended entry receives.
    #[must_use]
    pub fn next_rank(&self) -> Rank {
        self.entries.last().map_or(0, |&(_, rank)| rank.saturating_add(1))
    }

    /// `true` if ranks run `0, 1, 2, ...` without gaps.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .all(|(index, &(_, rank))| usize::try_from(rank).is_ok_and(|rank| rank == index))
    }

    /// Append `id` at [`Self::next_rank`] and return its rank.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::DuplicateId`] if `id` is already present.
    pub fn push(&mut self, id: Id) -> Result<Rank, OrderingError> {
        if self.rank_of(id).is_some() {
            return Err(OrderingError::DuplicateId(id.to_string()));
        }
        let rank = self.next_rank();
        self.entries.push((id, rank));
        Ok(rank)
    }

    /// Plan moving `id` one step in `direction`.
    ///
    /// Returns `Ok(None)` when no entry holds the adjacent rank, i.e. `id` is
    /// already first (for [`Direction::Up`]) or last (for [`Direction::Down`]).
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::UnknownId`] if `id` is not in the scope.
    pub fn plan_move(&self, id: Id, direction: Direction) -> Result<Option<RankSwap<Id>>, OrderingError> {
        let rank = self
            .rank_of(id)
            .ok_or_else(|| OrderingError::UnknownId(id.to_string()))?;

        let swap = direction
            .neighbor_rank(rank)
            .and_then(|neighbor_rank| self.at_rank(neighbor_rank).map(|neighbor| (neighbor, neighbor_rank)))
            .map(|(neighbor, neighbor_rank)| RankSwap {
                target: id,
                target_rank: rank,
                neighbor,
                neighbor_rank,
            });

        Ok(swap)
    }

    /// Apply a swap planned against this scope.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::StaleSwap`] if either entry no longer holds its
    /// expected rank. The scope is left untouched in that case.
    pub fn apply(&mut self, swap: &RankSwap<Id>) -> Result<(), OrderingError> {
        let target = self.position(swap.target, swap.target_rank);
        let neighbor = self.position(swap.neighbor, swap.neighbor_rank);

        match (target, neighbor) {
            (Some(target), Some(neighbor)) if target != neighbor => {
                // Ranks stay in place; only the ids trade slots, so the sequence stays sorted.
                self.entries[target].0 = swap.neighbor;
                self.entries[neighbor].0 = swap.target;
                Ok(())
            }
            _ => Err(OrderingError::StaleSwap(swap.target.to_string())),
        }
    }

    /// Remove `id` and renumber the remaining entries `0..len`.
    ///
    /// Returns the `(id, new rank)` pairs whose rank changed, or `None` if `id`
    /// was not present.
    pub fn remove(&mut self, id: Id) -> Option<Vec<(Id, Rank)>> {
        let index = self.entries.iter().position(|&(entry, _)| entry == id)?;
        self.entries.remove(index);
        Some(self.compact())
    }

    /// Renumber entries `0..len`, keeping their relative order.
    ///
    /// Returns the `(id, new rank)` pairs whose rank changed.
    pub fn compact(&mut self) -> Vec<(Id, Rank)> {
        let mut changed = Vec::new();
        for (index, entry) in self.entries.iter_mut().enumerate() {
            let rank = Rank::try_from(index).unwrap_or(Rank::MAX);
            if entry.1 != rank {
                entry.1 = rank;
                changed.push((entry.0, rank));
            }
        }
        changed
    }

    fn position(&self, id: Id, rank: Rank) -> Option<usize> {
        self.entries
            .iter()
            .position(|&(entry, entry_rank)| entry == id && entry_rank == rank)
    }
}
