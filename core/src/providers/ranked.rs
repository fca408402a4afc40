//! Rank access for the reorder protocol.

use crate::error::Result;
use crate::ordering::{RankSwap, RankedEntity, RankedEntry};
use crate::types::Rank;

/// Rank projection of an entity of family `E`.
pub type Entry<E> = RankedEntry<<E as RankedEntity>::Id, <E as RankedEntity>::Scope>;

/// Read and swap ranks of one entity family.
///
/// # Atomicity
///
/// [`swap_ranks`](Self::swap_ranks) is a compare-and-swap on both rows:
///
/// 1. Both rows must still hold the ranks recorded in the [`RankSwap`]
/// 2. Both rows are updated, or neither is
///
/// Implementations:
/// - `PostgreSQL`: two conditional `UPDATE`s in one transaction, rolled back
///   unless each touched exactly one row
/// - In-memory: check-and-write under one mutex
pub trait RankedStore<E: RankedEntity>: Send + Sync {
    /// Rank and scope of entity `id`.
    ///
    /// # Returns
    ///
    /// `None` if the entity does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Storage`](crate::ContentError::Storage) if the read fails.
    fn find_ranked(&self, id: E::Id) -> impl std::future::Future<Output = Result<Option<Entry<E>>>> + Send;

    /// The entity holding `rank` in `scope`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Storage`](crate::ContentError::Storage) if the read fails.
    fn find_at_rank(
        &self,
        scope: E::Scope,
        rank: Rank,
    ) -> impl std::future::Future<Output = Result<Option<Entry<E>>>> + Send;

    /// Exchange the ranks described by `swap`, atomically and conditionally.
    ///
    /// # Errors
    ///
    /// - [`ContentError::RankConflict`](crate::ContentError::RankConflict) if either
    ///   row no longer holds its expected rank. Nothing is written.
    /// - [`ContentError::Storage`](crate::ContentError::Storage) if the write fails.
    fn swap_ranks(
        &self,
        scope: E::Scope,
        swap: RankSwap<E::Id>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
