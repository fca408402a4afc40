//! Single-step reorder of a ranked entity.
//!
//! The protocol, for an entity `id` and a [`Direction`]:
//!
//! 1. Read the entity's rank and scope (missing entity: `NotFound`, nothing written)
//! 2. Compute the neighbour rank, `rank - 1` for up and `rank + 1` for down
//! 3. Look up the entity holding that rank in the same scope
//! 4. No such entity: the target is first/last, report success without writing
//! 5. Otherwise swap the two ranks with one conditional, atomic store call
//!
//! A concurrent move that changed either rank between step 1 and step 5 makes
//! the swap fail with [`ContentError::RankConflict`]. Nothing is written in
//! that case, so the caller may retry.

use crate::error::{ContentError, Result};
use crate::ordering::{RankSwap, RankedEntity};
use crate::providers::RankedStore;
use crate::types::Direction;

/// Result of a successful reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome<Id> {
    /// Ranks were exchanged.
    Moved(RankSwap<Id>),
    /// The entity already sits at the edge of its scope. Nothing was written.
    AtBoundary,
}

impl<Id> ReorderOutcome<Id> {
    /// `true` if ranks changed.
    #[must_use]
    pub const fn moved(&self) -> bool {
        matches!(self, Self::Moved(_))
    }
}

/// Move entity `id` one position in `direction` within its scope.
///
/// # Errors
///
/// - [`ContentError::NotFound`] if the entity does not exist
/// - [`ContentError::RankConflict`] if a concurrent change invalidated the swap
/// - [`ContentError::Storage`] if a read or the swap fails
#[tracing::instrument(skip(store), fields(resource = E::RESOURCE))]
pub async fn reorder<E, S>(store: &S, id: E::Id, direction: Direction) -> Result<ReorderOutcome<E::Id>>
where
    E: RankedEntity,
    S: RankedStore<E> + ?Sized,
{
    let target = store
        .find_ranked(id)
        .await?
        .ok_or_else(|| ContentError::not_found(E::RESOURCE, id))?;

    let Some(neighbor_rank) = direction.neighbor_rank(target.rank) else {
        tracing::debug!(rank = target.rank, "rank at integer limit, treating as boundary");
        record(E::RESOURCE, "boundary");
        return Ok(ReorderOutcome::AtBoundary);
    };

    let Some(neighbor) = store.find_at_rank(target.scope, neighbor_rank).await? else {
        tracing::debug!(rank = target.rank, "already at scope boundary");
        record(E::RESOURCE, "boundary");
        return Ok(ReorderOutcome::AtBoundary);
    };

    let swap = RankSwap::between(&target, &neighbor);

    match store.swap_ranks(target.scope, swap).await {
        Ok(()) => {
            tracing::debug!(
                neighbor = %swap.neighbor,
                from = swap.target_rank,
                to = swap.neighbor_rank,
                "ranks swapped"
            );
            record(E::RESOURCE, "moved");
            Ok(ReorderOutcome::Moved(swap))
        }
        Err(err @ ContentError::RankConflict { .. }) => {
            tracing::warn!(neighbor = %swap.neighbor, "rank changed concurrently, swap rejected");
            record(E::RESOURCE, "conflict");
            Err(err)
        }
        Err(err) => {
            record(E::RESOURCE, "error");
            Err(err)
        }
    }
}

fn record(resource: &'static str, outcome: &'static str) {
    metrics::counter!("linkboard_reorder_total", "resource" => resource, "outcome" => outcome).increment(1);
}
