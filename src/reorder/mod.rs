//! Priority reordering engine.
//!
//! Turns a drag-and-drop move inside one child's wishlist into durable
//! priority values. The new order is applied locally first; persistence is a
//! sequence of per-gift point updates, and any failure throws the local order
//! away in favour of a fresh read from the store.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::Gift;
use crate::store::{GiftStore, PersistenceError};

/// A move that cannot be applied to the current list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    #[error("index {index} is out of range for a list of {len} gifts")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Move the gift at `from_index` to `to_index` and renumber the whole list.
///
/// Gifts strictly between the two positions shift by one slot. Afterwards the
/// gift at position `k` has priority `len - k`. Moving a gift onto its own
/// position returns the list untouched, priorities included.
pub fn reorder(list: &[Gift], from_index: usize, to_index: usize) -> Result<Vec<Gift>, ReorderError> {
    let len = list.len();
    for index in [from_index, to_index] {
        if index >= len {
            return Err(ReorderError::IndexOutOfRange { index, len });
        }
    }

    if from_index == to_index {
        return Ok(list.to_vec());
    }

    let mut moved = list.to_vec();
    let gift = moved.remove(from_index);
    moved.insert(to_index, gift);

    let len = moved.len() as i64;
    for (position, gift) in moved.iter_mut().enumerate() {
        gift.priority = len - position as i64;
    }

    Ok(moved)
}

/// One pending `(id, priority)` write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityUpdate {
    pub id: String,
    pub priority: i64,
}

/// The writes that realise one reorder, with a cursor over what already landed.
#[derive(Debug, Clone, Default)]
pub struct PriorityBatch {
    updates: Vec<PriorityUpdate>,
    applied: usize,
}

/// A batch stopped at its first failed write.
#[derive(Debug, Clone)]
pub struct BatchFailure {
    pub failed: PriorityUpdate,
    pub error: PersistenceError,
}

impl PriorityBatch {
    /// Plan writes for every gift whose priority differs from the last persisted one.
    ///
    /// Updates are ordered highest priority first.
    pub fn plan(persisted: &HashMap<String, i64>, sequence: &[Gift]) -> Self {
        let mut updates: Vec<PriorityUpdate> = sequence
            .iter()
            .filter(|gift| persisted.get(&gift.id) != Some(&gift.priority))
            .map(|gift| PriorityUpdate {
                id: gift.id.clone(),
                priority: gift.priority,
            })
            .collect();
        updates.sort_by(|a, b| b.priority.cmp(&a.priority));

        Self {
            updates,
            applied: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Writes acknowledged by the store so far.
    pub fn applied(&self) -> &[PriorityUpdate] {
        &self.updates[..self.applied]
    }

    /// Writes not yet acknowledged.
    pub fn remaining(&self) -> &[PriorityUpdate] {
        &self.updates[self.applied..]
    }

    /// Issue the remaining writes one at a time, stopping at the first failure.
    ///
    /// Writes are never issued concurrently: a slow write must not overwrite a later one.
    pub async fn run<S>(&mut self, store: &S) -> Result<(), BatchFailure>
    where
        S: GiftStore + ?Sized,
    {
        while let Some(update) = self.updates.get(self.applied) {
            if let Err(error) = store.update_gift_priority(&update.id, update.priority).await {
                return Err(BatchFailure {
                    failed: update.clone(),
                    error,
                });
            }
            self.applied += 1;
        }
        Ok(())
    }
}

/// Where a reorder gesture currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderState {
    Idle,
    OptimisticallyApplied,
    Committing,
    Committed,
    Reconciling,
}

/// How a commit ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// Nothing was pending; no writes were issued.
    Unchanged,
    /// Every planned write landed.
    Committed { applied: usize },
    /// A write failed; the list was re-read from the store.
    Reconciled {
        applied: usize,
        failed_id: String,
        error: PersistenceError,
        /// Set when the re-read failed too and the list was left empty.
        refresh_error: Option<PersistenceError>,
    },
}

/// One child's wishlist as held by a client, plus the reorder state machine.
pub struct ReorderSession<'a, S: GiftStore + ?Sized> {
    store: &'a S,
    child_id: String,
    gifts: Vec<Gift>,
    persisted: HashMap<String, i64>,
    state: ReorderState,
}

impl<'a, S: GiftStore + ?Sized> ReorderSession<'a, S> {
    /// Read the authoritative list for a child.
    pub async fn load(store: &'a S, child_id: &str) -> Result<Self, PersistenceError> {
        let gifts = store.list_gifts_for_child(child_id).await?;
        let persisted = snapshot(&gifts);

        Ok(Self {
            store,
            child_id: child_id.to_string(),
            gifts,
            persisted,
            state: ReorderState::Idle,
        })
    }

    pub fn gifts(&self) -> &[Gift] {
        &self.gifts
    }

    pub fn into_gifts(self) -> Vec<Gift> {
        self.gifts
    }

    pub fn state(&self) -> ReorderState {
        self.state
    }

    /// Apply a move locally and return the list the caller should render right away.
    pub fn apply_move(&mut self, from_index: usize, to_index: usize) -> Result<&[Gift], ReorderError> {
        let moved = reorder(&self.gifts, from_index, to_index)?;
        if from_index != to_index {
            self.gifts = moved;
            self.state = ReorderState::OptimisticallyApplied;
        }
        Ok(&self.gifts)
    }

    /// Persist the optimistically applied order.
    ///
    /// On the first failed write the remaining writes are dropped and the list
    /// is replaced by a fresh read of the store.
    pub async fn commit(&mut self) -> CommitOutcome {
        if self.state != ReorderState::OptimisticallyApplied {
            return CommitOutcome::Unchanged;
        }

        self.state = ReorderState::Committing;
        let mut batch = PriorityBatch::plan(&self.persisted, &self.gifts);
        if batch.is_empty() {
            self.state = ReorderState::Committed;
            return CommitOutcome::Committed { applied: 0 };
        }
        tracing::debug!(
            child_id = %self.child_id,
            updates = batch.len(),
            "Committing wishlist order"
        );

        match batch.run(self.store).await {
            Ok(()) => {
                for update in batch.applied() {
                    self.persisted.insert(update.id.clone(), update.priority);
                }
                self.state = ReorderState::Committed;
                CommitOutcome::Committed {
                    applied: batch.applied().len(),
                }
            }
            Err(failure) => {
                tracing::warn!(
                    child_id = %self.child_id,
                    gift_id = %failure.failed.id,
                    applied = batch.applied().len(),
                    skipped = batch.remaining().len().saturating_sub(1),
                    "Could not save order, refreshing list: {}",
                    failure.error
                );
                self.state = ReorderState::Reconciling;
                let refresh_error = self.refresh().await.err();
                self.state = ReorderState::Idle;

                CommitOutcome::Reconciled {
                    applied: batch.applied().len(),
                    failed_id: failure.failed.id,
                    error: failure.error,
                    refresh_error,
                }
            }
        }
    }

    /// Remove a gift locally and from the store. The rest keep their priorities.
    ///
    /// A failed delete re-reads the list so the view matches the store again.
    pub async fn delete(&mut self, id: &str) -> Result<(), PersistenceError> {
        self.gifts.retain(|gift| gift.id != id);

        match self.store.delete_gift(id).await {
            Ok(()) => {
                self.persisted.remove(id);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(gift_id = %id, "Delete failed, refreshing list: {}", error);
                if let Err(refresh_error) = self.refresh().await {
                    tracing::error!("Refresh after failed delete failed: {}", refresh_error);
                }
                Err(error)
            }
        }
    }

    /// Replace the local list with the store's. Leaves it empty when the read fails.
    async fn refresh(&mut self) -> Result<(), PersistenceError> {
        match self.store.list_gifts_for_child(&self.child_id).await {
            Ok(gifts) => {
                self.persisted = snapshot(&gifts);
                self.gifts = gifts;
                Ok(())
            }
            Err(error) => {
                self.gifts.clear();
                self.persisted.clear();
                Err(error)
            }
        }
    }
}

fn snapshot(gifts: &[Gift]) -> HashMap<String, i64> {
    gifts
        .iter()
        .map(|gift| (gift.id.clone(), gift.priority))
        .collect()
}
