// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Tracker Registry
//!
//! Single source of truth for transaction state. A hash lives in exactly
//! one of two sets at any instant:
//!
//! - `pending` — insertion-ordered, unbounded, one live watcher each.
//! - `completed` — newest-first, bounded; insertion evicts the oldest.
//!
//! All mutation happens under one mutex with short critical sections and
//! no awaits while held, so watcher tasks and explicit API calls are
//! serialized against each other. Resolution moves a record between the
//! sets in a single lock hold, so there is never a window where a
//! registered hash is absent from both.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

use crate::error::TrackerError;
use crate::record::{TransactionRecord, TxOutcome};

struct RegistryState {
    /// Pending records in registration order.
    pending: Vec<TransactionRecord>,
    /// Completed records, most recently resolved at the front.
    completed: VecDeque<TransactionRecord>,
    /// Per-hash watcher cancellation arena. Invariant: keys match the
    /// pending set exactly.
    watchers: HashMap<String, CancellationToken>,
}

/// In-memory registry of pending and completed transaction records.
pub struct Registry {
    state: Mutex<RegistryState>,
    completed_capacity: usize,
}

impl Registry {
    /// Create an empty registry retaining at most `completed_capacity`
    /// resolved records.
    pub fn new(completed_capacity: usize) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                pending: Vec::new(),
                completed: VecDeque::new(),
                watchers: HashMap::new(),
            }),
            completed_capacity: completed_capacity.max(1),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryState> {
        // A poisoned lock means a panic mid-mutation in this module;
        // the state itself is still structurally valid.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a new pending record and arm its watcher entry atomically.
    ///
    /// Rejects a hash that already has a live pending record, keeping the
    /// one-watcher-per-pending-hash invariant.
    pub fn begin(
        &self,
        record: TransactionRecord,
        token: CancellationToken,
    ) -> Result<(), TrackerError> {
        let mut state = self.lock();
        if state.watchers.contains_key(&record.hash) {
            return Err(TrackerError::AlreadyTracked(record.hash.clone()));
        }
        // Re-tracking a previously resolved hash replaces its stale
        // outcome; a hash is never present in both sets.
        state.completed.retain(|tx| tx.hash != record.hash);
        state.watchers.insert(record.hash.clone(), token);
        state.pending.push(record);
        Ok(())
    }

    /// Move a record from pending to completed with the given outcome.
    ///
    /// No-op if the hash is no longer pending (already resolved or
    /// cleared) — late scheduler ticks must not resurrect records.
    pub fn resolve(&self, hash: &str, outcome: TxOutcome) {
        let mut state = self.lock();
        let Some(index) = state.pending.iter().position(|tx| tx.hash == hash) else {
            tracing::debug!(hash = %hash, "Ignoring resolution for non-pending transaction");
            return;
        };

        if let Some(token) = state.watchers.remove(hash) {
            token.cancel();
        }

        let mut record = state.pending.remove(index);
        record.apply(outcome);

        tracing::info!(
            hash = %record.hash,
            status = ?record.status,
            error = record.error.as_deref().unwrap_or(""),
            "Transaction resolved"
        );

        state.completed.push_front(record);
        state.completed.truncate(self.completed_capacity);
    }

    /// Remove a record from whichever set holds it and cancel any live
    /// watcher. Safe to call on an unknown hash.
    pub fn clear(&self, hash: &str) {
        let mut state = self.lock();
        if let Some(token) = state.watchers.remove(hash) {
            token.cancel();
        }
        state.pending.retain(|tx| tx.hash != hash);
        state.completed.retain(|tx| tx.hash != hash);
    }

    /// Empty the completed set only; pending records keep polling.
    pub fn clear_completed(&self) {
        self.lock().completed.clear();
    }

    /// Empty both sets and cancel every live watcher.
    pub fn clear_all(&self) {
        let mut state = self.lock();
        for (_, token) in state.watchers.drain() {
            token.cancel();
        }
        state.pending.clear();
        state.completed.clear();
    }

    /// Look up a record by hash, checking pending then completed.
    pub fn status_of(&self, hash: &str) -> Option<TransactionRecord> {
        let state = self.lock();
        state
            .pending
            .iter()
            .find(|tx| tx.hash == hash)
            .or_else(|| state.completed.iter().find(|tx| tx.hash == hash))
            .cloned()
    }

    /// First record of the given kind, scanning pending then completed.
    ///
    /// Best-effort "most recent": list order is registration order for
    /// pending and resolution order for completed; no timestamp sort is
    /// applied.
    pub fn latest_by_kind(&self, kind: &str) -> Option<TransactionRecord> {
        let state = self.lock();
        state
            .pending
            .iter()
            .chain(state.completed.iter())
            .find(|tx| tx.kind.as_deref() == Some(kind))
            .cloned()
    }

    /// Snapshot of the pending set in registration order.
    pub fn pending(&self) -> Vec<TransactionRecord> {
        self.lock().pending.clone()
    }

    /// Snapshot of the completed set, most recently resolved first.
    pub fn completed(&self) -> Vec<TransactionRecord> {
        self.lock().completed.iter().cloned().collect()
    }

    /// Number of records still awaiting resolution.
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Total tracked records across both sets.
    pub fn total_tracked(&self) -> usize {
        let state = self.lock();
        state.pending.len() + state.completed.len()
    }
}
