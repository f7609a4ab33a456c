// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tracker error types.

/// Errors surfaced by [`crate::tracker::TransactionTracker`].
///
/// Clear and query operations deliberately never error: unknown hashes
/// degrade to no-op / `None`. Only registration can fail.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TrackerError {
    /// The hash already has a live pending record and watcher.
    #[error("Transaction {0} is already being tracked")]
    AlreadyTracked(String),

    /// The tracker has been shut down; no new watchers can be spawned.
    #[error("Tracker has been shut down")]
    ShutDown,
}
