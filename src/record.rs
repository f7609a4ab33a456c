// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction record types for the lifecycle tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Failure detail recorded when a watched transaction exceeds its deadline.
pub const TIMED_OUT_DETAIL: &str = "Transaction timed out";

/// Failure detail recorded when the ledger does not know the hash.
pub const NOT_FOUND_DETAIL: &str = "Transaction not found";

/// Lifecycle status of a tracked transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Transaction has been registered but not yet resolved
    Pending,
    /// Transaction reached a terminal successful state
    Success,
    /// Transaction reverted, disappeared, or timed out
    Failed,
}

impl Default for TxStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// A single tracked transaction.
///
/// Created in `Pending` state at registration time. Once the status moves
/// to `Success` or `Failed` the record is immutable and never re-enters
/// `Pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction hash (opaque, unique per tracker instance)
    pub hash: String,
    /// Current lifecycle status
    pub status: TxStatus,
    /// When the transaction was registered with the tracker
    pub submitted_at: DateTime<Utc>,
    /// Optional free-form category label (e.g. "stake", "transfer")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Optional human-readable description, immutable once set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Consumed-resource metric reported on success (gas / fee used)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<String>,
    /// Block number (EVM) or ledger version (Move) the transaction landed in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_ref: Option<u64>,
    /// Failure detail: ledger-reported revert, not-found, or timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransactionRecord {
    /// Create a new pending record with `submitted_at = now`.
    pub fn new_pending(hash: String, kind: Option<String>, note: Option<String>) -> Self {
        Self {
            hash,
            status: TxStatus::Pending,
            submitted_at: Utc::now(),
            kind,
            note,
            gas_used: None,
            block_ref: None,
            error: None,
        }
    }

    /// Apply a terminal outcome to this record.
    pub(crate) fn apply(&mut self, outcome: TxOutcome) {
        match outcome {
            TxOutcome::Success { gas_used, block_ref } => {
                self.status = TxStatus::Success;
                self.gas_used = gas_used;
                self.block_ref = block_ref;
            }
            TxOutcome::Failed { error } => {
                self.status = TxStatus::Failed;
                self.error = Some(error);
            }
        }
    }

    /// Whether this record is still awaiting resolution.
    pub fn is_pending(&self) -> bool {
        self.status == TxStatus::Pending
    }
}

/// Terminal outcome handed from the poll scheduler to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutcome {
    /// Confirmed on the ledger without revert
    Success {
        gas_used: Option<String>,
        block_ref: Option<u64>,
    },
    /// Reverted, unknown to the ledger, or timed out
    Failed { error: String },
}

impl TxOutcome {
    /// Failure outcome with the given detail string.
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    /// Failure outcome for a transaction that exceeded its deadline.
    pub fn timed_out() -> Self {
        Self::failed(TIMED_OUT_DETAIL)
    }

    /// Failure outcome for a hash the ledger does not know.
    pub fn not_found() -> Self {
        Self::failed(NOT_FOUND_DETAIL)
    }
}
