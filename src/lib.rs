// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! txwatch - Transaction Lifecycle Tracker
//!
//! This crate tracks externally-submitted blockchain transactions: each
//! registered hash is polled against a ledger status endpoint on a fixed
//! interval until it resolves or a deadline fires, and the outcomes are
//! kept in a bounded, queryable in-memory history. The tracker observes
//! only; it never submits or signs transactions.
//!
//! ## Modules
//!
//! - `config` - Polling and timeout tunables
//! - `provider` - Ledger status bindings (EVM receipt lookup, Aptos REST)
//! - `record` - Transaction record types
//! - `registry` - Pending / completed state owner
//! - `tracker` - Public tracking and query surface
//!
//! ## Example
//!
//! ```rust,no_run
//! use txwatch::{EvmStatusProvider, TrackerConfig, TransactionTracker};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = EvmStatusProvider::connect("https://api.avax.network/ext/bc/C/rpc")?;
//! let tracker = TransactionTracker::new(provider, TrackerConfig::evm());
//!
//! tracker.track("0xabc...", Some("transfer"), Some("Send 1.5 AVAX"))?;
//! // ... later, from the presentation layer:
//! let snapshot = tracker.snapshot();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod record;
pub mod registry;
pub mod tracker;

mod watcher;

pub use config::TrackerConfig;
pub use error::TrackerError;
pub use provider::{AptosStatusProvider, EvmStatusProvider, LedgerStatus, ProviderError, StatusProvider};
pub use record::{TransactionRecord, TxOutcome, TxStatus};
pub use tracker::{TrackerSnapshot, TransactionTracker};
