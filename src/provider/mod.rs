// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger status providers.
//!
//! The tracker core is polymorphic over a single capability: given a
//! transaction hash, report whether the ledger considers it in flight,
//! unknown, or terminal. Two concrete bindings are provided:
//!
//! - [`evm::EvmStatusProvider`] — EVM-compatible chains via receipt lookup
//! - [`aptos::AptosStatusProvider`] — Move chains via the fullnode REST API

pub mod aptos;
pub mod evm;

use std::future::Future;

pub use aptos::AptosStatusProvider;
pub use evm::EvmStatusProvider;

/// Ledger-reported state of a transaction hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerStatus {
    /// Known to the ledger but not yet in a terminal state.
    InFlight,
    /// Unknown to the ledger.
    NotFound,
    /// Terminal: executed, either successfully or reverted.
    Confirmed {
        /// Whether execution succeeded
        success: bool,
        /// Gas / fee consumed, as reported by the ledger
        gas_used: Option<String>,
        /// Block number (EVM) or ledger version (Move)
        block_ref: Option<u64>,
        /// Ledger-reported failure reason when `success` is false
        error: Option<String>,
    },
}

/// Errors raised while querying a ledger.
///
/// Every variant returned from [`StatusProvider::status`] is treated as
/// transient by the scheduler: logged and retried on the next tick, never
/// surfaced as a failure of the tracked transaction.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Endpoint URL rejected at construction time.
    #[error("Invalid ledger endpoint: {0}")]
    InvalidEndpoint(String),

    /// Network / RPC transport failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The ledger answered with something we could not interpret.
    #[error("Unexpected ledger response: {0}")]
    BadResponse(String),
}

/// Capability to query the status of a transaction hash on some ledger.
///
/// Shared read-only across all concurrently polled hashes.
pub trait StatusProvider: Send + Sync + 'static {
    /// Query the current ledger status of `hash`.
    fn status(
        &self,
        hash: &str,
    ) -> impl Future<Output = Result<LedgerStatus, ProviderError>> + Send;
}
