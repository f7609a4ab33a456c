// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Poll Scheduler
//!
//! One watcher task per tracked hash. The task queries the ledger
//! immediately, then on a fixed interval, until one of:
//!
//! - the ledger reports a terminal result (resolved),
//! - the ledger does not know the hash (resolved as failed),
//! - the per-hash deadline fires (resolved as timed out),
//! - the cancellation token trips (clear / clear_all / tracker shutdown).
//!
//! Transient provider errors are logged and retried on the next tick;
//! indefinite retry within the deadline budget is intentional. The
//! cancellation branches are `biased` so a token cancelled before the
//! task first runs guarantees zero provider calls.

use std::sync::Arc;

use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::TrackerConfig;
use crate::provider::{LedgerStatus, StatusProvider};
use crate::record::TxOutcome;
use crate::registry::Registry;

/// Drive status polling for a single hash until resolution, timeout, or
/// cancellation. Spawned by the tracker; never resolves after `cancel`.
pub(crate) async fn watch<P: StatusProvider>(
    provider: Arc<P>,
    registry: Arc<Registry>,
    hash: String,
    config: TrackerConfig,
    cancel: CancellationToken,
) {
    let deadline = Instant::now() + config.timeout;

    let mut ticker = interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // First tick completes immediately, so the initial query has no delay.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = sleep_until(deadline) => {
                tracing::warn!(hash = %hash, "Transaction watch deadline reached");
                registry.resolve(&hash, TxOutcome::timed_out());
                return;
            }
            _ = ticker.tick() => {}
        }

        // The status query itself stays subject to cancellation and the
        // deadline, so a hung RPC cannot outlive either.
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = sleep_until(deadline) => {
                tracing::warn!(hash = %hash, "Transaction watch deadline reached");
                registry.resolve(&hash, TxOutcome::timed_out());
                return;
            }
            result = provider.status(&hash) => result,
        };

        match result {
            Ok(LedgerStatus::InFlight) => {}
            Ok(LedgerStatus::NotFound) => {
                registry.resolve(&hash, TxOutcome::not_found());
                return;
            }
            Ok(LedgerStatus::Confirmed {
                success,
                gas_used,
                block_ref,
                error,
            }) => {
                let outcome = if success {
                    TxOutcome::Success {
                        gas_used,
                        block_ref,
                    }
                } else {
                    TxOutcome::failed(error.unwrap_or_else(|| "Transaction failed".to_string()))
                };
                registry.resolve(&hash, outcome);
                return;
            }
            Err(e) => {
                // Transient: swallowed, retried next tick.
                tracing::debug!(hash = %hash, error = %e, "Status query failed, will retry");
            }
        }
    }
}
