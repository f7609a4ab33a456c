// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Tracker Configuration
//!
//! Polling and timeout tunables for the transaction tracker. Defaults
//! match the Move-chain profile (2 s poll, 5 min deadline); EVM chains
//! with slower block times use [`TrackerConfig::evm`] (3 s poll, 10 min
//! deadline). All values can be overridden from the environment.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TXWATCH_POLL_INTERVAL_MS` | Milliseconds between status queries | `2000` |
//! | `TXWATCH_TIMEOUT_SECS` | Seconds before a pending transaction is failed | `300` |
//! | `TXWATCH_COMPLETED_CAPACITY` | Completed records retained before eviction | `50` |

use std::env;
use std::time::Duration;

/// Environment variable name for the poll interval in milliseconds.
pub const POLL_INTERVAL_MS_ENV: &str = "TXWATCH_POLL_INTERVAL_MS";

/// Environment variable name for the per-transaction deadline in seconds.
pub const TIMEOUT_SECS_ENV: &str = "TXWATCH_TIMEOUT_SECS";

/// Environment variable name for the completed-set capacity.
pub const COMPLETED_CAPACITY_ENV: &str = "TXWATCH_COMPLETED_CAPACITY";

/// Default interval between ledger status queries.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default deadline after which a still-pending transaction is failed.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// EVM-profile poll interval.
const EVM_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// EVM-profile deadline.
const EVM_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Number of completed records kept before the oldest is evicted.
const DEFAULT_COMPLETED_CAPACITY: usize = 50;

/// Tunables for one tracker instance.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Interval between ledger status queries for each pending hash.
    pub poll_interval: Duration,
    /// Deadline after which a still-pending hash is resolved as failed.
    pub timeout: Duration,
    /// Bound on the completed set; insertion evicts beyond this.
    pub completed_capacity: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            completed_capacity: DEFAULT_COMPLETED_CAPACITY,
        }
    }
}

impl TrackerConfig {
    /// Profile for EVM-compatible chains: slower blocks, longer deadline.
    pub fn evm() -> Self {
        Self {
            poll_interval: EVM_POLL_INTERVAL,
            timeout: EVM_TIMEOUT,
            ..Self::default()
        }
    }

    /// Load the default profile with any environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of this configuration.
    ///
    /// Unset or unparsable variables leave the existing value in place.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(ms) = read_env_u64(POLL_INTERVAL_MS_ENV) {
            self.poll_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = read_env_u64(TIMEOUT_SECS_ENV) {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(cap) = read_env_u64(COMPLETED_CAPACITY_ENV) {
            self.completed_capacity = cap as usize;
        }
        self
    }
}

fn read_env_u64(name: &str) -> Option<u64> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "Ignoring unparsable tracker override");
            None
        }
    }
}
