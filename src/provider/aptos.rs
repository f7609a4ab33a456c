// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Move-chain (Aptos) ledger status binding.
//!
//! Uses the fullnode REST API: `GET /transactions/by_hash/{hash}`.
//! A 404 means the ledger does not know the hash; a body with
//! `"type": "pending_transaction"` means it is still in flight; any other
//! transaction type carries the terminal execution result.

use reqwest::StatusCode;
use serde::Deserialize;

use super::{LedgerStatus, ProviderError};

/// One transaction as returned by the fullnode REST API.
///
/// Only the fields the tracker needs; the API returns many more.
#[derive(Debug, Deserialize)]
struct ApiTransaction {
    #[serde(rename = "type")]
    kind: String,
    success: Option<bool>,
    gas_used: Option<String>,
    version: Option<String>,
    vm_status: Option<String>,
}

/// Read-only status provider for an Aptos fullnode.
#[derive(Debug)]
pub struct AptosStatusProvider {
    http: reqwest::Client,
    base_url: url::Url,
}

impl AptosStatusProvider {
    /// Connect to a fullnode REST endpoint (e.g. `https://fullnode.testnet.aptoslabs.com/v1/`).
    pub fn connect(base_url: &str) -> Result<Self, ProviderError> {
        // Trailing slash so Url::join keeps the /v1 path segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url: url::Url = normalized
            .parse()
            .map_err(|e: url::ParseError| ProviderError::InvalidEndpoint(e.to_string()))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    /// Query the fullnode for the transaction behind `hash`.
    pub async fn transaction_status(&self, hash: &str) -> Result<LedgerStatus, ProviderError> {
        let url = self
            .base_url
            .join(&format!("transactions/by_hash/{hash}"))
            .map_err(|e| ProviderError::InvalidEndpoint(e.to_string()))?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(LedgerStatus::NotFound);
        }

        if !response.status().is_success() {
            return Err(ProviderError::Transport(format!(
                "Fullnode returned HTTP {}",
                response.status()
            )));
        }

        let body: ApiTransaction = response
            .json()
            .await
            .map_err(|e| ProviderError::BadResponse(e.to_string()))?;

        Ok(classify(body))
    }
}

impl super::StatusProvider for AptosStatusProvider {
    fn status(
        &self,
        hash: &str,
    ) -> impl std::future::Future<Output = Result<LedgerStatus, ProviderError>> + Send {
        self.transaction_status(hash)
    }
}

/// Map a fullnode transaction body to a ledger status.
fn classify(tx: ApiTransaction) -> LedgerStatus {
    if tx.kind == "pending_transaction" {
        return LedgerStatus::InFlight;
    }

    let success = tx.success.unwrap_or(false);
    LedgerStatus::Confirmed {
        success,
        gas_used: tx.gas_used,
        block_ref: tx.version.and_then(|v| v.parse().ok()),
        error: if success { None } else { tx.vm_status },
    }
}
