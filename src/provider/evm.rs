// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM-compatible ledger status binding.
//!
//! Status is derived from `eth_getTransactionReceipt`. A missing receipt
//! does not distinguish "still in the mempool" from "unknown hash", so a
//! fallback `eth_getTransactionByHash` existence check decides between
//! [`LedgerStatus::InFlight`] and [`LedgerStatus::NotFound`].

use alloy::{
    network::Ethereum,
    primitives::TxHash,
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};

use super::{LedgerStatus, ProviderError};

/// HTTP provider type for EVM chains (with all fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Read-only status provider for an EVM-compatible chain.
#[derive(Debug)]
pub struct EvmStatusProvider {
    provider: HttpProvider,
}

impl EvmStatusProvider {
    /// Connect to the given JSON-RPC endpoint.
    pub fn connect(rpc_url: &str) -> Result<Self, ProviderError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ProviderError::InvalidEndpoint(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self { provider })
    }

    /// Query receipt, falling back to a transaction existence check.
    pub async fn transaction_status(&self, hash: &str) -> Result<LedgerStatus, ProviderError> {
        // A malformed hash can never land on chain; report it unknown
        // rather than retrying until the deadline.
        let Ok(tx_hash) = hash.parse::<TxHash>() else {
            return Ok(LedgerStatus::NotFound);
        };

        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| ProviderError::Transport(format!("Failed to get receipt: {}", e)))?;

        if let Some(receipt) = receipt {
            let success = receipt.status();
            return Ok(LedgerStatus::Confirmed {
                success,
                gas_used: Some(receipt.gas_used.to_string()),
                block_ref: receipt.block_number,
                error: (!success).then(|| "Transaction reverted".to_string()),
            });
        }

        // No receipt yet: does the node know the transaction at all?
        let known = self
            .provider
            .get_transaction_by_hash(tx_hash)
            .await
            .map_err(|e| ProviderError::Transport(format!("Failed to get transaction: {}", e)))?;

        Ok(match known {
            Some(_) => LedgerStatus::InFlight,
            None => LedgerStatus::NotFound,
        })
    }
}

impl super::StatusProvider for EvmStatusProvider {
    fn status(
        &self,
        hash: &str,
    ) -> impl std::future::Future<Output = Result<LedgerStatus, ProviderError>> + Send {
        self.transaction_status(hash)
    }
}
