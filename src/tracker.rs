// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Transaction Tracker
//!
//! Public surface of the crate: register a transaction hash, let the
//! per-hash watcher poll the ledger until resolution or timeout, and read
//! the bounded outcome history at any time without blocking on polling.
//!
//! A tracker is scoped to its owning context (one per UI session), never
//! a process-wide singleton. Dropping it, or calling
//! [`TransactionTracker::shutdown`], cancels every live watcher.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::provider::StatusProvider;
use crate::record::TransactionRecord;
use crate::registry::Registry;
use crate::watcher;

/// Point-in-time view of tracker state, suitable for UI binding.
#[derive(Debug, Clone, Serialize)]
pub struct TrackerSnapshot {
    /// Pending records in registration order
    pub pending: Vec<TransactionRecord>,
    /// Completed records, most recently resolved first
    pub completed: Vec<TransactionRecord>,
    /// Whether any transaction is still awaiting resolution
    pub has_pending: bool,
    /// Number of pending records
    pub pending_count: usize,
    /// Total records across both sets
    pub total_tracked: usize,
}

/// Tracks externally-submitted transactions against one ledger.
///
/// Generic over the [`StatusProvider`] capability; the provider handle is
/// shared read-only across all concurrently watched hashes.
pub struct TransactionTracker<P> {
    provider: Arc<P>,
    registry: Arc<Registry>,
    config: TrackerConfig,
    shutdown: CancellationToken,
}

impl<P: StatusProvider> TransactionTracker<P> {
    /// Create a tracker over the given provider and tunables.
    pub fn new(provider: P, config: TrackerConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            registry: Arc::new(Registry::new(config.completed_capacity)),
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Register a transaction hash and start polling it immediately.
    ///
    /// Fails if the hash already has a live pending record, or if the
    /// tracker has been shut down.
    pub fn track(
        &self,
        hash: &str,
        kind: Option<&str>,
        note: Option<&str>,
    ) -> Result<(), TrackerError> {
        if self.shutdown.is_cancelled() {
            return Err(TrackerError::ShutDown);
        }

        let record = TransactionRecord::new_pending(
            hash.to_string(),
            kind.map(str::to_owned),
            note.map(str::to_owned),
        );

        let token = self.shutdown.child_token();
        self.registry.begin(record, token.clone())?;

        tracing::info!(
            hash = %hash,
            kind = kind.unwrap_or(""),
            "Tracking transaction"
        );

        tokio::spawn(watcher::watch(
            self.provider.clone(),
            self.registry.clone(),
            hash.to_string(),
            self.config.clone(),
            token,
        ));

        Ok(())
    }

    /// Current record for a hash, checking pending then completed.
    pub fn status_of(&self, hash: &str) -> Option<TransactionRecord> {
        self.registry.status_of(hash)
    }

    /// Best-effort most recent record with the given kind label.
    ///
    /// Scans pending then completed in list order; no timestamp sort.
    pub fn latest_by_kind(&self, kind: &str) -> Option<TransactionRecord> {
        self.registry.latest_by_kind(kind)
    }

    /// Stop watching a hash and forget its record. No-op if unknown.
    pub fn clear(&self, hash: &str) {
        self.registry.clear(hash);
    }

    /// Forget all completed records; pending ones keep polling.
    pub fn clear_completed(&self) {
        self.registry.clear_completed();
    }

    /// Stop every watcher and forget all records.
    pub fn clear_all(&self) {
        self.registry.clear_all();
    }

    /// Pending records in registration order.
    pub fn pending(&self) -> Vec<TransactionRecord> {
        self.registry.pending()
    }

    /// Completed records, most recently resolved first.
    pub fn completed(&self) -> Vec<TransactionRecord> {
        self.registry.completed()
    }

    /// Number of records still awaiting resolution.
    pub fn pending_count(&self) -> usize {
        self.registry.pending_count()
    }

    /// Whether any transaction is still awaiting resolution.
    pub fn has_pending(&self) -> bool {
        self.registry.pending_count() > 0
    }

    /// Total records across both sets.
    pub fn total_tracked(&self) -> usize {
        self.registry.total_tracked()
    }

    /// Consistent point-in-time view of the whole tracker state.
    pub fn snapshot(&self) -> TrackerSnapshot {
        let pending = self.registry.pending();
        let completed = self.registry.completed();
        let pending_count = pending.len();
        let total_tracked = pending_count + completed.len();
        TrackerSnapshot {
            has_pending: pending_count > 0,
            pending_count,
            total_tracked,
            pending,
            completed,
        }
    }

    /// Tear the tracker down: cancel every live watcher and drop all
    /// records. Subsequent [`Self::track`] calls fail with
    /// [`TrackerError::ShutDown`]; no watcher callback fires afterwards.
    pub fn shutdown(&self) {
        tracing::info!("Transaction tracker shutting down");
        self.shutdown.cancel();
        self.registry.clear_all();
    }
}

impl<P> Drop for TransactionTracker<P> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::provider::{LedgerStatus, ProviderError};
    use crate::record::{TxOutcome, TxStatus, NOT_FOUND_DETAIL, TIMED_OUT_DETAIL};

    /// One scripted provider reply.
    #[derive(Clone)]
    enum Step {
        Status(LedgerStatus),
        Transient,
    }

    #[derive(Default)]
    struct MockInner {
        script: Mutex<VecDeque<Step>>,
        fallback: Option<Step>,
        calls: AtomicUsize,
    }

    /// Scripted ledger: pops replies in order, then repeats `fallback`
    /// (transient errors when unset). Clones share call counts.
    #[derive(Clone, Default)]
    struct MockProvider {
        inner: Arc<MockInner>,
    }

    impl MockProvider {
        fn scripted(steps: Vec<Step>, fallback: Option<Step>) -> Self {
            Self {
                inner: Arc::new(MockInner {
                    script: Mutex::new(steps.into()),
                    fallback,
                    calls: AtomicUsize::new(0),
                }),
            }
        }

        fn always_transient() -> Self {
            Self::scripted(Vec::new(), None)
        }

        fn always(status: LedgerStatus) -> Self {
            Self::scripted(Vec::new(), Some(Step::Status(status)))
        }

        fn calls(&self) -> usize {
            self.inner.calls.load(Ordering::SeqCst)
        }
    }

    impl StatusProvider for MockProvider {
        fn status(
            &self,
            _hash: &str,
        ) -> impl std::future::Future<Output = Result<LedgerStatus, ProviderError>> + Send
        {
            self.inner.calls.fetch_add(1, Ordering::SeqCst);
            let step = self
                .inner
                .script
                .lock()
                .unwrap()
                .pop_front()
                .or_else(|| self.inner.fallback.clone())
                .unwrap_or(Step::Transient);
            async move {
                match step {
                    Step::Status(status) => Ok(status),
                    Step::Transient => Err(ProviderError::Transport("rpc hiccup".into())),
                }
            }
        }
    }

    fn confirmed_success() -> LedgerStatus {
        LedgerStatus::Confirmed {
            success: true,
            gas_used: Some("21000".into()),
            block_ref: Some(7),
            error: None,
        }
    }

    /// Opt-in log output for debugging async tests (`RUST_LOG=debug`).
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }

    fn fast_config() -> TrackerConfig {
        TrackerConfig {
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(10),
            completed_capacity: 50,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn status_is_pending_immediately_after_track() {
        let tracker = TransactionTracker::new(MockProvider::always_transient(), fast_config());
        tracker.track("0xh1", Some("stake"), Some("stake 10")).unwrap();

        let record = tracker.status_of("0xh1").unwrap();
        assert_eq!(record.status, TxStatus::Pending);
        assert_eq!(record.kind.as_deref(), Some("stake"));
        assert_eq!(record.note.as_deref(), Some("stake 10"));
        assert!(tracker.has_pending());
        assert_eq!(tracker.total_tracked(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_success_resolves_with_gas_used() {
        let provider = MockProvider::always(confirmed_success());
        let tracker = TransactionTracker::new(provider.clone(), fast_config());

        tracker.track("0xh2", Some("transfer"), None).unwrap();
        assert_eq!(tracker.pending_count(), 1);

        // Let the watcher take its immediate first tick.
        tokio::time::sleep(Duration::from_millis(10)).await;

        let record = tracker.status_of("0xh2").unwrap();
        assert_eq!(record.status, TxStatus::Success);
        assert_eq!(record.gas_used.as_deref(), Some("21000"));
        assert_eq!(record.block_ref, Some(7));
        assert_eq!(tracker.pending_count(), 0);
        assert_eq!(tracker.total_tracked(), 1);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn revert_resolves_failed_with_detail() {
        let provider = MockProvider::always(LedgerStatus::Confirmed {
            success: false,
            gas_used: Some("5".into()),
            block_ref: Some(9),
            error: Some("Transaction reverted".into()),
        });
        let tracker = TransactionTracker::new(provider, fast_config());

        tracker.track("0xh5", None, None).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let record = tracker.status_of("0xh5").unwrap();
        assert_eq!(record.status, TxStatus::Failed);
        assert_eq!(record.error.as_deref(), Some("Transaction reverted"));
    }

    #[tokio::test(start_paused = true)]
    async fn not_found_resolves_failed() {
        let provider = MockProvider::always(LedgerStatus::NotFound);
        let tracker = TransactionTracker::new(provider.clone(), fast_config());

        tracker.track("0xh6", None, None).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let record = tracker.status_of("0xh6").unwrap();
        assert_eq!(record.status, TxStatus::Failed);
        assert_eq!(record.error.as_deref(), Some(NOT_FOUND_DETAIL));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_retry_until_timeout() {
        init_tracing();
        let provider = MockProvider::always_transient();
        let tracker = TransactionTracker::new(provider.clone(), fast_config());

        tracker.track("0xh1", None, None).unwrap();

        // 10 s deadline, 2 s interval: ticks at 0, 2, 4, 6, 8 all fail
        // transiently, then the deadline fires.
        tokio::time::sleep(Duration::from_secs(11)).await;

        let record = tracker.status_of("0xh1").unwrap();
        assert_eq!(record.status, TxStatus::Failed);
        assert_eq!(record.error.as_deref(), Some(TIMED_OUT_DETAIL));
        assert_eq!(tracker.pending_count(), 0);

        // No provider call happens after the deadline.
        let calls_at_timeout = provider.calls();
        assert_eq!(calls_at_timeout, 5);
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(provider.calls(), calls_at_timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_keeps_polling_then_resolves() {
        let provider = MockProvider::scripted(
            vec![
                Step::Status(LedgerStatus::InFlight),
                Step::Transient,
                Step::Status(confirmed_success()),
            ],
            None,
        );
        let tracker = TransactionTracker::new(provider.clone(), fast_config());

        tracker.track("0xh7", None, None).unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;

        let record = tracker.status_of("0xh7").unwrap();
        assert_eq!(record.status, TxStatus::Success);
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_all_before_first_tick_prevents_any_provider_call() {
        let provider = MockProvider::always(confirmed_success());
        let tracker = TransactionTracker::new(provider.clone(), fast_config());

        tracker.track("0xh3", None, None).unwrap();
        // No await between track and clear_all: the watcher task has not
        // run yet on the current-thread test runtime.
        tracker.clear_all();

        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(provider.calls(), 0);
        assert!(tracker.status_of("0xh3").is_none());
        assert_eq!(tracker.total_tracked(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn late_tick_after_clear_does_not_resurrect() {
        let provider = MockProvider::always_transient();
        let tracker = TransactionTracker::new(provider.clone(), fast_config());

        tracker.track("0xh4", None, None).unwrap();

        // One transient tick happens, then the hash is cleared.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(provider.calls(), 1);
        tracker.clear("0xh4");

        // Polling stops and the record stays gone.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(provider.calls(), 1);
        assert!(tracker.status_of("0xh4").is_none());

        // A stale resolution arriving after the clear is a no-op.
        tracker.registry.resolve(
            "0xh4",
            TxOutcome::Success {
                gas_used: Some("1".into()),
                block_ref: None,
            },
        );
        assert!(tracker.status_of("0xh4").is_none());
        assert_eq!(tracker.total_tracked(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_track_is_rejected() {
        let tracker = TransactionTracker::new(MockProvider::always_transient(), fast_config());

        tracker.track("0xdup", None, None).unwrap();
        let err = tracker.track("0xdup", None, None).unwrap_err();
        assert_eq!(err, TrackerError::AlreadyTracked("0xdup".into()));
        assert_eq!(tracker.pending_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_watchers_and_rejects_new_tracking() {
        let provider = MockProvider::always_transient();
        let tracker = TransactionTracker::new(provider.clone(), fast_config());

        tracker.track("0xh8", None, None).unwrap();
        tracker.shutdown();

        let err = tracker.track("0xh9", None, None).unwrap_err();
        assert_eq!(err, TrackerError::ShutDown);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(provider.calls(), 0);
        assert_eq!(tracker.total_tracked(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_reflects_both_sets() {
        let provider = MockProvider::scripted(
            vec![Step::Status(confirmed_success())],
            None,
        );
        let tracker = TransactionTracker::new(provider, fast_config());

        tracker.track("0xdone", Some("stake"), None).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        tracker.track("0xwip", Some("transfer"), None).unwrap();

        let snapshot = tracker.snapshot();
        assert!(snapshot.has_pending);
        assert_eq!(snapshot.pending_count, 1);
        assert_eq!(snapshot.total_tracked, 2);
        assert_eq!(snapshot.pending[0].hash, "0xwip");
        assert_eq!(snapshot.completed[0].hash, "0xdone");

        // Serializes for UI consumption.
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["pending_count"], 1);
        assert_eq!(json["completed"][0]["status"], "success");
    }

    #[tokio::test(start_paused = true)]
    async fn latest_by_kind_via_facade() {
        let provider = MockProvider::always_transient();
        let tracker = TransactionTracker::new(provider, fast_config());

        tracker.track("0xa", Some("stake"), None).unwrap();
        tracker.track("0xb", Some("stake"), None).unwrap();

        assert_eq!(tracker.latest_by_kind("stake").unwrap().hash, "0xa");
        assert!(tracker.latest_by_kind("vote").is_none());
    }
}
