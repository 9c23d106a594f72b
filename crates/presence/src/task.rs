use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use {
    tokio::task::JoinHandle,
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use {
    crate::keep_alive::KeepAlive,
    beacon_config::{AccountKey, PresenceConfig},
};

/// Waits between keep-alive calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceTiming {
    /// After a successful call.
    pub interval: Duration,
    /// After a failed call.
    pub retry_interval: Duration,
}

impl Default for PresenceTiming {
    fn default() -> Self {
        Self::from(&PresenceConfig::default())
    }
}

impl From<&PresenceConfig> for PresenceTiming {
    fn from(cfg: &PresenceConfig) -> Self {
        Self {
            interval: cfg.interval(),
            retry_interval: cfg.retry_interval(),
        }
    }
}

/// Call counters for one presence loop.
#[derive(Debug, Default)]
pub struct PresenceStats {
    successes: AtomicU64,
    failures: AtomicU64,
}

impl PresenceStats {
    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

/// A running presence loop bound to one account.
///
/// The loop never ends on its own: failures only slow it down. It stops once
/// cancelled, at the next suspension point (the in-flight call or the sleep).
pub struct PresenceTask {
    key: AccountKey,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
    stats: Arc<PresenceStats>,
}

impl PresenceTask {
    pub fn spawn(key: AccountKey, client: Arc<dyn KeepAlive>, timing: PresenceTiming) -> Self {
        let cancel = CancellationToken::new();
        let stats = Arc::new(PresenceStats::default());
        let handle = tokio::spawn(run_loop(
            key.clone(),
            client,
            timing,
            cancel.clone(),
            Arc::clone(&stats),
        ));
        Self {
            key,
            cancel,
            handle,
            stats,
        }
    }

    pub fn stats(&self) -> Arc<PresenceStats> {
        Arc::clone(&self.stats)
    }

    /// Request cancellation without waiting for the loop to exit.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel and wait for the loop to exit.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!(account = %self.key, error = %e, "presence task ended abnormally");
        }
    }
}

async fn run_loop(
    key: AccountKey,
    client: Arc<dyn KeepAlive>,
    timing: PresenceTiming,
    cancel: CancellationToken,
    stats: Arc<PresenceStats>,
) {
    debug!(account = %key, "presence loop started");

    loop {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = client.keep_alive() => result,
        };

        let wait = match result {
            Ok(()) => {
                stats.successes.fetch_add(1, Ordering::Relaxed);
                info!(account = %key, "status updated to online");
                timing.interval
            },
            Err(e) => {
                stats.failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    account = %key,
                    error = %e,
                    retry_in_secs = timing.retry_interval.as_secs(),
                    "error updating status"
                );
                timing.retry_interval
            },
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(wait) => {},
        }
    }

    debug!(account = %key, "presence loop stopped");
}
