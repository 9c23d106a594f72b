//! Fake accounts for unit tests.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use {anyhow::Result, async_trait::async_trait};

use crate::keep_alive::KeepAlive;

/// Counts calls and succeeds or fails on demand.
#[derive(Default)]
pub(crate) struct ScriptedClient {
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl ScriptedClient {
    pub(crate) fn ok() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn failing() -> Arc<Self> {
        let client = Self::default();
        client.failing.store(true, Ordering::SeqCst);
        Arc::new(client)
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeepAlive for ScriptedClient {
    async fn keep_alive(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("FLOOD_WAIT_X");
        }
        Ok(())
    }
}

/// Never completes its keep-alive call.
#[derive(Default)]
pub(crate) struct HangingClient {
    calls: AtomicUsize,
}

impl HangingClient {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeepAlive for HangingClient {
    async fn keep_alive(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}
