use {anyhow::Result, async_trait::async_trait};

/// A connected account that can announce itself as online.
#[async_trait]
pub trait KeepAlive: Send + Sync {
    /// Perform one lightweight call that refreshes the account's presence.
    async fn keep_alive(&self) -> Result<()>;
}
