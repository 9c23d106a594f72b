//! Config file schema (presence timing, account slots, control bot).

use std::{borrow::Borrow, fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Identifier of a configured account slot ("1", "2", ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountKey(String);

impl AccountKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key for the 1-based slot number.
    pub fn slot(n: u8) -> Self {
        Self(n.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for AccountKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    pub presence: PresenceConfig,
    pub accounts: AccountsConfig,
    pub bot: BotConfig,
}

/// Timing of the per-account keep-alive loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Wait after a successful keep-alive call.
    pub interval_secs: u64,
    /// Wait after a failed keep-alive call.
    pub retry_interval_secs: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            retry_interval_secs: 60,
        }
    }
}

impl PresenceConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    /// Number of `API_ID_<n>` / `API_HASH_<n>` / `SESSION_STRING_<n>` slots read
    /// from the environment.
    pub slots: u8,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self { slots: 3 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Telegram user ids allowed to send control commands, in addition to the
    /// connected accounts themselves.
    pub allowed_users: Vec<u64>,
}
