//! Resolution of the environment-provided secrets into account slots.
//!
//! Slot `n` is usable iff `API_ID_<n>`, `API_HASH_<n>` and `SESSION_STRING_<n>`
//! are all present and non-empty and the app id is a non-zero integer. Unusable
//! slots are reported back, never fatal on their own.

use std::fmt;

use {
    secrecy::SecretString,
    tracing::{debug, warn},
};

use crate::{
    error::ConfigError,
    schema::{AccountKey, BeaconConfig},
};

pub const BOT_TOKEN_VAR: &str = "BOT_TOKEN";
pub const ALLOWED_USERS_VAR: &str = "BEACON_ALLOWED_USERS";
pub const ACCOUNT_SLOTS_VAR: &str = "BEACON_ACCOUNT_SLOTS";

/// Credentials of one pre-authenticated account.
#[derive(Debug)]
pub struct AccountConfig {
    pub key: AccountKey,
    pub api_id: i32,
    pub api_hash: SecretString,
    /// Base64-encoded serialized session.
    pub session: SecretString,
}

/// Why a slot was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingApiId,
    InvalidApiId(String),
    MissingApiHash,
    MissingSession,
    /// The slot number is above the configured slot count.
    OutsideSlotRange,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiId => f.write_str("API_ID not set"),
            Self::InvalidApiId(raw) => write!(f, "API_ID {raw:?} is not a valid app id"),
            Self::MissingApiHash => f.write_str("API_HASH not set"),
            Self::MissingSession => f.write_str("SESSION_STRING not set"),
            Self::OutsideSlotRange => f.write_str("outside the configured slot count"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSlot {
    pub key: AccountKey,
    pub reason: SkipReason,
}

/// File settings plus the secrets read from the environment.
#[derive(Debug)]
pub struct ResolvedConfig {
    pub settings: BeaconConfig,
    pub bot_token: SecretString,
    pub accounts: Vec<AccountConfig>,
    pub skipped: Vec<SkippedSlot>,
}

/// Resolve against the process environment.
pub fn resolve_from_env(settings: BeaconConfig) -> Result<ResolvedConfig, ConfigError> {
    resolve(settings, |name| std::env::var(name).ok())
}

/// Resolve bot token and account slots using `lookup` for variable values.
pub fn resolve(
    mut settings: BeaconConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig, ConfigError> {
    let non_empty = |name: &str| {
        lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let bot_token = non_empty(BOT_TOKEN_VAR).ok_or(ConfigError::MissingBotToken)?;

    if let Some(raw) = non_empty(ACCOUNT_SLOTS_VAR) {
        match raw.parse::<u8>() {
            Ok(slots) => settings.accounts.slots = slots,
            Err(e) => warn!(value = %raw, error = %e, "ignoring invalid {ACCOUNT_SLOTS_VAR}"),
        }
    }

    if let Some(raw) = non_empty(ALLOWED_USERS_VAR) {
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.parse::<u64>() {
                Ok(id) if !settings.bot.allowed_users.contains(&id) => {
                    settings.bot.allowed_users.push(id)
                },
                Ok(_) => {},
                Err(e) => warn!(value = %part, error = %e, "ignoring invalid allowed user id"),
            }
        }
    }

    let mut accounts = Vec::new();
    let mut skipped = Vec::new();
    for n in 1..=settings.accounts.slots {
        let key = AccountKey::slot(n);
        match resolve_slot(n, &non_empty) {
            Ok((api_id, api_hash, session)) => {
                debug!(account = %key, api_id, "account slot configured");
                accounts.push(AccountConfig {
                    key,
                    api_id,
                    api_hash: SecretString::new(api_hash),
                    session: SecretString::new(session),
                });
            },
            Err(reason) => skipped.push(SkippedSlot { key, reason }),
        }
    }

    if !accounts.iter().any(|a| a.key.as_str() == "1") {
        let reason = skipped
            .iter()
            .find(|s| s.key.as_str() == "1")
            .map_or(SkipReason::OutsideSlotRange, |s| s.reason.clone());
        return Err(ConfigError::ControlSlotMissing(reason));
    }

    Ok(ResolvedConfig {
        settings,
        bot_token: SecretString::new(bot_token),
        accounts,
        skipped,
    })
}

fn resolve_slot(
    n: u8,
    non_empty: &impl Fn(&str) -> Option<String>,
) -> Result<(i32, String, String), SkipReason> {
    let raw_id = non_empty(&format!("API_ID_{n}")).ok_or(SkipReason::MissingApiId)?;
    let api_id = match raw_id.parse::<i32>() {
        Ok(0) => return Err(SkipReason::MissingApiId),
        Ok(id) => id,
        Err(_) => return Err(SkipReason::InvalidApiId(raw_id)),
    };
    let api_hash = non_empty(&format!("API_HASH_{n}")).ok_or(SkipReason::MissingApiHash)?;
    let session = non_empty(&format!("SESSION_STRING_{n}")).ok_or(SkipReason::MissingSession)?;
    Ok((api_id, api_hash, session))
}
