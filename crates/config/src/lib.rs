//! Beacon configuration.
//!
//! Two layers: an optional config file (`beacon.toml` / `.yaml` / `.json`)
//! carrying tunables, and the process environment carrying the secrets
//! (bot token, per-slot app credentials and session tokens).

pub mod accounts;
pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;

pub use {
    accounts::{AccountConfig, ResolvedConfig, SkipReason, SkippedSlot, resolve, resolve_from_env},
    error::ConfigError,
    loader::{discover_and_load, load_config},
    schema::{AccountKey, AccountsConfig, BeaconConfig, BotConfig, PresenceConfig},
};
