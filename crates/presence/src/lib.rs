//! Presence keeping for pre-authenticated accounts.
//!
//! A [`PresenceTask`] repeatedly pings one account so it shows as online. The
//! [`TaskRegistry`] holds at most one such task per account key, and the
//! [`CommandDispatcher`] drives the registry from `/start`, `/stop` and
//! `/status` control commands.

pub mod command;
pub mod dispatcher;
pub mod keep_alive;
pub mod registry;
pub mod task;

#[cfg(test)]
mod testing;

pub use {
    beacon_config::AccountKey,
    command::{ControlCommand, Reply},
    dispatcher::{CommandDispatcher, InboundCommand, OperatorGate, ReplySink},
    keep_alive::KeepAlive,
    registry::{RegistryError, StartOutcome, Status, StopOutcome, TaskRegistry},
    task::{PresenceStats, PresenceTask, PresenceTiming},
};
