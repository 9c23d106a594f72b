//! Telegram side of beacon.
//!
//! User accounts connect over MTProto (grammers) from stored sessions; the
//! control bot talks to the operator through the Bot API (teloxide).

pub mod account;
pub mod bot;
pub mod service;

pub use {
    account::{AccountError, TelegramAccount, connect_all},
    bot::{ControlBot, TelegramReplySink},
    service::serve,
};
