use std::path::PathBuf;

use crate::accounts::SkipReason;

/// Configuration errors that prevent the process from starting.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("BOT_TOKEN environment variable not set")]
    MissingBotToken,

    #[error("account slot 1 is not usable ({0}); the control bot requires it")]
    ControlSlotMissing(SkipReason),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("unsupported config format: .{0}")]
    UnsupportedFormat(String),
}
