use std::fmt;

use beacon_config::AccountKey;

/// A control command recognised in a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    Start(String),
    Stop(String),
    Status,
}

impl ControlCommand {
    /// Parse `/start <key>`, `/stop <key>` or `/status`.
    ///
    /// The command word may carry a `@botname` suffix. `/start` and `/stop`
    /// need a non-empty argument; everything after the command word is the
    /// account key, trimmed. Returns `None` for any other text.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (word, rest) = text
            .split_once(char::is_whitespace)
            .unwrap_or((text, ""));
        let word = word.split_once('@').map_or(word, |(cmd, _bot)| cmd);
        let arg = rest.trim();

        match word {
            "/start" if !arg.is_empty() => Some(Self::Start(arg.to_string())),
            "/stop" if !arg.is_empty() => Some(Self::Stop(arg.to_string())),
            "/status" => Some(Self::Status),
            _ => None,
        }
    }
}

/// The single reply sent for a handled command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Activated(String),
    AlreadyActive(String),
    NotFound(String),
    Deactivated(String),
    NotActive(String),
    AllOffline,
    Active(Vec<AccountKey>),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Activated(key) => write!(f, "✅ Online status activated for Account {key}."),
            Self::AlreadyActive(key) => write!(f, "ℹ️ Account {key} is already active."),
            Self::NotFound(key) => write!(f, "❌ Account {key} not found."),
            Self::Deactivated(key) => write!(f, "🛑 Online status deactivated for Account {key}."),
            Self::NotActive(key) => write!(f, "ℹ️ Account {key} is not currently active."),
            Self::AllOffline => f.write_str("All accounts are currently offline."),
            Self::Active(keys) => {
                let keys: Vec<&str> = keys.iter().map(AccountKey::as_str).collect();
                write!(f, "🟢 Active accounts: {}", keys.join(", "))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("/start 1", Some(ControlCommand::Start("1".into())))]
    #[case("/start   2  ", Some(ControlCommand::Start("2".into())))]
    #[case("/start@beacon_bot 3", Some(ControlCommand::Start("3".into())))]
    #[case("/stop 1", Some(ControlCommand::Stop("1".into())))]
    #[case("/stop two words", Some(ControlCommand::Stop("two words".into())))]
    #[case("/status", Some(ControlCommand::Status))]
    #[case("/status@beacon_bot", Some(ControlCommand::Status))]
    #[case("/status now", Some(ControlCommand::Status))]
    #[case("/start", None)]
    #[case("/start   ", None)]
    #[case("/stop", None)]
    #[case("/startx 1", None)]
    #[case("/statusx", None)]
    #[case("start 1", None)]
    #[case("hello", None)]
    #[case("", None)]
    fn parses(#[case] text: &str, #[case] expected: Option<ControlCommand>) {
        assert_eq!(ControlCommand::parse(text), expected);
    }

    #[test]
    fn reply_texts() {
        assert_eq!(
            Reply::Activated("1".into()).to_string(),
            "✅ Online status activated for Account 1."
        );
        assert_eq!(
            Reply::AlreadyActive("1".into()).to_string(),
            "ℹ️ Account 1 is already active."
        );
        assert_eq!(Reply::NotFound("7".into()).to_string(), "❌ Account 7 not found.");
        assert_eq!(
            Reply::Deactivated("1".into()).to_string(),
            "🛑 Online status deactivated for Account 1."
        );
        assert_eq!(
            Reply::NotActive("2".into()).to_string(),
            "ℹ️ Account 2 is not currently active."
        );
        assert_eq!(Reply::AllOffline.to_string(), "All accounts are currently offline.");
        assert_eq!(
            Reply::Active(vec![AccountKey::slot(1), AccountKey::slot(3)]).to_string(),
            "🟢 Active accounts: 1, 3"
        );
    }
}
