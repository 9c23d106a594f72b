//! User accounts connected over MTProto from stored session tokens.

use {
    anyhow::Context,
    async_trait::async_trait,
    base64::{
        Engine,
        engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD},
    },
    grammers_client::{Client, Config, InitParams},
    grammers_session::{PackedChat, Session},
    secrecy::ExposeSecret,
    tracing::{info, warn},
};

use {
    beacon_config::{AccountConfig, AccountKey},
    beacon_presence::KeepAlive,
};

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("session token is not valid base64: {0}")]
    SessionEncoding(#[from] base64::DecodeError),

    #[error("session token could not be loaded: {0}")]
    SessionFormat(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("session is no longer authorized")]
    Unauthorized,

    #[error("request failed: {0}")]
    Request(String),
}

/// Decode a session token, tolerating padding, whitespace and the URL-safe
/// alphabet.
pub fn decode_session(token: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = token.chars().filter(|c| !c.is_whitespace()).collect();
    let trimmed = compact.trim_end_matches('=');
    STANDARD_NO_PAD
        .decode(trimmed)
        .or_else(|_| URL_SAFE_NO_PAD.decode(trimmed))
}

/// A connected, authorized user account.
pub struct TelegramAccount {
    key: AccountKey,
    client: Client,
    me: PackedChat,
    user_id: i64,
    first_name: String,
}

impl TelegramAccount {
    /// Connect with the stored session. Never falls back to an interactive
    /// login.
    pub async fn connect(account: &AccountConfig) -> Result<Self, AccountError> {
        let bytes = decode_session(account.session.expose_secret())?;
        let session =
            Session::load(&bytes).map_err(|e| AccountError::SessionFormat(e.to_string()))?;

        let client = Client::connect(Config {
            session,
            api_id: account.api_id,
            api_hash: account.api_hash.expose_secret().clone(),
            params: InitParams::default(),
        })
        .await
        .map_err(|e| AccountError::Connect(e.to_string()))?;

        let authorized = client
            .is_authorized()
            .await
            .map_err(|e| AccountError::Request(e.to_string()))?;
        if !authorized {
            return Err(AccountError::Unauthorized);
        }

        let me = client
            .get_me()
            .await
            .map_err(|e| AccountError::Request(e.to_string()))?;

        Ok(Self {
            key: account.key.clone(),
            me: me.pack(),
            user_id: me.id(),
            first_name: me.first_name().to_string(),
            client,
        })
    }

    pub fn key(&self) -> &AccountKey {
        &self.key
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }
}

#[async_trait]
impl KeepAlive for TelegramAccount {
    /// Mark the account's own "Saved Messages" dialog as read.
    async fn keep_alive(&self) -> anyhow::Result<()> {
        self.client
            .mark_as_read(self.me)
            .await
            .with_context(|| format!("read acknowledge for user {}", self.user_id))
    }
}

/// Connect every configured account. A failing account is logged and left
/// out; it never prevents the others from connecting.
pub async fn connect_all(accounts: &[AccountConfig]) -> Vec<TelegramAccount> {
    let mut connected = Vec::with_capacity(accounts.len());

    for account in accounts {
        info!(account = %account.key, "connecting using session string");
        match TelegramAccount::connect(account).await {
            Ok(client) => {
                info!(
                    account = %client.key,
                    name = %client.first_name,
                    user_id = client.user_id,
                    "account connected successfully"
                );
                connected.push(client);
            },
            Err(e) => warn!(account = %account.key, error = %e, "account failed to connect"),
        }
    }

    connected
}
