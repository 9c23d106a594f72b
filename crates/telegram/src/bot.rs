//! Control bot: receives operator commands over the Bot API and relays them
//! to the command dispatcher.

use std::sync::Arc;

use {
    anyhow::Context,
    async_trait::async_trait,
    secrecy::{ExposeSecret, SecretString},
    teloxide::{
        prelude::*,
        types::{BotCommand, MessageId, ReplyParameters},
    },
    tokio::sync::mpsc,
    tracing::{info, warn},
};

use beacon_presence::{InboundCommand, ReplySink};

/// Commands advertised in the bot's menu.
pub fn command_menu() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "Keep an account online: /start <account>"),
        BotCommand::new("stop", "Stop keeping an account online: /stop <account>"),
        BotCommand::new("status", "List accounts currently kept online"),
    ]
}

/// Convert a chat message into a dispatcher input. Non-text messages yield
/// `None`.
pub fn inbound_from_message(msg: &Message) -> Option<InboundCommand> {
    Some(InboundCommand {
        chat_id: msg.chat.id.0,
        message_id: msg.id.0,
        sender_id: msg.from.as_ref().map(|user| user.id.0),
        text: msg.text()?.to_string(),
    })
}

pub struct ControlBot {
    bot: Bot,
}

impl ControlBot {
    /// Authenticate the bot token and publish the command menu.
    pub async fn connect(token: &SecretString) -> anyhow::Result<Self> {
        let bot = Bot::new(token.expose_secret());
        let me = bot
            .get_me()
            .await
            .context("control bot failed to authenticate")?;
        info!(username = %me.username(), "control bot started successfully");

        if let Err(e) = bot.set_my_commands(command_menu()).await {
            warn!(error = %e, "failed to publish bot command menu");
        }

        Ok(Self { bot })
    }

    pub fn reply_sink(&self) -> Arc<TelegramReplySink> {
        Arc::new(TelegramReplySink {
            bot: self.bot.clone(),
        })
    }

    /// Forward text messages into `commands` until Ctrl-C or disconnect.
    ///
    /// Messages are only queued here; handling order is decided by the single
    /// consumer of the channel.
    pub async fn listen(self, commands: mpsc::Sender<InboundCommand>) {
        let handler = Update::filter_message().endpoint(
            |msg: Message, commands: mpsc::Sender<InboundCommand>| async move {
                if let Some(inbound) = inbound_from_message(&msg)
                    && commands.send(inbound).await.is_err()
                {
                    warn!("command dispatcher is gone, dropping message");
                }
                respond(())
            },
        );

        Dispatcher::builder(self.bot, handler)
            .dependencies(dptree::deps![commands])
            .default_handler(|_| async {})
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

/// Replies in the originating chat, threaded to the command message.
pub struct TelegramReplySink {
    bot: Bot,
}

#[async_trait]
impl ReplySink for TelegramReplySink {
    async fn reply(&self, to: &InboundCommand, text: &str) -> anyhow::Result<()> {
        self.bot
            .send_message(ChatId(to.chat_id), text)
            .reply_parameters(ReplyParameters::new(MessageId(to.message_id)))
            .await
            .context("send reply")?;
        Ok(())
    }
}
