//! Sequential handling of inbound control commands.

use std::{collections::HashSet, sync::Arc};

use {
    anyhow::Result,
    async_trait::async_trait,
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

use crate::{
    command::{ControlCommand, Reply},
    registry::{RegistryError, StartOutcome, Status, StopOutcome, TaskRegistry},
};

/// A chat message received by the control bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub chat_id: i64,
    pub message_id: i32,
    pub sender_id: Option<u64>,
    pub text: String,
}

/// Send a reply to the chat an inbound message came from.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn reply(&self, to: &InboundCommand, text: &str) -> Result<()>;
}

/// Decides which senders may issue commands.
#[derive(Debug, Clone, Default)]
pub struct OperatorGate {
    allowed: Option<HashSet<u64>>,
}

impl OperatorGate {
    /// Accept commands from anyone.
    pub fn open() -> Self {
        Self { allowed: None }
    }

    /// Accept commands only from the given user ids.
    pub fn allow(ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            allowed: Some(ids.into_iter().collect()),
        }
    }

    pub fn permits(&self, sender: Option<u64>) -> bool {
        match (&self.allowed, sender) {
            (None, _) => true,
            (Some(allowed), Some(id)) => allowed.contains(&id),
            (Some(_), None) => false,
        }
    }
}

/// Owns the [`TaskRegistry`] and applies commands to it one at a time.
pub struct CommandDispatcher {
    registry: TaskRegistry,
    gate: OperatorGate,
}

impl CommandDispatcher {
    pub fn new(registry: TaskRegistry, gate: OperatorGate) -> Self {
        Self { registry, gate }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Apply one command and describe the outcome.
    pub fn handle(&mut self, command: ControlCommand) -> Reply {
        match command {
            ControlCommand::Start(key) => match self.registry.start(&key) {
                Ok(StartOutcome::Activated) => Reply::Activated(key),
                Ok(StartOutcome::AlreadyActive) => Reply::AlreadyActive(key),
                Err(RegistryError::UnknownAccount(_)) => Reply::NotFound(key),
            },
            ControlCommand::Stop(key) => match self.registry.stop(&key) {
                StopOutcome::Deactivated => Reply::Deactivated(key),
                StopOutcome::NotActive => Reply::NotActive(key),
            },
            ControlCommand::Status => match self.registry.status() {
                Status::AllOffline => Reply::AllOffline,
                Status::Active(keys) => Reply::Active(keys),
            },
        }
    }

    /// Filter and parse one inbound message, returning the reply to send.
    pub fn handle_message(&mut self, message: &InboundCommand) -> Option<Reply> {
        if !self.gate.permits(message.sender_id) {
            warn!(
                sender = ?message.sender_id,
                chat_id = message.chat_id,
                "ignoring command from unauthorized sender"
            );
            return None;
        }
        let Some(command) = ControlCommand::parse(&message.text) else {
            debug!(chat_id = message.chat_id, "ignoring non-command message");
            return None;
        };
        debug!(?command, chat_id = message.chat_id, "handling command");
        Some(self.handle(command))
    }

    /// Serve commands in arrival order until the inbound channel closes, then
    /// stop every presence loop.
    pub async fn run(mut self, mut inbound: mpsc::Receiver<InboundCommand>, sink: Arc<dyn ReplySink>) {
        info!("listening for commands");

        while let Some(message) = inbound.recv().await {
            let Some(reply) = self.handle_message(&message) else {
                continue;
            };
            if let Err(e) = sink.reply(&message, &reply.to_string()).await {
                warn!(chat_id = message.chat_id, error = %e, "failed to send reply");
            }
        }

        info!("command stream closed");
        self.registry.shutdown().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        crate::{
            AccountKey,
            testing::ScriptedClient,
        },
        std::time::Duration,
        tokio::{sync::Mutex, time::sleep},
    };

    const OPERATOR: u64 = 1001;

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(i64, i32, String)>>,
        fail: bool,
    }

    impl RecordingSink {
        async fn texts(&self) -> Vec<String> {
            self.sent.lock().await.iter().map(|(_, _, t)| t.clone()).collect()
        }
    }

    #[async_trait]
    impl ReplySink for RecordingSink {
        async fn reply(&self, to: &InboundCommand, text: &str) -> Result<()> {
            self.sent
                .lock()
                .await
                .push((to.chat_id, to.message_id, text.to_string()));
            if self.fail {
                anyhow::bail!("chat not found");
            }
            Ok(())
        }
    }

    fn message(id: i32, text: &str) -> InboundCommand {
        InboundCommand {
            chat_id: 42,
            message_id: id,
            sender_id: Some(OPERATOR),
            text: text.to_string(),
        }
    }

    fn dispatcher(keys: &[&str]) -> (CommandDispatcher, Vec<Arc<ScriptedClient>>) {
        let mut registry = TaskRegistry::default();
        let mut clients = Vec::new();
        for key in keys {
            let client = ScriptedClient::ok();
            registry.register(AccountKey::from(*key), client.clone());
            clients.push(client);
        }
        (
            CommandDispatcher::new(registry, OperatorGate::allow([OPERATOR])),
            clients,
        )
    }

    async fn serve(
        dispatcher: CommandDispatcher,
        sink: Arc<RecordingSink>,
        texts: &[&str],
    ) {
        let (tx, rx) = mpsc::channel(16);
        for (i, text) in texts.iter().enumerate() {
            tx.send(message(i as i32, text)).await.unwrap();
        }
        drop(tx);
        dispatcher.run(rx, sink).await;
    }

    #[tokio::test]
    async fn start_stop_status_conversation() {
        let (dispatcher, _) = dispatcher(&["1", "3"]);
        let sink = Arc::new(RecordingSink::default());

        serve(dispatcher, Arc::clone(&sink), &[
            "/status",
            "/start 1",
            "/start 1",
            "/status",
            "/stop 1",
            "/status",
        ])
        .await;

        assert_eq!(sink.texts().await, [
            "All accounts are currently offline.",
            "✅ Online status activated for Account 1.",
            "ℹ️ Account 1 is already active.",
            "🟢 Active accounts: 1",
            "🛑 Online status deactivated for Account 1.",
            "All accounts are currently offline.",
        ]);
    }

    #[tokio::test]
    async fn unknown_and_inactive_accounts_get_plain_replies() {
        let (dispatcher, _) = dispatcher(&["1"]);
        let sink = Arc::new(RecordingSink::default());

        serve(dispatcher, Arc::clone(&sink), &[
            "/start 2",
            "/start abc",
            "/stop 1",
            "/status",
        ])
        .await;

        assert_eq!(sink.texts().await, [
            "❌ Account 2 not found.",
            "❌ Account abc not found.",
            "ℹ️ Account 1 is not currently active.",
            "All accounts are currently offline.",
        ]);
    }

    #[tokio::test]
    async fn replies_go_to_the_originating_message() {
        let (dispatcher, _) = dispatcher(&["1"]);
        let sink = Arc::new(RecordingSink::default());

        serve(dispatcher, Arc::clone(&sink), &["hello", "/status", "/start 1"]).await;

        let sent = sink.sent.lock().await.clone();
        assert_eq!(sent.len(), 2);
        assert_eq!((sent[0].0, sent[0].1), (42, 1));
        assert_eq!((sent[1].0, sent[1].1), (42, 2));
    }

    #[tokio::test]
    async fn unauthorized_senders_are_ignored() {
        let (mut dispatcher, _) = dispatcher(&["1"]);

        let mut stranger = message(0, "/start 1");
        stranger.sender_id = Some(7);
        assert_eq!(dispatcher.handle_message(&stranger), None);

        stranger.sender_id = None;
        assert_eq!(dispatcher.handle_message(&stranger), None);
        assert_eq!(dispatcher.registry().status(), Status::AllOffline);

        assert_eq!(
            dispatcher.handle_message(&message(1, "/start 1")),
            Some(Reply::Activated("1".into()))
        );
    }

    #[test]
    fn open_gate_permits_everyone() {
        let gate = OperatorGate::open();
        assert!(gate.permits(None));
        assert!(gate.permits(Some(5)));
        assert!(!OperatorGate::allow([]).permits(Some(5)));
    }

    #[tokio::test]
    async fn failed_replies_do_not_stop_the_loop() {
        let (dispatcher, _) = dispatcher(&["1"]);
        let sink = Arc::new(RecordingSink {
            fail: true,
            ..Default::default()
        });

        serve(dispatcher, Arc::clone(&sink), &["/start 1", "/status"]).await;
        assert_eq!(sink.texts().await.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_account_keeps_retrying_until_stopped() {
        let mut registry = TaskRegistry::default();
        let client = ScriptedClient::failing();
        registry.register(AccountKey::from("1"), client.clone());
        let mut dispatcher = CommandDispatcher::new(registry, OperatorGate::open());

        assert_eq!(
            dispatcher.handle(ControlCommand::Start("1".into())),
            Reply::Activated("1".into())
        );
        sleep(Duration::from_secs(60 * 60 + 1)).await;
        assert_eq!(client.calls(), 61);

        assert_eq!(
            dispatcher.handle(ControlCommand::Stop("1".into())),
            Reply::Deactivated("1".into())
        );
        sleep(Duration::from_secs(600)).await;
        assert_eq!(client.calls(), 61);
    }

    #[tokio::test]
    async fn closing_the_stream_stops_running_loops() {
        let (dispatcher, clients) = dispatcher(&["1", "2"]);
        let sink = Arc::new(RecordingSink::default());

        serve(dispatcher, Arc::clone(&sink), &["/start 1", "/start 2"]).await;

        let before: Vec<usize> = clients.iter().map(|c| c.calls()).collect();
        tokio::task::yield_now().await;
        let after: Vec<usize> = clients.iter().map(|c| c.calls()).collect();
        assert_eq!(before, after);
    }
}
