use std::sync::Arc;

use {
    tokio::sync::mpsc,
    tracing::info,
};

use {
    beacon_config::ResolvedConfig,
    beacon_presence::{CommandDispatcher, OperatorGate, PresenceTiming, TaskRegistry},
};

use crate::{
    account::{TelegramAccount, connect_all},
    bot::ControlBot,
};

/// Inbound commands buffered between the bot and the dispatcher.
const COMMAND_QUEUE: usize = 64;

/// Connect the accounts, start the control bot and serve commands until the
/// bot stops.
pub async fn serve(config: ResolvedConfig) -> anyhow::Result<()> {
    for slot in &config.skipped {
        info!(
            account = %slot.key,
            reason = %slot.reason,
            "skipping account: required environment variables not found"
        );
    }

    let accounts = connect_all(&config.accounts).await;
    if accounts.is_empty() {
        anyhow::bail!(
            "no accounts were able to connect, please check your environment variables"
        );
    }

    let bot = ControlBot::connect(&config.bot_token).await?;

    let allowed_users = &config.settings.bot.allowed_users;
    let gate = operator_gate(allowed_users, accounts.iter().map(TelegramAccount::user_id));

    let mut registry = TaskRegistry::new(PresenceTiming::from(&config.settings.presence));
    for account in accounts {
        registry.register(account.key().clone(), Arc::new(account));
    }
    info!(
        accounts = registry.accounts().count(),
        allowed_users = allowed_users.len(),
        open = allowed_users.is_empty(),
        "ready"
    );

    let dispatcher = CommandDispatcher::new(registry, gate);
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
    let sink = bot.reply_sink();

    tokio::join!(bot.listen(tx), dispatcher.run(rx, sink));

    info!("control bot stopped");
    Ok(())
}

/// Without configured `allowed_users` anyone may issue commands. Otherwise only
/// those users and the connected accounts themselves may.
fn operator_gate(
    allowed_users: &[u64],
    account_ids: impl IntoIterator<Item = i64>,
) -> OperatorGate {
    if allowed_users.is_empty() {
        return OperatorGate::open();
    }
    let accounts = account_ids.into_iter().filter_map(|id| u64::try_from(id).ok());
    OperatorGate::allow(allowed_users.iter().copied().chain(accounts))
}
