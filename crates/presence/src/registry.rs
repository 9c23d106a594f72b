use std::{collections::BTreeMap, sync::Arc};

use tracing::info;

use {
    crate::{
        keep_alive::KeepAlive,
        task::{PresenceTask, PresenceTiming},
    },
    beacon_config::AccountKey,
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("account {0} not found")]
    UnknownAccount(AccountKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Activated,
    AlreadyActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Deactivated,
    NotActive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    AllOffline,
    /// Active keys, sorted ascending.
    Active(Vec<AccountKey>),
}

/// Connected accounts and their running presence loops.
///
/// Presence of a key in the task map is the only record of whether that
/// account's loop is active.
pub struct TaskRegistry {
    clients: BTreeMap<AccountKey, Arc<dyn KeepAlive>>,
    tasks: BTreeMap<AccountKey, PresenceTask>,
    timing: PresenceTiming,
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new(PresenceTiming::default())
    }
}

impl TaskRegistry {
    pub fn new(timing: PresenceTiming) -> Self {
        Self {
            clients: BTreeMap::new(),
            tasks: BTreeMap::new(),
            timing,
        }
    }

    /// Make a connected account available to `start`.
    pub fn register(&mut self, key: AccountKey, client: Arc<dyn KeepAlive>) {
        self.clients.insert(key, client);
    }

    /// Keys of all connected accounts.
    pub fn accounts(&self) -> impl Iterator<Item = &AccountKey> {
        self.clients.keys()
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.tasks.contains_key(key)
    }

    pub fn task(&self, key: &str) -> Option<&PresenceTask> {
        self.tasks.get(key)
    }

    pub fn start(&mut self, key: &str) -> Result<StartOutcome, RegistryError> {
        let Some((key, client)) = self.clients.get_key_value(key) else {
            return Err(RegistryError::UnknownAccount(AccountKey::new(key)));
        };
        if self.tasks.contains_key(key) {
            return Ok(StartOutcome::AlreadyActive);
        }

        let task = PresenceTask::spawn(key.clone(), Arc::clone(client), self.timing);
        self.tasks.insert(key.clone(), task);
        info!(account = %key, "presence loop activated");
        Ok(StartOutcome::Activated)
    }

    pub fn stop(&mut self, key: &str) -> StopOutcome {
        match self.tasks.remove(key) {
            Some(task) => {
                task.cancel();
                info!(account = %key, "presence loop deactivated");
                StopOutcome::Deactivated
            },
            None => StopOutcome::NotActive,
        }
    }

    pub fn status(&self) -> Status {
        if self.tasks.is_empty() {
            Status::AllOffline
        } else {
            Status::Active(self.tasks.keys().cloned().collect())
        }
    }

    /// Cancel every running loop and wait for all of them to exit.
    pub async fn shutdown(&mut self) {
        let tasks = std::mem::take(&mut self.tasks);
        if !tasks.is_empty() {
            info!(count = tasks.len(), "stopping presence loops");
        }
        for task in tasks.into_values() {
            task.stop().await;
        }
    }
}
