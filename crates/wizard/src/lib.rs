//! Stateful wizard engine behind the channel navigator: per-user sessions,
//! staged admin actions and the command, component and modal handlers that
//! drive them.

pub mod access;
pub mod commands;
pub mod confirm;
pub mod edit;
pub mod navi;
pub mod pending;
pub mod session;
pub mod ui;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use shared::{
    error::ApiError,
    protocol::{InboundEvent, Reply},
};
use storage::Storage;
use thiserror::Error;
use tracing::{debug, error};

use access::{ActorPermissions, ChannelDirectory, PermissionCheck, StorageDirectory};
use edit::EditFlow;
use navi::NaviFlow;
use pending::PendingActions;
use session::SessionStore;

pub const PERMISSION_DENIED: &str = "You do not have permission to do that.";
pub const CATEGORY_NOT_FOUND: &str = "That category could not be found.";
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("unknown component id `{0}`")]
    UnknownComponent(String),
    #[error("component `{0}` arrived without a usable value")]
    MissingValue(String),
}

/// Everything a handler needs: storage plus the in-memory session and token
/// registries. Cheap to clone.
#[derive(Clone)]
pub struct Navigator {
    pub storage: Storage,
    pub edit_sessions: Arc<SessionStore<EditFlow>>,
    pub navi_sessions: Arc<SessionStore<NaviFlow>>,
    pub pending: Arc<PendingActions>,
    pub directory: Arc<dyn ChannelDirectory>,
    pub permissions: Arc<dyn PermissionCheck>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub edit_sessions: usize,
    pub navi_sessions: usize,
    pub pending: usize,
}

impl Navigator {
    pub fn new(storage: Storage) -> Self {
        Self {
            directory: Arc::new(StorageDirectory::new(storage.clone())),
            permissions: Arc::new(ActorPermissions),
            edit_sessions: Arc::new(SessionStore::new()),
            navi_sessions: Arc::new(SessionStore::new()),
            pending: Arc::new(PendingActions::new()),
            storage,
        }
    }

    pub fn with_pending(mut self, pending: PendingActions) -> Self {
        self.pending = Arc::new(pending);
        self
    }

    pub fn with_directory(mut self, directory: Arc<dyn ChannelDirectory>) -> Self {
        self.directory = directory;
        self
    }

    pub fn with_permissions(mut self, permissions: Arc<dyn PermissionCheck>) -> Self {
        self.permissions = permissions;
        self
    }

    /// Drops idle sessions and expired tokens.
    pub fn sweep(
        &self,
        now: DateTime<Utc>,
        session_ttl: Duration,
        pending_ttl: Duration,
    ) -> SweepReport {
        SweepReport {
            edit_sessions: self.edit_sessions.sweep_idle(now, session_ttl),
            navi_sessions: self.navi_sessions.sweep_idle(now, session_ttl),
            pending: self.pending.sweep_expired(now, pending_ttl),
        }
    }

    /// Routes one inbound event. Handler failures are logged and answered
    /// with a generic message; they never leave the engine.
    pub async fn dispatch(&self, event: InboundEvent) -> Reply {
        let user_id = event.actor().user_id;
        match self.route(event).await {
            Ok(reply) => reply,
            Err(err) => {
                error!(user_id = %user_id, code = ?err.code, message = %err.message, "handler failed");
                Reply::Message(ui::notice(GENERIC_FAILURE))
            }
        }
    }

    async fn route(&self, event: InboundEvent) -> Result<Reply, ApiError> {
        match event {
            InboundEvent::Command {
                actor,
                context,
                command,
            } => {
                debug!(user_id = %actor.user_id, command = command.name(), "command received");
                commands::handle_command(self, &actor, &context, command).await
            }
            InboundEvent::Component {
                actor,
                context,
                custom_id,
                values,
            } => {
                if custom_id.starts_with("naviedit:") {
                    edit::handle_component(self, &actor, &context, &custom_id, &values).await
                } else if custom_id.starts_with("navi:") {
                    navi::handle_component(self, &actor, &context, &custom_id, &values).await
                } else if custom_id.starts_with("admin:") {
                    confirm::handle_component(self, &actor, &custom_id).await
                } else {
                    debug!(user_id = %actor.user_id, custom_id, "component not ours");
                    Ok(Reply::Ignored)
                }
            }
            InboundEvent::ModalSubmit {
                actor,
                context,
                custom_id,
                fields,
            } => {
                if custom_id.starts_with("naviedit:") {
                    edit::handle_modal(self, &actor, &context, &custom_id, &fields).await
                } else {
                    debug!(user_id = %actor.user_id, custom_id, "modal not ours");
                    Ok(Reply::Ignored)
                }
            }
            InboundEvent::Autocomplete {
                context,
                command,
                focused,
                ..
            } => commands::autocomplete(self, &context, &command, &focused).await,
        }
    }
}

pub(crate) fn internal(err: anyhow::Error) -> ApiError {
    ApiError::internal(err.to_string())
}
