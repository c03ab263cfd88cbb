// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolves an inbound turn to a conversation identifier.
//!
//! A recent conversation that nobody has written into yet is reused instead
//! of provisioning another empty row.

use std::time::Duration;

use chrono::{DateTime, Utc};
use taimako_core::types::{Location, NewConversation};
use taimako_core::{ConversationStore, TaimakoError};
use tracing::{debug, info};

use crate::title::generate_title;

/// How a turn obtained its conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The caller supplied the identifier.
    Supplied(String),
    /// An empty conversation inside the reuse window was picked up.
    Reused(String),
    /// A fresh conversation was provisioned.
    Created(String),
}

impl Resolution {
    pub fn conversation_id(&self) -> &str {
        match self {
            Resolution::Supplied(id) | Resolution::Reused(id) | Resolution::Created(id) => id,
        }
    }

    pub fn into_id(self) -> String {
        match self {
            Resolution::Supplied(id) | Resolution::Reused(id) | Resolution::Created(id) => id,
        }
    }
}

/// Session resolution over a conversation store.
pub struct SessionManager<'a> {
    store: &'a dyn ConversationStore,
    reuse_window: Duration,
}

impl<'a> SessionManager<'a> {
    pub fn new(store: &'a dyn ConversationStore, reuse_window: Duration) -> Self {
        Self {
            store,
            reuse_window,
        }
    }

    /// Picks the conversation for a turn.
    ///
    /// A supplied id is not checked here; an unknown one fails later with
    /// [`TaimakoError::NotFound`]. Without an id, the newest empty
    /// conversation created at or after `now - reuse_window` is reused and
    /// retitled, otherwise a new one is created.
    pub async fn resolve(
        &self,
        conversation_id: Option<&str>,
        user_id: &str,
        message: &str,
        location: Option<&Location>,
        now: DateTime<Utc>,
    ) -> Result<Resolution, TaimakoError> {
        if let Some(id) = conversation_id.filter(|id| !id.trim().is_empty()) {
            return Ok(Resolution::Supplied(id.to_string()));
        }

        let window = chrono::Duration::from_std(self.reuse_window)
            .map_err(|e| TaimakoError::Internal(format!("invalid reuse window: {e}")))?;
        let title = generate_title(message);

        if let Some(existing) = self
            .store
            .find_reusable_conversation(user_id, now - window)
            .await?
        {
            debug!(conversation_id = %existing.id, "reusing empty conversation");
            self.store
                .update_conversation_title(&existing.id, &title)
                .await?;
            return Ok(Resolution::Reused(existing.id));
        }

        let id = self
            .store
            .create_conversation(&NewConversation {
                user_id: user_id.to_string(),
                title,
                location: location.cloned(),
            })
            .await?;
        info!(conversation_id = %id, "created conversation");
        Ok(Resolution::Created(id))
    }
}
