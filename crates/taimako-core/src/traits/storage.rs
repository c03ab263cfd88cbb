// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence service boundary for conversations, messages, and context.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::TaimakoError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    Conversation, ConversationContext, ConversationWithMessages, NewConversation, NewMessage,
};

/// Adapter for the relational store that owns every conversation entity.
///
/// Messages are append-only; `add_message` also bumps the owning
/// conversation's `total_messages`. Context rows are upserted whole.
#[async_trait]
pub trait ConversationStore: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), TaimakoError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), TaimakoError>;

    /// Provisions a conversation and returns its identifier.
    async fn create_conversation(&self, new: &NewConversation) -> Result<String, TaimakoError>;

    /// Loads a conversation and its messages in insertion order.
    ///
    /// Fails with [`TaimakoError::NotFound`] for an unknown identifier.
    async fn get_conversation_with_messages(
        &self,
        conversation_id: &str,
    ) -> Result<ConversationWithMessages, TaimakoError>;

    /// Newest conversation of `user_id` with zero messages created at or
    /// after `created_since`.
    async fn find_reusable_conversation(
        &self,
        user_id: &str,
        created_since: DateTime<Utc>,
    ) -> Result<Option<Conversation>, TaimakoError>;

    /// Replaces a conversation's title.
    async fn update_conversation_title(
        &self,
        conversation_id: &str,
        title: &str,
    ) -> Result<(), TaimakoError>;

    /// Reads the context row for a conversation, if one exists.
    async fn get_context(
        &self,
        conversation_id: &str,
    ) -> Result<Option<ConversationContext>, TaimakoError>;

    /// Inserts or fully replaces the context row for a conversation.
    async fn upsert_context(&self, context: &ConversationContext) -> Result<(), TaimakoError>;

    /// Appends a message and returns its identifier.
    async fn add_message(&self, message: &NewMessage) -> Result<String, TaimakoError>;
}
