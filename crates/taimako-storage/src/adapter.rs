// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ConversationStore trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use taimako_config::model::StorageConfig;
use taimako_core::types::{
    Conversation, ConversationContext, ConversationWithMessages, NewConversation, NewMessage,
};
use taimako_core::{AdapterType, ConversationStore, HealthStatus, PluginAdapter, TaimakoError};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed conversation store.
///
/// The database is opened on the first call to
/// [`ConversationStore::initialize`]; every other operation fails until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, TaimakoError> {
        self.db.get().ok_or_else(|| TaimakoError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, TaimakoError> {
        self.db()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TaimakoError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for SqliteStorage {
    async fn initialize(&self) -> Result<(), TaimakoError> {
        let db = Database::open_with_journal(&self.config.database_path, self.config.wal_mode)
            .await?;
        self.db.set(db).map_err(|_| TaimakoError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), TaimakoError> {
        self.db()?.close().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn create_conversation(&self, new: &NewConversation) -> Result<String, TaimakoError> {
        queries::conversations::create_conversation(self.db()?, new, Utc::now()).await
    }

    async fn get_conversation_with_messages(
        &self,
        conversation_id: &str,
    ) -> Result<ConversationWithMessages, TaimakoError> {
        queries::conversations::get_conversation_with_messages(self.db()?, conversation_id).await
    }

    async fn find_reusable_conversation(
        &self,
        user_id: &str,
        created_since: DateTime<Utc>,
    ) -> Result<Option<Conversation>, TaimakoError> {
        queries::conversations::find_reusable_conversation(self.db()?, user_id, created_since)
            .await
    }

    async fn update_conversation_title(
        &self,
        conversation_id: &str,
        title: &str,
    ) -> Result<(), TaimakoError> {
        queries::conversations::update_conversation_title(
            self.db()?,
            conversation_id,
            title,
            Utc::now(),
        )
        .await
    }

    async fn get_context(
        &self,
        conversation_id: &str,
    ) -> Result<Option<ConversationContext>, TaimakoError> {
        queries::context::get_context(self.db()?, conversation_id).await
    }

    async fn upsert_context(&self, context: &ConversationContext) -> Result<(), TaimakoError> {
        queries::context::upsert_context(self.db()?, context).await
    }

    async fn add_message(&self, message: &NewMessage) -> Result<String, TaimakoError> {
        queries::messages::add_message(self.db()?, message, Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taimako_core::types::{ConversationStage, Role};
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn operations_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert!(storage.health_check().await.is_err());
        assert!(storage.get_context("c").await.is_err());
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
        assert!(storage.initialize().await.is_err());
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn full_conversation_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        let id = storage
            .create_conversation(&NewConversation {
                user_id: "u1".to_string(),
                title: "New chat".to_string(),
                location: None,
            })
            .await
            .unwrap();

        let reusable = storage
            .find_reusable_conversation("u1", Utc::now() - chrono::Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(reusable.map(|c| c.id), Some(id.clone()));

        storage
            .add_message(&NewMessage::user(&id, "u1", "I feel dizzy"))
            .await
            .unwrap();
        storage
            .update_conversation_title(&id, "Dizziness")
            .await
            .unwrap();
        storage
            .upsert_context(&ConversationContext {
                conversation_id: id.clone(),
                extracted_symptoms: vec!["dizziness".to_string()],
                current_concerns: vec![],
                conversation_stage: ConversationStage::SymptomCollection,
                updated_at: taimako_core::types::format_timestamp(Utc::now()),
            })
            .await
            .unwrap();

        let loaded = storage.get_conversation_with_messages(&id).await.unwrap();
        assert_eq!(loaded.conversation.title, "Dizziness");
        assert_eq!(loaded.total_messages(), 1);
        assert_eq!(loaded.messages[0].role, Role::User);

        let ctx = storage.get_context(&id).await.unwrap().unwrap();
        assert_eq!(ctx.extracted_symptoms, ["dizziness"]);

        storage.shutdown().await.unwrap();
    }
}
