// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD operations.

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row, params};
use taimako_core::TaimakoError;
use taimako_core::types::format_timestamp;

use crate::database::{Database, map_tr_err};
use crate::models::{Conversation, ConversationWithMessages, NewConversation};
use crate::queries::messages::select_messages;

const CONVERSATION_COLUMNS: &str =
    "id, user_id, title, total_messages, state_code, lga_code, created_at, updated_at";

fn conversation_from_row(row: &Row<'_>) -> Result<Conversation, rusqlite::Error> {
    Ok(Conversation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        total_messages: row.get(3)?,
        state_code: row.get(4)?,
        lga_code: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Insert a conversation with zero messages and return its new identifier.
pub async fn create_conversation(
    db: &Database,
    new: &NewConversation,
    now: DateTime<Utc>,
) -> Result<String, TaimakoError> {
    let id = uuid::Uuid::new_v4().to_string();
    let new = new.clone();
    let created_at = format_timestamp(now);
    let row_id = id.clone();
    db.connection()
        .call(move |conn| {
            let location = new.location.unwrap_or_default();
            conn.execute(
                "INSERT INTO conversations
                 (id, user_id, title, total_messages, state_code, lga_code, created_at, updated_at)
                 VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6, ?6)",
                params![
                    row_id,
                    new.user_id,
                    new.title,
                    location.state_code,
                    location.lga_code,
                    created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
    Ok(id)
}

/// Get a conversation by ID.
pub async fn get_conversation(
    db: &Database,
    id: &str,
) -> Result<Option<Conversation>, TaimakoError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"),
                params![id],
                conversation_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Load a conversation and all of its messages in one read.
///
/// Fails with `NotFound` when the conversation does not exist.
pub async fn get_conversation_with_messages(
    db: &Database,
    id: &str,
) -> Result<ConversationWithMessages, TaimakoError> {
    let lookup = id.to_string();
    let found = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let conversation = tx
                .query_row(
                    &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"),
                    params![lookup],
                    conversation_from_row,
                )
                .optional()?;
            let Some(conversation) = conversation else {
                return Ok(None);
            };
            let messages = select_messages(&tx, &conversation.id)?;
            tx.commit()?;
            Ok(Some(ConversationWithMessages {
                conversation,
                messages,
            }))
        })
        .await
        .map_err(map_tr_err)?;
    found.ok_or_else(|| TaimakoError::conversation_not_found(id))
}

/// Newest empty conversation for `user_id` created at or after `created_since`.
pub async fn find_reusable_conversation(
    db: &Database,
    user_id: &str,
    created_since: DateTime<Utc>,
) -> Result<Option<Conversation>, TaimakoError> {
    let user_id = user_id.to_string();
    let cutoff = format_timestamp(created_since);
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {CONVERSATION_COLUMNS} FROM conversations
                     WHERE user_id = ?1 AND total_messages = 0 AND created_at >= ?2
                     ORDER BY created_at DESC LIMIT 1"
                ),
                params![user_id, cutoff],
                conversation_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Replace a conversation's title and bump `updated_at`.
pub async fn update_conversation_title(
    db: &Database,
    id: &str,
    title: &str,
    now: DateTime<Utc>,
) -> Result<(), TaimakoError> {
    let lookup = id.to_string();
    let title = title.to_string();
    let updated_at = format_timestamp(now);
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET title = ?1, updated_at = ?2 WHERE id = ?3",
                params![title, updated_at, lookup],
            )
        })
        .await
        .map_err(map_tr_err)?;
    if changed == 0 {
        return Err(TaimakoError::conversation_not_found(id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taimako_core::types::{Location, NewMessage};
    use tempfile::tempdir;

    use crate::queries::messages::add_message;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn at(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    fn new_conversation(user: &str) -> NewConversation {
        NewConversation {
            user_id: user.to_string(),
            title: "New conversation".to_string(),
            location: Some(Location {
                state_code: Some("LA".to_string()),
                lga_code: None,
            }),
        }
    }

    #[tokio::test]
    async fn create_and_get_conversation_roundtrips() {
        let (db, _dir) = setup_db().await;
        let id = create_conversation(&db, &new_conversation("u1"), at("2026-03-01T10:00:00Z"))
            .await
            .unwrap();

        let conv = get_conversation(&db, &id).await.unwrap().unwrap();
        assert_eq!(conv.user_id, "u1");
        assert_eq!(conv.total_messages, 0);
        assert_eq!(conv.state_code.as_deref(), Some("LA"));
        assert!(conv.lga_code.is_none());
        assert_eq!(conv.created_at, "2026-03-01T10:00:00.000Z");
        assert_eq!(conv.created_at, conv.updated_at);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn missing_conversation_is_not_found() {
        let (db, _dir) = setup_db().await;
        assert!(get_conversation(&db, "nope").await.unwrap().is_none());
        let err = get_conversation_with_messages(&db, "nope").await.unwrap_err();
        assert!(matches!(err, TaimakoError::NotFound { .. }));
        let err = update_conversation_title(&db, "nope", "t", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, TaimakoError::NotFound { .. }));
    }

    #[tokio::test]
    async fn reusable_lookup_respects_window_owner_and_emptiness() {
        let (db, _dir) = setup_db().await;
        let older = create_conversation(&db, &new_conversation("u1"), at("2026-03-01T10:00:00Z"))
            .await
            .unwrap();
        let newer = create_conversation(&db, &new_conversation("u1"), at("2026-03-01T10:02:00Z"))
            .await
            .unwrap();
        create_conversation(&db, &new_conversation("u2"), at("2026-03-01T10:03:00Z"))
            .await
            .unwrap();

        let found = find_reusable_conversation(&db, "u1", at("2026-03-01T09:59:00Z"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, newer, "newest empty conversation wins");

        add_message(&db, &NewMessage::user(&newer, "u1", "hi"), Utc::now())
            .await
            .unwrap();
        let found = find_reusable_conversation(&db, "u1", at("2026-03-01T09:59:00Z"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, older, "conversations with messages are skipped");

        let none = find_reusable_conversation(&db, "u1", at("2026-03-01T10:01:00Z"))
            .await
            .unwrap();
        assert!(none.is_none(), "older conversation is outside the window");
    }

    #[tokio::test]
    async fn window_cutoff_is_inclusive() {
        let (db, _dir) = setup_db().await;
        let created = at("2026-03-01T10:00:00Z");
        let id = create_conversation(&db, &new_conversation("u1"), created)
            .await
            .unwrap();
        let found = find_reusable_conversation(&db, "u1", created).await.unwrap();
        assert_eq!(found.map(|c| c.id), Some(id));
    }

    #[tokio::test]
    async fn update_title_changes_title_and_updated_at() {
        let (db, _dir) = setup_db().await;
        let id = create_conversation(&db, &new_conversation("u1"), at("2026-03-01T10:00:00Z"))
            .await
            .unwrap();
        update_conversation_title(&db, &id, "Headache and fever", at("2026-03-01T10:05:00Z"))
            .await
            .unwrap();

        let conv = get_conversation(&db, &id).await.unwrap().unwrap();
        assert_eq!(conv.title, "Headache and fever");
        assert_eq!(conv.updated_at, "2026-03-01T10:05:00.000Z");
        assert_eq!(conv.created_at, "2026-03-01T10:00:00.000Z");
    }
}
