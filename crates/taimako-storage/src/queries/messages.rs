// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message operations. Messages are append-only.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use taimako_core::TaimakoError;
use taimako_core::types::{MessageType, format_timestamp};

use crate::database::{Database, map_tr_err};
use crate::models::{Message, NewMessage, from_json_column, parse_enum_column, to_json_column};

/// Read every message of a conversation in insertion order.
///
/// `created_at` is not consulted, so a clock step between turns cannot
/// reorder history.
pub(crate) fn select_messages(
    conn: &Connection,
    conversation_id: &str,
) -> Result<Vec<Message>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT id, conversation_id, user_id, role, content, message_type,
                prediction_data, follow_up_questions, created_at
         FROM messages WHERE conversation_id = ?1
         ORDER BY seq ASC",
    )?;
    let rows = stmt.query_map(params![conversation_id], |row| {
        let role: String = row.get(3)?;
        let message_type: String = row.get(5)?;
        let prediction_data: Option<String> = row.get(6)?;
        let follow_ups: String = row.get(7)?;
        Ok(Message {
            id: row.get(0)?,
            conversation_id: row.get(1)?,
            user_id: row.get(2)?,
            role: parse_enum_column(3, &role)?,
            content: row.get(4)?,
            message_type: MessageType::parse_lenient(&message_type),
            prediction_data: prediction_data
                .map(|raw| from_json_column(6, &raw))
                .transpose()?,
            follow_up_questions: from_json_column(7, &follow_ups)?,
            created_at: row.get(8)?,
        })
    })?;
    rows.collect()
}

/// Append a message and increment the conversation's `total_messages`.
///
/// Both writes commit together. Fails with `NotFound` when the
/// conversation does not exist.
pub async fn add_message(
    db: &Database,
    msg: &NewMessage,
    now: DateTime<Utc>,
) -> Result<String, TaimakoError> {
    let id = uuid::Uuid::new_v4().to_string();
    let msg = msg.clone();
    let conversation_id = msg.conversation_id.clone();
    let created_at = format_timestamp(now);
    let row_id = id.clone();
    let inserted = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let exists = tx
                .query_row(
                    "SELECT 1 FROM conversations WHERE id = ?1",
                    params![msg.conversation_id],
                    |_| Ok(()),
                )
                .optional()?;
            if exists.is_none() {
                return Ok(false);
            }
            let prediction_data = msg
                .prediction_data
                .as_ref()
                .map(to_json_column)
                .transpose()?;
            tx.execute(
                "INSERT INTO messages
                 (id, conversation_id, user_id, role, content, message_type,
                  prediction_data, follow_up_questions, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    row_id,
                    msg.conversation_id,
                    msg.user_id,
                    msg.role.to_string(),
                    msg.content,
                    msg.message_type.to_string(),
                    prediction_data,
                    to_json_column(&msg.follow_up_questions)?,
                    created_at,
                ],
            )?;
            tx.execute(
                "UPDATE conversations
                 SET total_messages = total_messages + 1, updated_at = ?1
                 WHERE id = ?2",
                params![created_at, msg.conversation_id],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)?;
    if !inserted {
        return Err(TaimakoError::conversation_not_found(conversation_id));
    }
    Ok(id)
}

/// Get messages for a conversation in insertion order.
pub async fn get_messages(
    db: &Database,
    conversation_id: &str,
) -> Result<Vec<Message>, TaimakoError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| select_messages(conn, &conversation_id))
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taimako_core::types::{NewConversation, Role};
    use tempfile::tempdir;

    use crate::queries::conversations::{create_conversation, get_conversation};

    async fn setup_db_with_conversation() -> (Database, String, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let id = create_conversation(
            &db,
            &NewConversation {
                user_id: "u1".to_string(),
                title: "t".to_string(),
                location: None,
            },
            Utc::now(),
        )
        .await
        .unwrap();
        (db, id, dir)
    }

    #[tokio::test]
    async fn add_message_increments_total_messages() {
        let (db, conv, _dir) = setup_db_with_conversation().await;
        add_message(&db, &NewMessage::user(&conv, "u1", "I have a headache"), Utc::now())
            .await
            .unwrap();
        add_message(&db, &NewMessage::user(&conv, "u1", "and fever"), Utc::now())
            .await
            .unwrap();

        let row = get_conversation(&db, &conv).await.unwrap().unwrap();
        assert_eq!(row.total_messages, 2);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn messages_with_identical_timestamps_keep_insertion_order() {
        let (db, conv, _dir) = setup_db_with_conversation().await;
        let now = Utc::now();
        for text in ["first", "second", "third"] {
            add_message(&db, &NewMessage::user(&conv, "u1", text), now)
                .await
                .unwrap();
        }

        let messages = get_messages(&db, &conv).await.unwrap();
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn backwards_clock_does_not_reorder_history() {
        let (db, conv, _dir) = setup_db_with_conversation().await;
        let now = Utc::now();
        add_message(&db, &NewMessage::user(&conv, "u1", "first"), now)
            .await
            .unwrap();
        add_message(
            &db,
            &NewMessage::user(&conv, "u1", "second"),
            now - chrono::Duration::minutes(5),
        )
        .await
        .unwrap();

        let messages = get_messages(&db, &conv).await.unwrap();
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second"]);
    }

    #[tokio::test]
    async fn prediction_payload_and_follow_ups_survive_storage() {
        let (db, conv, _dir) = setup_db_with_conversation().await;
        let payload = serde_json::json!({"illness": "Malaria", "confidence": 0.85});
        let msg = NewMessage {
            conversation_id: conv.clone(),
            user_id: "u1".to_string(),
            role: Role::Assistant,
            content: "Possible malaria".to_string(),
            message_type: MessageType::Prediction,
            prediction_data: Some(payload.clone()),
            follow_up_questions: vec!["Any chills?".to_string()],
        };
        let id = add_message(&db, &msg, Utc::now()).await.unwrap();

        let stored = get_messages(&db, &conv).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].role, Role::Assistant);
        assert_eq!(stored[0].message_type, MessageType::Prediction);
        assert_eq!(stored[0].prediction_data.as_ref(), Some(&payload));
        assert_eq!(stored[0].follow_up_questions, ["Any chills?"]);
    }

    #[tokio::test]
    async fn add_message_to_missing_conversation_is_not_found() {
        let (db, _conv, _dir) = setup_db_with_conversation().await;
        let err = add_message(&db, &NewMessage::user("ghost", "u1", "hi"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, TaimakoError::NotFound { .. }));
        assert!(get_messages(&db, "ghost").await.unwrap().is_empty());
    }
}
