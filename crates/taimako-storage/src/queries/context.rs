// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation context read and upsert.

use rusqlite::{OptionalExtension, params};
use taimako_core::TaimakoError;
use taimako_core::types::ConversationStage;

use crate::database::{Database, map_tr_err};
use crate::models::{ConversationContext, from_json_column, to_json_column};

/// Get the context row for a conversation.
pub async fn get_context(
    db: &Database,
    conversation_id: &str,
) -> Result<Option<ConversationContext>, TaimakoError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT conversation_id, extracted_symptoms, current_concerns,
                        conversation_stage, updated_at
                 FROM conversation_context WHERE conversation_id = ?1",
                params![conversation_id],
                |row| {
                    let symptoms: String = row.get(1)?;
                    let concerns: String = row.get(2)?;
                    let stage: String = row.get(3)?;
                    Ok(ConversationContext {
                        conversation_id: row.get(0)?,
                        extracted_symptoms: from_json_column(1, &symptoms)?,
                        current_concerns: from_json_column(2, &concerns)?,
                        conversation_stage: ConversationStage::parse_lenient(&stage),
                        updated_at: row.get(4)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert the context row or replace every column of the existing one.
pub async fn upsert_context(
    db: &Database,
    context: &ConversationContext,
) -> Result<(), TaimakoError> {
    let context = context.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversation_context
                 (conversation_id, extracted_symptoms, current_concerns, conversation_stage, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(conversation_id) DO UPDATE SET
                    extracted_symptoms = excluded.extracted_symptoms,
                    current_concerns = excluded.current_concerns,
                    conversation_stage = excluded.conversation_stage,
                    updated_at = excluded.updated_at",
                params![
                    context.conversation_id,
                    to_json_column(&context.extracted_symptoms)?,
                    to_json_column(&context.current_concerns)?,
                    context.conversation_stage.to_string(),
                    context.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
