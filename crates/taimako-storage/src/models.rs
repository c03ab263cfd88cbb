// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities and their column encodings.
//!
//! The canonical types live in `taimako-core::types`; this module re-exports
//! them and holds the helpers that move list and JSON fields in and out of
//! TEXT columns.

use rusqlite::types::Type;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use taimako_core::types::{
    Conversation, ConversationContext, ConversationWithMessages, Message, NewConversation,
    NewMessage,
};

/// Encodes a value as a JSON TEXT column.
pub(crate) fn to_json_column<T: Serialize>(value: &T) -> Result<String, rusqlite::Error> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Decodes a JSON TEXT column read at `idx`.
pub(crate) fn from_json_column<T: DeserializeOwned>(
    idx: usize,
    raw: &str,
) -> Result<T, rusqlite::Error> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Decodes a strum-backed enum column read at `idx`.
pub(crate) fn parse_enum_column<T>(idx: usize, raw: &str) -> Result<T, rusqlite::Error>
where
    T: std::str::FromStr<Err = strum::ParseError>,
{
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
