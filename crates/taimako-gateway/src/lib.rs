// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Taimako triage service.
//!
//! Routes:
//! - `POST /v1/chat` runs one chat turn (bearer auth when configured)
//! - `GET /health` reports liveness, version, and uptime

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{GatewayState, ServerConfig, build_router, start_server};
