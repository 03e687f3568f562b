//! postbox library entrypoint.
//!
//! Modules:
//! - `app`: startup, configuration, shared state
//! - `auth`: JWT issuing/verification and password hashing
//! - `compose`: draft lifecycle, send, recipient fan-out
//! - `db`: migrations and SQLite helpers
//! - `error`: failure taxonomy and the uniform response envelope
//! - `http`: Axum router and handlers
//! - `labels`: named label catalog (user-owned message-id sets)
//! - `mailbox`: per-user mailbox entries (folders, flags, custom labels)
//! - `models`: typed records used across layers
//! - `notify`: push notification seam
//! - `users`: user account lookups and registration
//! - `util`: logging setup

pub mod app;
pub mod auth;
pub mod compose;
pub mod db;
pub mod error;
pub mod http;
pub mod labels;
pub mod mailbox;
pub mod models;
pub mod notify;
pub mod users;
pub mod util;
