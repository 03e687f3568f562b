//! Typed records used across layers.

pub mod attachment;
pub mod label;
pub mod mailbox;
pub mod message;
pub mod user;
