//! Database row for a message.
//!
//! The recipient and attachment lists are stored as JSON text, document
//! style. A message is mutable only while `is_draft` is set; after send the
//! row is frozen and only mailbox entries around it change.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::recipient::Recipient;
use crate::{error::AppResult, models::attachment::attachment_ref::AttachmentRef};

#[derive(Debug, Clone, FromRow)]
pub struct DbMessage {
  pub id: Uuid,
  pub sender_id: Uuid,
  pub subject: String,
  pub body: String,
  pub is_draft: bool,
  pub recipients: String,
  pub attachments: String,
  pub reply_to_message_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl DbMessage {
  pub fn recipient_list(&self) -> AppResult<Vec<Recipient>> {
    Ok(serde_json::from_str(&self.recipients)?)
  }

  pub fn attachment_list(&self) -> AppResult<Vec<AttachmentRef>> {
    Ok(serde_json::from_str(&self.attachments)?)
  }
}
