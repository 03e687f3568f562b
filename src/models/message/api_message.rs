//! API representation of a message as one viewer sees it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{
  db_message::DbMessage,
  recipient::{Recipient, project_recipients},
};
use crate::{
  error::AppResult,
  models::{
    attachment::attachment_ref::AttachmentRef,
    mailbox::{entry::DbEntry, folder::Folder},
  },
};

/// A message joined with the viewer's mailbox entry, recipient list already
/// passed through the visibility projection.
#[derive(Debug, Serialize)]
pub struct MessageView {
  pub id: Uuid,
  pub sender_id: Uuid,
  pub subject: String,
  pub body: String,
  pub is_draft: bool,
  pub recipients: Vec<Recipient>,
  pub attachments: Vec<AttachmentRef>,
  pub reply_to_message_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub main_folder: Folder,
  pub is_read: bool,
  pub is_starred: bool,
  pub custom_labels: Vec<String>,
}

impl MessageView {
  pub fn project(message: DbMessage, entry: &DbEntry, viewer: Uuid) -> AppResult<Self> {
    let recipients = message.recipient_list()?;
    let attachments = message.attachment_list()?;
    let custom_labels = entry.labels()?;
    Ok(MessageView {
      id: message.id,
      sender_id: message.sender_id,
      subject: message.subject,
      body: message.body,
      is_draft: message.is_draft,
      recipients: project_recipients(viewer, message.sender_id, &recipients),
      attachments,
      reply_to_message_id: message.reply_to_message_id,
      created_at: message.created_at,
      updated_at: message.updated_at,
      main_folder: entry.folder(),
      is_read: entry.is_read,
      is_starred: entry.is_starred,
      custom_labels,
    })
  }
}
