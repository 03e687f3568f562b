//! Message store: draft lifecycle, send transition, recipient fan-out.
//!
//! A message is mutable only by its sender while in draft. Send freezes the
//! record and fans out one inbox entry plus one best-effort push per
//! resolved recipient; a failure for one recipient never blocks the others.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{
  error::{AppError, AppResult},
  mailbox,
  models::{
    attachment::attachment_ref::AttachmentRef,
    mailbox::folder::Folder,
    message::{
      db_message::DbMessage,
      recipient::{Recipient, RecipientRole},
    },
  },
  notify::{self, PushNotifier},
  users,
};

const MSG_COLS: &str =
  "id, sender_id, subject, body, is_draft, recipients, attachments, reply_to_message_id, created_at, updated_at";

/// Recipient as supplied by a client: an address plus the requested role.
#[derive(Debug, Deserialize)]
pub struct RecipientAddress {
  pub address: String,
  pub role: RecipientRole,
}

/// Content for a new draft or a direct send, recipients already resolved.
#[derive(Debug, Default)]
pub struct DraftFields {
  pub subject: Option<String>,
  pub body: Option<String>,
  pub recipients: Vec<Recipient>,
  pub attachments: Vec<AttachmentRef>,
  pub reply_to_message_id: Option<Uuid>,
}

/// Field-level patch for an existing draft. Present fields overwrite;
/// attachments are appended, never replaced.
#[derive(Debug, Default)]
pub struct DraftPatch {
  pub subject: Option<String>,
  pub body: Option<String>,
  pub recipients: Option<Vec<Recipient>>,
  pub attachments: Vec<AttachmentRef>,
}

pub async fn find_message(db: &SqlitePool, id: Uuid) -> AppResult<Option<DbMessage>> {
  let sql = format!("SELECT {MSG_COLS} FROM messages WHERE id = ?");
  let row = sqlx::query_as::<_, DbMessage>(&sql)
    .bind(id)
    .fetch_optional(db)
    .await?;
  Ok(row)
}

async fn get_message(db: &SqlitePool, id: Uuid) -> AppResult<DbMessage> {
  find_message(db, id).await?.ok_or(AppError::NotFound("message"))
}

/// Resolve recipient addresses to user ids. Unresolvable addresses are
/// dropped, not an error; duplicate (user, role) pairs collapse.
pub async fn resolve_recipients(
  db: &SqlitePool,
  requested: &[RecipientAddress],
) -> AppResult<Vec<Recipient>> {
  let mut out: Vec<Recipient> = Vec::new();
  for req in requested {
    match users::find_user_by_email(db, &req.address).await? {
      Some(user) => {
        let candidate = Recipient {
          recipient_id: user.id,
          role: req.role,
        };
        if !out.contains(&candidate) {
          out.push(candidate);
        }
      }
      None => warn!("dropping unresolvable recipient {}", req.address),
    }
  }
  Ok(out)
}

async fn insert_message(
  db: &SqlitePool,
  fields: DraftFields,
  sender_id: Uuid,
  is_draft: bool,
) -> AppResult<DbMessage> {
  let id = Uuid::new_v4();
  let now = Utc::now();
  sqlx::query(&format!(
    "INSERT INTO messages ({MSG_COLS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
  ))
  .bind(id)
  .bind(sender_id)
  .bind(fields.subject.unwrap_or_default())
  .bind(fields.body.unwrap_or_default())
  .bind(is_draft)
  .bind(serde_json::to_string(&fields.recipients)?)
  .bind(serde_json::to_string(&fields.attachments)?)
  .bind(fields.reply_to_message_id)
  .bind(now)
  .bind(now)
  .execute(db)
  .await?;
  get_message(db, id).await
}

/// Create a draft and the sender's `draft` entry (read by default).
pub async fn create_draft(
  db: &SqlitePool,
  fields: DraftFields,
  sender_id: Uuid,
) -> AppResult<DbMessage> {
  let message = insert_message(db, fields, sender_id, true).await?;
  mailbox::place_in_folder(db, message.id, sender_id, Folder::Draft, true).await?;
  Ok(message)
}

/// Merge a patch onto an existing draft. Only the sender may update it and
/// only while it is still a draft.
pub async fn update_draft(
  db: &SqlitePool,
  id: Uuid,
  patch: DraftPatch,
  sender_id: Uuid,
) -> AppResult<DbMessage> {
  let message = get_message(db, id).await?;
  if message.sender_id != sender_id {
    return Err(AppError::NotFound("message"));
  }
  if !message.is_draft {
    return Err(AppError::InvalidState("message is not a draft".to_string()));
  }
  let subject = patch.subject.unwrap_or(message.subject);
  let body = patch.body.unwrap_or(message.body);
  let recipients = match patch.recipients {
    Some(r) => serde_json::to_string(&r)?,
    None => message.recipients,
  };
  let mut attachments = serde_json::from_str::<Vec<AttachmentRef>>(&message.attachments)?;
  attachments.extend(patch.attachments);
  sqlx::query(
    "UPDATE messages SET subject = ?, body = ?, recipients = ?, attachments = ?, updated_at = ? WHERE id = ?",
  )
  .bind(subject)
  .bind(body)
  .bind(recipients)
  .bind(serde_json::to_string(&attachments)?)
  .bind(Utc::now())
  .bind(id)
  .execute(db)
  .await?;
  get_message(db, id).await
}

/// Promote a draft to sent and fan out.
pub async fn send_draft(
  db: &SqlitePool,
  notifier: &dyn PushNotifier,
  id: Uuid,
  sender_id: Uuid,
) -> AppResult<DbMessage> {
  let message = get_message(db, id).await?;
  if message.sender_id != sender_id {
    return Err(AppError::NotFound("message"));
  }
  if !message.is_draft {
    return Err(AppError::InvalidState("message is not a draft".to_string()));
  }
  sqlx::query("UPDATE messages SET is_draft = 0, updated_at = ? WHERE id = ?")
    .bind(Utc::now())
    .bind(id)
    .execute(db)
    .await?;
  let message = get_message(db, id).await?;
  fan_out(db, notifier, &message).await?;
  Ok(message)
}

/// Create-and-send without an intermediate draft; converges on the same
/// fan-out as draft promotion.
pub async fn create_and_send(
  db: &SqlitePool,
  notifier: &dyn PushNotifier,
  fields: DraftFields,
  sender_id: Uuid,
) -> AppResult<DbMessage> {
  let message = insert_message(db, fields, sender_id, false).await?;
  fan_out(db, notifier, &message).await?;
  Ok(message)
}

/// Create the sender's `sent` entry, one `inbox` entry per distinct
/// recipient, and push a notification per recipient. Entry creation and
/// notification are isolated per recipient: a failure is logged and the
/// remaining recipients still get theirs.
async fn fan_out(db: &SqlitePool, notifier: &dyn PushNotifier, message: &DbMessage) -> AppResult<()> {
  mailbox::place_in_folder(db, message.id, message.sender_id, Folder::Sent, true).await?;
  let mut delivered: Vec<Uuid> = Vec::new();
  for recipient in message.recipient_list()? {
    // The sender's entry stays in `sent` even when self-addressed.
    if recipient.recipient_id == message.sender_id || delivered.contains(&recipient.recipient_id) {
      continue;
    }
    delivered.push(recipient.recipient_id);
    if let Err(e) =
      mailbox::place_in_folder(db, message.id, recipient.recipient_id, Folder::Inbox, false).await
    {
      error!(
        "inbox entry for {} on message {} failed: {e}",
        recipient.recipient_id, message.id
      );
      continue;
    }
    notify::notify_recipient(db, notifier, recipient.recipient_id, &message.subject, &message.body)
      .await;
  }
  Ok(())
}
