//! Per-user mailbox entries: folder placement, flags, custom labels.
//!
//! One entry exists per (user, message) pair for every participant of a
//! message and nobody else. All user-visible mail state lives here; the
//! shared message record is never touched after send. Operations addressing
//! a pair with no entry fail with NotFound rather than creating one.

use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use crate::{
  compose,
  error::{AppError, AppResult},
  models::{
    mailbox::{entry::DbEntry, folder::Folder},
    message::api_message::MessageView,
  },
};

const ENTRY_COLS: &str =
  "id, user_id, message_id, main_folder, previous_folder, is_read, is_starred, custom_labels";

pub async fn find_entry(
  db: &SqlitePool,
  message_id: Uuid,
  user_id: Uuid,
) -> AppResult<Option<DbEntry>> {
  let sql = format!(
    "SELECT {ENTRY_COLS} FROM mailbox_entries WHERE message_id = ? AND user_id = ?"
  );
  let row = sqlx::query_as::<_, DbEntry>(&sql)
    .bind(message_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
  Ok(row)
}

/// Fetch the caller's entry; NotFound when the caller is neither sender nor
/// recipient of the message.
pub async fn get_entry(db: &SqlitePool, message_id: Uuid, user_id: Uuid) -> AppResult<DbEntry> {
  find_entry(db, message_id, user_id)
    .await?
    .ok_or(AppError::NotFound("mailbox entry"))
}

/// Idempotent upsert used at draft-create and send fan-out. An existing
/// entry keeps its flags and labels apart from folder and read state.
pub async fn place_in_folder(
  db: &SqlitePool,
  message_id: Uuid,
  user_id: Uuid,
  folder: Folder,
  is_read: bool,
) -> AppResult<()> {
  sqlx::query(
    "INSERT INTO mailbox_entries (id, user_id, message_id, main_folder, previous_folder, is_read, is_starred, custom_labels) \
     VALUES (?, ?, ?, ?, NULL, ?, 0, '[]') \
     ON CONFLICT(user_id, message_id) DO UPDATE SET main_folder = excluded.main_folder, is_read = excluded.is_read",
  )
  .bind(Uuid::new_v4())
  .bind(user_id)
  .bind(message_id)
  .bind(folder.as_str())
  .bind(is_read)
  .execute(db)
  .await?;
  Ok(())
}

/// Flip the star on the caller's entry only.
pub async fn toggle_star(db: &SqlitePool, message_id: Uuid, user_id: Uuid) -> AppResult<DbEntry> {
  let entry = get_entry(db, message_id, user_id).await?;
  sqlx::query("UPDATE mailbox_entries SET is_starred = ? WHERE id = ?")
    .bind(!entry.is_starred)
    .bind(entry.id)
    .execute(db)
    .await?;
  get_entry(db, message_id, user_id).await
}

/// Monotonic: marks read, never un-reads.
pub async fn mark_read(db: &SqlitePool, message_id: Uuid, user_id: Uuid) -> AppResult<DbEntry> {
  let entry = get_entry(db, message_id, user_id).await?;
  sqlx::query("UPDATE mailbox_entries SET is_read = 1 WHERE id = ?")
    .bind(entry.id)
    .execute(db)
    .await?;
  get_entry(db, message_id, user_id).await
}

/// Toggle: into trash remembering the prior folder, or out of trash back to
/// it (inbox when unset). Affects the caller's entry only.
pub async fn move_to_trash(db: &SqlitePool, message_id: Uuid, user_id: Uuid) -> AppResult<DbEntry> {
  let entry = get_entry(db, message_id, user_id).await?;
  if entry.folder() == Folder::Trash {
    let restore = entry
      .previous_folder
      .as_deref()
      .and_then(Folder::parse)
      .unwrap_or(Folder::Inbox);
    sqlx::query("UPDATE mailbox_entries SET main_folder = ?, previous_folder = NULL WHERE id = ?")
      .bind(restore.as_str())
      .bind(entry.id)
      .execute(db)
      .await?;
  } else {
    sqlx::query("UPDATE mailbox_entries SET main_folder = 'trash', previous_folder = ? WHERE id = ?")
      .bind(&entry.main_folder)
      .bind(entry.id)
      .execute(db)
      .await?;
  }
  get_entry(db, message_id, user_id).await
}

/// Delete the caller's trashed entry. When the last entry referencing a
/// message goes, the message record itself is reclaimed.
pub async fn purge(db: &SqlitePool, message_id: Uuid, user_id: Uuid) -> AppResult<()> {
  let entry = get_entry(db, message_id, user_id).await?;
  if entry.folder() != Folder::Trash {
    return Err(AppError::InvalidState(
      "only messages in trash can be deleted".to_string(),
    ));
  }
  sqlx::query("DELETE FROM mailbox_entries WHERE id = ?")
    .bind(entry.id)
    .execute(db)
    .await?;
  let (remaining,): (i64,) =
    sqlx::query_as("SELECT COUNT(*) FROM mailbox_entries WHERE message_id = ?")
      .bind(message_id)
      .fetch_one(db)
      .await?;
  if remaining == 0 {
    sqlx::query("DELETE FROM messages WHERE id = ?")
      .bind(message_id)
      .execute(db)
      .await?;
  }
  Ok(())
}

/// Tag each listed message with a custom label, idempotently. Fails with
/// NotFound if any message has no entry for the caller.
pub async fn add_label(
  db: &SqlitePool,
  message_ids: &[Uuid],
  user_id: Uuid,
  label: &str,
) -> AppResult<usize> {
  let mut entries = Vec::with_capacity(message_ids.len());
  for id in message_ids {
    entries.push(get_entry(db, *id, user_id).await?);
  }
  let mut tagged = 0;
  for entry in entries {
    let mut labels = entry.labels()?;
    if !labels.iter().any(|l| l == label) {
      labels.push(label.to_string());
      sqlx::query("UPDATE mailbox_entries SET custom_labels = ? WHERE id = ?")
        .bind(serde_json::to_string(&labels)?)
        .bind(entry.id)
        .execute(db)
        .await?;
      tagged += 1;
    }
  }
  Ok(tagged)
}

/// Strip a custom label from every entry the user owns.
pub async fn remove_label(db: &SqlitePool, user_id: Uuid, label: &str) -> AppResult<usize> {
  let entries = user_entries(db, user_id).await?;
  let mut stripped = 0;
  for entry in entries {
    let labels = entry.labels()?;
    if labels.iter().any(|l| l == label) {
      let kept: Vec<&String> = labels.iter().filter(|l| l.as_str() != label).collect();
      sqlx::query("UPDATE mailbox_entries SET custom_labels = ? WHERE id = ?")
        .bind(serde_json::to_string(&kept)?)
        .bind(entry.id)
        .execute(db)
        .await?;
      stripped += 1;
    }
  }
  Ok(stripped)
}

async fn user_entries(db: &SqlitePool, user_id: Uuid) -> AppResult<Vec<DbEntry>> {
  let sql = format!("SELECT {ENTRY_COLS} FROM mailbox_entries WHERE user_id = ?");
  Ok(
    sqlx::query_as::<_, DbEntry>(&sql)
      .bind(user_id)
      .fetch_all(db)
      .await?,
  )
}

/// Join entries with their messages and run the visibility projection.
/// An entry whose message is gone is skipped with a warning, not an error.
async fn project_entries(
  db: &SqlitePool,
  entries: Vec<DbEntry>,
  viewer: Uuid,
) -> AppResult<Vec<MessageView>> {
  let mut out = Vec::with_capacity(entries.len());
  for entry in entries {
    match compose::find_message(db, entry.message_id).await? {
      Some(message) => out.push(MessageView::project(message, &entry, viewer)?),
      None => warn!(
        "entry {} references missing message {}, skipping",
        entry.id, entry.message_id
      ),
    }
  }
  out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
  Ok(out)
}

pub async fn list_by_folder(
  db: &SqlitePool,
  user_id: Uuid,
  folder: Folder,
) -> AppResult<Vec<MessageView>> {
  let sql = format!(
    "SELECT {ENTRY_COLS} FROM mailbox_entries WHERE user_id = ? AND main_folder = ?"
  );
  let entries = sqlx::query_as::<_, DbEntry>(&sql)
    .bind(user_id)
    .bind(folder.as_str())
    .fetch_all(db)
    .await?;
  project_entries(db, entries, user_id).await
}

pub async fn list_starred(db: &SqlitePool, user_id: Uuid) -> AppResult<Vec<MessageView>> {
  let sql = format!(
    "SELECT {ENTRY_COLS} FROM mailbox_entries WHERE user_id = ? AND is_starred = 1"
  );
  let entries = sqlx::query_as::<_, DbEntry>(&sql)
    .bind(user_id)
    .fetch_all(db)
    .await?;
  project_entries(db, entries, user_id).await
}

pub async fn list_by_custom_label(
  db: &SqlitePool,
  user_id: Uuid,
  label: &str,
) -> AppResult<Vec<MessageView>> {
  let mut tagged = Vec::new();
  for entry in user_entries(db, user_id).await? {
    if entry.labels()?.iter().any(|l| l == label) {
      tagged.push(entry);
    }
  }
  project_entries(db, tagged, user_id).await
}

/// Case-insensitive substring match over subject, body and custom labels,
/// scoped to the caller's own entries.
pub async fn search_by_keyword(
  db: &SqlitePool,
  user_id: Uuid,
  keyword: &str,
) -> AppResult<Vec<MessageView>> {
  let needle = keyword.to_lowercase();
  let entries = user_entries(db, user_id).await?;
  let views = project_entries(db, entries, user_id).await?;
  Ok(
    views
      .into_iter()
      .filter(|v| {
        v.subject.to_lowercase().contains(&needle)
          || v.body.to_lowercase().contains(&needle)
          || v.custom_labels.iter().any(|l| l.to_lowercase().contains(&needle))
      })
      .collect(),
  )
}

/// One message as the caller sees it; NotFound unless the caller holds an
/// entry and the message still exists.
pub async fn view_message(
  db: &SqlitePool,
  message_id: Uuid,
  viewer: Uuid,
) -> AppResult<MessageView> {
  let entry = get_entry(db, message_id, viewer).await?;
  let message = compose::find_message(db, message_id)
    .await?
    .ok_or(AppError::NotFound("message"))?;
  MessageView::project(message, &entry, viewer)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    compose::{self, DraftFields},
    db,
    models::message::recipient::{Recipient, RecipientRole},
    notify::LogNotifier,
  };
  use sqlx::sqlite::SqlitePoolOptions;

  async fn pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
      .max_connections(1)
      .connect("sqlite::memory:")
      .await
      .expect("connect memory sqlite");
    db::run_migrations(&pool).await.expect("migrate");
    pool
  }

  fn to(recipient_id: Uuid) -> Recipient {
    Recipient {
      recipient_id,
      role: RecipientRole::To,
    }
  }

  async fn send(db: &SqlitePool, sender: Uuid, recipients: Vec<Recipient>) -> Uuid {
    let fields = DraftFields {
      subject: Some("hello".to_string()),
      body: Some("body text".to_string()),
      recipients,
      ..Default::default()
    };
    compose::create_and_send(db, &LogNotifier, fields, sender)
      .await
      .expect("send")
      .id
  }

  #[tokio::test]
  async fn fan_out_creates_exactly_one_entry_per_participant() {
    let db = pool().await;
    let (sender, r1, r2) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let id = send(&db, sender, vec![to(r1), to(r2)]).await;

    assert_eq!(get_entry(&db, id, sender).await.unwrap().folder(), Folder::Sent);
    assert!(get_entry(&db, id, sender).await.unwrap().is_read);
    for r in [r1, r2] {
      let entry = get_entry(&db, id, r).await.unwrap();
      assert_eq!(entry.folder(), Folder::Inbox);
      assert!(!entry.is_read);
    }
    let (count,): (i64,) =
      sqlx::query_as("SELECT COUNT(*) FROM mailbox_entries WHERE message_id = ?")
        .bind(id)
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(count, 3);
  }

  #[tokio::test]
  async fn operations_on_missing_entry_fail_without_creating_one() {
    let db = pool().await;
    let (sender, r1) = (Uuid::new_v4(), Uuid::new_v4());
    let id = send(&db, sender, vec![to(r1)]).await;
    let stranger = Uuid::new_v4();

    assert!(matches!(
      toggle_star(&db, id, stranger).await,
      Err(AppError::NotFound(_))
    ));
    assert!(matches!(
      mark_read(&db, id, stranger).await,
      Err(AppError::NotFound(_))
    ));
    assert!(find_entry(&db, id, stranger).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn mark_read_is_idempotent() {
    let db = pool().await;
    let (sender, r1) = (Uuid::new_v4(), Uuid::new_v4());
    let id = send(&db, sender, vec![to(r1)]).await;

    let once = mark_read(&db, id, r1).await.unwrap();
    let twice = mark_read(&db, id, r1).await.unwrap();
    assert!(once.is_read);
    assert!(twice.is_read);
  }

  #[tokio::test]
  async fn trash_toggle_round_trips_to_the_original_folder() {
    let db = pool().await;
    let (sender, r1) = (Uuid::new_v4(), Uuid::new_v4());
    let id = send(&db, sender, vec![to(r1)]).await;

    let trashed = move_to_trash(&db, id, sender).await.unwrap();
    assert_eq!(trashed.folder(), Folder::Trash);
    assert_eq!(trashed.previous_folder.as_deref(), Some("sent"));

    let restored = move_to_trash(&db, id, sender).await.unwrap();
    assert_eq!(restored.folder(), Folder::Sent);
    assert!(restored.previous_folder.is_none());

    // Recipient's entry was never touched.
    assert_eq!(get_entry(&db, id, r1).await.unwrap().folder(), Folder::Inbox);
  }

  #[tokio::test]
  async fn purge_is_trash_only_and_reclaims_the_message_last() {
    let db = pool().await;
    let (sender, r1) = (Uuid::new_v4(), Uuid::new_v4());
    let id = send(&db, sender, vec![to(r1)]).await;

    assert!(matches!(
      purge(&db, id, sender).await,
      Err(AppError::InvalidState(_))
    ));

    move_to_trash(&db, id, sender).await.unwrap();
    purge(&db, id, sender).await.unwrap();
    assert!(compose::find_message(&db, id).await.unwrap().is_some());

    move_to_trash(&db, id, r1).await.unwrap();
    purge(&db, id, r1).await.unwrap();
    assert!(compose::find_message(&db, id).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn remove_label_strips_every_entry_of_the_user() {
    let db = pool().await;
    let (sender, r1) = (Uuid::new_v4(), Uuid::new_v4());
    let m1 = send(&db, sender, vec![to(r1)]).await;
    let m2 = send(&db, sender, vec![to(r1)]).await;

    add_label(&db, &[m1, m2], r1, "work").await.unwrap();
    // Adding again is a no-op.
    assert_eq!(add_label(&db, &[m1], r1, "work").await.unwrap(), 0);

    assert_eq!(remove_label(&db, r1, "work").await.unwrap(), 2);
    for m in [m1, m2] {
      assert!(get_entry(&db, m, r1).await.unwrap().labels().unwrap().is_empty());
    }
  }

  #[tokio::test]
  async fn keyword_search_scans_subject_body_and_labels() {
    let db = pool().await;
    let (sender, r1) = (Uuid::new_v4(), Uuid::new_v4());
    let id = send(&db, sender, vec![to(r1)]).await;
    add_label(&db, &[id], r1, "Invoices").await.unwrap();

    assert_eq!(search_by_keyword(&db, r1, "HELLO").await.unwrap().len(), 1);
    assert_eq!(search_by_keyword(&db, r1, "body").await.unwrap().len(), 1);
    assert_eq!(search_by_keyword(&db, r1, "invoice").await.unwrap().len(), 1);
    assert!(search_by_keyword(&db, r1, "nothing").await.unwrap().is_empty());
    // Results are scoped to the caller's own entries.
    assert!(search_by_keyword(&db, Uuid::new_v4(), "hello").await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn bcc_recipients_stay_hidden_from_everyone_else() {
    let db = pool().await;
    let (sender, a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let recipients = vec![
      Recipient { recipient_id: a, role: RecipientRole::To },
      Recipient { recipient_id: b, role: RecipientRole::Cc },
      Recipient { recipient_id: c, role: RecipientRole::Bcc },
    ];
    let id = send(&db, sender, recipients).await;

    let as_a = view_message(&db, id, a).await.unwrap();
    assert_eq!(as_a.recipients.len(), 1);
    assert_eq!(as_a.recipients[0].recipient_id, a);

    let as_b = view_message(&db, id, b).await.unwrap();
    assert_eq!(as_b.recipients.len(), 2);
    assert!(as_b.recipients.iter().all(|r| r.recipient_id != c));

    let as_c = view_message(&db, id, c).await.unwrap();
    assert_eq!(as_c.recipients.len(), 1);
    assert_eq!(as_c.recipients[0].recipient_id, c);

    let as_sender = view_message(&db, id, sender).await.unwrap();
    assert_eq!(as_sender.recipients.len(), 3);
  }

  #[tokio::test]
  async fn entries_referencing_missing_messages_are_skipped_in_lists() {
    let db = pool().await;
    let (sender, r1) = (Uuid::new_v4(), Uuid::new_v4());
    let id = send(&db, sender, vec![to(r1)]).await;
    // Simulate the accepted cross-document inconsistency.
    sqlx::query("DELETE FROM messages WHERE id = ?")
      .bind(id)
      .execute(&db)
      .await
      .unwrap();

    assert!(list_by_folder(&db, r1, Folder::Inbox).await.unwrap().is_empty());
  }
}
