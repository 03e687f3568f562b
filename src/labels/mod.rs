//! Named label catalog: user-owned sets of message ids.
//!
//! Independent of the per-entry custom label tags. A label may reference a
//! message that has since been deleted; reads skip those with a warning.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use crate::{
  error::{AppError, AppResult},
  mailbox,
  models::{label::label_row::DbLabel, message::api_message::MessageView},
};

const LABEL_COLS: &str = "id, label_name, user_id, email_ids, created_at";

pub async fn find_label(
  db: &SqlitePool,
  name: &str,
  user_id: Uuid,
) -> AppResult<Option<DbLabel>> {
  let sql = format!("SELECT {LABEL_COLS} FROM labels WHERE user_id = ? AND label_name = ?");
  let row = sqlx::query_as::<_, DbLabel>(&sql)
    .bind(user_id)
    .bind(name)
    .fetch_optional(db)
    .await?;
  Ok(row)
}

async fn get_label(db: &SqlitePool, name: &str, user_id: Uuid) -> AppResult<DbLabel> {
  find_label(db, name, user_id)
    .await?
    .ok_or(AppError::NotFound("label"))
}

/// Create a label; Conflict when the user already has one by that name.
pub async fn create_label(db: &SqlitePool, name: &str, user_id: Uuid) -> AppResult<DbLabel> {
  if find_label(db, name, user_id).await?.is_some() {
    return Err(AppError::Conflict("label already exists".to_string()));
  }
  let id = Uuid::new_v4();
  sqlx::query(&format!(
    "INSERT INTO labels ({LABEL_COLS}) VALUES (?, ?, ?, '[]', ?)"
  ))
  .bind(id)
  .bind(name)
  .bind(user_id)
  .bind(Utc::now())
  .execute(db)
  .await?;
  get_label(db, name, user_id).await
}

pub async fn list_labels(db: &SqlitePool, user_id: Uuid) -> AppResult<Vec<DbLabel>> {
  let sql =
    format!("SELECT {LABEL_COLS} FROM labels WHERE user_id = ? ORDER BY created_at ASC");
  Ok(
    sqlx::query_as::<_, DbLabel>(&sql)
      .bind(user_id)
      .fetch_all(db)
      .await?,
  )
}

/// Set union; no existence check against the message store.
pub async fn add_emails(
  db: &SqlitePool,
  name: &str,
  user_id: Uuid,
  message_ids: &[Uuid],
) -> AppResult<DbLabel> {
  let label = get_label(db, name, user_id).await?;
  let mut ids = label.ids()?;
  for id in message_ids {
    if !ids.contains(id) {
      ids.push(*id);
    }
  }
  update_ids(db, label.id, &ids).await?;
  get_label(db, name, user_id).await
}

/// Set difference.
pub async fn remove_emails(
  db: &SqlitePool,
  name: &str,
  user_id: Uuid,
  message_ids: &[Uuid],
) -> AppResult<DbLabel> {
  let label = get_label(db, name, user_id).await?;
  let ids: Vec<Uuid> = label
    .ids()?
    .into_iter()
    .filter(|id| !message_ids.contains(id))
    .collect();
  update_ids(db, label.id, &ids).await?;
  get_label(db, name, user_id).await
}

async fn update_ids(db: &SqlitePool, label_id: Uuid, ids: &[Uuid]) -> AppResult<()> {
  sqlx::query("UPDATE labels SET email_ids = ? WHERE id = ?")
    .bind(serde_json::to_string(ids)?)
    .bind(label_id)
    .execute(db)
    .await?;
  Ok(())
}

/// Resolve every labeled message through the caller's visibility-projected
/// mailbox lookup. Ids the caller cannot see (or that no longer exist) are
/// skipped with a warning.
pub async fn list_emails(
  db: &SqlitePool,
  name: &str,
  user_id: Uuid,
) -> AppResult<Vec<MessageView>> {
  let label = get_label(db, name, user_id).await?;
  let mut out = Vec::new();
  for message_id in label.ids()? {
    match mailbox::view_message(db, message_id, user_id).await {
      Ok(view) => out.push(view),
      Err(AppError::NotFound(_)) => {
        warn!("label {name}: message {message_id} missing or not visible to {user_id}, skipping");
      }
      Err(e) => return Err(e),
    }
  }
  Ok(out)
}

/// Remove the label record only; referenced messages and entries stay.
pub async fn delete_label(db: &SqlitePool, name: &str, user_id: Uuid) -> AppResult<()> {
  let label = get_label(db, name, user_id).await?;
  sqlx::query("DELETE FROM labels WHERE id = ?")
    .bind(label.id)
    .execute(db)
    .await?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    compose::{self, DraftFields},
    db, mailbox,
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

  #[tokio::test]
  async fn duplicate_label_names_conflict_per_user_only() {
    let db = pool().await;
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    create_label(&db, "travel", alice).await.unwrap();
    assert!(matches!(
      create_label(&db, "travel", alice).await,
      Err(AppError::Conflict(_))
    ));
    // Another user may reuse the name.
    create_label(&db, "travel", bob).await.unwrap();
  }

  #[tokio::test]
  async fn email_sets_grow_and_shrink_as_sets() {
    let db = pool().await;
    let user = Uuid::new_v4();
    create_label(&db, "travel", user).await.unwrap();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    let label = add_emails(&db, "travel", user, &[a, b, a]).await.unwrap();
    assert_eq!(label.ids().unwrap(), vec![a, b]);

    let label = add_emails(&db, "travel", user, &[b]).await.unwrap();
    assert_eq!(label.ids().unwrap(), vec![a, b]);

    let label = remove_emails(&db, "travel", user, &[a]).await.unwrap();
    assert_eq!(label.ids().unwrap(), vec![b]);
  }

  #[tokio::test]
  async fn listing_skips_missing_and_unauthorized_messages() {
    let db = pool().await;
    let (sender, recipient) = (Uuid::new_v4(), Uuid::new_v4());
    let message = compose::create_and_send(
      &db,
      &LogNotifier,
      DraftFields {
        subject: Some("kept".to_string()),
        recipients: vec![Recipient {
          recipient_id: recipient,
          role: RecipientRole::To,
        }],
        ..Default::default()
      },
      sender,
    )
    .await
    .unwrap();
    // A second message the label owner cannot see.
    let foreign = compose::create_and_send(
      &db,
      &LogNotifier,
      DraftFields::default(),
      Uuid::new_v4(),
    )
    .await
    .unwrap();

    create_label(&db, "mixed", recipient).await.unwrap();
    add_emails(&db, "mixed", recipient, &[message.id, foreign.id, Uuid::new_v4()])
      .await
      .unwrap();

    let views = list_emails(&db, "mixed", recipient).await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].subject, "kept");
  }

  #[tokio::test]
  async fn deleting_a_label_leaves_mailbox_entries_alone() {
    let db = pool().await;
    let (sender, recipient) = (Uuid::new_v4(), Uuid::new_v4());
    let message = compose::create_and_send(
      &db,
      &LogNotifier,
      DraftFields {
        recipients: vec![Recipient {
          recipient_id: recipient,
          role: RecipientRole::To,
        }],
        ..Default::default()
      },
      sender,
    )
    .await
    .unwrap();

    create_label(&db, "temp", recipient).await.unwrap();
    add_emails(&db, "temp", recipient, &[message.id]).await.unwrap();
    delete_label(&db, "temp", recipient).await.unwrap();

    assert!(matches!(
      delete_label(&db, "temp", recipient).await,
      Err(AppError::NotFound(_))
    ));
    assert!(mailbox::find_entry(&db, message.id, recipient).await.unwrap().is_some());
    assert!(compose::find_message(&db, message.id).await.unwrap().is_some());
  }
}
