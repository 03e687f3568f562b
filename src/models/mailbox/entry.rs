//! Database row for a per-user mailbox entry.
//!
//! One row per (user, message) pair: the user's private view over a shared
//! message. The custom label set is stored as a JSON array of strings.

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::folder::Folder;
use crate::error::AppResult;

#[derive(Debug, Clone, FromRow)]
pub struct DbEntry {
  pub id: Uuid,
  pub user_id: Uuid,
  pub message_id: Uuid,
  pub main_folder: String,
  pub previous_folder: Option<String>,
  pub is_read: bool,
  pub is_starred: bool,
  pub custom_labels: String,
}

impl DbEntry {
  pub fn folder(&self) -> Folder {
    Folder::parse(&self.main_folder).unwrap_or(Folder::Inbox)
  }

  pub fn labels(&self) -> AppResult<Vec<String>> {
    Ok(serde_json::from_str(&self.custom_labels)?)
  }
}

/// API view of an entry without the joined message, used by flag endpoints.
#[derive(Debug, Serialize)]
pub struct EntryView {
  pub id: Uuid,
  pub user_id: Uuid,
  pub message_id: Uuid,
  pub main_folder: Folder,
  pub is_read: bool,
  pub is_starred: bool,
  pub custom_labels: Vec<String>,
}

impl EntryView {
  pub fn from_row(row: DbEntry) -> AppResult<Self> {
    let custom_labels = row.labels()?;
    Ok(EntryView {
      id: row.id,
      user_id: row.user_id,
      message_id: row.message_id,
      main_folder: row.folder(),
      is_read: row.is_read,
      is_starred: row.is_starred,
      custom_labels,
    })
  }
}
