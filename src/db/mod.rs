//! Database helpers: migrations and path handling.

use sqlx::SqlitePool;
use std::path::Path;

/// Run SQLite migrations to create tables if absent.
///
/// Three logical collections back the mail core (messages, mailbox_entries,
/// labels); users, push_tokens and attachments support the auth and upload
/// surfaces. mailbox_entries is unique on (user_id, message_id) and indexed
/// for the folder and starred list queries.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
  sqlx::query(
    r#"CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            avatar TEXT NULL,
            phone_number TEXT NOT NULL UNIQUE
        )"#,
  )
  .execute(pool)
  .await?;

  sqlx::query(
    r#"CREATE TABLE IF NOT EXISTS push_tokens (
            user_id TEXT PRIMARY KEY,
            token TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )"#,
  )
  .execute(pool)
  .await?;

  sqlx::query(
    r#"CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            sender_id TEXT NOT NULL,
            subject TEXT NOT NULL DEFAULT '',
            body TEXT NOT NULL DEFAULT '',
            is_draft INTEGER NOT NULL,
            recipients TEXT NOT NULL,
            attachments TEXT NOT NULL,
            reply_to_message_id TEXT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )"#,
  )
  .execute(pool)
  .await?;

  sqlx::query(
    r#"CREATE TABLE IF NOT EXISTS mailbox_entries (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            message_id TEXT NOT NULL,
            main_folder TEXT NOT NULL,
            previous_folder TEXT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            is_starred INTEGER NOT NULL DEFAULT 0,
            custom_labels TEXT NOT NULL DEFAULT '[]',
            UNIQUE(user_id, message_id)
        )"#,
  )
  .execute(pool)
  .await?;

  sqlx::query(
    "CREATE INDEX IF NOT EXISTS idx_entries_user_folder ON mailbox_entries (user_id, main_folder)",
  )
  .execute(pool)
  .await?;

  sqlx::query(
    "CREATE INDEX IF NOT EXISTS idx_entries_user_starred ON mailbox_entries (user_id, is_starred)",
  )
  .execute(pool)
  .await?;

  sqlx::query(
    r#"CREATE TABLE IF NOT EXISTS labels (
            id TEXT PRIMARY KEY,
            label_name TEXT NOT NULL,
            user_id TEXT NOT NULL,
            email_ids TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            UNIQUE(user_id, label_name)
        )"#,
  )
  .execute(pool)
  .await?;

  sqlx::query(
    r#"CREATE TABLE IF NOT EXISTS attachments (
            id TEXT PRIMARY KEY,
            file_name TEXT NULL,
            mime_type TEXT NOT NULL,
            size INTEGER NOT NULL,
            content BLOB NOT NULL,
            created_at TEXT NOT NULL
        )"#,
  )
  .execute(pool)
  .await?;
  Ok(())
}

/// Ensure SQLite file and parent folder exist for a given sqlx URL.
pub fn ensure_sqlite_path(db_url: &str) -> String {
  if !db_url.starts_with("sqlite:") {
    return db_url.to_string();
  }
  let path_part = db_url.trim_start_matches("sqlite://");
  if path_part == ":memory:" {
    return db_url.to_string();
  }
  let (path_only, _) = match path_part.split_once('?') {
    Some((p, q)) => (p, Some(q)),
    None => (path_part, None),
  };
  if !path_only.is_empty() {
    let p = Path::new(path_only);
    if let Some(parent) = p.parent() {
      if !parent.as_os_str().is_empty() {
        let _ = std::fs::create_dir_all(parent);
      }
    }
    let _ = std::fs::OpenOptions::new()
      .create(true)
      .append(true)
      .open(p);
  }
  db_url.to_string()
}
