//! Attachment row for downloads.

use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct AttachmentRow {
  pub id: Uuid,
  pub file_name: Option<String>,
  pub mime_type: String,
  pub content: Vec<u8>,
}
