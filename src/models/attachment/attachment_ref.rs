//! Attachment reference embedded in a message record.
//!
//! What the upload endpoint hands back and what send/draft payloads carry;
//! `file_url` points at the download endpoint for locally stored blobs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
  pub file_name: String,
  pub file_url: String,
  pub mime_type: String,
  pub size: Option<i64>,
}
