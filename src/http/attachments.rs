//! Attachment upload and download.
//!
//! Upload stores each file and returns the metadata callers embed in draft
//! and send payloads; an upload failure fails the whole request.

use axum::{
  extract::{Multipart, Path as AxumPath, State},
  http::{HeaderMap, HeaderValue, StatusCode, header},
  response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
  app::AppState,
  auth::AuthUser,
  error::{AppError, AppResult, ok},
  models::attachment::{attachment_ref::AttachmentRef, attachment_row::AttachmentRow},
};

pub async fn upload_attachments(
  State(state): State<AppState>,
  AuthUser(_user_id): AuthUser,
  mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
  let mut out: Vec<AttachmentRef> = Vec::new();
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|_| AppError::InvalidState("malformed upload".to_string()))?
  {
    let file_name = field.file_name().map(|s| s.to_string());
    let mime_type = field
      .content_type()
      .map(|s| s.to_string())
      .unwrap_or_else(|| "application/octet-stream".to_string());
    let data = field
      .bytes()
      .await
      .map_err(|_| AppError::InvalidState("malformed upload".to_string()))?;
    let size = data.len() as i64;
    let id = Uuid::new_v4();
    sqlx::query(
      "INSERT INTO attachments (id, file_name, mime_type, size, content, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&file_name)
    .bind(&mime_type)
    .bind(size)
    .bind(data.to_vec())
    .bind(Utc::now())
    .execute(&state.db)
    .await?;
    out.push(AttachmentRef {
      file_name: file_name.unwrap_or_else(|| "attachment".to_string()),
      file_url: format!("/attachments/{id}/download"),
      mime_type,
      size: Some(size),
    });
  }
  Ok(ok("Upload Successfully", out))
}

pub async fn download_attachment(
  State(state): State<AppState>,
  AxumPath(att_id): AxumPath<Uuid>,
) -> AppResult<impl IntoResponse> {
  let row: Option<AttachmentRow> =
    sqlx::query_as("SELECT id, file_name, mime_type, content FROM attachments WHERE id = ?")
      .bind(att_id)
      .fetch_optional(&state.db)
      .await?;
  let Some(a) = row else {
    return Err(AppError::NotFound("attachment"));
  };
  let mut headers = HeaderMap::new();
  headers.insert(
    header::CONTENT_TYPE,
    a.mime_type
      .parse()
      .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
  );
  if let Some(name) = a.file_name {
    if let Ok(value) = format!("inline; filename=\"{}\"", name).parse() {
      headers.insert(header::CONTENT_DISPOSITION, value);
    }
  }
  Ok((StatusCode::OK, headers, a.content))
}
