//! Draft create/update handlers.

use axum::{
  Json,
  extract::{Path as AxumPath, State},
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  app::AppState,
  auth::AuthUser,
  compose::{self, DraftFields, DraftPatch, RecipientAddress},
  error::{AppResult, ok},
  mailbox,
  models::attachment::attachment_ref::AttachmentRef,
};

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
  pub subject: Option<String>,
  pub body: Option<String>,
  #[serde(default)]
  pub recipients: Vec<RecipientAddress>,
  #[serde(default)]
  pub attachments: Vec<AttachmentRef>,
  pub reply_to_message_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct DraftUpdateRequest {
  pub subject: Option<String>,
  pub body: Option<String>,
  pub recipients: Option<Vec<RecipientAddress>>,
  #[serde(default)]
  pub attachments: Vec<AttachmentRef>,
}

pub async fn create_draft(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  Json(req): Json<DraftRequest>,
) -> AppResult<impl IntoResponse> {
  let recipients = compose::resolve_recipients(&state.db, &req.recipients).await?;
  let fields = DraftFields {
    subject: req.subject,
    body: req.body,
    recipients,
    attachments: req.attachments,
    reply_to_message_id: req.reply_to_message_id,
  };
  let message = compose::create_draft(&state.db, fields, user_id).await?;
  let view = mailbox::view_message(&state.db, message.id, user_id).await?;
  Ok(ok("Create Email Draft Successfully", view))
}

pub async fn update_draft(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  AxumPath(id): AxumPath<Uuid>,
  Json(req): Json<DraftUpdateRequest>,
) -> AppResult<impl IntoResponse> {
  let recipients = match req.recipients {
    Some(r) => Some(compose::resolve_recipients(&state.db, &r).await?),
    None => None,
  };
  let patch = DraftPatch {
    subject: req.subject,
    body: req.body,
    recipients,
    attachments: req.attachments,
  };
  let message = compose::update_draft(&state.db, id, patch, user_id).await?;
  let view = mailbox::view_message(&state.db, message.id, user_id).await?;
  Ok(ok("Update Email Draft Successfully", view))
}
