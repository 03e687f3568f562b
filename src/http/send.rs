//! Send handlers: draft promotion and direct create-and-send.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::drafts::DraftRequest;
use crate::{
  app::AppState,
  auth::AuthUser,
  compose::{self, DraftFields},
  error::{AppResult, ok},
  mailbox,
};

#[derive(Debug, Deserialize)]
pub struct SendRequest {
  pub id: Uuid,
}

/// Promote an existing draft and fan out to its recipients.
pub async fn send_draft(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  Json(req): Json<SendRequest>,
) -> AppResult<impl IntoResponse> {
  let message =
    compose::send_draft(&state.db, state.notifier.as_ref(), req.id, user_id).await?;
  let view = mailbox::view_message(&state.db, message.id, user_id).await?;
  Ok(ok("Send Email Successfully", view))
}

/// Create and send in one step, without an intermediate draft.
pub async fn create_and_send(
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
  let message =
    compose::create_and_send(&state.db, state.notifier.as_ref(), fields, user_id).await?;
  let view = mailbox::view_message(&state.db, message.id, user_id).await?;
  Ok(ok("Send Email Successfully", view))
}
