//! Mailbox entry handlers: folder lists, flags, trash, purge, custom labels.

use axum::{
  Json,
  extract::{Path as AxumPath, Query, State},
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  app::AppState,
  auth::AuthUser,
  error::{AppError, AppResult, ok},
  mailbox,
  models::mailbox::{entry::EntryView, folder::Folder},
};

#[derive(Debug, Deserialize)]
pub struct FolderParams {
  pub folder: String,
}

#[derive(Debug, Deserialize)]
pub struct CustomLabelRequest {
  pub email_ids: Vec<Uuid>,
  pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveLabelRequest {
  pub label: String,
}

pub(crate) fn parse_folder(s: &str) -> AppResult<Folder> {
  Folder::parse(s).ok_or_else(|| AppError::InvalidState(format!("unknown folder '{s}'")))
}

pub async fn list_by_folder(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  Query(params): Query<FolderParams>,
) -> AppResult<impl IntoResponse> {
  let folder = parse_folder(&params.folder)?;
  let views = mailbox::list_by_folder(&state.db, user_id, folder).await?;
  Ok(ok("Get All Emails Successfully", views))
}

pub async fn list_starred(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
) -> AppResult<impl IntoResponse> {
  let views = mailbox::list_starred(&state.db, user_id).await?;
  Ok(ok("Get All Emails Successfully", views))
}

pub async fn get_message(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  AxumPath(id): AxumPath<Uuid>,
) -> AppResult<impl IntoResponse> {
  let view = mailbox::view_message(&state.db, id, user_id).await?;
  Ok(ok("Get Email Successfully", view))
}

pub async fn toggle_star(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  AxumPath(id): AxumPath<Uuid>,
) -> AppResult<impl IntoResponse> {
  let entry = mailbox::toggle_star(&state.db, id, user_id).await?;
  Ok(ok("Star Toggled Successfully", EntryView::from_row(entry)?))
}

pub async fn mark_read(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  AxumPath(id): AxumPath<Uuid>,
) -> AppResult<impl IntoResponse> {
  let entry = mailbox::mark_read(&state.db, id, user_id).await?;
  Ok(ok("Read Emails Successfully", EntryView::from_row(entry)?))
}

pub async fn toggle_trash(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  AxumPath(id): AxumPath<Uuid>,
) -> AppResult<impl IntoResponse> {
  let entry = mailbox::move_to_trash(&state.db, id, user_id).await?;
  Ok(ok("Move to Trash Successfully", EntryView::from_row(entry)?))
}

pub async fn purge_message(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  AxumPath(id): AxumPath<Uuid>,
) -> AppResult<impl IntoResponse> {
  mailbox::purge(&state.db, id, user_id).await?;
  Ok(ok("Delete Emails Successfully", true))
}

pub async fn add_custom_label(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  Json(req): Json<CustomLabelRequest>,
) -> AppResult<impl IntoResponse> {
  let tagged = mailbox::add_label(&state.db, &req.email_ids, user_id, &req.label).await?;
  Ok(ok("Custom Label Added Successfully", tagged))
}

pub async fn remove_custom_label(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  Json(req): Json<RemoveLabelRequest>,
) -> AppResult<impl IntoResponse> {
  let stripped = mailbox::remove_label(&state.db, user_id, &req.label).await?;
  Ok(ok("Custom Label Removed Successfully", stripped))
}

pub async fn list_by_custom_label(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  AxumPath(label): AxumPath<String>,
) -> AppResult<impl IntoResponse> {
  let views = mailbox::list_by_custom_label(&state.db, user_id, &label).await?;
  Ok(ok("Get All Emails Successfully", views))
}
