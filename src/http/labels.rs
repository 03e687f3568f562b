//! Label catalog handlers.

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
  error::{AppResult, ok},
  labels,
  models::label::label_row::LabelView,
};

#[derive(Debug, Deserialize)]
pub struct CreateLabelRequest {
  pub label_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LabelEmailsRequest {
  pub email_ids: Vec<Uuid>,
}

pub async fn create_label(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  Json(req): Json<CreateLabelRequest>,
) -> AppResult<impl IntoResponse> {
  let label = labels::create_label(&state.db, &req.label_name, user_id).await?;
  Ok(ok("Create Label Successfully", LabelView::from_row(label)?))
}

pub async fn list_labels(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
) -> AppResult<impl IntoResponse> {
  let rows = labels::list_labels(&state.db, user_id).await?;
  let mut out = Vec::with_capacity(rows.len());
  for row in rows {
    out.push(LabelView::from_row(row)?);
  }
  Ok(ok("Get All Labels Successfully", out))
}

pub async fn add_emails(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  AxumPath(name): AxumPath<String>,
  Json(req): Json<LabelEmailsRequest>,
) -> AppResult<impl IntoResponse> {
  let label = labels::add_emails(&state.db, &name, user_id, &req.email_ids).await?;
  Ok(ok("Add Emails Successfully", LabelView::from_row(label)?))
}

pub async fn remove_emails(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  AxumPath(name): AxumPath<String>,
  Json(req): Json<LabelEmailsRequest>,
) -> AppResult<impl IntoResponse> {
  let label = labels::remove_emails(&state.db, &name, user_id, &req.email_ids).await?;
  Ok(ok("Remove Emails Successfully", LabelView::from_row(label)?))
}

pub async fn list_emails(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  AxumPath(name): AxumPath<String>,
) -> AppResult<impl IntoResponse> {
  let views = labels::list_emails(&state.db, &name, user_id).await?;
  Ok(ok("Get All Emails Successfully", views))
}

pub async fn delete_label(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  AxumPath(name): AxumPath<String>,
) -> AppResult<impl IntoResponse> {
  labels::delete_label(&state.db, &name, user_id).await?;
  Ok(ok("Delete Label Successfully", true))
}
