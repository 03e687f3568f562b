//! Search API: keyword search and advanced filters.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
  app::AppState,
  auth::AuthUser,
  error::{AppResult, ok},
  mailbox,
  models::message::api_message::MessageView,
  users,
};

use super::mailbox::parse_folder;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
  pub keyword: String,
}

/// Advanced filters; all text matching is case-insensitive substring.
/// `folder` scopes the search; the rest are optional.
#[derive(Debug, Deserialize)]
pub struct AdvancedSearchRequest {
  pub from: Option<String>,
  pub to: Option<String>,
  pub subject: Option<String>,
  pub keyword: Option<String>,
  pub folder: String,
  pub has_attachment: Option<bool>,
}

pub async fn search_keyword(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  Json(req): Json<SearchRequest>,
) -> AppResult<impl IntoResponse> {
  let views = mailbox::search_by_keyword(&state.db, user_id, &req.keyword).await?;
  Ok(ok("search Successfully", views))
}

pub async fn search_advanced(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  Json(req): Json<AdvancedSearchRequest>,
) -> AppResult<impl IntoResponse> {
  let folder = parse_folder(&req.folder)?;
  let views = mailbox::list_by_folder(&state.db, user_id, folder).await?;
  let mut out = Vec::new();
  for view in views {
    if matches_advanced(&state.db, &view, &req).await? {
      out.push(view);
    }
  }
  Ok(ok("search Successfully", out))
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
  haystack.to_lowercase().contains(&needle.to_lowercase())
}

async fn matches_advanced(
  db: &SqlitePool,
  view: &MessageView,
  req: &AdvancedSearchRequest,
) -> AppResult<bool> {
  if let Some(from) = req.from.as_deref().filter(|s| !s.trim().is_empty()) {
    let sender = users::find_user_by_id(db, view.sender_id).await?;
    match sender {
      Some(u) if contains_ci(&u.email, from) => {}
      _ => return Ok(false),
    }
  }
  if let Some(to) = req.to.as_deref().filter(|s| !s.trim().is_empty()) {
    // Matches only against the recipients this viewer is allowed to see.
    let mut hit = false;
    for recipient in &view.recipients {
      if let Some(u) = users::find_user_by_id(db, recipient.recipient_id).await? {
        if contains_ci(&u.email, to) {
          hit = true;
          break;
        }
      }
    }
    if !hit {
      return Ok(false);
    }
  }
  if let Some(subject) = req.subject.as_deref().filter(|s| !s.trim().is_empty()) {
    if !contains_ci(&view.subject, subject) {
      return Ok(false);
    }
  }
  if let Some(keyword) = req.keyword.as_deref().filter(|s| !s.trim().is_empty()) {
    if !contains_ci(&view.body, keyword) {
      return Ok(false);
    }
  }
  if let Some(flag) = req.has_attachment {
    if view.attachments.is_empty() == flag {
      return Ok(false);
    }
  }
  Ok(true)
}
