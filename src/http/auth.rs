//! Account registration, login, push token registration.

use axum::{
  Json,
  extract::State,
  http::header,
  response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
  app::AppState,
  auth::AuthUser,
  error::{AppError, AppResult, ok},
  models::user::user_row::UserView,
  notify, users,
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
  pub username: String,
  pub email: String,
  pub password: String,
  pub phone_number: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
  pub email: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token: String,
  pub user: UserView,
}

#[derive(Debug, Deserialize)]
pub struct PushTokenRequest {
  pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
  pub username: Option<String>,
  pub avatar: Option<String>,
}

pub async fn register(
  State(state): State<AppState>,
  Json(req): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
  let user = users::register(
    &state.db,
    &req.username,
    &req.email,
    &req.password,
    &req.phone_number,
  )
  .await?;
  Ok(ok("Register Successfully", UserView::from(user)))
}

/// Issues a bearer token and mirrors it into an httponly `token` cookie.
pub async fn login(
  State(state): State<AppState>,
  Json(req): Json<LoginRequest>,
) -> AppResult<Response> {
  let user = users::login(&state.db, &req.email, &req.password).await?;
  let token = state.auth.issue(user.id, &user.email)?;
  let cookie = format!("token={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age=3600");
  let mut res = ok(
    "Login Successfully",
    LoginResponse {
      token,
      user: UserView::from(user),
    },
  )
  .into_response();
  res.headers_mut().insert(
    header::SET_COOKIE,
    cookie.parse().map_err(|_| AppError::Internal)?,
  );
  Ok(res)
}

/// Update username and/or avatar; the avatar url usually comes from a prior
/// attachment upload.
pub async fn update_profile(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  Json(req): Json<UpdateProfileRequest>,
) -> AppResult<impl IntoResponse> {
  let user = users::update_profile(
    &state.db,
    user_id,
    req.username.as_deref(),
    req.avatar.as_deref(),
  )
  .await?;
  Ok(ok("Update Profile Successfully", UserView::from(user)))
}

pub async fn save_push_token(
  State(state): State<AppState>,
  AuthUser(user_id): AuthUser,
  Json(req): Json<PushTokenRequest>,
) -> AppResult<impl IntoResponse> {
  notify::save_push_token(&state.db, user_id, &req.token)
    .await
    .map_err(AppError::from)?;
  Ok(ok("Push Token Saved", true))
}
