//! User account lookups and registration.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
  auth,
  error::{AppError, AppResult},
  models::user::user_row::DbUser,
};

const USER_COLS: &str = "id, username, email, password_hash, avatar, phone_number";

pub async fn find_user_by_id(db: &SqlitePool, id: Uuid) -> AppResult<Option<DbUser>> {
  let sql = format!("SELECT {USER_COLS} FROM users WHERE id = ?");
  let row = sqlx::query_as::<_, DbUser>(&sql)
    .bind(id)
    .fetch_optional(db)
    .await?;
  Ok(row)
}

pub async fn find_user_by_email(db: &SqlitePool, email: &str) -> AppResult<Option<DbUser>> {
  let sql = format!("SELECT {USER_COLS} FROM users WHERE email = ?");
  let row = sqlx::query_as::<_, DbUser>(&sql)
    .bind(email)
    .fetch_optional(db)
    .await?;
  Ok(row)
}

pub async fn find_user_by_phone(db: &SqlitePool, phone: &str) -> AppResult<Option<DbUser>> {
  let sql = format!("SELECT {USER_COLS} FROM users WHERE phone_number = ?");
  let row = sqlx::query_as::<_, DbUser>(&sql)
    .bind(phone)
    .fetch_optional(db)
    .await?;
  Ok(row)
}

/// Create an account. Conflict when the phone number or email is taken.
pub async fn register(
  db: &SqlitePool,
  username: &str,
  email: &str,
  password: &str,
  phone_number: &str,
) -> AppResult<DbUser> {
  if find_user_by_phone(db, phone_number).await?.is_some() {
    return Err(AppError::Conflict("phone number already registered".to_string()));
  }
  if find_user_by_email(db, email).await?.is_some() {
    return Err(AppError::Conflict("email already registered".to_string()));
  }
  let user = DbUser {
    id: Uuid::new_v4(),
    username: username.to_string(),
    email: email.to_string(),
    password_hash: auth::hash_password(password)?,
    avatar: None,
    phone_number: phone_number.to_string(),
  };
  sqlx::query(
    "INSERT INTO users (id, username, email, password_hash, avatar, phone_number) VALUES (?, ?, ?, ?, NULL, ?)",
  )
  .bind(user.id)
  .bind(&user.username)
  .bind(&user.email)
  .bind(&user.password_hash)
  .bind(&user.phone_number)
  .execute(db)
  .await?;
  Ok(user)
}

/// Check credentials, returning the account on success.
pub async fn login(db: &SqlitePool, email: &str, password: &str) -> AppResult<DbUser> {
  let user = find_user_by_email(db, email)
    .await?
    .ok_or(AppError::BadCredentials)?;
  if !auth::verify_password(password, &user.password_hash) {
    return Err(AppError::BadCredentials);
  }
  Ok(user)
}

/// Update mutable profile fields. Present fields overwrite; the avatar is a
/// url, typically one handed back by the attachment upload endpoint.
pub async fn update_profile(
  db: &SqlitePool,
  user_id: Uuid,
  username: Option<&str>,
  avatar: Option<&str>,
) -> AppResult<DbUser> {
  let user = find_user_by_id(db, user_id)
    .await?
    .ok_or(AppError::NotFound("user"))?;
  let username = username.unwrap_or(&user.username);
  let avatar = avatar.or(user.avatar.as_deref());
  sqlx::query("UPDATE users SET username = ?, avatar = ? WHERE id = ?")
    .bind(username)
    .bind(avatar)
    .bind(user_id)
    .execute(db)
    .await?;
  find_user_by_id(db, user_id)
    .await?
    .ok_or(AppError::NotFound("user"))
}
