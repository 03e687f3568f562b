//! User account records.

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct DbUser {
  pub id: Uuid,
  pub username: String,
  pub email: String,
  pub password_hash: String,
  pub avatar: Option<String>,
  pub phone_number: String,
}

/// User as returned by the API; the password hash never leaves the server.
#[derive(Debug, Serialize)]
pub struct UserView {
  pub id: Uuid,
  pub username: String,
  pub email: String,
  pub avatar: Option<String>,
  pub phone_number: String,
}

impl From<DbUser> for UserView {
  fn from(u: DbUser) -> Self {
    UserView {
      id: u.id,
      username: u.username,
      email: u.email,
      avatar: u.avatar,
      phone_number: u.phone_number,
    }
  }
}
