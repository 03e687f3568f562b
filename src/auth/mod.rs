//! JWT issuing/verification and password hashing.
//!
//! Tokens are HS256 and fully validated (signature + expiry) before a user
//! id is trusted. Callers present a Bearer header or a `token` cookie.

use argon2::{
  Argon2,
  password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
  async_trait,
  extract::FromRequestParts,
  http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{app::AppState, error::AppError};

const TOKEN_TTL_SECS: i64 = 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  pub sub: String,
  pub email: String,
  pub iat: usize,
  pub exp: usize,
}

#[derive(Clone)]
pub struct AuthKeys {
  encoding: EncodingKey,
  decoding: DecodingKey,
  validation: Validation,
}

impl AuthKeys {
  pub fn new(secret: &str) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    AuthKeys {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      validation,
    }
  }

  pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
      sub: user_id.to_string(),
      email: email.to_string(),
      iat: now as usize,
      exp: (now + TOKEN_TTL_SECS) as usize,
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|_| AppError::Internal)
  }

  /// Verify signature and expiry, returning the caller's user id.
  pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
    let data = decode::<Claims>(token, &self.decoding, &self.validation)
      .map_err(|_| AppError::Unauthorized)?;
    Uuid::parse_str(&data.claims.sub).map_err(|_| AppError::Unauthorized)
  }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|_| AppError::Internal)
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
  match PasswordHash::new(stored_hash) {
    Ok(parsed) => Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok(),
    Err(_) => false,
  }
}

/// Authenticated caller, extracted per request.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
  type Rejection = AppError;

  async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
    let bearer = parts
      .headers
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.strip_prefix("Bearer "))
      .map(|t| t.trim().to_string())
      .filter(|t| !t.is_empty());
    let token = match bearer {
      Some(t) => t,
      None => {
        let cookies = parts.headers.get(header::COOKIE).and_then(|v| v.to_str().ok());
        cookie_token(cookies).ok_or(AppError::Unauthorized)?
      }
    };
    let user_id = state.auth.verify(&token)?;
    Ok(AuthUser(user_id))
  }
}

/// Pull the `token` cookie out of a Cookie header, if present.
fn cookie_token(header: Option<&str>) -> Option<String> {
  let raw = header?;
  for pair in raw.split(';') {
    if let Some((k, v)) = pair.trim().split_once('=') {
      if k == "token" && !v.is_empty() {
        return Some(v.to_string());
      }
    }
  }
  None
}
