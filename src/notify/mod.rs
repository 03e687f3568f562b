//! Push notification seam.
//!
//! Delivery is fire-and-forget: a failed push for one recipient never fails
//! the send that triggered it.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
  #[error("push delivery failed: {0}")]
  Delivery(String),
}

/// Gateway seam for push delivery. A real backend (FCM, websocket bridge)
/// returns `NotifyError::Delivery` when a push cannot be handed off; callers
/// log it and move on.
#[async_trait]
pub trait PushNotifier: Send + Sync {
  async fn send_push(&self, device_token: &str, title: &str, body: &str)
  -> Result<(), NotifyError>;
}

/// Default notifier: logs the push instead of calling a real gateway.
pub struct LogNotifier;

#[async_trait]
impl PushNotifier for LogNotifier {
  async fn send_push(
    &self,
    device_token: &str,
    title: &str,
    _body: &str,
  ) -> Result<(), NotifyError> {
    info!("push to {device_token}: {title}");
    Ok(())
  }
}

/// Upsert a user's registered device token.
pub async fn save_push_token(
  db: &SqlitePool,
  user_id: Uuid,
  token: &str,
) -> Result<(), sqlx::Error> {
  sqlx::query(
    "INSERT INTO push_tokens (user_id, token, updated_at) VALUES (?, ?, ?) \
     ON CONFLICT(user_id) DO UPDATE SET token = excluded.token, updated_at = excluded.updated_at",
  )
  .bind(user_id)
  .bind(token)
  .bind(Utc::now())
  .execute(db)
  .await?;
  Ok(())
}

/// Best-effort push to one recipient; looks up their device token and
/// swallows every failure with a warning.
pub async fn notify_recipient(
  db: &SqlitePool,
  notifier: &dyn PushNotifier,
  user_id: Uuid,
  title: &str,
  body: &str,
) {
  let token: Result<Option<(String,)>, _> =
    sqlx::query_as("SELECT token FROM push_tokens WHERE user_id = ?")
      .bind(user_id)
      .fetch_optional(db)
      .await;
  match token {
    Ok(Some((token,))) => {
      if let Err(e) = notifier.send_push(&token, title, body).await {
        warn!("push to {user_id} failed: {e}");
      }
    }
    Ok(None) => {}
    Err(e) => warn!("push token lookup for {user_id} failed: {e}"),
  }
}
