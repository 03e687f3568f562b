//! Application setup and runtime.

use crate::{auth::AuthKeys, db, http, notify::{LogNotifier, PushNotifier}};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Shared application state. Collaborators are constructor-injected; there
/// is no ambient registry.
#[derive(Clone)]
pub struct AppState {
  pub db: SqlitePool,
  pub auth: AuthKeys,
  pub notifier: Arc<dyn PushNotifier>,
}

/// Start the HTTP server with configured environment.
pub async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  crate::util::init_tracing();

  let db_url =
    std::env::var("POSTBOX_DATABASE").unwrap_or_else(|_| "sqlite://postbox.db".to_string());
  let db_url = db::ensure_sqlite_path(&db_url);
  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&db_url)
    .await?;
  db::run_migrations(&pool).await?;

  let secret = std::env::var("POSTBOX_JWT_SECRET")
    .unwrap_or_else(|_| "postbox-dev-secret".to_string());

  let state = AppState {
    db: pool.clone(),
    auth: AuthKeys::new(&secret),
    notifier: Arc::new(LogNotifier),
  };

  let app = http::build_router(state.clone());

  let addr: SocketAddr = std::env::var("POSTBOX_ADDR")
    .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
    .parse()?;

  info!("postbox API:        http://{}/", addr);
  info!("register endpoint:  POST http://{}/auth/register", addr);
  info!("send endpoint:      POST http://{}/mail", addr);

  let listener = tokio::net::TcpListener::bind(addr).await?;
  axum::serve(listener, app).await?;
  Ok(())
}
