//! Named label owned by one user, holding a set of message ids.
//!
//! Separate from the per-entry custom label tags; the two facilities
//! deliberately coexist.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct DbLabel {
  pub id: Uuid,
  pub label_name: String,
  pub user_id: Uuid,
  pub email_ids: String,
  pub created_at: DateTime<Utc>,
}

impl DbLabel {
  pub fn ids(&self) -> crate::error::AppResult<Vec<Uuid>> {
    Ok(serde_json::from_str(&self.email_ids)?)
  }
}

#[derive(Debug, Serialize)]
pub struct LabelView {
  pub id: Uuid,
  pub label_name: String,
  pub user_id: Uuid,
  pub email_ids: Vec<Uuid>,
  pub created_at: DateTime<Utc>,
}

impl LabelView {
  pub fn from_row(row: DbLabel) -> crate::error::AppResult<Self> {
    let email_ids = row.ids()?;
    Ok(LabelView {
      id: row.id,
      label_name: row.label_name,
      user_id: row.user_id,
      email_ids,
      created_at: row.created_at,
    })
  }
}
