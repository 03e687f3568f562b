//! Recipient roles and the visibility projection.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientRole {
  To,
  Cc,
  Bcc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
  pub recipient_id: Uuid,
  pub role: RecipientRole,
}

/// Restrict a message's recipient list to what `viewer` is allowed to see.
///
/// The sender sees everything. A `to` recipient sees only the `to` list.
/// A `cc` recipient sees the `to` and `cc` lists. A `bcc` recipient sees a
/// single entry naming only themselves; bcc recipients are never shown to
/// anyone else.
pub fn project_recipients(
  viewer: Uuid,
  sender: Uuid,
  recipients: &[Recipient],
) -> Vec<Recipient> {
  if viewer == sender {
    return recipients.to_vec();
  }
  let own_role = recipients
    .iter()
    .find(|r| r.recipient_id == viewer)
    .map(|r| r.role);
  match own_role {
    Some(RecipientRole::To) => recipients
      .iter()
      .filter(|r| r.role == RecipientRole::To)
      .cloned()
      .collect(),
    Some(RecipientRole::Cc) => recipients
      .iter()
      .filter(|r| r.role != RecipientRole::Bcc || r.recipient_id == viewer)
      .cloned()
      .collect(),
    Some(RecipientRole::Bcc) => vec![Recipient {
      recipient_id: viewer,
      role: RecipientRole::Bcc,
    }],
    None => Vec::new(),
  }
}
