//! Main mailbox folders.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Folder {
  Inbox,
  Sent,
  Draft,
  Trash,
}

impl Folder {
  pub fn as_str(self) -> &'static str {
    match self {
      Folder::Inbox => "inbox",
      Folder::Sent => "sent",
      Folder::Draft => "draft",
      Folder::Trash => "trash",
    }
  }

  pub fn parse(s: &str) -> Option<Folder> {
    match s {
      "inbox" => Some(Folder::Inbox),
      "sent" => Some(Folder::Sent),
      "draft" => Some(Folder::Draft),
      "trash" => Some(Folder::Trash),
      _ => None,
    }
  }
}
