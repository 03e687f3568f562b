//! HTTP router and handlers.

use crate::app::AppState;
use axum::{
  Router,
  routing::{delete, get, post},
};

pub mod attachments;
pub mod auth;
pub mod drafts;
pub mod labels;
pub mod mailbox;
pub mod search;
pub mod send;

/// Assemble the HTTP router with all routes.
pub fn build_router(state: AppState) -> Router {
  Router::new()
    .route("/auth/register", post(auth::register))
    .route("/auth/login", post(auth::login))
    .route("/auth/push-token", post(auth::save_push_token))
    .route("/users/update-profile", post(auth::update_profile))
    .route("/attachments", post(attachments::upload_attachments))
    .route(
      "/attachments/:id/download",
      get(attachments::download_attachment),
    )
    .route(
      "/mail",
      get(mailbox::list_by_folder).post(send::create_and_send),
    )
    .route("/mail/drafts", post(drafts::create_draft))
    .route("/mail/drafts/:id", post(drafts::update_draft))
    .route("/mail/send", post(send::send_draft))
    .route("/mail/starred", get(mailbox::list_starred))
    .route("/mail/search", post(search::search_keyword))
    .route("/mail/search/advanced", post(search::search_advanced))
    .route("/mail/labels", post(mailbox::add_custom_label))
    .route("/mail/labels/remove", post(mailbox::remove_custom_label))
    .route("/mail/labels/:label", get(mailbox::list_by_custom_label))
    .route(
      "/mail/:id",
      get(mailbox::get_message).delete(mailbox::purge_message),
    )
    .route("/mail/:id/star", post(mailbox::toggle_star))
    .route("/mail/:id/read", post(mailbox::mark_read))
    .route("/mail/:id/trash", post(mailbox::toggle_trash))
    .route("/labels", post(labels::create_label).get(labels::list_labels))
    .route("/labels/:name", delete(labels::delete_label))
    .route(
      "/labels/:name/emails",
      get(labels::list_emails).post(labels::add_emails),
    )
    .route("/labels/:name/emails/remove", post(labels::remove_emails))
    .with_state(state)
}
