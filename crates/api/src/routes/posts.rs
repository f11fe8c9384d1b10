//! Route definitions for post revision history.
//!
//! Registered under `/posts`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::revisions;
use crate::state::AppState;

/// Revision routes, registered as `/posts`.
///
/// ```text
/// GET    /{post_id}/revisions              list_revisions
/// POST   /{post_id}/revisions              save_revision
/// GET    /{post_id}/revisions/{version}    get_revision
/// GET    /{post_id}/diff                   diff_revisions
/// POST   /{post_id}/restore/{version}      restore_version
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{post_id}/revisions",
            get(revisions::list_revisions).post(revisions::save_revision),
        )
        .route("/{post_id}/revisions/{version}", get(revisions::get_revision))
        .route("/{post_id}/diff", get(revisions::diff_revisions))
        .route("/{post_id}/restore/{version}", post(revisions::restore_version))
}
