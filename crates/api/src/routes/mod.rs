pub mod health;
pub mod posts;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /posts/{post_id}/revisions                  list, save
/// /posts/{post_id}/revisions/{version}        get one revision
/// /posts/{post_id}/diff                       compare (?from=A&to=B)
/// /posts/{post_id}/restore/{version}          restore (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/posts", posts::router())
}
