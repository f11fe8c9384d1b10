//! Handlers for post revision history.
//!
//! Provides the revision timeline, single-revision lookup, save/checkpoint,
//! comparison, and restore endpoints.

use std::time::Duration;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use folio_core::presenter::{count_changes, present, present_snapshots, ChangeSet};
use folio_core::revision::{NewRevision, Revision, RevisionKind, RevisionSummary};
use folio_core::snapshot::Snapshot;
use folio_core::types::DbId;
use folio_events::ContentEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/* --------------------------------------------------------------------------
Request / response types
-------------------------------------------------------------------------- */

#[derive(Debug, Deserialize, Validate)]
pub struct SaveRevisionRequest {
    /// New post state. When absent, the current live state is checkpointed.
    pub snapshot: Option<Snapshot>,
    /// `auto`, `manual` or `publish`.
    pub kind: Option<String>,
    /// Overrides the derived change summary; at most 500 characters.
    #[validate(length(max = 500))]
    pub summary: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DiffParams {
    pub from: i32,
    /// Compare against this version; the live post when absent.
    pub to: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct DiffResponse {
    pub post_id: DbId,
    /// Changed fields among title, content, excerpt, featured image, category and tags.
    pub watched_changes: usize,
    #[serde(flatten)]
    pub change_set: ChangeSet,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub ok: bool,
    pub new_version: i32,
    pub restored_from: i32,
    /// Version recording the replaced live state, when one was needed.
    pub safety_version: Option<i32>,
    pub snapshot: Snapshot,
}

/// Right-hand side of a comparison.
enum DiffTarget {
    Revision(Revision),
    Live(Snapshot),
}

/* --------------------------------------------------------------------------
Timeline
-------------------------------------------------------------------------- */

/// GET /posts/{post_id}/revisions
///
/// List retained revisions, newest first.
pub async fn list_revisions(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let revisions = state.store.list(post_id).await?;
    let summaries: Vec<RevisionSummary> = revisions.iter().map(Revision::summary).collect();
    Ok(Json(DataResponse { data: summaries }))
}

/// GET /posts/{post_id}/revisions/{version}
pub async fn get_revision(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path((post_id, version)): Path<(DbId, i32)>,
) -> AppResult<impl IntoResponse> {
    let revision = state.store.get_by_version(post_id, version).await?;
    Ok(Json(DataResponse { data: revision }))
}

/// POST /posts/{post_id}/revisions
///
/// Save an edit (the snapshot becomes the live post) or, with no snapshot,
/// checkpoint the current live state.
pub async fn save_revision(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
    payload: Result<Json<SaveRevisionRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;
    input.validate()?;
    let kind = input
        .kind
        .as_deref()
        .map(str::parse::<RevisionKind>)
        .transpose()?;
    let summary = input.summary.filter(|s| !s.trim().is_empty());

    let guard = state.store.lock_post(post_id).await;
    let revision = match input.snapshot {
        Some(snapshot) => {
            let mut new = NewRevision::new(
                post_id,
                snapshot,
                auth.editor(),
                kind.unwrap_or(RevisionKind::Auto),
            );
            new.summary = summary;
            let revision = state.store.append_locked(&guard, new).await?;
            state
                .posts
                .set_current_snapshot(post_id, &revision.snapshot)
                .await?;
            revision
        }
        None => {
            let live = state.posts.current_snapshot(post_id).await?;
            let mut new = NewRevision::new(
                post_id,
                live,
                auth.editor(),
                kind.unwrap_or(RevisionKind::Manual),
            );
            new.summary = summary;
            state.store.append_locked(&guard, new).await?
        }
    };
    drop(guard);

    tracing::info!(
        user_id = auth.user_id,
        post_id,
        version = revision.version,
        kind = %revision.kind,
        "Revision saved"
    );
    state
        .event_bus
        .publish(ContentEvent::revision_recorded(&revision));

    Ok((StatusCode::CREATED, Json(DataResponse { data: revision })))
}

/* --------------------------------------------------------------------------
Diff
-------------------------------------------------------------------------- */

/// GET /posts/{post_id}/diff?from=A&to=B
///
/// Compare revision `from` (old) against revision `to`, or against the live
/// post when `to` is omitted. Computed off the async runtime under a deadline.
pub async fn diff_revisions(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
    params: Result<Query<DiffParams>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = params?;
    let from = state.store.get_by_version(post_id, params.from).await?;
    let to = match params.to {
        Some(version) => DiffTarget::Revision(state.store.get_by_version(post_id, version).await?),
        None => DiffTarget::Live(state.posts.current_snapshot(post_id).await?),
    };

    let task = tokio::task::spawn_blocking(move || match to {
        DiffTarget::Revision(to) => present(&from, &to),
        DiffTarget::Live(live) => {
            let mut change_set = present_snapshots(&from.snapshot, &live);
            change_set.from_version = Some(from.version);
            Ok(change_set)
        }
    });

    let deadline = Duration::from_millis(state.config.diff_timeout_ms);
    let change_set = match tokio::time::timeout(deadline, task).await {
        Ok(Ok(result)) => result?,
        Ok(Err(join_err)) => {
            return Err(AppError::InternalError(format!(
                "Diff task failed: {join_err}"
            )))
        }
        Err(_) => {
            tracing::warn!(
                post_id,
                from = params.from,
                to = ?params.to,
                timeout_ms = state.config.diff_timeout_ms,
                "Diff exceeded deadline"
            );
            return Err(AppError::DiffUnavailable(
                "Unable to compute comparison".to_string(),
            ));
        }
    };

    let response = DiffResponse {
        post_id,
        watched_changes: count_changes(&change_set),
        change_set,
    };
    Ok(Json(DataResponse { data: response }))
}

/* --------------------------------------------------------------------------
Restore
-------------------------------------------------------------------------- */

/// POST /posts/{post_id}/restore/{version}
///
/// Make an earlier revision live again. History is only appended to.
pub async fn restore_version(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((post_id, version)): Path<(DbId, i32)>,
) -> AppResult<impl IntoResponse> {
    let outcome = match state.restore.restore(post_id, version, &auth.editor()).await {
        Ok(outcome) => outcome,
        Err(err) => {
            state.event_bus.publish(ContentEvent::restore_failed(
                post_id,
                version,
                auth.user_id,
                &err.to_string(),
            ));
            return Err(err.into());
        }
    };

    if let Some(safety) = &outcome.safety_revision {
        state
            .event_bus
            .publish(ContentEvent::revision_recorded(safety));
    }
    state
        .event_bus
        .publish(ContentEvent::revision_restored(post_id, &outcome));

    let response = RestoreResponse {
        ok: true,
        new_version: outcome.revision.version,
        restored_from: outcome.restored_from,
        safety_version: outcome.safety_revision.as_ref().map(|r| r.version),
        snapshot: outcome.snapshot,
    };
    Ok(Json(DataResponse { data: response }))
}
