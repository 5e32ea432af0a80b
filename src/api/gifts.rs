//! Wishlist API endpoints used by the children's pages.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateGiftRequest, Gift, ReorderRequest, DEFAULT_PRIORITY};
use crate::reorder::{CommitOutcome, ReorderSession};
use crate::store::GiftStore;
use crate::AppState;

/// Message shown when a reorder could not be saved.
pub const RECONCILE_MESSAGE: &str = "could not save order, refreshing list…";

/// How a reorder request ended.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReorderStatus {
    Unchanged,
    Committed,
    Reconciled,
}

/// Result of a reorder: the list the client should now show.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderResponse {
    pub outcome: ReorderStatus,
    pub gifts: Vec<Gift>,
    pub applied_updates: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Look up a child, turning a missing one into a 404.
async fn require_child(state: &AppState, child_id: &str) -> Result<(), AppError> {
    match state.repo.get_child(child_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!("Child {} not found", child_id))),
    }
}

/// GET /api/children/:id/gifts - A child's wishlist in display order.
pub async fn list_child_gifts(
    State(state): State<AppState>,
    Path(child_id): Path<String>,
) -> ApiResult<Vec<Gift>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Err(e) = require_child(&state, &child_id).await {
        return error(e, revision_id);
    }

    match state.repo.list_gifts_for_child(&child_id).await {
        Ok(gifts) => success(gifts, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/children/:id/gifts - Add a photographed gift to a wishlist.
pub async fn create_gift(
    State(state): State<AppState>,
    Path(child_id): Path<String>,
    Json(request): Json<CreateGiftRequest>,
) -> ApiResult<Gift> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let image_url = request.image_url.trim();
    if image_url.is_empty() {
        return error(
            AppError::Validation("imageUrl is required".to_string()),
            revision_id,
        );
    }

    if let Err(e) = require_child(&state, &child_id).await {
        return error(e, revision_id);
    }

    match GiftStore::insert_gift(state.repo.as_ref(), &child_id, image_url, DEFAULT_PRIORITY).await {
        Ok(gift) => {
            tracing::info!("Child {} asked for gift {}", child_id, gift.id);
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(gift, new_revision)
        }
        Err(e) => error(e.into(), revision_id),
    }
}

/// POST /api/children/:id/gifts/reorder - Move one gift and persist the new ranks.
pub async fn reorder_gifts(
    State(state): State<AppState>,
    Path(child_id): Path<String>,
    Json(request): Json<ReorderRequest>,
) -> ApiResult<ReorderResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Err(e) = require_child(&state, &child_id).await {
        return error(e, revision_id);
    }

    let mut session = match ReorderSession::load(state.repo.as_ref(), &child_id).await {
        Ok(session) => session,
        Err(e) => return error(e.into(), revision_id),
    };

    match session.apply_move(request.from_index, request.to_index) {
        Ok(shown) => tracing::debug!(
            "Applied move {} -> {} for child {} ({} gifts)",
            request.from_index,
            request.to_index,
            child_id,
            shown.len()
        ),
        Err(e) => return error(e.into(), revision_id),
    }

    let (outcome, applied_updates, message) = match session.commit().await {
        CommitOutcome::Unchanged => (ReorderStatus::Unchanged, 0, None),
        CommitOutcome::Committed { applied } => (ReorderStatus::Committed, applied, None),
        CommitOutcome::Reconciled {
            refresh_error: Some(refresh_error),
            error: write_error,
            ..
        } => {
            tracing::error!(
                "Reorder for child {} failed ({}) and the list could not be reloaded: {}",
                child_id,
                write_error,
                refresh_error
            );
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            return error(
                AppError::Database(format!(
                    "Could not save order and could not reload the list: {}",
                    refresh_error
                )),
                new_revision,
            );
        }
        CommitOutcome::Reconciled { applied, .. } => (
            ReorderStatus::Reconciled,
            applied,
            Some(RECONCILE_MESSAGE.to_string()),
        ),
    };

    tracing::debug!(
        "Reorder for child {} ended in {:?} showing {} gifts",
        child_id,
        session.state(),
        session.gifts().len()
    );

    let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
    success(
        ReorderResponse {
            outcome,
            gifts: session.into_gifts(),
            applied_updates,
            message,
        },
        new_revision,
    )
}
