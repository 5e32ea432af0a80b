//! Parents area endpoints: annotating and deleting gifts.
//!
//! Everything here sits behind the PIN gate.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{ApplyOfferRequest, Gift, GiftWithChild, UpdateGiftRequest};
use crate::reorder::ReorderSession;
use crate::AppState;

/// Parents session info.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentSession {
    pub authenticated: bool,
    pub pin_required: bool,
}

/// GET /api/parents/session - Check the PIN without touching data.
pub async fn parent_session(State(state): State<AppState>) -> ApiResult<ParentSession> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    success(
        ParentSession {
            authenticated: true,
            pin_required: state.config.parent_pin.is_some(),
        },
        revision_id,
    )
}

/// GET /api/parents/gifts - Every gift with its child, newest first.
pub async fn list_all_gifts(State(state): State<AppState>) -> ApiResult<Vec<GiftWithChild>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_all_gifts().await {
        Ok(gifts) => success(gifts, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/parents/gifts/:id - Annotate price, assignment or bought state.
pub async fn update_gift(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateGiftRequest>,
) -> ApiResult<Gift> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Some(Some(price)) = request.price {
        if !price.is_finite() || price < 0.0 {
            return error(
                AppError::Validation("Price must be a non-negative number".to_string()),
                revision_id,
            );
        }
    }

    match state.repo.update_gift(&id, &request).await {
        Ok(gift) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(gift, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/parents/gifts/:id/apply-offer - Take over a store's offer.
pub async fn apply_offer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ApplyOfferRequest>,
) -> ApiResult<Gift> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if !request.price.is_finite() || request.price <= 0.0 {
        return error(
            AppError::Validation("Offer price must be positive".to_string()),
            revision_id,
        );
    }
    if request.store.trim().is_empty() {
        return error(
            AppError::Validation("Offer store is required".to_string()),
            revision_id,
        );
    }

    let update = UpdateGiftRequest {
        price: Some(Some(request.price)),
        assigned_to: Some(Some(request.store.trim().to_string())),
        ..Default::default()
    };

    match state.repo.update_gift(&id, &update).await {
        Ok(gift) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(gift, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/parents/gifts/:id - Remove a gift and return its child's remaining list.
///
/// The remaining gifts keep their priorities; gaps are fine.
pub async fn delete_gift(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Vec<Gift>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let gift = match state.repo.get_gift(&id).await {
        Ok(Some(gift)) => gift,
        Ok(None) => {
            return error(
                AppError::NotFound(format!("Gift {} not found", id)),
                revision_id,
            )
        }
        Err(e) => return error(e, revision_id),
    };

    let mut session = match ReorderSession::load(state.repo.as_ref(), &gift.child_id).await {
        Ok(session) => session,
        Err(e) => return error(e.into(), revision_id),
    };

    match session.delete(&id).await {
        Ok(()) => {
            tracing::info!("Deleted gift {}", id);
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(session.into_gifts(), new_revision)
        }
        Err(e) => error(e.into(), revision_id),
    }
}
