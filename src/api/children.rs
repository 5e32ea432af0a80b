//! Child API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{Child, CreateChildRequest};
use crate::AppState;

/// GET /api/children - List all children.
pub async fn list_children(State(state): State<AppState>) -> ApiResult<Vec<Child>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_children().await {
        Ok(children) => success(children, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/parents/children - Register a child.
pub async fn create_child(
    State(state): State<AppState>,
    Json(request): Json<CreateChildRequest>,
) -> ApiResult<Child> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let name = request.name.trim();
    if name.is_empty() {
        return error(
            AppError::Validation("Child name is required".to_string()),
            revision_id,
        );
    }

    match state.repo.create_child(name).await {
        Ok(child) => {
            tracing::info!("Registered child {}", child.id);
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(child, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/parents/children/:id - Delete a child and its wishlist.
pub async fn delete_child(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_child(&id).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
