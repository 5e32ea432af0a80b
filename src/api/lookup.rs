//! Price lookup endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::lookup::compare_prices;
use crate::models::PriceComparisonResult;
use crate::AppState;

/// Body of a raw image search.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchProductRequest {
    #[serde(default)]
    pub image_url: Option<String>,
}

/// POST /api/parents/gifts/:id/price-lookup - Compare prices for a gift's photo.
pub async fn price_lookup(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PriceComparisonResult> {
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

    match compare_prices(state.lookup.as_ref(), &gift.image_url).await {
        Ok(result) => {
            if result.is_empty() {
                tracing::info!("No usable prices for gift {}", id);
            }
            success(result, revision_id)
        }
        Err(e) => error(e.into(), revision_id),
    }
}

/// POST /api/parents/search-product - Relay the raw search payload for an image.
///
/// Failures use the flat `{ error }` body the web client expects from this endpoint.
pub async fn search_product(
    State(state): State<AppState>,
    Json(request): Json<SearchProductRequest>,
) -> Response {
    let Some(image_url) = request.image_url.filter(|url| !url.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "imageUrl is required" })),
        )
            .into_response();
    };

    match state.lookup.search_by_image(&image_url).await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => {
            tracing::warn!("Error in search proxy: {}", e);
            let status =
                StatusCode::from_u16(e.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}
