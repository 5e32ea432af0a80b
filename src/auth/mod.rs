//! PIN gate for the parents area.
//!
//! Implements constant-time comparison to mitigate timing attacks.

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;

use crate::errors::{codes, ErrorDetails, ErrorResponse};

/// Header carrying the parents' PIN.
pub const PARENT_PIN_HEADER: &str = "x-parent-pin";

/// PIN middleware that takes the expected PIN as a parameter.
pub async fn parent_pin_layer(expected_pin: Option<String>, request: Request, next: Next) -> Response {
    // No PIN configured: the parents area is open (dev mode)
    let Some(expected) = expected_pin else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(PARENT_PIN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    match provided {
        Some(pin) => {
            if constant_time_compare(&pin, &expected) {
                next.run(request).await
            } else {
                tracing::warn!("Rejected parents request with wrong PIN");
                unauthorized_response("Incorrect PIN")
            }
        }
        None => {
            let bearer = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
                .map(|s| s.to_string());

            match bearer {
                Some(pin) if constant_time_compare(&pin, &expected) => next.run(request).await,
                _ => unauthorized_response("Parent PIN required"),
            }
        }
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Create an unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorDetails {
            code: codes::UNAUTHORIZED.to_string(),
            message: message.to_string(),
            details: None,
        },
        revision_id: 0,
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
