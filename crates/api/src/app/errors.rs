use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use inventra_auth::{AuthenticationError, SecurityContext, UnknownResourceType};
use inventra_core::DomainError;

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// 401/503 for a request that reached a protected resource without an
/// authenticated principal.
pub fn unauthenticated(ctx: &SecurityContext) -> Response {
    let (status, code, message) = match ctx.rejection() {
        None => (
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "authentication required".to_string(),
        ),
        Some(AuthenticationError::Expired) => (
            StatusCode::UNAUTHORIZED,
            "session_expired",
            "session expired; sign in again".to_string(),
        ),
        Some(AuthenticationError::AccountDisabled) => (
            StatusCode::UNAUTHORIZED,
            "account_disabled",
            AuthenticationError::AccountDisabled.to_string(),
        ),
        Some(AuthenticationError::AccountLocked) => (
            StatusCode::UNAUTHORIZED,
            "account_locked",
            AuthenticationError::AccountLocked.to_string(),
        ),
        Some(AuthenticationError::StoreUnavailable) => {
            return json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "principal_store_unavailable",
                "authentication backend unavailable",
            );
        }
        Some(other) => (StatusCode::UNAUTHORIZED, "unauthorized", other.to_string()),
    };

    let mut response = json_error(status, code, message);
    let challenge = if ctx.rejection().is_none() {
        HeaderValue::from_static("Bearer")
    } else {
        HeaderValue::from_static("Bearer error=\"invalid_token\"")
    };
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, challenge);
    response
}

pub fn forbidden(message: impl Into<String>) -> Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", message)
}

/// The resource registry does not know a shape or tag: a server defect.
pub fn unknown_resource_type(err: UnknownResourceType) -> Response {
    tracing::error!(error = %err, "authorization aborted: unclassifiable resource");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "unknown_resource_type",
        err.to_string(),
    )
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
    }
}
