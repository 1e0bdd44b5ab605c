use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use inventra_auth::{Action, SecurityContext};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// Report how the caller's request for `(kind, action, id)` would be decided.
pub async fn explain(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Query(query): Query<dto::ExplainQuery>,
) -> Response {
    if let Err(resp) = crate::authz::require_authenticated(&ctx) {
        return resp;
    }

    let action = query.action.trim().to_string();
    if action.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "action is required");
    }

    // Root is decided before the kind is resolved, as on every other path.
    match services
        .evaluator
        .explain_by_id(&ctx, query.id, query.kind.trim(), &Action::new(action))
    {
        Ok(decision) => Json(decision).into_response(),
        // The kind comes from the caller: an input error, not a registry defect.
        Err(e) => errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
    }
}
