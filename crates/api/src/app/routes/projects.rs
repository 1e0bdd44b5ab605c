use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;

use inventra_auth::{Action, ResourceKind, SecurityContext};
use inventra_core::ProjectId;
use inventra_inventory::CreateProjectRequest;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_project))
        .route("/:id", get(get_project).delete(delete_project))
}

pub async fn get_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<i64>,
) -> Response {
    if let Err(resp) = authz::require_by_id(
        &ctx,
        &services.evaluator,
        Some(id),
        ResourceKind::Project.as_str(),
        &Action::READ,
    ) {
        return resp;
    }

    let id = match ProjectId::new(id) {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.projects.get(id) {
        Ok(project) => Json(project).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Json(body): Json<CreateProjectRequest>,
) -> Response {
    let auth = match authz::require(&ctx, &services.evaluator, Some(&body), &Action::WRITE) {
        Ok(auth) => auth,
        Err(resp) => return resp,
    };

    let project = match services.projects.create(body, Utc::now()) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    tracing::info!(project_id = %project.id, username = %auth.username(), "project created");
    (StatusCode::CREATED, Json(project)).into_response()
}

pub async fn delete_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<i64>,
) -> Response {
    let auth = match authz::require_by_id(
        &ctx,
        &services.evaluator,
        Some(id),
        ResourceKind::Project.as_str(),
        &Action::DELETE,
    ) {
        Ok(auth) => auth,
        Err(resp) => return resp,
    };

    let id = match ProjectId::new(id) {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.projects.remove(id) {
        Ok(_) => {
            tracing::info!(project_id = %id, username = %auth.username(), "project deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
