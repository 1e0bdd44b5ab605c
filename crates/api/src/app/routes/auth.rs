use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;

use inventra_auth::{
    AccountState, PrincipalStoreError, SecurityContext, verify_dummy, verify_password,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
}

/// Exchange a username and password for a bearer token.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> Response {
    let principal = match services.principals.load_by_username(&body.username).await {
        Ok(p) => p,
        Err(PrincipalStoreError::NotFound(_)) => {
            // Same hashing cost as a wrong password for a known user.
            let password = body.password.clone();
            let _ = tokio::task::spawn_blocking(move || verify_dummy(&password)).await;
            return invalid_credentials(&body.username);
        }
        Err(PrincipalStoreError::Unavailable(reason)) => {
            tracing::error!(%reason, "principal lookup failed during login");
            return errors::json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "principal_store_unavailable",
                "authentication backend unavailable",
            );
        }
    };

    // Blocking hash check.
    let password = body.password;
    let stored_hash = principal.password_hash().to_string();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await;
    match verified {
        Ok(Ok(true)) => {}
        Ok(Ok(false)) => return invalid_credentials(&body.username),
        Ok(Err(e)) => {
            tracing::error!(username = %body.username, error = %e, "stored password hash unusable");
            return invalid_credentials(&body.username);
        }
        Err(e) => {
            tracing::error!(error = %e, "password verification task failed");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "login failed");
        }
    }

    match principal.account_state() {
        AccountState::Active => {}
        AccountState::Disabled => {
            return errors::json_error(StatusCode::UNAUTHORIZED, "account_disabled", "account is disabled");
        }
        AccountState::Locked => {
            return errors::json_error(StatusCode::UNAUTHORIZED, "account_locked", "account is locked");
        }
    }

    let issued = match services.tokens.issue(&principal.username, Utc::now()) {
        Ok(issued) => issued,
        Err(e) => {
            tracing::error!(error = %e, "token signing failed");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "login failed");
        }
    };

    tracing::info!(username = %principal.username, "login succeeded");
    (
        StatusCode::OK,
        Json(dto::LoginResponse {
            token: issued.token,
            token_type: "Bearer",
            expires_in: services.tokens.config().ttl().num_seconds(),
            expires_at: issued.expires_at,
        }),
    )
        .into_response()
}

pub async fn me(Extension(ctx): Extension<SecurityContext>) -> Response {
    let auth = match crate::authz::require_authenticated(&ctx) {
        Ok(auth) => auth,
        Err(resp) => return resp,
    };

    Json(dto::WhoAmIResponse {
        username: auth.username().to_string(),
        role: auth.principal().role.name.as_str(),
        authorities: auth
            .authorities()
            .iter()
            .map(|a| a.as_str().to_string())
            .collect(),
        request_id: auth.metadata().request_id.to_string(),
    })
    .into_response()
}

fn invalid_credentials(username: &str) -> Response {
    tracing::warn!(%username, "login rejected");
    errors::json_error(
        StatusCode::UNAUTHORIZED,
        "invalid_credentials",
        "invalid username or password",
    )
}
