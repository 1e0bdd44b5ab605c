use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use inventra_auth::{AuthenticationGate, RequestMetadata, SecurityContext};

#[derive(Clone)]
pub struct AuthState {
    pub gate: AuthenticationGate,
}

/// Attach a [`SecurityContext`] to every request.
///
/// Never rejects: handlers decide through [`crate::authz`] whether an
/// anonymous context is acceptable.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let authorization = header_str(&req, header::AUTHORIZATION);
    let user_agent = header_str(&req, header::USER_AGENT);
    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.to_string());
    let existing = req.extensions().get::<SecurityContext>().cloned();

    let ctx = state
        .gate
        .authenticate(
            authorization.as_deref(),
            existing.as_ref(),
            RequestMetadata::new(remote_addr, user_agent),
            Utc::now(),
        )
        .await;

    req.extensions_mut().insert(ctx);
    next.run(req).await
}

fn header_str(req: &Request, name: header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}
