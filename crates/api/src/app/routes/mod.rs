use axum::{Router, routing::get};

pub mod auth;
pub mod explain;
pub mod projects;
pub mod system;

/// Router for everything behind the authentication layer.
pub fn router() -> Router {
    Router::new()
        .route("/authz/explain", get(explain::explain))
        .nest("/auth", auth::router())
        .nest("/projects", projects::router())
}
