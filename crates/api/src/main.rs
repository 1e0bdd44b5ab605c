use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use inventra_api::app::{build_app, services};
use inventra_api::config::{ApiConfig, ROOT_PASSWORD_ENV};
use inventra_auth::{InMemoryPrincipalStore, Principal, Role, RoleName, hash_password};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    inventra_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    tracing::debug!(?config, "configuration loaded");

    let principals = Arc::new(InMemoryPrincipalStore::new());
    match config.root_password.clone() {
        Some(password) => {
            let hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;
            principals.insert(Principal::new("root", hash, Role::new(RoleName::Root, Vec::new())));
            tracing::info!("seeded root principal");
        }
        None => tracing::warn!("{ROOT_PASSWORD_ENV} not set; principal store starts empty"),
    }

    let services = services::build_services(&config, principals).context("building services")?;
    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
