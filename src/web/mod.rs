pub mod calendar;
pub mod handlers;
pub mod views;

use std::sync::Arc;

use anyhow::Result;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::client::PlanClient;
use crate::models::Config;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<Config>,
    pub(crate) client: Arc<PlanClient>,
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::week_page))
        .route("/api/blocks", get(handlers::blocks_json))
        .route("/api/wire-map", get(handlers::wire_map_json))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: Config, addr: &str) -> Result<()> {
    let client = PlanClient::new(&config.api)?;
    info!("Reading schedule from {}", client.endpoint());
    let state = AppState {
        config: Arc::new(config),
        client: Arc::new(client),
    };

    let listener = TcpListener::bind(addr).await?;
    info!("Weekly plan view listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
