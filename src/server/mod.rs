use axum::{
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::chemical::ChemicalRecord;
use crate::exposure::ExposureLimitRecord;
use crate::storage::Store;
use crate::ui::Icons;

pub mod routes;

/// Server state
pub struct AppState {
    pub chemicals: Store<ChemicalRecord>,
    pub limits: Store<ExposureLimitRecord>,
    pub page_size: usize,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/stats", get(routes::handle_stats))
        .route("/chemicals", get(routes::handle_chemicals))
        .route("/chemicals/{id}", get(routes::handle_chemical))
        .route("/limits", get(routes::handle_limits))
        .route("/lookup/{cas}", get(routes::handle_lookup))
        .route("/completeness/{cas}", get(routes::handle_completeness))
        .route("/link", get(routes::handle_link))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(port: u16, state: AppState) -> anyhow::Result<()> {
    state.chemicals.init().await?;
    state.limits.init().await?;

    let app = router(Arc::new(state));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {}", addr);
    println!("{} Serving {} at http://{}", Icons::GLOBE, env!("CARGO_PKG_NAME"), addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
