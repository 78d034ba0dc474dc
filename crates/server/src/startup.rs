use std::sync::Arc;

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::{AppConfig, StoreBackend, StoreConfig};
use dotenvy::dotenv;
use service::store::{MemoryStore, PostgrestStore};
use service::TableStore;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Create the single store handle shared by every request.
pub fn build_store(cfg: &StoreConfig) -> anyhow::Result<Arc<dyn TableStore>> {
    match cfg.backend {
        StoreBackend::Postgrest => {
            let store = PostgrestStore::from_config(cfg)?;
            info!(url = %cfg.url, "using PostgREST table store");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("using in-memory table store; records are lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Build the router for a given state with the default CORS policy.
pub fn app(state: AppState) -> Router {
    routes::build_router(state, build_cors())
}

/// Public entry: load configuration, build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_and_validate()?;
    let store = build_store(&cfg.store)?;
    let state = AppState::new(store, &cfg.store);
    info!(
        logs_table = %cfg.store.logs_table,
        tickets_table = %cfg.store.tickets_table,
        "record collections configured"
    );

    let router = app(state);

    let listener = tokio::net::TcpListener::bind(cfg.server.bind_addr()).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "starting records api");
    axum::serve(listener, router).await?;
    Ok(())
}
