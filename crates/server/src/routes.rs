use axum::{routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::types::{Health, Message};

use crate::state::AppState;

pub mod records;

pub async fn root() -> Json<Message> {
    Json(Message::new("Welcome to the Company Logs and Tickets API!"))
}

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// Build the full application router: greeting, health, and one CRUD route
/// set per collection (`/items` for logs, `/tickets` for tickets).
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health));

    public
        .merge(records::record_routes(state.logs))
        .merge(records::record_routes(state.tickets))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx responses are logged at ERROR
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
