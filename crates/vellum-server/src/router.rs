use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all Vellum endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/blob", post(handler::post_blob))
        .route(
            "/blob/:hash",
            get(handler::get_blob)
                .head(handler::head_blob)
                .put(handler::put_blob),
        )
        .route("/query", get(handler::query_entries))
        .route("/search", get(handler::search))
        .route("/content/:id", get(handler::get_content))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
