use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub fn create_doh_routes(state: AppState) -> Router {
    Router::new()
        .route("/resolve", get(handlers::resolve_doh_query))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
