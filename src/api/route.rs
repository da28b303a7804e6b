use axum::{http::StatusCode, routing::get, Router};
use tower_http::trace::TraceLayer;

// Liveness router for external uptime checks; carries no monitoring state
pub fn create_router() -> Router {
    Router::new()
        .route("/", get(liveness))
        .layer(TraceLayer::new_for_http())
}

// GET / handler
async fn liveness() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
