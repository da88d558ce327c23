use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{courses, health, query, sessions};
use crate::state::AppState;

/// Creates the application router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/query", post(query::query_documents))
        .route("/api/courses", get(courses::get_course_stats))
        .route("/api/courses/add", post(courses::add_course))
        .route("/api/sessions/new", post(sessions::create_session))
        .route(
            "/api/sessions/:session_id/clear",
            delete(sessions::clear_session),
        )
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}
