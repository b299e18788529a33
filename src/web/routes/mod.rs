//! Contains all the routes that this application can handle.

mod admin;
mod health;
mod newsletter;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};

use crate::{web::rate_limit::rate_limit, AppState};

/// All the routes of the server
pub fn routes(app_state: AppState) -> Router {
    Router::new().nest("/api", api_routes(app_state))
}

/// API - Routes nested under "/api" path
fn api_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/admin/subscribers", get(admin::list_subscribers))
        .with_state(app_state.clone())
        .nest("/newsletter", newsletter_routes(app_state))
}

/// NEWSLETTER - Routes nested under "/newsletter" path.
/// Every request under the path is rate limited per source, unknown paths included.
fn newsletter_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/subscribe", post(newsletter::subscribe))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(app_state.clone(), rate_limit))
        .with_state(app_state)
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
