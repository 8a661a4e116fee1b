// routes.rs
use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        auth::auth_handler,
        commission::admin_commission_handler,
        notification_handler::{admin_notification_handler, notification_handler},
        users::{admin_users_handler, users_handler},
        wallet::{admin_wallet_handler, wallet_handler},
    },
    middleware::{admin_guard, auth},
    AppState,
};

// Health check handler
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .nest("/users", admin_users_handler())
        .nest("/wallet", admin_wallet_handler())
        .nest("/commission", admin_commission_handler())
        .nest("/notifications", admin_notification_handler())
        .layer(middleware::from_fn(admin_guard))
        .layer(middleware::from_fn(auth));

    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest(
            "/users",
            users_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/wallet",
            wallet_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/notifications",
            notification_handler().layer(middleware::from_fn(auth)),
        )
        .nest("/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}
