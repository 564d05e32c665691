use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::api::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // D402 SALES OVERVIEW DASHBOARD
        // ========================================
        .route(
            "/api/d402/upload",
            post(handlers::d402_sales_overview::upload),
        )
        .route(
            "/api/d402/overview",
            post(handlers::d402_sales_overview::get_overview),
        )
        .route(
            "/api/d402/filter_options",
            get(handlers::d402_sales_overview::get_filter_options),
        )
        .route(
            "/api/d402/dataset",
            delete(handlers::d402_sales_overview::reset_dataset),
        )
}
