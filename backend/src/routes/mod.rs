//! Route definitions for the Restaurant POS admin API

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/nonce", get(handlers::issue_nonce))
        .route("/dashboard/settings", get(handlers::get_dashboard_settings))
        // Protected routes - menu categories
        .nest("/categories", category_routes())
        // Protected routes - fryers and oil batches
        .nest("/fryers", fryer_routes())
        .nest("/batches", batch_routes())
        // Protected routes - ingredient stock
        .nest("/ingredients", ingredient_routes())
        // Protected routes - reports
        .nest("/reports", report_routes())
        // Protected routes - kitchen display
        .nest("/kitchen", kitchen_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        .merge(protected)
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

/// Category routes (protected)
fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/:category_id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
}

/// Fryer routes (protected)
fn fryer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_fryers).post(handlers::create_fryer))
        .route("/dashboard", get(handlers::get_fryer_dashboard))
        .route("/alerts", get(handlers::list_oil_alerts))
        .route(
            "/:fryer_id",
            get(handlers::get_fryer)
                .put(handlers::update_fryer)
                .delete(handlers::delete_fryer),
        )
        .route(
            "/:fryer_id/batches",
            get(handlers::list_batches).post(handlers::start_batch),
        )
}

/// Oil batch routes (protected)
fn batch_routes() -> Router<AppState> {
    Router::new()
        .route("/:batch_id", get(handlers::get_batch))
        .route("/:batch_id/close", post(handlers::close_batch))
        .route(
            "/:batch_id/usage",
            get(handlers::list_usage).post(handlers::record_usage),
        )
}

/// Ingredient routes (protected)
fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_ingredients).post(handlers::create_ingredient),
        )
        .route(
            "/:ingredient_id",
            get(handlers::get_ingredient)
                .put(handlers::update_ingredient)
                .delete(handlers::delete_ingredient),
        )
        .route(
            "/:ingredient_id/movements",
            get(handlers::list_movements).post(handlers::record_movement),
        )
}

/// Report routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new().route(
        "/ingredient-usage",
        get(handlers::get_ingredient_usage_report),
    )
}

/// Kitchen display routes (protected)
fn kitchen_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/orders",
            get(handlers::list_kitchen_orders).post(handlers::create_kitchen_order),
        )
        .route("/orders/:order_id", get(handlers::get_kitchen_order))
        .route(
            "/orders/:order_id/status",
            put(handlers::update_kitchen_order_status),
        )
}
