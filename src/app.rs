use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::handlers;
use crate::services::MealStore;

/// Builds the application router with its session layer. Kept separate
/// from `main` so tests can drive the router in-process.
pub fn create_router(store: MealStore, session_key: Key) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_name("session")
        .with_signed(session_key);

    Router::new()
        // Auth routes
        .route("/", get(handlers::home))
        .route(
            "/register",
            get(handlers::serve_register_page).post(handlers::handle_register),
        )
        .route(
            "/login",
            get(handlers::serve_login_page).post(handlers::handle_login),
        )
        .route("/logout", get(handlers::handle_logout))
        // Meal routes
        .route(
            "/add",
            get(handlers::serve_add_meal).post(handlers::handle_add_meal),
        )
        .route(
            "/edit/:meal_id",
            get(handlers::serve_edit_meal).post(handlers::handle_edit_meal),
        )
        .route("/delete/:meal_id", post(handlers::handle_delete_meal))
        // Dashboard and reports
        .route("/dashboard", get(handlers::serve_dashboard))
        .route("/reports", get(handlers::serve_reports))
        .route("/export_csv", get(handlers::export_csv))
        // Admin routes
        .route("/admin", get(handlers::admin_dashboard))
        .route("/admin/user/:user_id", get(handlers::admin_user_detail))
        .route(
            "/admin/user/:user_id/export",
            get(handlers::admin_user_export),
        )
        // Static files
        .nest_service("/static", ServeDir::new("static"))
        // Add middleware
        .layer(session_layer)
        // Add state
        .with_state(store)
}
