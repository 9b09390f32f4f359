pub mod auth;
mod cart;
mod catalog;
pub mod cleanup;
mod checklist;
pub mod error;
mod events;
mod guests;
mod suppliers;
pub mod validation;
mod venues;

pub use events::event_detail_for;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth routes (public, logout checks the session itself)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/current_user", get(auth::current_user))
        .route("/check_user", post(auth::check_user))
        .route("/password-reset/request", post(auth::request_password_reset))
        .route("/password-reset/confirm", post(auth::confirm_password_reset));

    // Catalog routes; creating entries requires a logged-in user
    let catalog_routes = Router::new()
        .route("/venues", get(venues::list_venues).post(venues::create_venue))
        .route("/venues/:id", get(venues::get_venue))
        .route("/suppliers", get(suppliers::list_suppliers).post(suppliers::create_supplier))
        .route("/suppliers/:id", get(suppliers::get_supplier))
        .route(
            "/suppliers/type/:supplier_type",
            get(suppliers::list_suppliers_by_type),
        )
        .route("/search", get(catalog::search))
        .route("/stats", get(catalog::stats))
        .route("/images", get(catalog::image_manifest))
        .route("/images/:category", get(catalog::category_images));

    let cart_routes = Router::new()
        .route(
            "/cart",
            get(cart::get_cart)
                .post(cart::add_to_cart)
                .delete(cart::clear_cart),
        )
        .route("/cart/:type/:id", delete(cart::remove_from_cart));

    // Event routes (ownership checked per handler)
    let event_routes = Router::new()
        .route("/events", get(events::list_events))
        .route("/events", post(events::create_event))
        .route("/events/:id", get(events::get_event))
        .route("/events/:id", put(events::update_event))
        .route("/events/:id", delete(events::delete_event))
        .route("/events/:id/vendors", post(events::add_event_vendor))
        .route(
            "/events/:id/vendors/:vendor_id",
            delete(events::remove_event_vendor),
        )
        // Checklist
        .route("/events/:id/checklist", get(checklist::list_checklist))
        .route("/events/:id/checklist", post(checklist::create_checklist_item))
        .route("/checklist/:item_id", put(checklist::update_checklist_item))
        .route("/checklist/:item_id", delete(checklist::delete_checklist_item))
        // Guests
        .route("/events/:id/guests", get(guests::list_guests))
        .route("/events/:id/guests", post(guests::create_guest))
        .route("/events/:id/guests/summary", get(guests::guest_summary))
        .route("/guests/:guest_id", put(guests::update_guest))
        .route("/guests/:guest_id", delete(guests::delete_guest));

    let mut api_routes = auth_routes
        .merge(catalog_routes)
        .merge(cart_routes)
        .merge(event_routes);

    if state.config.dev.seed_routes {
        tracing::warn!("Development seed routes are enabled");
        api_routes = api_routes
            .route("/dev/seed-venues", post(catalog::seed_venues))
            .route("/dev/seed-suppliers", post(catalog::seed_suppliers));
    }

    let static_files = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .merge(crate::ui::create_router())
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
