// Server-rendered pages
// Uses Askama templates; the pages call the JSON API from the browser for changes

mod templates;

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use crate::api::error::ErrorCode;
use crate::cart::{total_price, CART_COOKIE};
use crate::catalog::{search_suppliers, search_venues, ImageCategory, Region, SearchParams};
use crate::db::{Event, User};
use crate::AppState;

pub use templates::*;

// Helper to render templates and handle errors
fn render_template<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Template error: {}", e)).into_response(),
    }
}

fn render_error(user: Option<&User>, status: StatusCode, title: &str, message: &str) -> Response {
    let template = ErrorTemplate {
        user: user.map(NavUser::from),
        title: title.to_string(),
        message: message.to_string(),
    };
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Template error: {}", e)).into_response(),
    }
}

pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public pages
        .route("/", get(index))
        .route("/login", get(login_page))
        .route("/register", get(register_page))
        .route("/plan", get(plan_page))
        .route("/results", get(results_page))
        // Pages for logged-in users
        .route("/dashboard", get(dashboard))
        .route("/events/:id", get(event_page))
}

// Home page
async fn index(State(state): State<Arc<AppState>>, user: Option<User>) -> Response {
    let (total_venues, total_suppliers): (i64, i64) = sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM venues), (SELECT COUNT(*) FROM suppliers)",
    )
    .fetch_one(&state.db)
    .await
    .unwrap_or((0, 0));

    let mut hero_images = state.images.images(ImageCategory::Wedding, 1);
    hero_images.extend(state.images.images(ImageCategory::Hall, 1));
    hero_images.extend(state.images.images(ImageCategory::Pool, 1));

    render_template(IndexTemplate {
        user: user.as_ref().map(NavUser::from),
        hero_images,
        total_venues,
        total_suppliers,
    })
}

async fn login_page(user: Option<User>) -> Response {
    if user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    render_template(LoginTemplate { user: None })
}

async fn register_page(user: Option<User>) -> Response {
    if user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    render_template(RegisterTemplate { user: None })
}

async fn plan_page(user: Option<User>) -> Response {
    let regions = Region::ALL
        .iter()
        .map(|r| SelectOption {
            value: r.code().to_string(),
            label: r.label().to_string(),
        })
        .collect();

    render_template(PlanTemplate {
        user: user.as_ref().map(NavUser::from),
        regions,
    })
}

// Filtered venues and suppliers next to the session cart
async fn results_page(
    State(state): State<Arc<AppState>>,
    user: Option<User>,
    jar: CookieJar,
    Query(params): Query<SearchParams>,
) -> Response {
    let venues = match search_venues(&state.db, &params).await {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Failed to search venues: {}", e);
            Vec::new()
        }
    };
    let suppliers = match search_suppliers(&state.db, &params).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to search suppliers: {}", e);
            Vec::new()
        }
    };

    let cart = jar
        .get(CART_COOKIE)
        .map(|c| state.carts.items(c.value()))
        .unwrap_or_default();

    render_template(ResultsTemplate {
        user: user.as_ref().map(NavUser::from),
        event_type: params.event_type.clone().unwrap_or_default(),
        venues: venues.into_iter().map(VendorCard::from).collect(),
        suppliers: suppliers.into_iter().map(VendorCard::from).collect(),
        cart_total: group_thousands(total_price(&cart)),
        cart,
    })
}

// Dashboard: the user's saved events
async fn dashboard(State(state): State<Arc<AppState>>, user: Option<User>) -> Response {
    let Some(user) = user else {
        return Redirect::to("/login").into_response();
    };

    let events: Vec<Event> = sqlx::query_as(
        "SELECT * FROM events WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
    )
    .bind(&user.id)
    .fetch_all(&state.db)
    .await
    .unwrap_or_default();

    render_template(DashboardTemplate {
        user: Some(NavUser::from(&user)),
        events: events.into_iter().map(EventRow::from).collect(),
    })
}

// Event management page, owner only
async fn event_page(
    State(state): State<Arc<AppState>>,
    user: Option<User>,
    Path(id): Path<String>,
) -> Response {
    let Some(user) = user else {
        return Redirect::to("/login").into_response();
    };

    match crate::api::event_detail_for(&state.db, &id, &user).await {
        Ok(detail) => render_template(EventTemplate::new(&user, detail)),
        Err(e) => match e.code() {
            ErrorCode::Forbidden => render_error(
                Some(&user),
                StatusCode::FORBIDDEN,
                "אין הרשאה",
                "האירוע שייך למשתמש אחר.",
            ),
            ErrorCode::NotFound => render_error(
                Some(&user),
                StatusCode::NOT_FOUND,
                "האירוע לא נמצא",
                "ייתכן שהאירוע נמחק.",
            ),
            _ => render_error(
                Some(&user),
                StatusCode::INTERNAL_SERVER_ERROR,
                "שגיאה",
                e.message(),
            ),
        },
    }
}
