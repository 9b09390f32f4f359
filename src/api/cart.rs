use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::cart::{total_price, AddOutcome, CartItem, CART_COOKIE};
use crate::db::{MessageResponse, Supplier, Venue, VendorType};
use crate::AppState;

use super::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub vendor_type: VendorType,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub success: bool,
    pub items: Vec<CartItem>,
    pub count: usize,
    pub total: i64,
}

impl CartResponse {
    fn from_items(items: Vec<CartItem>) -> Self {
        Self {
            success: true,
            count: items.len(),
            total: total_price(&items),
            items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddToCartResponse {
    pub success: bool,
    pub message: String,
    pub added: bool,
    pub cart: CartResponse,
}

/// The cart id from the request cookie, if one was issued before
pub fn existing_cart_id(jar: &CookieJar) -> Option<String> {
    jar.get(CART_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|id| !id.is_empty())
}

/// The request's cart id, issuing a new cookie on first use
fn ensure_cart_id(jar: CookieJar) -> (CookieJar, String) {
    if let Some(id) = existing_cart_id(&jar) {
        return (jar, id);
    }

    let id = uuid::Uuid::new_v4().to_string();
    let cookie = Cookie::build((CART_COOKIE, id.clone()))
        .path("/")
        .http_only(true);
    (jar.add(cookie), id)
}

/// Snapshot of a catalog entry as a cart item
pub async fn lookup_vendor(
    pool: &sqlx::SqlitePool,
    vendor_type: VendorType,
    id: &str,
) -> Result<CartItem, ApiError> {
    match vendor_type {
        VendorType::Venue => {
            let venue = sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE id = ?")
                .bind(id)
                .fetch_optional(pool)
                .await?
                .ok_or_else(|| ApiError::not_found("האולם לא נמצא"))?;
            Ok(CartItem {
                id: venue.id,
                vendor_type,
                name: venue.name,
                price: venue.price,
                image_url: venue.image_url,
            })
        }
        VendorType::Supplier => {
            let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ?")
                .bind(id)
                .fetch_optional(pool)
                .await?
                .ok_or_else(|| ApiError::not_found("הספק לא נמצא"))?;
            Ok(CartItem {
                id: supplier.id,
                vendor_type,
                name: supplier.name,
                price: supplier.price,
                image_url: supplier.image_url,
            })
        }
    }
}

pub async fn get_cart(State(state): State<Arc<AppState>>, jar: CookieJar) -> Json<CartResponse> {
    let items = existing_cart_id(&jar)
        .map(|id| state.carts.items(&id))
        .unwrap_or_default();
    Json(CartResponse::from_items(items))
}

/// Add a venue or supplier; adding the same `(id, type)` twice keeps one copy
pub async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<AddToCartRequest>,
) -> Result<(CookieJar, Json<AddToCartResponse>), ApiError> {
    if req.id.trim().is_empty() {
        return Err(ApiError::validation_field("id", "שדה חובה"));
    }

    let item = lookup_vendor(&state.db, req.vendor_type, req.id.trim()).await?;
    let (jar, cart_id) = ensure_cart_id(jar);

    let name = item.name.clone();
    let outcome = state.carts.add(&cart_id, item);
    let (added, message) = match outcome {
        AddOutcome::Added => (true, format!("{} נוסף לסל", name)),
        AddOutcome::AlreadyPresent => (false, format!("{} כבר נמצא בסל", name)),
    };

    tracing::debug!(cart_id = %cart_id, vendor_id = %req.id, added, "Cart add");

    Ok((
        jar,
        Json(AddToCartResponse {
            success: true,
            message,
            added,
            cart: CartResponse::from_items(state.carts.items(&cart_id)),
        }),
    ))
}

pub async fn remove_from_cart(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path((vendor_type, id)): Path<(String, String)>,
) -> Result<Json<CartResponse>, ApiError> {
    let vendor_type: VendorType = vendor_type
        .parse()
        .map_err(|_| ApiError::bad_request("סוג פריט לא תקין"))?;
    let cart_id = existing_cart_id(&jar).ok_or_else(|| ApiError::not_found("הפריט אינו בסל"))?;

    if !state.carts.remove(&cart_id, vendor_type, &id) {
        return Err(ApiError::not_found("הפריט אינו בסל"));
    }

    Ok(Json(CartResponse::from_items(state.carts.items(&cart_id))))
}

pub async fn clear_cart(State(state): State<Arc<AppState>>, jar: CookieJar) -> Json<MessageResponse> {
    if let Some(cart_id) = existing_cart_id(&jar) {
        state.carts.clear(&cart_id);
    }
    Json(MessageResponse::ok("הסל רוקן"))
}
