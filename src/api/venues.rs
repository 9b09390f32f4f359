use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::catalog::{search_venues, ImageCategory, SearchParams};
use crate::db::{now_rfc3339, CreateVenueRequest, User, Venue, VenueListResponse, VenueResponse};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{normalize_phone, validate_non_negative, validate_phone, validate_title};

/// List venues, narrowed by any supplied filter parameters
pub async fn list_venues(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<VenueListResponse>, ApiError> {
    let venues = search_venues(&state.db, &params).await?;
    tracing::debug!(count = venues.len(), "Listed venues");

    Ok(Json(VenueListResponse {
        success: true,
        count: venues.len(),
        venues,
    }))
}

pub async fn get_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<VenueResponse>, ApiError> {
    let venue = sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("האולם לא נמצא"))?;

    Ok(Json(VenueResponse {
        success: true,
        venue,
    }))
}

/// Add a venue to the catalog. Without an explicit image one is picked from the style's folder.
pub async fn create_venue(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(req): Json<CreateVenueRequest>,
) -> Result<(StatusCode, Json<VenueResponse>), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors
        .check("name", validate_title(&req.name, 120))
        .check("city", validate_title(&req.city, 60))
        .check("price", validate_non_negative(req.price))
        .check("capacity", validate_non_negative(req.capacity))
        .check("phone", validate_phone(req.phone.as_deref().unwrap_or("")));
    errors.finish()?;

    let image_url = match req.image_url.filter(|u| !u.trim().is_empty()) {
        Some(url) => Some(url),
        None => {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM venues")
                .fetch_one(&state.db)
                .await?;
            let category = ImageCategory::for_venue_style(req.style.as_deref().unwrap_or(""));
            state.images.image_at(category, count as usize)
        }
    };

    let id = uuid::Uuid::new_v4().to_string();
    let now = now_rfc3339();
    let phone = req
        .phone
        .as_deref()
        .map(normalize_phone)
        .filter(|p| !p.is_empty());

    sqlx::query(
        r#"
        INSERT INTO venues (id, name, city, address, style, is_open_air, price, phone, capacity, image_url, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(req.name.trim())
    .bind(req.city.trim())
    .bind(&req.address)
    .bind(&req.style)
    .bind(req.is_open_air)
    .bind(req.price)
    .bind(&phone)
    .bind(req.capacity)
    .bind(&image_url)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let venue = sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    tracing::info!(venue_id = %venue.id, user_id = %user.id, "Venue created");

    Ok((
        StatusCode::CREATED,
        Json(VenueResponse {
            success: true,
            venue,
        }),
    ))
}
