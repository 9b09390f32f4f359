//! Catalog-wide endpoints: combined search, statistics, development seeding
//! and the category-image lookup.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::catalog::images::ImageManifest;
use crate::catalog::{search_suppliers, search_venues, ImageCategory, SearchParams};
use crate::db::{seeders, CatalogStats, SearchResponse, StatsResponse};
use crate::AppState;

use super::error::ApiError;

/// Largest `count` accepted by the image lookup
const MAX_IMAGE_COUNT: usize = 100;

/// Venues and suppliers matching the same parameters, in one body
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let venues = search_venues(&state.db, &params).await?;
    let suppliers = search_suppliers(&state.db, &params).await?;

    tracing::debug!(
        venues = venues.len(),
        suppliers = suppliers.len(),
        region = ?params.region,
        "Catalog search"
    );

    Ok(Json(SearchResponse {
        success: true,
        venue_count: venues.len(),
        supplier_count: suppliers.len(),
        venues,
        suppliers,
    }))
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>, ApiError> {
    let (total_users, total_venues, total_suppliers, total_events): (i64, i64, i64, i64) =
        sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users),
                (SELECT COUNT(*) FROM venues),
                (SELECT COUNT(*) FROM suppliers),
                (SELECT COUNT(*) FROM events)
            "#,
        )
        .fetch_one(&state.db)
        .await?;

    Ok(Json(StatsResponse {
        success: true,
        stats: CatalogStats {
            total_users,
            total_venues,
            total_suppliers,
            total_events,
        },
    }))
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub success: bool,
    pub message: String,
    pub inserted: usize,
}

pub async fn seed_venues(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SeedResponse>), ApiError> {
    let inserted = seeders::seed_venues(&state.db, &state.images)
        .await
        .map_err(|e| {
            tracing::error!("Failed to seed venues: {:#}", e);
            ApiError::database("שגיאה בהוספת אולמות לדוגמה")
        })?;

    Ok((
        StatusCode::CREATED,
        Json(SeedResponse {
            success: true,
            message: format!("נוספו {} אולמות", inserted),
            inserted,
        }),
    ))
}

pub async fn seed_suppliers(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SeedResponse>), ApiError> {
    let inserted = seeders::seed_suppliers(&state.db, &state.images)
        .await
        .map_err(|e| {
            tracing::error!("Failed to seed suppliers: {:#}", e);
            ApiError::database("שגיאה בהוספת ספקים לדוגמה")
        })?;

    Ok((
        StatusCode::CREATED,
        Json(SeedResponse {
            success: true,
            message: format!("נוספו {} ספקים", inserted),
            inserted,
        }),
    ))
}

/// Every category folder with its image URLs
pub async fn image_manifest(State(state): State<Arc<AppState>>) -> Json<ImageManifest> {
    Json(state.images.manifest())
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub count: Option<usize>,
    pub food_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImageListResponse {
    pub success: bool,
    pub category: String,
    pub images: Vec<String>,
    pub count: usize,
}

/// `count` images of one category, repeating when the folder holds fewer.
/// Unknown categories answer with an empty list.
pub async fn category_images(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(query): Query<ImageQuery>,
) -> Json<ImageListResponse> {
    let count = query.count.unwrap_or(1).min(MAX_IMAGE_COUNT);
    let food_type = query.food_type.as_deref();

    let key = ImageCategory::parse(&category, food_type)
        .map(|c| c.key())
        .unwrap_or_else(|_| category.to_lowercase());
    let images = state.images.images_by_name(&category, food_type, count);

    Json(ImageListResponse {
        success: true,
        category: key,
        count: images.len(),
        images,
    })
}
