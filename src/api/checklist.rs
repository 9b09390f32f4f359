use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{
    now_rfc3339, ChecklistItem, ChecklistItemResponse, ChecklistResponse,
    CreateChecklistItemRequest, MessageResponse, UpdateChecklistItemRequest, User,
};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::events::ensure_event_owner;
use super::validation::{validate_date, validate_title};

/// Load a checklist item whose event belongs to `user`
async fn owned_item(
    pool: &sqlx::SqlitePool,
    item_id: &str,
    user: &User,
) -> Result<ChecklistItem, ApiError> {
    let item = sqlx::query_as::<_, ChecklistItem>("SELECT * FROM checklist_items WHERE id = ?")
        .bind(item_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("המשימה לא נמצאה"))?;

    ensure_event_owner(pool, &item.event_id, user).await?;
    Ok(item)
}

pub async fn list_checklist(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(event_id): Path<String>,
) -> Result<Json<ChecklistResponse>, ApiError> {
    ensure_event_owner(&state.db, &event_id, &user).await?;

    let items = sqlx::query_as::<_, ChecklistItem>(
        "SELECT * FROM checklist_items WHERE event_id = ? ORDER BY rowid",
    )
    .bind(&event_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ChecklistResponse {
        success: true,
        items,
    }))
}

pub async fn create_checklist_item(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(event_id): Path<String>,
    Json(req): Json<CreateChecklistItemRequest>,
) -> Result<(StatusCode, Json<ChecklistItemResponse>), ApiError> {
    ensure_event_owner(&state.db, &event_id, &user).await?;

    let mut errors = ValidationErrorBuilder::new();
    errors
        .check("title", validate_title(&req.title, 200))
        .check("due_date", validate_date(&req.due_date));
    errors.finish()?;

    let id = uuid::Uuid::new_v4().to_string();
    let now = now_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO checklist_items (id, event_id, title, is_completed, due_date, created_at, updated_at)
        VALUES (?, ?, ?, 0, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&event_id)
    .bind(req.title.trim())
    .bind(req.due_date.as_deref().filter(|d| !d.is_empty()))
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let item = sqlx::query_as::<_, ChecklistItem>("SELECT * FROM checklist_items WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ChecklistItemResponse {
            success: true,
            item,
        }),
    ))
}

pub async fn update_checklist_item(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(item_id): Path<String>,
    Json(req): Json<UpdateChecklistItemRequest>,
) -> Result<Json<ChecklistItemResponse>, ApiError> {
    owned_item(&state.db, &item_id, &user).await?;

    let mut errors = ValidationErrorBuilder::new();
    if let Some(title) = &req.title {
        errors.check("title", validate_title(title, 200));
    }
    errors.check("due_date", validate_date(&req.due_date));
    errors.finish()?;

    sqlx::query(
        r#"
        UPDATE checklist_items SET
            title = COALESCE(?, title),
            is_completed = COALESCE(?, is_completed),
            due_date = CASE WHEN ? = '' THEN NULL ELSE COALESCE(?, due_date) END,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(req.title.as_deref().map(str::trim))
    .bind(req.is_completed)
    .bind(&req.due_date)
    .bind(req.due_date.as_deref().filter(|d| !d.is_empty()))
    .bind(now_rfc3339())
    .bind(&item_id)
    .execute(&state.db)
    .await?;

    let item = sqlx::query_as::<_, ChecklistItem>("SELECT * FROM checklist_items WHERE id = ?")
        .bind(&item_id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(ChecklistItemResponse {
        success: true,
        item,
    }))
}

pub async fn delete_checklist_item(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(item_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    owned_item(&state.db, &item_id, &user).await?;

    sqlx::query("DELETE FROM checklist_items WHERE id = ?")
        .bind(&item_id)
        .execute(&state.db)
        .await?;

    Ok(Json(MessageResponse::ok("המשימה נמחקה")))
}
