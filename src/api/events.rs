use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use std::collections::HashSet;
use std::sync::Arc;

use crate::cart::CartItem;
use crate::db::{
    now_rfc3339, ChecklistItem, CreateEventRequest, Event, EventDetail, EventDetailResponse,
    EventListResponse, EventResponse, EventStatus, EventVendor, EventVendorResponse, Guest,
    MessageResponse, UpdateEventRequest, User, VendorSelection,
};
use crate::AppState;

use super::cart::{existing_cart_id, lookup_vendor};
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_date, validate_non_negative, validate_title};

/// Checklist every new event starts with
const DEFAULT_CHECKLIST: &[&str] = &[
    "לקבוע תקציב",
    "לבחור ולהזמין אולם",
    "לסגור קייטרינג",
    "לסגור צלם",
    "לסגור DJ או תזמורת",
    "לשלוח הזמנות לאורחים",
    "לאשר הגעה של האורחים",
    "לסדר הושבה",
];

/// Load an event and check that it belongs to `user`.
/// A missing event is 404, someone else's event is 403.
pub async fn ensure_event_owner(
    pool: &sqlx::SqlitePool,
    event_id: &str,
    user: &User,
) -> Result<Event, ApiError> {
    let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
        .bind(event_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("האירוע לא נמצא"))?;

    if event.user_id != user.id {
        tracing::warn!(event_id = %event.id, user_id = %user.id, "Access to foreign event denied");
        return Err(ApiError::forbidden("אין לך הרשאה לאירוע זה"));
    }

    Ok(event)
}

fn validate_event_fields(
    name: Option<&str>,
    event_date: &Option<String>,
    guest_count: Option<i64>,
    status: Option<&str>,
) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Some(name) = name {
        errors.check("name", validate_title(name, 120));
    }
    errors
        .check("event_date", validate_date(event_date))
        .check("guest_count", validate_non_negative(guest_count));
    if let Some(status) = status {
        if status.parse::<EventStatus>().is_err() {
            errors.add("status", "סטטוס אירוע לא תקין");
        }
    }
    errors.finish()
}

/// All of the current user's events, newest first
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<EventListResponse>, ApiError> {
    let events = sqlx::query_as::<_, Event>(
        "SELECT * FROM events WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
    )
    .bind(&user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(EventListResponse {
        success: true,
        count: events.len(),
        events,
    }))
}

/// Save an event with its vendors.
///
/// Vendors come from the body when it lists them, otherwise from the
/// session cart, which is emptied once the event is stored. The event, its
/// vendor snapshots and the default checklist are written in one transaction.
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    user: User,
    jar: CookieJar,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventDetailResponse>), ApiError> {
    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| match req.event_type.as_deref() {
            Some(t) if !t.trim().is_empty() => format!("האירוע שלי ({})", t.trim()),
            _ => "האירוע שלי".to_string(),
        });
    validate_event_fields(Some(name.as_str()), &req.event_date, req.guest_count, None)?;

    let cart_id = existing_cart_id(&jar);
    let (vendors, from_cart) = match &req.vendors {
        Some(selections) => (snapshot_selections(&state.db, selections).await?, false),
        None => {
            let items = cart_id
                .as_deref()
                .map(|id| state.carts.items(id))
                .unwrap_or_default();
            (items, true)
        }
    };

    let id = uuid::Uuid::new_v4().to_string();
    let now = now_rfc3339();

    let mut tx = state.db.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO events (id, user_id, name, event_type, event_date, budget, style, guest_count, region, status, notes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&user.id)
    .bind(&name)
    .bind(&req.event_type)
    .bind(req.event_date.as_deref().filter(|d| !d.is_empty()))
    .bind(&req.budget)
    .bind(&req.style)
    .bind(req.guest_count)
    .bind(&req.region)
    .bind(EventStatus::Planning.as_str())
    .bind(&req.notes)
    .bind(&now)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    for item in &vendors {
        sqlx::query(
            r#"
            INSERT INTO event_vendors (id, event_id, vendor_id, vendor_type, name, price, image_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(&id)
        .bind(&item.id)
        .bind(item.vendor_type.as_str())
        .bind(&item.name)
        .bind(item.price)
        .bind(&item.image_url)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
    }

    for title in DEFAULT_CHECKLIST {
        sqlx::query(
            "INSERT INTO checklist_items (id, event_id, title, is_completed, created_at, updated_at) VALUES (?, ?, ?, 0, ?, ?)",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(&id)
        .bind(title)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    if from_cart {
        if let Some(cart_id) = &cart_id {
            state.carts.clear(cart_id);
        }
    }

    tracing::info!(
        event_id = %id,
        user_id = %user.id,
        vendors = vendors.len(),
        from_cart,
        "Event saved"
    );

    let detail = load_event_detail(&state.db, &id).await?;
    Ok((
        StatusCode::CREATED,
        Json(EventDetailResponse {
            success: true,
            detail,
        }),
    ))
}

/// Catalog snapshots for an explicit vendor list, skipping repeated `(id, type)` pairs
async fn snapshot_selections(
    pool: &sqlx::SqlitePool,
    selections: &[VendorSelection],
) -> Result<Vec<CartItem>, ApiError> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(selections.len());
    for selection in selections {
        if !seen.insert((selection.id.clone(), selection.vendor_type)) {
            continue;
        }
        items.push(lookup_vendor(pool, selection.vendor_type, &selection.id).await?);
    }
    Ok(items)
}

async fn load_event_detail(pool: &sqlx::SqlitePool, event_id: &str) -> Result<EventDetail, ApiError> {
    let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
        .bind(event_id)
        .fetch_one(pool)
        .await?;

    let vendors = sqlx::query_as::<_, EventVendor>(
        "SELECT * FROM event_vendors WHERE event_id = ? ORDER BY rowid",
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;

    let checklist = sqlx::query_as::<_, ChecklistItem>(
        "SELECT * FROM checklist_items WHERE event_id = ? ORDER BY rowid",
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;

    let guests = sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE event_id = ? ORDER BY rowid")
        .bind(event_id)
        .fetch_all(pool)
        .await?;

    let vendor_total = vendors.iter().filter_map(|v| v.price).sum();

    Ok(EventDetail {
        event,
        vendors,
        checklist,
        guests,
        vendor_total,
    })
}

/// Event with vendors, checklist and guests
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
) -> Result<Json<EventDetailResponse>, ApiError> {
    let event = ensure_event_owner(&state.db, &id, &user).await?;
    let detail = load_event_detail(&state.db, &event.id).await?;

    Ok(Json(EventDetailResponse {
        success: true,
        detail,
    }))
}

/// Detail for the management page; same ownership rules as the JSON endpoint
pub async fn event_detail_for(
    pool: &sqlx::SqlitePool,
    id: &str,
    user: &User,
) -> Result<EventDetail, ApiError> {
    let event = ensure_event_owner(pool, id, user).await?;
    load_event_detail(pool, &event.id).await
}

/// Patch an event. Only the fields of `UpdateEventRequest` can change.
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<EventResponse>, ApiError> {
    ensure_event_owner(&state.db, &id, &user).await?;

    if req.is_empty() {
        return Err(ApiError::bad_request("לא נשלחו שדות לעדכון"));
    }
    validate_event_fields(
        req.name.as_deref(),
        &req.event_date,
        req.guest_count,
        req.status.as_deref(),
    )?;

    let status = req
        .status
        .as_deref()
        .and_then(|s| s.parse::<EventStatus>().ok())
        .map(|s| s.as_str());

    // An empty date string clears the stored date
    sqlx::query(
        r#"
        UPDATE events SET
            name = COALESCE(?, name),
            event_type = COALESCE(?, event_type),
            event_date = CASE WHEN ? = '' THEN NULL ELSE COALESCE(?, event_date) END,
            budget = COALESCE(?, budget),
            style = COALESCE(?, style),
            guest_count = COALESCE(?, guest_count),
            region = COALESCE(?, region),
            status = COALESCE(?, status),
            notes = COALESCE(?, notes),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(req.name.as_deref().map(str::trim))
    .bind(&req.event_type)
    .bind(&req.event_date)
    .bind(req.event_date.as_deref().filter(|d| !d.is_empty()))
    .bind(&req.budget)
    .bind(&req.style)
    .bind(req.guest_count)
    .bind(&req.region)
    .bind(status)
    .bind(&req.notes)
    .bind(now_rfc3339())
    .bind(&id)
    .execute(&state.db)
    .await?;

    let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    tracing::info!(event_id = %id, status = %event.get_status(), "Event updated");

    Ok(Json(EventResponse {
        success: true,
        event,
    }))
}

/// Delete an event; vendors, checklist items and guests cascade
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    ensure_event_owner(&state.db, &id, &user).await?;

    let mut tx = state.db.begin().await?;
    for table in ["event_vendors", "checklist_items", "guests"] {
        sqlx::query(&format!("DELETE FROM {} WHERE event_id = ?", table))
            .bind(&id)
            .execute(&mut *tx)
            .await?;
    }
    sqlx::query("DELETE FROM events WHERE id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(event_id = %id, user_id = %user.id, "Event deleted");

    Ok(Json(MessageResponse::ok("האירוע נמחק")))
}

/// Attach one more catalog vendor to an event
pub async fn add_event_vendor(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
    Json(selection): Json<VendorSelection>,
) -> Result<(StatusCode, Json<EventVendorResponse>), ApiError> {
    ensure_event_owner(&state.db, &id, &user).await?;

    let existing: Option<(String,)> = sqlx::query_as(
        "SELECT id FROM event_vendors WHERE event_id = ? AND vendor_id = ? AND vendor_type = ?",
    )
    .bind(&id)
    .bind(&selection.id)
    .bind(selection.vendor_type.as_str())
    .fetch_optional(&state.db)
    .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("הספק כבר משויך לאירוע"));
    }

    let item = lookup_vendor(&state.db, selection.vendor_type, &selection.id).await?;
    let row_id = uuid::Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO event_vendors (id, event_id, vendor_id, vendor_type, name, price, image_url, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&row_id)
    .bind(&id)
    .bind(&item.id)
    .bind(item.vendor_type.as_str())
    .bind(&item.name)
    .bind(item.price)
    .bind(&item.image_url)
    .bind(now_rfc3339())
    .execute(&state.db)
    .await?;

    let vendor = sqlx::query_as::<_, EventVendor>("SELECT * FROM event_vendors WHERE id = ?")
        .bind(&row_id)
        .fetch_one(&state.db)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(EventVendorResponse {
            success: true,
            vendor,
        }),
    ))
}

/// Detach a vendor. `vendor_id` may be the link row id or the catalog id.
pub async fn remove_event_vendor(
    State(state): State<Arc<AppState>>,
    user: User,
    Path((id, vendor_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    ensure_event_owner(&state.db, &id, &user).await?;

    let result = sqlx::query(
        "DELETE FROM event_vendors WHERE event_id = ? AND (id = ? OR vendor_id = ?)",
    )
    .bind(&id)
    .bind(&vendor_id)
    .bind(&vendor_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("הספק אינו משויך לאירוע"));
    }

    Ok(Json(MessageResponse::ok("הספק הוסר מהאירוע")))
}
