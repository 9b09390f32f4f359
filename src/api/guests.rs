use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{
    now_rfc3339, CreateGuestRequest, Guest, GuestListResponse, GuestResponse, GuestSummary,
    GuestSummaryResponse, MessageResponse, RsvpStatus, UpdateGuestRequest, User,
};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::events::ensure_event_owner;
use super::validation::{
    normalize_email, normalize_phone, validate_email, validate_party_size, validate_phone,
    validate_title,
};

async fn owned_guest(pool: &sqlx::SqlitePool, guest_id: &str, user: &User) -> Result<Guest, ApiError> {
    let guest = sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE id = ?")
        .bind(guest_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("האורח לא נמצא"))?;

    ensure_event_owner(pool, &guest.event_id, user).await?;
    Ok(guest)
}

/// Checks shared by create and update; `None` fields are not being written
fn validate_guest_fields(
    name: Option<&str>,
    phone: Option<&str>,
    email: Option<&str>,
    rsvp_status: Option<&str>,
    party_size: Option<i64>,
) -> Result<Option<RsvpStatus>, ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Some(name) = name {
        errors.check("name", validate_title(name, 120));
    }
    if let Some(phone) = phone {
        errors.check("phone", validate_phone(phone));
    }
    if let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) {
        errors.check("email", validate_email(&normalize_email(email)));
    }
    if let Some(size) = party_size {
        errors.check("party_size", validate_party_size(size));
    }

    let status = match rsvp_status {
        Some(s) => match s.parse::<RsvpStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                errors.add("rsvp_status", "סטטוס הגעה לא תקין");
                None
            }
        },
        None => None,
    };

    errors.finish()?;
    Ok(status)
}

fn clean_phone(phone: Option<&str>) -> Option<String> {
    phone.map(normalize_phone).filter(|p| !p.is_empty())
}

fn clean_email(email: Option<&str>) -> Option<String> {
    email.map(normalize_email).filter(|e| !e.is_empty())
}

pub async fn list_guests(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(event_id): Path<String>,
) -> Result<Json<GuestListResponse>, ApiError> {
    ensure_event_owner(&state.db, &event_id, &user).await?;

    let guests = sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE event_id = ? ORDER BY rowid")
        .bind(&event_id)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(GuestListResponse {
        success: true,
        guests,
    }))
}

pub async fn create_guest(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(event_id): Path<String>,
    Json(req): Json<CreateGuestRequest>,
) -> Result<(StatusCode, Json<GuestResponse>), ApiError> {
    ensure_event_owner(&state.db, &event_id, &user).await?;

    let party_size = req.party_size.unwrap_or(1);
    let status = validate_guest_fields(
        Some(req.name.as_str()),
        req.phone.as_deref(),
        req.email.as_deref(),
        req.rsvp_status.as_deref(),
        Some(party_size),
    )?
    .unwrap_or(RsvpStatus::Pending);

    let id = uuid::Uuid::new_v4().to_string();
    let now = now_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO guests (id, event_id, name, phone, email, rsvp_status, party_size, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&event_id)
    .bind(req.name.trim())
    .bind(clean_phone(req.phone.as_deref()))
    .bind(clean_email(req.email.as_deref()))
    .bind(status.as_str())
    .bind(party_size)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let guest = sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    tracing::debug!(event_id = %event_id, guest_id = %id, "Guest added");

    Ok((
        StatusCode::CREATED,
        Json(GuestResponse {
            success: true,
            guest,
        }),
    ))
}

pub async fn update_guest(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(guest_id): Path<String>,
    Json(req): Json<UpdateGuestRequest>,
) -> Result<Json<GuestResponse>, ApiError> {
    owned_guest(&state.db, &guest_id, &user).await?;

    let status = validate_guest_fields(
        req.name.as_deref(),
        req.phone.as_deref(),
        req.email.as_deref(),
        req.rsvp_status.as_deref(),
        req.party_size,
    )?;

    sqlx::query(
        r#"
        UPDATE guests SET
            name = COALESCE(?, name),
            phone = COALESCE(?, phone),
            email = COALESCE(?, email),
            rsvp_status = COALESCE(?, rsvp_status),
            party_size = COALESCE(?, party_size),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(req.name.as_deref().map(str::trim))
    .bind(clean_phone(req.phone.as_deref()))
    .bind(clean_email(req.email.as_deref()))
    .bind(status.map(|s| s.as_str()))
    .bind(req.party_size)
    .bind(now_rfc3339())
    .bind(&guest_id)
    .execute(&state.db)
    .await?;

    let guest = sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE id = ?")
        .bind(&guest_id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(GuestResponse {
        success: true,
        guest,
    }))
}

pub async fn delete_guest(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(guest_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    owned_guest(&state.db, &guest_id, &user).await?;

    sqlx::query("DELETE FROM guests WHERE id = ?")
        .bind(&guest_id)
        .execute(&state.db)
        .await?;

    Ok(Json(MessageResponse::ok("האורח הוסר מהרשימה")))
}

/// Invitation and head counts per RSVP status
pub async fn guest_summary(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(event_id): Path<String>,
) -> Result<Json<GuestSummaryResponse>, ApiError> {
    ensure_event_owner(&state.db, &event_id, &user).await?;

    let guests = sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE event_id = ?")
        .bind(&event_id)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(GuestSummaryResponse {
        success: true,
        summary: GuestSummary::from_guests(&guests),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_field_validation() {
        let status = validate_guest_fields(Some("דנה"), Some("050-1234567"), None, Some("yes"), Some(2))
            .unwrap();
        assert_eq!(status, Some(RsvpStatus::Attending));

        assert!(validate_guest_fields(Some(""), None, None, None, None).is_err());
        assert!(validate_guest_fields(None, None, Some("not-an-email"), None, None).is_err());
        assert!(validate_guest_fields(None, None, None, Some("perhaps"), None).is_err());
        assert!(validate_guest_fields(None, None, None, None, Some(0)).is_err());
        assert_eq!(validate_guest_fields(None, None, Some("  "), None, None).unwrap(), None);
    }

    #[test]
    fn test_contact_cleanup() {
        assert_eq!(clean_phone(Some("050 123-4567")).as_deref(), Some("0501234567"));
        assert_eq!(clean_phone(Some("")), None);
        assert_eq!(clean_email(Some(" Guest@Mail.com ")).as_deref(), Some("guest@mail.com"));
        assert_eq!(clean_email(None), None);
    }
}
