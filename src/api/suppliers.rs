use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::catalog::{search_suppliers, ImageCategory, SearchParams};
use crate::db::{
    now_rfc3339, CreateSupplierRequest, Supplier, SupplierListResponse, SupplierResponse, User,
};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{normalize_phone, validate_non_negative, validate_phone, validate_title};

/// Supplier types the catalog knows about
pub const SUPPLIER_TYPES: &[&str] = &["Catering", "DJ", "Designer", "Orchestra", "Photographer"];

/// Case-insensitive lookup of a supplier type's canonical spelling
fn canonical_supplier_type(value: &str) -> Option<&'static str> {
    SUPPLIER_TYPES
        .iter()
        .copied()
        .find(|t| t.eq_ignore_ascii_case(value.trim()))
}

/// List suppliers, narrowed by `region` and `supplier_type`
pub async fn list_suppliers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SupplierListResponse>, ApiError> {
    let suppliers = search_suppliers(&state.db, &params).await?;

    Ok(Json(SupplierListResponse {
        success: true,
        supplier_type: params.supplier_type.filter(|t| !t.is_empty()),
        count: suppliers.len(),
        suppliers,
    }))
}

pub async fn get_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SupplierResponse>, ApiError> {
    let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("הספק לא נמצא"))?;

    Ok(Json(SupplierResponse {
        success: true,
        supplier,
    }))
}

/// Suppliers of one type; the region filter still applies
pub async fn list_suppliers_by_type(
    State(state): State<Arc<AppState>>,
    Path(supplier_type): Path<String>,
    Query(mut params): Query<SearchParams>,
) -> Result<Json<SupplierListResponse>, ApiError> {
    let supplier_type = canonical_supplier_type(&supplier_type)
        .map(str::to_string)
        .unwrap_or(supplier_type);
    params.supplier_type = Some(supplier_type.clone());

    let suppliers = search_suppliers(&state.db, &params).await?;

    Ok(Json(SupplierListResponse {
        success: true,
        supplier_type: Some(supplier_type),
        count: suppliers.len(),
        suppliers,
    }))
}

pub async fn create_supplier(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(req): Json<CreateSupplierRequest>,
) -> Result<(StatusCode, Json<SupplierResponse>), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors
        .check("name", validate_title(&req.name, 120))
        .check("price", validate_non_negative(req.price))
        .check("phone", validate_phone(req.phone.as_deref().unwrap_or("")));
    let supplier_type = canonical_supplier_type(&req.supplier_type);
    if supplier_type.is_none() {
        errors.add(
            "supplier_type",
            format!("סוג ספק לא מוכר (אפשרויות: {})", SUPPLIER_TYPES.join(", ")),
        );
    }
    errors.finish()?;
    let supplier_type = supplier_type.unwrap_or_default();

    let image_url = match req.image_url.filter(|u| !u.trim().is_empty()) {
        Some(url) => Some(url),
        None => match ImageCategory::for_supplier(supplier_type, req.subtype.as_deref()) {
            Some(category) => {
                let (count,): (i64,) =
                    sqlx::query_as("SELECT COUNT(*) FROM suppliers WHERE supplier_type = ?")
                        .bind(supplier_type)
                        .fetch_one(&state.db)
                        .await?;
                state.images.image_at(category, count as usize)
            }
            None => None,
        },
    };

    let id = uuid::Uuid::new_v4().to_string();
    let phone = req
        .phone
        .as_deref()
        .map(normalize_phone)
        .filter(|p| !p.is_empty());

    sqlx::query(
        r#"
        INSERT INTO suppliers (id, name, supplier_type, subtype, city, phone, price, cuisine_type, image_url, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(req.name.trim())
    .bind(supplier_type)
    .bind(&req.subtype)
    .bind(&req.city)
    .bind(&phone)
    .bind(req.price)
    .bind(&req.cuisine_type)
    .bind(&image_url)
    .bind(now_rfc3339())
    .execute(&state.db)
    .await?;

    let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    tracing::info!(supplier_id = %supplier.id, supplier_type, user_id = %user.id, "Supplier created");

    Ok((
        StatusCode::CREATED,
        Json(SupplierResponse {
            success: true,
            supplier,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_supplier_type() {
        assert_eq!(canonical_supplier_type("dj"), Some("DJ"));
        assert_eq!(canonical_supplier_type(" catering "), Some("Catering"));
        assert_eq!(canonical_supplier_type("Florist"), None);
    }
}
