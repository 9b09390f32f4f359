//! Venue and supplier catalog models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub city: String,
    pub address: Option<String>,
    pub style: Option<String>,
    pub is_open_air: bool,
    /// Average price per guest (halls) or per event (villas)
    pub price: Option<i64>,
    pub phone: Option<String>,
    /// Maximum number of guests
    pub capacity: Option<i64>,
    pub image_url: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    /// DJ, Catering, Designer, Photographer, Orchestra
    pub supplier_type: String,
    pub subtype: Option<String>,
    /// Service area; "כל הארץ" for nationwide suppliers
    pub city: Option<String>,
    pub phone: Option<String>,
    pub price: Option<i64>,
    pub cuisine_type: Option<String>,
    pub image_url: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateVenueRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    pub address: Option<String>,
    pub style: Option<String>,
    #[serde(default)]
    pub is_open_air: bool,
    pub price: Option<i64>,
    pub phone: Option<String>,
    pub capacity: Option<i64>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSupplierRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub supplier_type: String,
    pub subtype: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub price: Option<i64>,
    pub cuisine_type: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VenueResponse {
    pub success: bool,
    pub venue: Venue,
}

#[derive(Debug, Serialize)]
pub struct VenueListResponse {
    pub success: bool,
    pub venues: Vec<Venue>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct SupplierResponse {
    pub success: bool,
    pub supplier: Supplier,
}

#[derive(Debug, Serialize)]
pub struct SupplierListResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_type: Option<String>,
    pub suppliers: Vec<Supplier>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub venues: Vec<Venue>,
    pub suppliers: Vec<Supplier>,
    pub venue_count: usize,
    pub supplier_count: usize,
}

#[derive(Debug, Serialize)]
pub struct CatalogStats {
    pub total_users: i64,
    pub total_venues: i64,
    pub total_suppliers: i64,
    pub total_events: i64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: CatalogStats,
}
