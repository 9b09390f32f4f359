// Askama template definitions

use askama::Template;

use crate::cart::CartItem;
use crate::db::{ChecklistItem, Event, EventDetail, Guest, GuestSummary, Supplier, User, Venue};

/// Custom filters for Askama templates
mod filters {
    /// Shekel amount with thousands separators, `-` when unknown
    pub fn shekels(price: &Option<i64>) -> ::askama::Result<String> {
        Ok(match price {
            Some(p) => format!("₪{}", group_thousands(*p)),
            None => "-".to_string(),
        })
    }

    pub fn group_thousands(value: i64) -> String {
        let digits = value.abs().to_string();
        let mut out = String::new();
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        if value < 0 {
            format!("-{}", out)
        } else {
            out
        }
    }
}

pub use filters::group_thousands;

/// Header data for the logged-in user
pub struct NavUser {
    pub first_name: String,
}

impl From<&User> for NavUser {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
        }
    }
}

/// Catalog card (using String instead of Option for templates)
pub struct VendorCard {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub subtitle: String,
    pub city: String,
    pub price: Option<i64>,
    pub image_url: String,
}

impl From<Venue> for VendorCard {
    fn from(venue: Venue) -> Self {
        let mut subtitle = venue.style.unwrap_or_default();
        if let Some(capacity) = venue.capacity {
            subtitle = format!("{} · עד {} אורחים", subtitle, capacity);
        }
        Self {
            id: venue.id,
            kind: "venue".to_string(),
            name: venue.name,
            subtitle,
            city: venue.city,
            price: venue.price,
            image_url: venue.image_url.unwrap_or_default(),
        }
    }
}

impl From<Supplier> for VendorCard {
    fn from(supplier: Supplier) -> Self {
        let subtitle = match supplier.cuisine_type {
            Some(cuisine) => format!("{} · {}", supplier.supplier_type, cuisine),
            None => supplier.supplier_type,
        };
        Self {
            id: supplier.id,
            kind: "supplier".to_string(),
            name: supplier.name,
            subtitle,
            city: supplier.city.unwrap_or_default(),
            price: supplier.price,
            image_url: supplier.image_url.unwrap_or_default(),
        }
    }
}

/// Dashboard row for one saved event
pub struct EventRow {
    pub id: String,
    pub name: String,
    pub event_type: String,
    pub event_date: String,
    pub status: String,
}

impl From<Event> for EventRow {
    fn from(event: Event) -> Self {
        Self {
            status: event.get_status().to_string(),
            id: event.id,
            name: event.name,
            event_type: event.event_type.unwrap_or_default(),
            event_date: event.event_date.unwrap_or_else(|| "-".to_string()),
        }
    }
}

// Home page
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub user: Option<NavUser>,
    pub hero_images: Vec<String>,
    pub total_venues: i64,
    pub total_suppliers: i64,
}

// Login page
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub user: Option<NavUser>,
}

// Registration page
#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub user: Option<NavUser>,
}

/// Choice in a `<select>` on the planning form
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

// Planning form
#[derive(Template)]
#[template(path = "plan.html")]
pub struct PlanTemplate {
    pub user: Option<NavUser>,
    pub regions: Vec<SelectOption>,
}

// Filtered results with the cart
#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsTemplate {
    pub user: Option<NavUser>,
    pub event_type: String,
    pub venues: Vec<VendorCard>,
    pub suppliers: Vec<VendorCard>,
    pub cart: Vec<CartItem>,
    pub cart_total: String,
}

// Saved events of the current user
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user: Option<NavUser>,
    pub events: Vec<EventRow>,
}

// Event management page
#[derive(Template)]
#[template(path = "event.html")]
pub struct EventTemplate {
    pub user: Option<NavUser>,
    pub event: EventRow,
    pub notes: String,
    pub vendors: Vec<VendorCard>,
    pub vendor_total: String,
    pub checklist: Vec<ChecklistItem>,
    pub guests: Vec<Guest>,
    pub summary: GuestSummary,
}

impl EventTemplate {
    pub fn new(user: &User, detail: EventDetail) -> Self {
        let summary = GuestSummary::from_guests(&detail.guests);
        let notes = detail.event.notes.clone().unwrap_or_default();
        let vendors = detail
            .vendors
            .into_iter()
            .map(|v| VendorCard {
                id: v.id,
                kind: v.vendor_type,
                name: v.name,
                subtitle: String::new(),
                city: String::new(),
                price: v.price,
                image_url: v.image_url.unwrap_or_default(),
            })
            .collect();

        Self {
            user: Some(NavUser::from(user)),
            event: EventRow::from(detail.event),
            notes,
            vendors,
            vendor_total: group_thousands(detail.vendor_total),
            checklist: detail.checklist,
            guests: detail.guests,
            summary,
        }
    }
}

// Error page (403 / 404)
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub user: Option<NavUser>,
    pub title: String,
    pub message: String,
}
