//! Saved events and their child records (vendors, checklist, guests).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::common::VendorType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Planning,
    Confirmed,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "planning" => Ok(Self::Planning),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown event status: {}", s)),
        }
    }
}

impl From<String> for EventStatus {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(Self::Planning)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    Pending,
    Attending,
    Declined,
    Maybe,
}

impl RsvpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Attending => "attending",
            Self::Declined => "declined",
            Self::Maybe => "maybe",
        }
    }
}

impl std::str::FromStr for RsvpStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "attending" | "yes" => Ok(Self::Attending),
            "declined" | "no" => Ok(Self::Declined),
            "maybe" => Ok(Self::Maybe),
            _ => Err(format!("Unknown RSVP status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub event_type: Option<String>,
    pub event_date: Option<String>,
    pub budget: Option<String>,
    pub style: Option<String>,
    pub guest_count: Option<i64>,
    pub region: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Event {
    pub fn get_status(&self) -> EventStatus {
        EventStatus::from(self.status.clone())
    }
}

/// Vendor chosen for an event; name and price are captured when selected
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventVendor {
    pub id: String,
    pub event_id: String,
    pub vendor_id: String,
    pub vendor_type: String,
    pub name: String,
    pub price: Option<i64>,
    pub image_url: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChecklistItem {
    pub id: String,
    pub event_id: String,
    pub title: String,
    pub is_completed: bool,
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Guest {
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub rsvp_status: String,
    pub party_size: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Reference to a catalog entry, as sent by the browser
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VendorSelection {
    pub id: String,
    #[serde(rename = "type")]
    pub vendor_type: VendorType,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub name: Option<String>,
    pub event_type: Option<String>,
    pub event_date: Option<String>,
    pub budget: Option<String>,
    pub style: Option<String>,
    pub guest_count: Option<i64>,
    pub region: Option<String>,
    pub notes: Option<String>,
    /// Explicit vendor list; when absent the session cart is used
    pub vendors: Option<Vec<VendorSelection>>,
}

/// Patch body for an event. Only these fields can ever be written.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub event_type: Option<String>,
    pub event_date: Option<String>,
    pub budget: Option<String>,
    pub style: Option<String>,
    pub guest_count: Option<i64>,
    pub region: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl UpdateEventRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.event_type.is_none()
            && self.event_date.is_none()
            && self.budget.is_none()
            && self.style.is_none()
            && self.guest_count.is_none()
            && self.region.is_none()
            && self.status.is_none()
            && self.notes.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateChecklistItemRequest {
    #[serde(default)]
    pub title: String,
    pub due_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateChecklistItemRequest {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
    pub due_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateGuestRequest {
    #[serde(default)]
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub rsvp_status: Option<String>,
    pub party_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGuestRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub rsvp_status: Option<String>,
    pub party_size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub success: bool,
    pub event: Event,
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub success: bool,
    pub events: Vec<Event>,
    pub count: usize,
}

/// Event with all child records for the management view
#[derive(Debug, Serialize)]
pub struct EventDetail {
    pub event: Event,
    pub vendors: Vec<EventVendor>,
    pub checklist: Vec<ChecklistItem>,
    pub guests: Vec<Guest>,
    pub vendor_total: i64,
}

#[derive(Debug, Serialize)]
pub struct EventDetailResponse {
    pub success: bool,
    #[serde(flatten)]
    pub detail: EventDetail,
}

#[derive(Debug, Serialize)]
pub struct EventVendorResponse {
    pub success: bool,
    pub vendor: EventVendor,
}

#[derive(Debug, Serialize)]
pub struct ChecklistResponse {
    pub success: bool,
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Serialize)]
pub struct ChecklistItemResponse {
    pub success: bool,
    pub item: ChecklistItem,
}

#[derive(Debug, Serialize)]
pub struct GuestListResponse {
    pub success: bool,
    pub guests: Vec<Guest>,
}

#[derive(Debug, Serialize)]
pub struct GuestResponse {
    pub success: bool,
    pub guest: Guest,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct GuestSummary {
    /// Number of invitations (rows)
    pub invited: i64,
    /// Sum of party sizes over all invitations
    pub total_people: i64,
    pub attending: i64,
    pub attending_people: i64,
    pub declined: i64,
    pub maybe: i64,
    pub pending: i64,
}

impl GuestSummary {
    pub fn from_guests(guests: &[Guest]) -> Self {
        let mut summary = Self::default();
        for guest in guests {
            summary.invited += 1;
            summary.total_people += guest.party_size;
            match guest.rsvp_status.parse::<RsvpStatus>() {
                Ok(RsvpStatus::Attending) => {
                    summary.attending += 1;
                    summary.attending_people += guest.party_size;
                }
                Ok(RsvpStatus::Declined) => summary.declined += 1,
                Ok(RsvpStatus::Maybe) => summary.maybe += 1,
                _ => summary.pending += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Serialize)]
pub struct GuestSummaryResponse {
    pub success: bool,
    pub summary: GuestSummary,
}
