//! Common types shared across models.

use serde::{Deserialize, Serialize};

/// Plain `{success, message}` acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Kind of catalog entry a cart item or event vendor points at
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VendorType {
    Venue,
    Supplier,
}

impl VendorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Venue => "venue",
            Self::Supplier => "supplier",
        }
    }
}

impl std::fmt::Display for VendorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VendorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "venue" | "venues" => Ok(Self::Venue),
            "supplier" | "suppliers" => Ok(Self::Supplier),
            _ => Err(format!("Unknown vendor type: {}", s)),
        }
    }
}

/// Current UTC time in the format stored in every timestamp column
pub fn now_rfc3339() -> String {
    to_timestamp(chrono::Utc::now())
}

/// Fixed-width `YYYY-MM-DDTHH:MM:SSZ`, so stored timestamps compare correctly as text
pub fn to_timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
