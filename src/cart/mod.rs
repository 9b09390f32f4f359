//! Session-scoped shopping cart of selected vendors.
//!
//! Carts live only in memory and are keyed by the cart cookie issued to the
//! browser. Nothing here is persisted; saving an event copies the items into
//! `event_vendors` rows.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::db::VendorType;

/// Cookie holding the cart identifier
pub const CART_COOKIE: &str = "easyevents_cart";

/// A selected vendor, snapshotted from the catalog when it was added
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    pub id: String,
    #[serde(rename = "type")]
    pub vendor_type: VendorType,
    pub name: String,
    pub price: Option<i64>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

#[derive(Debug)]
struct CartEntry {
    items: Vec<CartItem>,
    last_seen: Instant,
}

impl Default for CartEntry {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            last_seen: Instant::now(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CartStore {
    carts: DashMap<String, CartEntry>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item unless an item with the same `(id, type)` is already there
    pub fn add(&self, cart_id: &str, item: CartItem) -> AddOutcome {
        let mut entry = self.carts.entry(cart_id.to_string()).or_default();
        entry.last_seen = Instant::now();
        let exists = entry
            .items
            .iter()
            .any(|i| i.id == item.id && i.vendor_type == item.vendor_type);
        if exists {
            AddOutcome::AlreadyPresent
        } else {
            entry.items.push(item);
            AddOutcome::Added
        }
    }

    pub fn items(&self, cart_id: &str) -> Vec<CartItem> {
        match self.carts.get_mut(cart_id) {
            Some(mut entry) => {
                entry.last_seen = Instant::now();
                entry.items.clone()
            }
            None => Vec::new(),
        }
    }

    /// Remove a single item; returns whether anything was removed.
    /// A cart left without items is dropped.
    pub fn remove(&self, cart_id: &str, vendor_type: VendorType, id: &str) -> bool {
        let removed = match self.carts.get_mut(cart_id) {
            Some(mut entry) => {
                entry.last_seen = Instant::now();
                let before = entry.items.len();
                entry
                    .items
                    .retain(|i| !(i.id == id && i.vendor_type == vendor_type));
                entry.items.len() != before
            }
            None => false,
        };
        self.carts.remove_if(cart_id, |_, entry| entry.items.is_empty());
        removed
    }

    pub fn clear(&self, cart_id: &str) {
        self.carts.remove(cart_id);
    }

    /// Drop carts untouched for longer than `max_idle`; returns how many were dropped
    pub fn cleanup_expired(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let before = self.carts.len();
        self.carts.retain(|_, entry| {
            !entry.items.is_empty() && now.duration_since(entry.last_seen) < max_idle
        });
        before.saturating_sub(self.carts.len())
    }

    pub fn len(&self) -> usize {
        self.carts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carts.is_empty()
    }
}

/// Sum of known prices; items without a price count as zero
pub fn total_price(items: &[CartItem]) -> i64 {
    items.iter().filter_map(|i| i.price).sum()
}
