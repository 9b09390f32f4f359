//! Venue/supplier catalog helpers: search filters and category images.

pub mod filters;
pub mod images;

pub use filters::{search_suppliers, search_venues, BudgetTier, Region, SearchParams};
pub use images::{FoodType, ImageCategory, ImageLibrary};
