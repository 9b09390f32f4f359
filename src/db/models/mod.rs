//! Database models split into domain-specific modules.

pub mod catalog;
pub mod common;
pub mod event;
pub mod user;

pub use catalog::*;
pub use common::*;
pub use event::*;
pub use user::*;
