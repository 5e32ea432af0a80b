//! Data models for the wishlist application.
//!
//! Field names serialize in camelCase to match the web client.

mod child;
mod gift;
mod price;
mod revision;

pub use child::*;
pub use gift::*;
pub use price::*;
pub use revision::*;
