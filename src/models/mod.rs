// src/models/mod.rs

//! Domain models for the notifier.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod listing;
mod money;
mod seen;

// Re-export all public types
pub use config::{
    ApiConfig, Config, LoggingConfig, NotificationConfig, StorageConfig, parse_color,
};
pub use listing::{Listing, ListingId, RawAmount, RawListing, RawTag, STORE_GAME_URL};
pub use money::Money;
pub use seen::{SeenGames, SeenRecord};
