//! Persisted history of observed listings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ListingId, Money, RawListing};

/// Everything remembered about a listing that has been seen free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenRecord {
    /// Unix timestamp (seconds) of the first observation
    pub first_seen: i64,
    /// Unix timestamp (seconds) of the latest observation
    pub last_updated: i64,
    /// Last known display name
    pub product_name: String,
    /// Last known original price
    pub original_price: Money,
    /// Set once the listing has dropped out of a snapshot
    #[serde(default)]
    pub ever_removed: bool,
}

impl SeenRecord {
    /// Record for a listing observed for the first time at `now`.
    pub fn first_sighting(raw: &RawListing, now: i64) -> Self {
        Self {
            first_seen: now,
            last_updated: now,
            product_name: raw.product_name.clone(),
            original_price: raw.original_price(),
            ever_removed: false,
        }
    }

    /// Refresh from a repeated observation. `ever_removed` is left alone.
    pub fn refresh(&mut self, raw: &RawListing, now: i64) {
        self.last_updated = now;
        self.product_name = raw.product_name.clone();
        self.original_price = raw.original_price();
    }
}

/// The seen-games table, keyed by listing id.
pub type SeenGames = BTreeMap<ListingId, SeenRecord>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawAmount;

    fn raw(name: &str, price: f64) -> RawListing {
        RawListing {
            product_no: ListingId::new("42"),
            product_name: name.to_string(),
            short_piece: None,
            amount: RawAmount {
                original_price: price,
                ..RawAmount::default()
            },
            title_image_rectangle: None,
            title_image_square: None,
            genres: Vec::new(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_first_sighting() {
        let record = SeenRecord::first_sighting(&raw("Old Name", 9.999), 1_700_000_000);
        assert_eq!(record.first_seen, 1_700_000_000);
        assert_eq!(record.last_updated, 1_700_000_000);
        assert_eq!(record.original_price, Money::from_cents(1000));
        assert!(!record.ever_removed);
    }

    #[test]
    fn test_refresh_keeps_first_seen_and_flag() {
        let mut record = SeenRecord::first_sighting(&raw("Old Name", 10.0), 100);
        record.ever_removed = true;

        record.refresh(&raw("New Name", 12.5), 200);
        assert_eq!(record.first_seen, 100);
        assert_eq!(record.last_updated, 200);
        assert_eq!(record.product_name, "New Name");
        assert_eq!(record.original_price, Money::from_cents(1250));
        assert!(record.ever_removed);
    }

    #[test]
    fn test_missing_flag_defaults_false() {
        let record: SeenRecord = serde_json::from_str(
            r#"{"first_seen": 1, "last_updated": 2, "product_name": "X", "original_price": 4.5}"#,
        )
        .unwrap();
        assert!(!record.ever_removed);
        assert_eq!(record.original_price, Money::from_cents(450));
    }
}
