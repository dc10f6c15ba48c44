//! Diff calculation between the current free-games snapshot and the
//! seen-games table.
//!
//! Every listing id in the snapshot is either new (never seen, gets
//! notified) or known (record refreshed, never notified again). Ids in the
//! table that are missing from the snapshot are dropped or flagged
//! `ever_removed` depending on [`DiffPolicy`].
//!
//! A listing that comes back after having been flagged is treated as known.
//! The flag is informational only.

use std::collections::HashSet;

use crate::models::{Listing, ListingId, RawListing, SeenGames, SeenRecord, StorageConfig};

/// What to do with listings that disappear from the snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffPolicy {
    /// Act on ids missing from the snapshot at all
    pub remove_disappeared: bool,
    /// Keep missing ids, flagged, instead of deleting them
    pub renotify_on_return: bool,
}

impl From<&StorageConfig> for DiffPolicy {
    fn from(config: &StorageConfig) -> Self {
        Self {
            remove_disappeared: config.remove_disappeared_games,
            renotify_on_return: config.renotify_returned_games,
        }
    }
}

/// Outcome of diffing one snapshot against the table.
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    /// The table after applying the snapshot
    pub store: SeenGames,
    /// Newly free listings in snapshot order, formatted for notification
    pub new_listings: Vec<Listing>,
    /// Known ids that were refreshed
    pub updated: Vec<ListingId>,
    /// Ids deleted because they disappeared
    pub removed: Vec<ListingId>,
    /// Ids kept but flagged `ever_removed` because they disappeared
    pub flagged: Vec<ListingId>,
}

impl DiffResult {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.new_listings.is_empty()
            || !self.updated.is_empty()
            || !self.removed.is_empty()
            || !self.flagged.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.new_listings.len() + self.updated.len() + self.removed.len() + self.flagged.len()
    }
}

/// Calculator for diffing snapshots against the seen-games table.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffCalculator {
    policy: DiffPolicy,
}

impl DiffCalculator {
    /// Create a diff calculator with the given disappearance policy.
    pub fn new(policy: DiffPolicy) -> Self {
        Self { policy }
    }

    /// Apply `current` to `store` at time `now` (Unix seconds).
    pub fn calculate(&self, current: &[RawListing], mut store: SeenGames, now: i64) -> DiffResult {
        let mut current_ids: HashSet<&ListingId> = HashSet::with_capacity(current.len());
        let mut new_ids: HashSet<&ListingId> = HashSet::new();
        let mut new_listings = Vec::new();
        let mut updated = Vec::new();

        for raw in current {
            let id = &raw.product_no;
            current_ids.insert(id);

            match store.get_mut(id) {
                None => {
                    new_listings.push(Listing::from(raw));
                    new_ids.insert(id);
                    store.insert(id.clone(), SeenRecord::first_sighting(raw, now));
                }
                Some(record) => {
                    record.refresh(raw, now);
                    // Duplicates of a new id, or of an id already refreshed, are not reported twice.
                    if !new_ids.contains(id) && !updated.contains(id) {
                        updated.push(id.clone());
                    }
                }
            }
        }

        let mut removed = Vec::new();
        let mut flagged = Vec::new();

        if self.policy.remove_disappeared {
            let gone: Vec<ListingId> = store
                .keys()
                .filter(|id| !current_ids.contains(id))
                .cloned()
                .collect();

            for id in gone {
                if self.policy.renotify_on_return {
                    if let Some(record) = store.get_mut(&id) {
                        record.ever_removed = true;
                    }
                    flagged.push(id);
                } else {
                    store.remove(&id);
                    removed.push(id);
                }
            }
        }

        DiffResult {
            store,
            new_listings,
            updated,
            removed,
            flagged,
        }
    }
}

/// Convenience function to diff with the given policy.
pub fn calculate_diff(
    current: &[RawListing],
    store: SeenGames,
    policy: DiffPolicy,
    now: i64,
) -> DiffResult {
    DiffCalculator::new(policy).calculate(current, store, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, RawAmount, RawTag};

    const T0: i64 = 1_760_000_000;
    const T1: i64 = 1_760_086_400;

    const KEEP: DiffPolicy = DiffPolicy {
        remove_disappeared: false,
        renotify_on_return: false,
    };
    const DROP: DiffPolicy = DiffPolicy {
        remove_disappeared: true,
        renotify_on_return: false,
    };
    const FLAG: DiffPolicy = DiffPolicy {
        remove_disappeared: true,
        renotify_on_return: true,
    };

    fn make_listing(id: &str, name: &str, price: f64) -> RawListing {
        RawListing {
            product_no: ListingId::new(id),
            product_name: name.to_string(),
            short_piece: Some(format!("About {name}")),
            amount: RawAmount {
                original_price: price,
                sales_price: 0.0,
                discount_rate: 100,
            },
            title_image_rectangle: None,
            title_image_square: Some(format!("https://img.example.com/{id}.png")),
            genres: vec![RawTag {
                tag_name: "Action".into(),
            }],
            tags: Vec::new(),
        }
    }

    fn ids(listings: &[Listing]) -> Vec<&str> {
        listings.iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn test_empty_store_everything_new() {
        let curr = vec![make_listing("3", "C", 5.0), make_listing("1", "A", 19.999)];

        let result = calculate_diff(&curr, SeenGames::new(), KEEP, T0);
        assert_eq!(ids(&result.new_listings), vec!["3", "1"]);
        assert!(result.updated.is_empty());
        assert_eq!(result.store.len(), 2);

        let record = &result.store[&ListingId::new("1")];
        assert_eq!(record.original_price, Money::from_cents(2000));
        assert_eq!(record.first_seen, T0);
        assert_eq!(record.last_updated, T0);
        assert!(!record.ever_removed);
        assert_eq!(result.new_listings[1].original_price, Money::from_cents(2000));
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let curr = vec![make_listing("1", "A", 9.99), make_listing("2", "B", 4.99)];

        let first = calculate_diff(&curr, SeenGames::new(), DROP, T0);
        let second = calculate_diff(&curr, first.store.clone(), DROP, T0);

        assert!(second.new_listings.is_empty());
        assert_eq!(second.store, first.store);
        assert!(second.removed.is_empty());
    }

    #[test]
    fn test_known_ids_are_refreshed_not_notified() {
        let first = calculate_diff(&[make_listing("1", "Old", 10.0)], SeenGames::new(), KEEP, T0);

        let result = calculate_diff(&[make_listing("1", "New", 12.345)], first.store, KEEP, T1);
        assert!(result.new_listings.is_empty());
        assert_eq!(result.updated, vec![ListingId::new("1")]);

        let record = &result.store[&ListingId::new("1")];
        assert_eq!(record.first_seen, T0);
        assert_eq!(record.last_updated, T1);
        assert_eq!(record.product_name, "New");
        assert_eq!(record.original_price, Money::from_cents(1235));
    }

    #[test]
    fn test_flagged_listing_not_renotified_on_return() {
        let first = calculate_diff(&[make_listing("1", "A", 1.0)], SeenGames::new(), FLAG, T0);
        let gone = calculate_diff(&[], first.store, FLAG, T1);
        assert_eq!(gone.flagged, vec![ListingId::new("1")]);
        assert!(gone.store[&ListingId::new("1")].ever_removed);

        let back = calculate_diff(&[make_listing("1", "A", 1.0)], gone.store, FLAG, T1 + 1);
        assert!(back.new_listings.is_empty());
        assert_eq!(back.updated, vec![ListingId::new("1")]);
        assert!(back.store[&ListingId::new("1")].ever_removed);
    }

    #[test]
    fn test_disappeared_removed() {
        let first = calculate_diff(&[make_listing("1", "A", 1.0)], SeenGames::new(), DROP, T0);

        let result = calculate_diff(&[], first.store, DROP, T1);
        assert!(result.store.is_empty());
        assert_eq!(result.removed, vec![ListingId::new("1")]);
        assert!(result.flagged.is_empty());
    }

    #[test]
    fn test_disappeared_kept_when_policy_off() {
        let first = calculate_diff(&[make_listing("1", "A", 1.0)], SeenGames::new(), KEEP, T0);

        let result = calculate_diff(&[], first.store, KEEP, T1);
        assert_eq!(result.store.len(), 1);
        assert!(!result.store[&ListingId::new("1")].ever_removed);
        assert!(!result.has_changes());
    }

    #[test]
    fn test_duplicate_ids_in_snapshot() {
        let curr = vec![
            make_listing("1", "First copy", 5.0),
            make_listing("2", "Other", 3.0),
            make_listing("1", "Second copy", 6.0),
        ];

        let result = calculate_diff(&curr, SeenGames::new(), DROP, T0);
        assert_eq!(ids(&result.new_listings), vec!["1", "2"]);
        assert_eq!(result.new_listings[0].name, "First copy");
        assert!(result.updated.is_empty());

        let record = &result.store[&ListingId::new("1")];
        assert_eq!(record.product_name, "Second copy");
        assert_eq!(record.original_price, Money::from_cents(600));
    }

    #[test]
    fn test_mixed_changes() {
        let prev = calculate_diff(
            &[
                make_listing("keep", "Keep", 1.0),
                make_listing("gone", "Gone", 2.0),
            ],
            SeenGames::new(),
            DROP,
            T0,
        );

        let curr = vec![make_listing("keep", "Keep", 1.0), make_listing("new", "New", 3.0)];
        let result = calculate_diff(&curr, prev.store, DROP, T1);

        assert_eq!(ids(&result.new_listings), vec!["new"]);
        assert_eq!(result.updated, vec![ListingId::new("keep")]);
        assert_eq!(result.removed, vec![ListingId::new("gone")]);
        assert_eq!(result.change_count(), 3);
        assert!(result.has_changes());
    }

    #[test]
    fn test_policy_from_config() {
        let config = StorageConfig {
            seen_games_file: "seen.json".into(),
            remove_disappeared_games: true,
            renotify_returned_games: true,
        };
        assert_eq!(DiffPolicy::from(&config), FLAG);
    }
}
