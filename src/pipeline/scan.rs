// src/pipeline/scan.rs

//! One scan run: fetch → diff → persist → notify.
//!
//! Fetch and persist failures abort the run with nothing (or nothing new)
//! written. Notification failures are logged and recorded in the report but
//! the run still counts as successful, since the table already remembers the
//! listings and re-sending would need a retry policy.

use std::fmt;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::pipeline::diff::{DiffCalculator, DiffPolicy};
use crate::services::{Dispatcher, Fetcher, Sender};
use crate::storage::SeenStore;
use crate::utils::unix_now;

/// Phases of a scan run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Fetching,
    Diffing,
    Persisting,
    Notifying,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Fetching => "fetching",
            RunState::Diffing => "diffing",
            RunState::Persisting => "persisting",
            RunState::Notifying => "notifying",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Summary of a completed scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub state: RunState,
    /// Listings in the upstream snapshot
    pub fetched: usize,
    /// Listings notified as new
    pub new_count: usize,
    pub updated_count: usize,
    pub removed_count: usize,
    pub flagged_count: usize,
    /// Records in the saved table
    pub tracked: usize,
    /// Every new listing was delivered
    pub notifications_ok: bool,
}

/// Sequences one scan over the given collaborators.
pub struct Scan<'a> {
    config: &'a Config,
    fetcher: &'a dyn Fetcher,
    store: &'a dyn SeenStore,
    sender: &'a dyn Sender,
    state: RunState,
}

impl<'a> Scan<'a> {
    pub fn new(
        config: &'a Config,
        fetcher: &'a dyn Fetcher,
        store: &'a dyn SeenStore,
        sender: &'a dyn Sender,
    ) -> Self {
        Self {
            config,
            fetcher,
            store,
            sender,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn advance(&mut self, next: RunState) {
        log::debug!("Scan state: {} -> {}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self, error: AppError) -> AppError {
        log::error!("Error during scan while {}: {error}", self.state);
        self.advance(RunState::Failed);
        error
    }

    /// Run the scan to completion.
    pub async fn run(&mut self) -> Result<ScanReport> {
        log::info!("Starting free-games scan...");

        self.advance(RunState::Fetching);
        let fetched = self.fetcher.fetch().await;
        let snapshot = match fetched {
            Ok(snapshot) => snapshot,
            Err(e) => return Err(self.fail(e)),
        };
        log::info!("Fetched {} free games from API", snapshot.len());

        let loaded = self.store.load().await;
        let seen = match loaded {
            Ok(seen) => seen,
            Err(e) => return Err(self.fail(e)),
        };
        log::debug!(
            "Loaded {} seen games from {}",
            seen.len(),
            self.store.location()
        );

        self.advance(RunState::Diffing);
        let policy = DiffPolicy::from(&self.config.storage);
        let diff = DiffCalculator::new(policy).calculate(&snapshot, seen, unix_now());
        log::info!("Found {} new free games", diff.new_listings.len());
        if !diff.removed.is_empty() || !diff.flagged.is_empty() {
            log::info!(
                "{} games no longer free ({} removed, {} flagged)",
                diff.removed.len() + diff.flagged.len(),
                diff.removed.len(),
                diff.flagged.len()
            );
        }

        self.advance(RunState::Persisting);
        let saved = self.store.save(&diff.store).await;
        if let Err(e) = saved {
            return Err(self.fail(e));
        }

        self.advance(RunState::Notifying);
        let notifications_ok = Dispatcher::new(self.sender, &self.config.notification)
            .dispatch(&diff.new_listings)
            .await;
        if !diff.new_listings.is_empty() {
            if notifications_ok {
                log::info!(
                    "Successfully sent notifications for {} games",
                    diff.new_listings.len()
                );
            } else {
                log::warn!("Failed to send some notifications");
            }
        }

        self.advance(RunState::Done);
        log::info!("Scan completed successfully");

        Ok(ScanReport {
            state: self.state,
            fetched: snapshot.len(),
            new_count: diff.new_listings.len(),
            updated_count: diff.updated.len(),
            removed_count: diff.removed.len(),
            flagged_count: diff.flagged.len(),
            tracked: diff.store.len(),
            notifications_ok,
        })
    }
}

/// Run a single scan with the given collaborators.
pub async fn run_scan(
    config: &Config,
    fetcher: &dyn Fetcher,
    store: &dyn SeenStore,
    sender: &dyn Sender,
) -> Result<ScanReport> {
    Scan::new(config, fetcher, store, sender).run().await
}
