//! Storage abstractions for the seen-games table.
//!
//! The table is the only durable state. It is read once at the start of a
//! scan and written once after diffing.
//!
//! ## Single writer
//!
//! No locking is done. Two scans running at the same time would both read
//! the old table and the later save would drop the other's updates, so the
//! scheduler must never overlap runs.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::SeenGames;

// Re-export for convenience
pub use local::LocalSeenStore;

/// Trait for seen-games storage backends.
#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Load the table. A store that was never written yields an empty table.
    async fn load(&self) -> Result<SeenGames>;

    /// Replace the stored table.
    async fn save(&self, games: &SeenGames) -> Result<()>;

    /// Human-readable location, for log lines.
    fn location(&self) -> String;
}
