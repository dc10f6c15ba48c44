//! Service layer for the notifier.
//!
//! This module contains the collaborators a scan talks to:
//! - Free-games fetching (`StoveFetcher`)
//! - Webhook payload building (`build_payload`)
//! - Notification delivery and dispatch (`WebhookSender`, `Dispatcher`)

mod fetcher;
mod notifier;
pub mod payload;

pub use fetcher::{Fetcher, StoveFetcher, parse_contents};
pub use notifier::{Dispatcher, Sender, WebhookSender};
pub use payload::{WebhookPayload, build_payload};
