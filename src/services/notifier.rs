// src/services/notifier.rs

//! Notification dispatch.
//!
//! One webhook message per new listing, sent in order with an optional pause
//! in between. The first failed send ends the batch: listings already sent
//! stay sent and the rest are skipped until a later listing is discovered.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};

use crate::error::{AppError, Result};
use crate::models::{Listing, NotificationConfig};
use crate::services::payload::{WebhookPayload, build_payload};
use crate::utils::http::{create_client, snippet};

/// Delivery channel for notification payloads.
#[async_trait]
pub trait Sender: Send + Sync {
    /// Deliver one payload. `Ok` means the target accepted it.
    async fn send(&self, payload: &WebhookPayload) -> Result<()>;
}

/// Sender posting JSON to a webhook URL.
pub struct WebhookSender {
    target_url: String,
    client: Client,
}

impl WebhookSender {
    /// Create a new sender with the given notification configuration.
    pub fn new(config: &NotificationConfig) -> Result<Self> {
        let client = create_client(
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
            config.timeout_secs,
            &[],
        )?;
        Ok(Self {
            target_url: config.target_url.clone(),
            client,
        })
    }
}

#[async_trait]
impl Sender for WebhookSender {
    async fn send(&self, payload: &WebhookPayload) -> Result<()> {
        let response = self
            .client
            .post(&self.target_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::delivery(payload.title(), e))?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::NO_CONTENT {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::delivery(
            payload.title(),
            format!("HTTP {} - {}", status.as_u16(), snippet(&body, 200)),
        ))
    }
}

/// Sends one notification per listing through a [`Sender`].
pub struct Dispatcher<'a> {
    sender: &'a dyn Sender,
    settings: &'a NotificationConfig,
    pacing: Duration,
}

impl<'a> Dispatcher<'a> {
    /// Create a dispatcher pacing sends by `settings.delay_between_sends`.
    pub fn new(sender: &'a dyn Sender, settings: &'a NotificationConfig) -> Self {
        Self {
            sender,
            settings,
            pacing: settings.pacing(),
        }
    }

    /// Override the pause between sends.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Send every listing in order. Returns `false` at the first failure.
    pub async fn dispatch(&self, listings: &[Listing]) -> bool {
        if listings.is_empty() {
            log::info!("No new games to notify about");
            return true;
        }

        for (i, listing) in listings.iter().enumerate() {
            if i > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }

            let payload = build_payload(listing, self.settings, Utc::now());
            if let Err(e) = self.sender.send(&payload).await {
                log::error!(
                    "Failed to send notification for game: {} ({e})",
                    listing.name
                );
                let skipped = listings.len() - i - 1;
                if skipped > 0 {
                    log::warn!("Skipped {skipped} remaining notification(s)");
                }
                return false;
            }

            log::debug!("Notified {} ({})", listing.name, listing.id);
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListingId, Money};
    use std::sync::Mutex;

    /// Records every payload; fails the n-th call (1-based) if set.
    #[derive(Default)]
    struct RecordingSender {
        fail_on: Option<usize>,
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Sender for RecordingSender {
        async fn send(&self, payload: &WebhookPayload) -> Result<()> {
            let mut sent = self.sent.lock().unwrap();
            sent.push(payload.title().to_string());
            if self.fail_on == Some(sent.len()) {
                return Err(AppError::delivery(payload.title(), "HTTP 500"));
            }
            Ok(())
        }
    }

    fn settings() -> NotificationConfig {
        NotificationConfig {
            target_url: "https://discord.com/api/webhooks/1/abc".into(),
            sender_name: "FreeBot".into(),
            embed_color: "00ff00".into(),
            delay_between_sends: 0,
            timeout_secs: 10,
        }
    }

    fn listing(id: &str) -> Listing {
        let id = ListingId::new(id);
        Listing {
            detail_url: id.detail_url(),
            name: format!("Game {id}"),
            id,
            short_description: None,
            original_price: Money::from_cents(999),
            sale_price: Money::ZERO,
            discount_rate: 100,
            image_url: None,
            genres: Vec::new(),
            tags: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_empty_batch_is_success() {
        let sender = RecordingSender::default();
        let settings = settings();

        assert!(Dispatcher::new(&sender, &settings).dispatch(&[]).await);
        assert!(sender.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_sent_in_order() {
        let sender = RecordingSender::default();
        let settings = settings();
        let listings = vec![listing("1"), listing("2"), listing("3")];

        assert!(Dispatcher::new(&sender, &settings).dispatch(&listings).await);
        assert_eq!(
            *sender.sent.lock().unwrap(),
            vec!["Game 1", "Game 2", "Game 3"]
        );
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let sender = RecordingSender {
            fail_on: Some(2),
            ..RecordingSender::default()
        };
        let settings = settings();
        let listings = vec![listing("1"), listing("2"), listing("3")];

        assert!(!Dispatcher::new(&sender, &settings).dispatch(&listings).await);
        assert_eq!(*sender.sent.lock().unwrap(), vec!["Game 1", "Game 2"]);
    }

    #[tokio::test]
    async fn test_pacing_between_sends() {
        let sender = RecordingSender::default();
        let settings = settings();
        let listings = vec![listing("1"), listing("2"), listing("3")];
        let dispatcher =
            Dispatcher::new(&sender, &settings).with_pacing(Duration::from_millis(20));

        let started = std::time::Instant::now();
        assert!(dispatcher.dispatch(&listings).await);
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_pacing_from_settings() {
        let sender = RecordingSender::default();
        let mut settings = settings();
        settings.delay_between_sends = 3;

        let dispatcher = Dispatcher::new(&sender, &settings);
        assert_eq!(dispatcher.pacing, Duration::from_secs(3));
    }
}
