// src/services/payload.rs

//! Webhook payloads (Discord embed format).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::models::{Listing, NotificationConfig};
use crate::utils::text::{join_first, truncate_with_marker};

/// Descriptions longer than this many characters are cut.
pub const DESCRIPTION_LIMIT: usize = 200;
/// Appended to cut descriptions.
pub const ELLIPSIS: &str = "...";
/// Used when a listing has no description.
pub const NO_DESCRIPTION: &str = "No description available";
/// At most this many genres are shown.
pub const MAX_GENRES: usize = 3;
/// At most this many tags are shown.
pub const MAX_TAGS: usize = 5;

/// Top-level webhook body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookPayload {
    pub username: String,
    pub embeds: Vec<Embed>,
}

impl WebhookPayload {
    /// Title of the first embed, for log lines.
    pub fn title(&self) -> &str {
        self.embeds.first().map(|e| e.title.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub url: String,
    pub color: u32,
    pub timestamp: String,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedThumbnail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    fn new(name: &str, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            inline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedThumbnail {
    pub url: String,
}

/// Description as shown in the embed.
pub fn embed_description(description: Option<&str>) -> String {
    match description {
        Some(text) if !text.is_empty() => truncate_with_marker(text, DESCRIPTION_LIMIT, ELLIPSIS),
        _ => NO_DESCRIPTION.to_string(),
    }
}

/// Build the webhook payload announcing one free listing.
pub fn build_payload(
    listing: &Listing,
    settings: &NotificationConfig,
    sent_at: DateTime<Utc>,
) -> WebhookPayload {
    let mut fields = vec![
        EmbedField::new("Original Price", listing.original_price.to_usd(), true),
        EmbedField::new("Current Price", "FREE", true),
        EmbedField::new("Discount", format!("{}%", listing.discount_rate), true),
    ];

    if !listing.genres.is_empty() {
        fields.push(EmbedField::new(
            "Genres",
            join_first(&listing.genres, MAX_GENRES),
            false,
        ));
    }

    if !listing.tags.is_empty() {
        fields.push(EmbedField::new(
            "Tags",
            join_first(&listing.tags, MAX_TAGS),
            false,
        ));
    }

    let thumbnail = listing
        .image_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .map(|url| EmbedThumbnail {
            url: url.to_string(),
        });

    let embed = Embed {
        title: listing.name.clone(),
        description: embed_description(listing.short_description.as_deref()),
        url: listing.detail_url.clone(),
        color: settings.color(),
        timestamp: sent_at.to_rfc3339_opts(SecondsFormat::Secs, false),
        fields,
        footer: EmbedFooter {
            text: format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        },
        thumbnail,
    };

    WebhookPayload {
        username: settings.sender_name.clone(),
        embeds: vec![embed],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListingId, Money};
    use chrono::TimeZone;

    fn settings() -> NotificationConfig {
        NotificationConfig {
            target_url: "https://discord.com/api/webhooks/1/abc".into(),
            sender_name: "FreeBot".into(),
            embed_color: "#00b0f4".into(),
            delay_between_sends: 0,
            timeout_secs: 10,
        }
    }

    fn listing() -> Listing {
        let id = ListingId::new("777");
        Listing {
            detail_url: id.detail_url(),
            id,
            name: "Lantern Road".into(),
            short_description: Some("A quiet walk.".into()),
            original_price: Money::from_cents(123_499),
            sale_price: Money::ZERO,
            discount_rate: 100,
            image_url: Some("https://img.example.com/777.png".into()),
            genres: vec!["Adventure".into(), "Indie".into(), "Puzzle".into(), "Story".into()],
            tags: (1..=7).map(|i| format!("tag{i}")).collect(),
        }
    }

    fn sent_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_payload_fields_in_order() {
        let payload = build_payload(&listing(), &settings(), sent_at());
        assert_eq!(payload.username, "FreeBot");
        assert_eq!(payload.embeds.len(), 1);

        let embed = &payload.embeds[0];
        assert_eq!(embed.title, "Lantern Road");
        assert_eq!(embed.url, "https://store.onstove.com/en/games/777");
        assert_eq!(embed.color, 0x00b0f4);
        assert_eq!(embed.timestamp, "2026-10-19T12:00:00+00:00");

        let names: Vec<&str> = embed.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Original Price", "Current Price", "Discount", "Genres", "Tags"]
        );
        assert_eq!(embed.fields[0].value, "$1,234.99");
        assert_eq!(embed.fields[1].value, "FREE");
        assert_eq!(embed.fields[2].value, "100%");
        assert_eq!(embed.fields[3].value, "Adventure, Indie, Puzzle");
        assert_eq!(embed.fields[4].value, "tag1, tag2, tag3, tag4, tag5");
        assert!(embed.fields[..3].iter().all(|f| f.inline));
        assert!(!embed.fields[3].inline);
        assert_eq!(
            embed.thumbnail.as_ref().map(|t| t.url.as_str()),
            Some("https://img.example.com/777.png")
        );
    }

    #[test]
    fn test_optional_parts_omitted() {
        let mut listing = listing();
        listing.genres.clear();
        listing.tags.clear();
        listing.image_url = Some(String::new());

        let payload = build_payload(&listing, &settings(), sent_at());
        let embed = &payload.embeds[0];
        assert_eq!(embed.fields.len(), 3);
        assert!(embed.thumbnail.is_none());

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["embeds"][0].get("thumbnail").is_none());
    }

    #[test]
    fn test_only_tags_present() {
        let mut listing = listing();
        listing.genres.clear();

        let payload = build_payload(&listing, &settings(), sent_at());
        let names: Vec<&str> = payload.embeds[0].fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Original Price", "Current Price", "Discount", "Tags"]);
    }

    #[test]
    fn test_long_description_truncated() {
        let text = "d".repeat(250);
        let description = embed_description(Some(&text));
        assert_eq!(description, format!("{}...", "d".repeat(200)));
    }

    #[test]
    fn test_missing_description_placeholder() {
        assert_eq!(embed_description(None), NO_DESCRIPTION);
        assert_eq!(embed_description(Some("")), NO_DESCRIPTION);
        assert_eq!(embed_description(Some("Short.")), "Short.");
    }

    #[test]
    fn test_description_text_kept_verbatim() {
        assert_eq!(embed_description(Some("  Indent\n")), "  Indent\n");
        assert_eq!(embed_description(Some("   ")), "   ");
    }
}
