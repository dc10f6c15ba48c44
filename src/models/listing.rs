//! Store listings, as fetched and as formatted for notification.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::Money;

/// Base URL for store product pages.
pub const STORE_GAME_URL: &str = "https://store.onstove.com/en/games";

/// Opaque listing identifier.
///
/// The store sends a numeric `product_no`; strings are accepted too so the
/// id survives being used as a JSON object key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(String);

impl ListingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Product page for this listing.
    pub fn detail_url(&self) -> String {
        format!("{STORE_GAME_URL}/{}", self.0)
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for ListingId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for ListingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

fn deserialize_listing_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ListingId, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => ListingId::from(n),
        RawId::Text(s) => ListingId::new(s),
    })
}

fn nullable_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A numeric upstream field, sometimes sent as a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    fn value(self) -> f64 {
        match self {
            RawNumber::Number(n) => n,
            RawNumber::Text(s) => s.trim().parse().unwrap_or(0.0),
        }
    }
}

/// Null, missing or unparseable amounts read as zero.
fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Option::<RawNumber>::deserialize(deserializer)?.map_or(0.0, RawNumber::value);
    Ok(if value.is_finite() { value } else { 0.0 })
}

/// Rates are rounded to a whole percentage and clamped to `0..=u32::MAX`.
fn lenient_rate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let rate = lenient_amount(deserializer)?.round();
    Ok(rate.clamp(0.0, f64::from(u32::MAX)) as u32)
}

/// Price block of an upstream record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawAmount {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub original_price: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub sales_price: f64,
    #[serde(default, deserialize_with = "lenient_rate")]
    pub discount_rate: u32,
}

/// A genre or tag entry of an upstream record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawTag {
    pub tag_name: String,
}

/// One element of the store API's `value.contents` array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawListing {
    #[serde(deserialize_with = "deserialize_listing_id")]
    pub product_no: ListingId,
    pub product_name: String,
    #[serde(default)]
    pub short_piece: Option<String>,
    #[serde(default, deserialize_with = "nullable_default")]
    pub amount: RawAmount,
    #[serde(default)]
    pub title_image_rectangle: Option<String>,
    #[serde(default)]
    pub title_image_square: Option<String>,
    #[serde(default, deserialize_with = "nullable_default")]
    pub genres: Vec<RawTag>,
    #[serde(default, deserialize_with = "nullable_default")]
    pub tags: Vec<RawTag>,
}

impl RawListing {
    /// Original price rounded to cents.
    pub fn original_price(&self) -> Money {
        Money::from_f64(self.amount.original_price)
    }
}

/// A listing formatted for notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub id: ListingId,
    pub name: String,
    pub short_description: Option<String>,
    pub original_price: Money,
    pub sale_price: Money,
    pub discount_rate: u32,
    pub image_url: Option<String>,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub detail_url: String,
}

impl From<&RawListing> for Listing {
    fn from(raw: &RawListing) -> Self {
        let image_url = raw
            .title_image_rectangle
            .clone()
            .or_else(|| raw.title_image_square.clone());

        Self {
            id: raw.product_no.clone(),
            name: raw.product_name.clone(),
            short_description: raw.short_piece.clone(),
            original_price: raw.original_price(),
            sale_price: Money::from_f64(raw.amount.sales_price),
            discount_rate: raw.amount.discount_rate,
            image_url,
            genres: raw.genres.iter().map(|g| g.tag_name.clone()).collect(),
            tags: raw.tags.iter().map(|t| t.tag_name.clone()).collect(),
            detail_url: raw.product_no.detail_url(),
        }
    }
}
