//! Resource models exchanged with the QuoteDesk service.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Market a product is offered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Residential,
    Commercial,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Residential => "residential",
            ProductType::Commercial => "commercial",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cleaning service that can be quoted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Absent on products that were never stored by the service.
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    pub product_description: String,
    pub price_hourly: f64,
    pub price_square_foot: f64,
    pub product_type: ProductType,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A quote the signed-in user asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub id: i64,
    #[serde(with = "unix_seconds")]
    pub created: DateTime<Utc>,
    /// When the service promised to answer.
    #[serde(with = "unix_seconds")]
    pub promised: DateTime<Utc>,
    #[serde(rename = "rwuser_id")]
    pub user_id: i64,
    pub product: Product,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomSize {
    Small,
    Medium,
    Large,
}

/// Description of the user's home used to price residential quotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeInfo {
    /// Assigned by the service; `None` until the record is first stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub bathroom_count: u32,
    pub bedroom_count: u32,
    pub kitchen_size: RoomSize,
    pub other_rooms_count: u32,
    pub square_footage: u32,
}

impl Default for HomeInfo {
    /// Starting values offered to a user who has not described a home yet.
    fn default() -> Self {
        Self {
            id: None,
            bathroom_count: 2,
            bedroom_count: 3,
            kitchen_size: RoomSize::Medium,
            other_rooms_count: 1,
            square_footage: 2000,
        }
    }
}

impl HomeInfo {
    /// Same home without the stored identifier, ready to be edited and sent.
    pub fn detached(&self) -> Self {
        Self {
            id: None,
            ..self.clone()
        }
    }
}

/// Decode a JSON array, dropping elements that do not match `T`.
///
/// Fails only when the body is not a JSON array at all.
pub(crate) fn decode_lenient<T: DeserializeOwned>(body: &[u8]) -> serde_json::Result<Vec<T>> {
    let values: Vec<serde_json::Value> = serde_json::from_slice(body)?;
    let total = values.len();
    let items: Vec<T> = values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();

    if items.len() < total {
        debug!(
            skipped = total - items.len(),
            total, "Dropped malformed elements from list response"
        );
    }
    Ok(items)
}

/// Timestamps sent as (possibly fractional) seconds since the Unix epoch.
mod unix_seconds {
    use chrono::{DateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        let seconds = value.timestamp() as f64 + f64::from(value.timestamp_subsec_millis()) / 1000.0;
        serializer.serialize_f64(seconds)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let seconds = f64::deserialize(deserializer)?;
        if !seconds.is_finite() {
            return Err(D::Error::custom("timestamp is not a finite number"));
        }
        let whole = seconds.floor();
        let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
        DateTime::from_timestamp(whole as i64, nanos)
            .ok_or_else(|| D::Error::custom(format!("timestamp {} out of range", seconds)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT_JSON: &str = r#"{
        "id": 4,
        "title": "Deep Clean",
        "product_description": "Top to bottom",
        "price_hourly": 45.0,
        "price_square_foot": 0.12,
        "product_type": "residential",
        "image_url": "https://cdn.example.com/deep.png"
    }"#;

    #[test]
    fn test_product_decodes() {
        let product: Product = serde_json::from_str(PRODUCT_JSON).unwrap();
        assert_eq!(product.id, Some(4));
        assert_eq!(product.product_type, ProductType::Residential);
        assert_eq!(product.image_url.as_deref(), Some("https://cdn.example.com/deep.png"));
    }

    #[test]
    fn test_quote_request_decodes_fractional_epoch_seconds() {
        let json = format!(
            r#"{{"id":9,"created":1500000000.5,"promised":1500086400,"rwuser_id":1,"product":{}}}"#,
            PRODUCT_JSON
        );
        let quote: QuoteRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(quote.created.timestamp(), 1_500_000_000);
        assert_eq!(quote.created.timestamp_subsec_millis(), 500);
        assert_eq!(quote.promised.timestamp(), 1_500_086_400);
        assert_eq!(quote.user_id, 1);
    }

    #[test]
    fn test_home_info_omits_missing_id() {
        let json = serde_json::to_value(HomeInfo::default()).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["kitchen_size"], "medium");
        assert_eq!(json["square_footage"], 2000);
    }

    #[test]
    fn test_home_info_detached_drops_id() {
        let stored = HomeInfo {
            id: Some(3),
            ..HomeInfo::default()
        };
        assert_eq!(stored.detached().id, None);
        assert_eq!(stored.detached().bedroom_count, 3);
    }

    #[test]
    fn test_decode_lenient_skips_bad_elements() {
        let body = format!(r#"[{}, {{"title": "broken"}}]"#, PRODUCT_JSON);
        let products: Vec<Product> = decode_lenient(body.as_bytes()).unwrap();
        assert_eq!(products.len(), 1);

        assert!(decode_lenient::<Product>(br#"{"not":"a list"}"#).is_err());
    }

    #[test]
    fn test_product_type_path_segment() {
        assert_eq!(ProductType::Commercial.to_string(), "commercial");
    }
}
