//! AI itinerary request and response

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Days planned when the request does not say
pub const DEFAULT_DAYS: u32 = 2;

/// Body of `POST /api/ai`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryRequest {
    #[serde(default)]
    pub destination: Option<String>,
    /// Free form, e.g. leisure, business, adventure
    #[serde(default)]
    pub trip_type: Option<String>,
    /// Whole number, either as a JSON number or a numeric string
    #[serde(default, deserialize_with = "lenient_days")]
    pub days: Option<u32>,
}

fn lenient_days<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let days = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    days.map(Some)
        .ok_or_else(|| D::Error::custom("days must be a whole number"))
}

impl ItineraryRequest {
    pub fn new(destination: &str, trip_type: &str, days: u32) -> Self {
        Self {
            destination: Some(destination.to_string()),
            trip_type: Some(trip_type.to_string()),
            days: Some(days),
        }
    }

    #[must_use]
    pub fn days_or_default(&self) -> u32 {
        self.days.unwrap_or(DEFAULT_DAYS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryResponse {
    pub itinerary: String,
}
