//! Trip plan requests and the normalized results returned for them

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::WanderError;

/// Body of `POST /api/plan`.
///
/// Every field is optional at the wire level so that missing, empty and
/// non-string values end up in the same validation path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    /// Free-text address or `lat,lng`
    #[serde(default, deserialize_with = "string_or_none")]
    pub origin: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub destination: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub transport_mode: Option<String>,
}

/// Any JSON value; only strings are kept.
fn string_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

impl PlanRequest {
    pub fn new(origin: &str, destination: &str, transport_mode: &str) -> Self {
        Self {
            origin: Some(origin.to_string()),
            destination: Some(destination.to_string()),
            transport_mode: Some(transport_mode.to_string()),
        }
    }
}

/// How the traveller wants to get there
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Own vehicle: driving directions
    Own,
    /// Public transport: transit directions
    Public,
    /// Book through a travel agency: agency search
    Agency,
}

impl FromStr for TransportMode {
    type Err = WanderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "own" => Ok(Self::Own),
            "public" => Ok(Self::Public),
            "agency" => Ok(Self::Agency),
            other => Err(WanderError::unknown_mode(other)),
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Own => "own",
            Self::Public => "public",
            Self::Agency => "agency",
        };
        f.write_str(name)
    }
}

/// Normalized response of `POST /api/plan`, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlanResult {
    /// Directions payload exactly as the provider returned it
    Driving { data: Value },
    /// Directions payload as returned, plus the transit lines found in it
    Transit { data: Value, lines: Vec<TransitLine> },
    /// At most six agencies, in provider order
    Agencies { data: Vec<Agency> },
}

impl PlanResult {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Driving { .. } => "driving",
            Self::Transit { .. } => "transit",
            Self::Agencies { .. } => "agencies",
        }
    }
}

/// A travel agency projected from a place-search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agency {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Absent when the provider has no rating; never defaulted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
}

/// One transit step of a route: which line, what vehicle, who runs it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitLine {
    pub line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<String>,
    /// Operator names joined with ", "; empty when none are listed
    pub agency: String,
}
