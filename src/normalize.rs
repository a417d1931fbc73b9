//! Reshapes raw provider JSON into the stable response shapes.
//!
//! Everything here is pure. Fields the provider leaves out stay out; nothing
//! is filled in with made-up defaults.

use serde_json::Value;

use crate::models::{Agency, TransitLine};

/// Upper bound on agencies returned for one destination
pub const MAX_AGENCIES: usize = 6;

/// Line label used when a transit line has neither a short nor a long name
const UNNAMED_LINE: &str = "Unnamed";

/// Project a place-search payload onto at most [`MAX_AGENCIES`] agencies,
/// keeping provider order.
#[must_use]
pub fn to_agency_result(raw_places: &Value) -> Vec<Agency> {
    let Some(results) = raw_places.get("results").and_then(Value::as_array) else {
        return Vec::new();
    };

    results
        .iter()
        .take(MAX_AGENCIES)
        .map(|place| Agency {
            name: string_field(place, "name"),
            address: string_field(place, "formatted_address"),
            rating: place.get("rating").and_then(Value::as_f64),
            place_id: string_field(place, "place_id"),
        })
        .collect()
}

/// Collect every transit step of every route, in route/leg/step order.
#[must_use]
pub fn transit_lines(raw_directions: &Value) -> Vec<TransitLine> {
    array(raw_directions, "routes")
        .flat_map(|route| array(route, "legs"))
        .flat_map(|leg| array(leg, "steps"))
        .filter(|step| step.get("travel_mode").and_then(Value::as_str) == Some("TRANSIT"))
        .filter_map(|step| step.get("transit_details"))
        .filter(|details| !details.is_null())
        .map(transit_line)
        .collect()
}

fn transit_line(details: &Value) -> TransitLine {
    let line = details.get("line");

    let name = line
        .and_then(|l| non_empty_str(l, "short_name").or_else(|| non_empty_str(l, "name")))
        .unwrap_or(UNNAMED_LINE)
        .to_string();

    let vehicle = line
        .and_then(|l| l.get("vehicle"))
        .and_then(|v| string_field(v, "type"));

    // Agencies sit on the step in some responses and on the line in others.
    let agencies = details
        .get("agencies")
        .and_then(Value::as_array)
        .or_else(|| line.and_then(|l| l.get("agencies")).and_then(Value::as_array));

    let agency = agencies
        .map(|list| {
            list.iter()
                .filter_map(|a| a.get("name").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    TransitLine {
        line: name,
        vehicle,
        agency,
    }
}

fn array<'a>(value: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> + use<'a> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter())
        .into_iter()
        .flatten()
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
