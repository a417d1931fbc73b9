//! Trip planner: routes each request to the right upstream capability
//!
//! `plan_trip` picks the maps call by transport mode and normalizes the
//! answer; `generate_itinerary` builds the prompt and asks the LLM.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::llm::CompletionApi;
use crate::maps::{MapsApi, TravelMode};
use crate::models::{ItineraryRequest, PlanRequest, PlanResult, TransportMode};
use crate::normalize;
use crate::{Result, WanderError};

/// Token cap for one itinerary completion
pub const ITINERARY_MAX_TOKENS: u32 = 400;

/// Itinerary text returned when the provider answered without any content
pub const NO_RESPONSE: &str = "No response";

/// Message for plan requests without origin or destination
pub const MISSING_ENDPOINTS: &str = "origin and destination are required";

pub struct TripPlanner {
    maps: Arc<dyn MapsApi>,
    llm: Arc<dyn CompletionApi>,
    model: String,
}

impl TripPlanner {
    pub fn new(maps: Arc<dyn MapsApi>, llm: Arc<dyn CompletionApi>, model: String) -> Self {
        Self { maps, llm, model }
    }

    /// Directions or agencies for a trip, depending on the transport mode.
    ///
    /// Origin and destination are checked before the mode, and nothing is
    /// sent upstream for an invalid request.
    #[instrument(skip(self))]
    pub async fn plan_trip(&self, req: &PlanRequest) -> Result<PlanResult> {
        let (Some(origin), Some(destination)) = (
            non_blank(req.origin.as_deref()),
            non_blank(req.destination.as_deref()),
        ) else {
            return Err(WanderError::validation(MISSING_ENDPOINTS));
        };

        let mode: TransportMode = req.transport_mode.as_deref().unwrap_or_default().parse()?;
        debug!("Planning {} trip from {} to {}", mode, origin, destination);

        let result = match mode {
            TransportMode::Own => {
                let data = self
                    .maps
                    .directions(origin, destination, TravelMode::Driving, true)
                    .await?;
                PlanResult::Driving { data }
            }
            TransportMode::Public => {
                let data = self
                    .maps
                    .directions(origin, destination, TravelMode::Transit, true)
                    .await?;
                let lines = normalize::transit_lines(&data);
                PlanResult::Transit { data, lines }
            }
            TransportMode::Agency => {
                let raw = self
                    .maps
                    .place_search(&agency_query(destination))
                    .await?;
                PlanResult::Agencies {
                    data: normalize::to_agency_result(&raw),
                }
            }
        };

        info!("Planned {} trip to {}", result.kind(), destination);
        Ok(result)
    }

    /// Short bulletized itinerary text from the LLM
    #[instrument(skip(self))]
    pub async fn generate_itinerary(&self, req: &ItineraryRequest) -> Result<String> {
        let destination = non_blank(req.destination.as_deref())
            .ok_or_else(|| WanderError::validation("destination is required"))?;
        let days = req.days_or_default();
        if days == 0 {
            return Err(WanderError::validation("days must be at least 1"));
        }
        let trip_type = req.trip_type.as_deref().unwrap_or_default().trim();

        let prompt = itinerary_prompt(destination, trip_type, days);
        let completion = self
            .llm
            .complete(&prompt, ITINERARY_MAX_TOKENS, &self.model)
            .await?;

        match completion.first_text() {
            Some(text) => Ok(text.to_string()),
            None => {
                info!("Completion for {} carried no text", destination);
                Ok(NO_RESPONSE.to_string())
            }
        }
    }
}

#[must_use]
pub fn agency_query(destination: &str) -> String {
    format!("travel agency in {destination}")
}

#[must_use]
pub fn itinerary_prompt(destination: &str, trip_type: &str, days: u32) -> String {
    let trip = if trip_type.is_empty() {
        format!("{days}-day")
    } else {
        format!("{days}-day {trip_type}")
    };
    format!(
        "Create a concise {trip} itinerary for {destination}.\n\
         Include 3 activities per day, travel time hints, and one recommended local eatery per day. \
         Keep it short and bulletized."
    )
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
