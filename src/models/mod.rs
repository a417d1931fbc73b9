//! Data models for the `WanderWise` backend
//!
//! This module contains the request and response shapes organized by concern:
//! - Plan: routing and agency requests and their normalized results
//! - Itinerary: AI itinerary requests and responses

pub mod itinerary;
pub mod plan;

// Re-export all public types for convenient access
pub use itinerary::{ItineraryRequest, ItineraryResponse};
pub use plan::{Agency, PlanRequest, PlanResult, TransitLine, TransportMode};
