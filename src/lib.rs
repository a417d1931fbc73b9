//! `WanderWise` - trip planning backend
//!
//! This library forwards planning requests to an LLM chat-completion service
//! and a maps/places service, and normalizes their answers into a few stable
//! response shapes for the browser frontend.

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod maps;
pub mod models;
pub mod normalize;
pub mod planner;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::AppConfig;
pub use error::WanderError;
pub use llm::{CompletionApi, CompletionResponse, OpenAiClient};
pub use maps::{GoogleMapsClient, MapsApi, TravelMode};
pub use models::{Agency, ItineraryRequest, PlanRequest, PlanResult, TransitLine, TransportMode};
pub use planner::TripPlanner;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WanderError>;
