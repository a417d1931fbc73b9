use std::sync::Arc;

use anyhow::Result;
use wanderwise::{AppConfig, AppState, GoogleMapsClient, OpenAiClient, TripPlanner, telemetry, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    let _telemetry = telemetry::init(&config.logging)?;

    tracing::info!("Starting WanderWise backend v{}", wanderwise::VERSION);
    tracing::debug!("Configuration: {:?}", config);
    for key in config.missing_api_keys() {
        tracing::warn!("{} is not set; requests that need it will fail", key);
    }

    let maps = GoogleMapsClient::new(&config.maps, &config.upstream)?;
    let llm = OpenAiClient::new(&config.llm, &config.upstream)?;
    let planner = TripPlanner::new(Arc::new(maps), Arc::new(llm), config.llm.model.clone());

    web::run(&config.server, AppState::new(planner)).await
}
