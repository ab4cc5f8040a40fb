use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use trip_planner::api::AppState;
use trip_planner::{
    GeminiClient, ImageResolver, ItineraryGenerator, TripPlannerConfig, UnsplashClient, logging, web,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = TripPlannerConfig::load_from_path(config_path)?;
    logging::init(&config.logging)?;

    if config.generator.api_key.is_none() {
        tracing::warn!("No generative API key configured; itinerary requests will fail");
    }

    let model = GeminiClient::new(&config.generator).context("Failed to create model client")?;
    let search = UnsplashClient::new(&config.images).context("Failed to create image client")?;

    let state = AppState {
        generator: Arc::new(ItineraryGenerator::new(Arc::new(model), &config.generator)),
        resolver: Arc::new(ImageResolver::new(Arc::new(search), &config.images)),
    };

    web::run(&config.server, state)
        .await
        .context("Web server stopped")?;
    Ok(())
}
