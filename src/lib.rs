//! Trip planner - AI-generated day-by-day itineraries with photo enrichment
//!
//! This library provides the itinerary generator (chunked prompting against a
//! generative-language API with defensive JSON extraction and validation),
//! the cached image resolver, the per-user trip session and the HTTP surface
//! the browser UI talks to.

pub mod api;
pub mod config;
pub mod error;
pub mod generator;
pub mod image_resolver;
pub mod images;
pub mod llm;
pub mod logging;
pub mod models;
pub mod session;
pub mod web;

// Re-export core types for public API
pub use config::TripPlannerConfig;
pub use error::TripPlannerError;
pub use generator::{GenerationOutcome, ItineraryGenerator};
pub use image_resolver::{ImageResolver, ViewHandle};
pub use images::{ImageSearch, UnsplashClient};
pub use llm::{GeminiClient, TextGenerator};
pub use models::{Coordinates, DayPlan, DayView, FoodRec, HotelRec, Stop, TripRequest};
pub use session::TripSession;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripPlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
