//! Data models for the trip planner
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates of a stop
//! - Trip: The request submitted from the planning form
//! - Itinerary: Day plans, stops and nearby recommendations

pub mod itinerary;
pub mod location;
pub mod trip;

// Re-export all public types for convenient access
pub use itinerary::{DayPlan, DayView, FoodRec, HotelRec, MapMarker, Stop};
pub use location::Coordinates;
pub use trip::{MAX_TRIP_DAYS, TripRequest};
