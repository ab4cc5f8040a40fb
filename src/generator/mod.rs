//! Itinerary generation
//!
//! A trip is split into day windows, each window is requested from the model
//! with its own prompt, and every answer is extracted and validated before the
//! next window is sent. Generation is all-or-nothing: one failed window fails
//! the whole trip.

pub mod extract;
pub mod prompt;
pub mod window;

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::TripPlannerError;
use crate::config::GeneratorConfig;
use crate::llm::TextGenerator;
use crate::models::{Coordinates, DayPlan, DayView, MAX_TRIP_DAYS, Stop, TripRequest};

pub use extract::{extract_json, parse_window, validate_days};
pub use prompt::build_window_prompt;
pub use window::{DayWindow, plan_windows};

/// Title of the synthetic day shown when generation fails
pub const FALLBACK_TITLE: &str = "Itinerary unavailable";

/// Result of a generation request
#[derive(Debug)]
pub enum GenerationOutcome {
    /// Every window was generated and validated
    Complete { days: Vec<DayPlan> },
    /// Generation failed; `partial` holds the windows validated before the failure
    Failed {
        reason: TripPlannerError,
        partial: Vec<DayPlan>,
    },
}

impl GenerationOutcome {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    /// Why generation failed, if it did
    #[must_use]
    pub fn failure(&self) -> Option<&TripPlannerError> {
        match self {
            Self::Complete { .. } => None,
            Self::Failed { reason, .. } => Some(reason),
        }
    }

    /// Days the UI should render
    ///
    /// A failed outcome renders as a single fallback day describing the
    /// failure; partially generated days are not shown.
    #[must_use]
    pub fn days(&self) -> Vec<DayPlan> {
        match self {
            Self::Complete { days } => days.clone(),
            Self::Failed { reason, .. } => vec![fallback_day(reason)],
        }
    }

    /// Consuming form of [`days`](Self::days)
    #[must_use]
    pub fn into_days(self) -> Vec<DayPlan> {
        match self {
            Self::Complete { days } => days,
            Self::Failed { reason, .. } => vec![fallback_day(&reason)],
        }
    }
}

/// Schema-valid single day explaining why no itinerary could be produced
#[must_use]
pub fn fallback_day(reason: &TripPlannerError) -> DayPlan {
    DayPlan {
        title: FALLBACK_TITLE.to_string(),
        stops: vec![Stop {
            name: "Unable to generate itinerary".to_string(),
            description: format!("The itinerary could not be generated: {reason}"),
            coordinates: Coordinates::new(0.0, 0.0),
            label: "!".to_string(),
            nearby_food: Vec::new(),
            nearby_hotels: Vec::new(),
        }],
    }
}

/// Serializable summary of an outcome for the HTTP layer
#[derive(Debug, Serialize)]
pub struct OutcomeSummary {
    pub status: &'static str,
    pub error: Option<String>,
    pub days: Vec<DayView>,
}

impl From<GenerationOutcome> for OutcomeSummary {
    fn from(outcome: GenerationOutcome) -> Self {
        let status = if outcome.is_complete() { "complete" } else { "failed" };
        let error = outcome.failure().map(TripPlannerError::user_message);
        Self {
            status,
            error,
            days: outcome.into_days().into_iter().map(DayView::from).collect(),
        }
    }
}

/// Generates day plans through a text model, one window at a time
pub struct ItineraryGenerator {
    backend: Arc<dyn TextGenerator>,
    chunk_size: u32,
}

impl ItineraryGenerator {
    /// Create a generator over a text backend
    pub fn new(backend: Arc<dyn TextGenerator>, config: &GeneratorConfig) -> Self {
        Self::with_chunk_size(backend, config.chunk_size)
    }

    /// Create a generator with an explicit window size, clamped to `1..=MAX_TRIP_DAYS`
    pub fn with_chunk_size(backend: Arc<dyn TextGenerator>, chunk_size: u32) -> Self {
        Self {
            backend,
            chunk_size: chunk_size.clamp(1, MAX_TRIP_DAYS),
        }
    }

    #[must_use]
    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Generate the itinerary; never fails, see [`GenerationOutcome`]
    #[instrument(name = "generate_itinerary", skip(self), fields(destination = %request.destination, days = request.day_count))]
    pub async fn generate(&self, request: &TripRequest) -> GenerationOutcome {
        let mut days = Vec::with_capacity(request.day_count as usize);

        match self.generate_into(request, &mut days).await {
            Ok(()) => GenerationOutcome::Complete { days },
            Err(reason) => {
                error!("Itinerary generation failed: {}", reason);
                GenerationOutcome::Failed {
                    reason,
                    partial: days,
                }
            }
        }
    }

    /// Generate the itinerary, returning the first error
    pub async fn try_generate(&self, request: &TripRequest) -> crate::Result<Vec<DayPlan>> {
        let mut days = Vec::with_capacity(request.day_count as usize);
        self.generate_into(request, &mut days).await?;
        Ok(days)
    }

    async fn generate_into(
        &self,
        request: &TripRequest,
        days: &mut Vec<DayPlan>,
    ) -> crate::Result<()> {
        request.validate()?;

        let windows = plan_windows(request.day_count, self.chunk_size);
        info!(
            "Generating {} days for {} in {} window(s)",
            request.day_count,
            request.destination,
            windows.len()
        );

        for window in &windows {
            info!("Requesting days {}", window);
            let prompt = build_window_prompt(request, window);
            let text = self.backend.generate_text(&prompt).await?;
            let window_days = parse_window(&text, window)?;

            if window_days.len() != window.len() as usize {
                warn!(
                    "Days {}: expected {} days, model returned {}",
                    window,
                    window.len(),
                    window_days.len()
                );
            }
            info!("Days {} validated ({} days)", window, window_days.len());
            days.extend(window_days);
        }

        if days.len() != request.day_count as usize {
            warn!(
                "Requested {} days but generated {}; returning as is",
                request.day_count,
                days.len()
            );
        }

        Ok(())
    }
}
