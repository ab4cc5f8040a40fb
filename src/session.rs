//! Trip session: the state a planning view works against
//!
//! Holds the submitted request, the generated outcome and the selected day.
//! Every day selection opens a fresh [`ViewHandle`] and closes the previous
//! one, so image lookups started for a stale selection are not applied.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::generator::{GenerationOutcome, ItineraryGenerator};
use crate::image_resolver::{ImageResolver, ViewHandle};
use crate::models::{DayPlan, TripRequest};
use crate::{Result, TripPlannerError};

/// Per-user planning session
pub struct TripSession {
    generator: Arc<ItineraryGenerator>,
    resolver: Arc<ImageResolver>,
    request: Option<TripRequest>,
    outcome: Option<GenerationOutcome>,
    days: Vec<DayPlan>,
    selected_day: u32,
    view: ViewHandle,
}

impl TripSession {
    pub fn new(generator: Arc<ItineraryGenerator>, resolver: Arc<ImageResolver>) -> Self {
        Self {
            generator,
            resolver,
            request: None,
            outcome: None,
            days: Vec::new(),
            selected_day: 0,
            view: ViewHandle::new(),
        }
    }

    /// Validate and generate a new trip, replacing the current one
    ///
    /// Only an invalid request is returned as an error; generation failures
    /// are stored in the outcome and render as the fallback day.
    pub async fn submit(&mut self, request: TripRequest) -> Result<&GenerationOutcome> {
        request.validate()?;

        self.view.close();
        info!(
            "Planning {} days in {}",
            request.day_count, request.destination
        );

        let outcome = self.generator.generate(&request).await;
        self.days = outcome.days();
        self.request = Some(request);
        self.selected_day = 1;
        self.view = ViewHandle::new();

        Ok(&*self.outcome.insert(outcome))
    }

    #[must_use]
    pub fn request(&self) -> Option<&TripRequest> {
        self.request.as_ref()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&GenerationOutcome> {
        self.outcome.as_ref()
    }

    /// Renderable days of the current trip
    #[must_use]
    pub fn days(&self) -> &[DayPlan] {
        &self.days
    }

    /// 1-based selected day, 0 before the first submit
    #[must_use]
    pub fn selected_day(&self) -> u32 {
        self.selected_day
    }

    /// Plan for the selected day
    #[must_use]
    pub fn selected_plan(&self) -> Option<&DayPlan> {
        let index = usize::try_from(self.selected_day).ok()?.checked_sub(1)?;
        self.days.get(index)
    }

    /// Handle of the currently open view
    #[must_use]
    pub fn view(&self) -> ViewHandle {
        self.view.clone()
    }

    /// Switch to another day, invalidating lookups started for the old one
    pub fn select_day(&mut self, day: u32) -> Result<ViewHandle> {
        if day == 0 || day as usize > self.days.len() {
            return Err(TripPlannerError::validation(format!(
                "Day {day} is out of range (1-{})",
                self.days.len()
            )));
        }

        self.view.close();
        self.view = ViewHandle::new();
        self.selected_day = day;
        debug!("Selected day {}", day);
        Ok(self.view.clone())
    }

    /// Resolve images for the selected day's stops
    ///
    /// Returns `None` when nothing is selected or the view was replaced while
    /// the lookups were running.
    pub async fn load_selected_images(&self) -> Option<HashMap<String, String>> {
        let plan = self.selected_plan()?;
        let destination = self
            .request
            .as_ref()
            .map(|request| request.destination.as_str())
            .unwrap_or_default();

        self.resolver.prefetch_day(destination, plan, &self.view).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImagesConfig;
    use crate::images::{ImageSearch, PhotoHit, SearchOptions};
    use crate::llm::TextGenerator;
    use async_trait::async_trait;

    struct TwoStopModel;

    #[async_trait]
    impl TextGenerator for TwoStopModel {
        async fn generate_text(&self, prompt: &str) -> Result<String> {
            let days = if prompt.contains("exactly 2 objects") { 2 } else { 1 };
            let plans: Vec<String> = (1..=days)
                .map(|day| {
                    format!(
                        r#"{{"title": "Day {day}: Walk", "itinerary": [
                            {{"name": "Museum {day}", "description": "Art", "location": {{"lat": 38.7, "lng": -9.1}}}},
                            {{"name": "Park {day}", "description": "Green", "location": {{"lat": 38.72, "lng": -9.15}}}}
                        ]}}"#
                    )
                })
                .collect();
            Ok(format!("[{}]", plans.join(",")))
        }
    }

    struct OneHit;

    #[async_trait]
    impl ImageSearch for OneHit {
        async fn search_photos(&self, query: &str, _options: &SearchOptions) -> Result<Vec<PhotoHit>> {
            Ok(vec![PhotoHit {
                url: format!("https://img.example/{}", urlencoding::encode(query)),
                description: None,
            }])
        }
    }

    fn session() -> TripSession {
        let generator = Arc::new(ItineraryGenerator::with_chunk_size(Arc::new(TwoStopModel), 7));
        let config = ImagesConfig {
            prefetch_delay_ms: 0,
            ..ImagesConfig::default()
        };
        let resolver = Arc::new(ImageResolver::new(Arc::new(OneHit), &config));
        TripSession::new(generator, resolver)
    }

    #[tokio::test]
    async fn test_submit_selects_first_day() {
        let mut session = session();
        let outcome = session
            .submit(TripRequest::new("Lisbon", 1500.0, 2))
            .await
            .unwrap();
        assert!(outcome.is_complete());

        assert_eq!(session.days().len(), 2);
        assert_eq!(session.selected_day(), 1);
        assert_eq!(session.selected_plan().unwrap().title, "Day 1: Walk");
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_request() {
        let mut session = session();
        let err = session
            .submit(TripRequest::new("Lisbon", -1.0, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, TripPlannerError::Validation { .. }));
        assert!(session.outcome().is_none());
        assert!(session.selected_plan().is_none());
    }

    #[tokio::test]
    async fn test_select_day_closes_previous_view() {
        let mut session = session();
        session.submit(TripRequest::new("Lisbon", 1500.0, 2)).await.unwrap();

        let first_view = session.view();
        let second_view = session.select_day(2).unwrap();

        assert!(!first_view.is_alive());
        assert!(second_view.is_alive());
        assert_eq!(session.selected_plan().unwrap().title, "Day 2: Walk");
        assert!(session.select_day(3).is_err());
        assert!(session.select_day(0).is_err());
    }

    #[tokio::test]
    async fn test_load_selected_images() {
        let mut session = session();
        session.submit(TripRequest::new("Lisbon", 1500.0, 1)).await.unwrap();

        let images = session.load_selected_images().await.unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(
            images["museum 1"],
            format!("https://img.example/{}", urlencoding::encode("Museum 1 Lisbon"))
        );
    }

    #[tokio::test]
    async fn test_stale_view_gets_no_images() {
        let mut session = session();
        session.submit(TripRequest::new("Lisbon", 1500.0, 2)).await.unwrap();
        session.view().close();

        assert!(session.load_selected_images().await.is_none());
    }
}
