use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    TripPlannerError,
    generator::{ItineraryGenerator, OutcomeSummary},
    image_resolver::{ImageResolver, ViewHandle},
    models::{DayPlan, TripRequest},
};

/// Shared services behind the HTTP routes
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<ItineraryGenerator>,
    pub resolver: Arc<ImageResolver>,
}

#[derive(Deserialize)]
pub struct ImageQuery {
    pub key: String,
    pub query: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ImageResponse {
    pub url: String,
}

#[derive(Deserialize)]
pub struct PrefetchRequest {
    pub destination: String,
    pub day: DayPlan,
}

#[derive(Serialize, Deserialize)]
pub struct PrefetchResponse {
    pub images: HashMap<String, String>,
}

/// Error body returned for rejected requests
pub struct ApiError(TripPlannerError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            TripPlannerError::Validation { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/itinerary", post(generate_itinerary))
        .route("/images", get(resolve_image))
        .route("/images/prefetch", post(prefetch_images))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

async fn generate_itinerary(
    State(state): State<AppState>,
    Json(request): Json<TripRequest>,
) -> Result<Json<OutcomeSummary>, ApiError> {
    request.validate().map_err(ApiError)?;

    let outcome = state.generator.generate(&request).await;
    Ok(Json(OutcomeSummary::from(outcome)))
}

async fn resolve_image(
    State(state): State<AppState>,
    Query(params): Query<ImageQuery>,
) -> Result<Json<ImageResponse>, ApiError> {
    if params.key.trim().is_empty() {
        return Err(ApiError(TripPlannerError::validation("Image key cannot be empty")));
    }

    let query = params.query.as_deref().unwrap_or(&params.key);
    let url = state.resolver.resolve(&params.key, query).await;
    Ok(Json(ImageResponse { url }))
}

async fn prefetch_images(
    State(state): State<AppState>,
    Json(request): Json<PrefetchRequest>,
) -> Json<PrefetchResponse> {
    // A dropped connection drops this future, so the view is never closed early.
    let view = ViewHandle::new();
    let images = state
        .resolver
        .prefetch_day(&request.destination, &request.day, &view)
        .await
        .unwrap_or_default();

    Json(PrefetchResponse { images })
}
