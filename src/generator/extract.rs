//! Turning free-form model output into validated day plans
//!
//! The model is asked for a bare JSON array but is not guaranteed to comply:
//! answers arrive wrapped in code fences, introduced by prose, or cut off.
//! Extraction is best effort with a single regex-based second attempt;
//! validation then checks every field the UI depends on before anything is
//! deserialized.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use super::DayWindow;
use crate::models::DayPlan;
use crate::{Result, TripPlannerError};

/// Fence marker on a line of its own; a JSON string cannot span lines
static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*```[A-Za-z]*[ \t]*$").expect("valid fence pattern")
});

/// Array of objects, so bracketed prose before the payload is skipped
static ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*\{[\s\S]*\}\s*\]").expect("valid array pattern"));

/// Slice from the first `[` to the last `]` after removing code fences
fn slice_array(text: &str) -> Option<String> {
    let unfenced = FENCE.replace_all(text, "");
    let start = unfenced.find('[')?;
    let end = unfenced.rfind(']')?;
    (start < end).then(|| unfenced[start..=end].to_string())
}

/// Pull the JSON array out of a model answer
pub fn extract_json(text: &str, window: &DayWindow) -> Result<Value> {
    let first_error = match slice_array(text) {
        Some(candidate) => match serde_json::from_str::<Value>(&candidate) {
            Ok(value) => return Ok(value),
            Err(e) => e.to_string(),
        },
        None => "no JSON array found".to_string(),
    };

    debug!(
        "Direct parse failed for days {} ({}), scanning for an array",
        window, first_error
    );

    let recovered = ARRAY
        .find(text)
        .ok_or_else(|| TripPlannerError::malformed(window, format!("no JSON array in response ({first_error})")))?;

    serde_json::from_str::<Value>(recovered.as_str()).map_err(|e| {
        TripPlannerError::malformed(window, format!("unparseable JSON after recovery: {e}"))
    })
}

fn is_number(value: Option<&Value>) -> bool {
    value.is_some_and(Value::is_number)
}

fn is_string(value: Option<&Value>) -> bool {
    value.is_some_and(Value::is_string)
}

/// Check one stop; `None` means valid
fn stop_violation(stop: &Value) -> Option<&'static str> {
    if !stop.is_object() {
        return Some("stop is not an object");
    }
    if !is_string(stop.get("name")) {
        return Some("stop is missing a name");
    }
    if !is_string(stop.get("description")) {
        return Some("stop is missing a description");
    }
    let Some(location) = stop.get("location").filter(|l| l.is_object()) else {
        return Some("stop is missing a location");
    };
    if !is_number(location.get("lat")) || !is_number(location.get("lng")) {
        return Some("stop location needs numeric lat and lng");
    }
    None
}

/// Validate the parsed payload against the itinerary schema and convert it
pub fn validate_days(value: Value, window: &DayWindow) -> Result<Vec<DayPlan>> {
    let Value::Array(days) = value else {
        return Err(TripPlannerError::malformed(window, "response is not a JSON array"));
    };

    for (day_index, day) in days.iter().enumerate() {
        let title_ok = day
            .get("title")
            .and_then(Value::as_str)
            .is_some_and(|title| !title.trim().is_empty());
        if !title_ok {
            return Err(TripPlannerError::invalid_schema(
                window,
                day_index,
                None,
                "day is missing a title",
            ));
        }

        let Some(stops) = day.get("itinerary").and_then(Value::as_array) else {
            return Err(TripPlannerError::invalid_schema(
                window,
                day_index,
                None,
                "day itinerary is not an array",
            ));
        };

        for (stop_index, stop) in stops.iter().enumerate() {
            if let Some(violation) = stop_violation(stop) {
                return Err(TripPlannerError::invalid_schema(
                    window,
                    day_index,
                    Some(stop_index),
                    violation,
                ));
            }
        }
    }

    let plans = days
        .into_iter()
        .enumerate()
        .map(|(day_index, day)| {
            serde_json::from_value::<DayPlan>(day).map_err(|e| {
                TripPlannerError::invalid_schema(window, day_index, None, e.to_string())
            })
        })
        .collect::<Result<Vec<_>>>()?;

    for plan in &plans {
        for stop in plan.stops.iter().filter(|s| !s.coordinates.is_plausible()) {
            warn!(
                "Stop '{}' on '{}' has implausible coordinates ({})",
                stop.name,
                plan.title,
                stop.coordinates.format_coordinates()
            );
        }
    }

    Ok(plans)
}

/// Extract and validate one window's answer
pub fn parse_window(text: &str, window: &DayWindow) -> Result<Vec<DayPlan>> {
    let value = extract_json(text, window)?;
    validate_days(value, window)
}
