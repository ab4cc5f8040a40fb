//! Trip request submitted from the planning form

use serde::{Deserialize, Serialize};

use crate::TripPlannerError;

/// Longest trip the planner will generate
pub const MAX_TRIP_DAYS: u32 = 21;

/// Destination, budget and length of a requested trip
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    /// Free-form destination, e.g. "Kyoto" or "Lisbon, Portugal"
    pub destination: String,
    /// Total budget for the whole trip
    pub budget: f64,
    /// Number of days to plan, 1 to [`MAX_TRIP_DAYS`]
    pub day_count: u32,
}

impl TripRequest {
    /// Create a new trip request
    pub fn new<S: Into<String>>(destination: S, budget: f64, day_count: u32) -> Self {
        Self {
            destination: destination.into(),
            budget,
            day_count,
        }
    }

    /// Check the request before any generation starts
    pub fn validate(&self) -> crate::Result<()> {
        if self.destination.trim().is_empty() {
            return Err(TripPlannerError::validation("Destination cannot be empty"));
        }

        if !self.budget.is_finite() || self.budget <= 0.0 {
            return Err(TripPlannerError::validation(format!(
                "Budget must be a positive number, got {}",
                self.budget
            )));
        }

        if !(1..=MAX_TRIP_DAYS).contains(&self.day_count) {
            return Err(TripPlannerError::validation(format!(
                "Trip length must be between 1 and {MAX_TRIP_DAYS} days, got {}",
                self.day_count
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Kyoto", 900.0, 5)]
    #[case("Lisbon, Portugal", 0.01, 1)]
    #[case("Patagonia", 12_000.0, 21)]
    fn test_valid_requests(#[case] destination: &str, #[case] budget: f64, #[case] days: u32) {
        assert!(TripRequest::new(destination, budget, days).validate().is_ok());
    }

    #[rstest]
    #[case("", 900.0, 5, "Destination")]
    #[case("   ", 900.0, 5, "Destination")]
    #[case("Kyoto", 0.0, 5, "Budget")]
    #[case("Kyoto", -20.0, 5, "Budget")]
    #[case("Kyoto", f64::NAN, 5, "Budget")]
    #[case("Kyoto", f64::INFINITY, 5, "Budget")]
    #[case("Kyoto", 900.0, 0, "Trip length")]
    #[case("Kyoto", 900.0, 22, "Trip length")]
    fn test_invalid_requests(
        #[case] destination: &str,
        #[case] budget: f64,
        #[case] days: u32,
        #[case] expected: &str,
    ) {
        let err = TripRequest::new(destination, budget, days)
            .validate()
            .unwrap_err();
        assert!(matches!(err, TripPlannerError::Validation { .. }));
        assert!(err.to_string().contains(expected), "unexpected error: {err}");
    }

    #[test]
    fn test_request_uses_camel_case_on_the_wire() {
        let request: TripRequest =
            serde_json::from_str(r#"{"destination":"Kyoto","budget":900,"dayCount":5}"#).unwrap();
        assert_eq!(request, TripRequest::new("Kyoto", 900.0, 5));
    }
}
