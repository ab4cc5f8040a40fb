//! Error types and handling for the trip planner

use thiserror::Error;

/// Main error type for the trip planner
#[derive(Error, Debug)]
pub enum TripPlannerError {
    /// Missing or invalid configuration, e.g. an absent API key
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Network or backend failure from one of the external APIs
    #[error("API error: {message}")]
    Api { message: String },

    /// Model output that could not be turned into JSON
    #[error("Malformed response for days {window}: {message}")]
    MalformedResponse { window: String, message: String },

    /// Parsed model output that does not match the itinerary schema
    #[error("Invalid itinerary for days {window}, day index {day}{}: {message}", stop_suffix(.stop))]
    InvalidSchema {
        window: String,
        day: usize,
        stop: Option<usize>,
        message: String,
    },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

fn stop_suffix(stop: &Option<usize>) -> String {
    stop.map(|index| format!(", stop index {index}"))
        .unwrap_or_default()
}

impl TripPlannerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new malformed-response error for a window
    pub fn malformed<W: ToString, S: Into<String>>(window: W, message: S) -> Self {
        Self::MalformedResponse {
            window: window.to_string(),
            message: message.into(),
        }
    }

    /// Create a new schema error for a day (and optionally a stop) of a window
    pub fn invalid_schema<W: ToString, S: Into<String>>(
        window: W,
        day: usize,
        stop: Option<usize>,
        message: S,
    ) -> Self {
        Self::InvalidSchema {
            window: window.to_string(),
            day,
            stop,
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripPlannerError::Config { message } => {
                format!("Configuration error: {message}. Please check your API keys.")
            }
            TripPlannerError::Api { .. } => {
                "Unable to reach the itinerary service. Please check your internet connection."
                    .to_string()
            }
            TripPlannerError::MalformedResponse { .. } | TripPlannerError::InvalidSchema { .. } => {
                "The itinerary service returned an unusable answer. Please try again.".to_string()
            }
            TripPlannerError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TripPlannerError::Io { .. } => {
                "File or network operation failed. Please check permissions.".to_string()
            }
        }
    }
}
