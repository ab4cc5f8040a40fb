//! Configuration management for the trip planner
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TripPlannerError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Conventional variable for the generative-language key
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Conventional variable for the image-search key
pub const UNSPLASH_ACCESS_KEY_VAR: &str = "UNSPLASH_ACCESS_KEY";

/// Root configuration structure for the trip planner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPlannerConfig {
    /// Itinerary generation settings
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Image search settings
    #[serde(default)]
    pub images: ImagesConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Generative-language API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// API key for the generative-language API
    pub api_key: Option<String>,
    /// Base URL of the generative-language API
    #[serde(default = "default_generator_base_url")]
    pub base_url: String,
    /// Model used for itinerary generation
    #[serde(default = "default_generator_model")]
    pub model: String,
    /// Days requested per model call
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,
    /// Request timeout in seconds
    #[serde(default = "default_generator_timeout")]
    pub timeout_seconds: u32,
}

/// Image search API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Access key for the image search API
    pub api_key: Option<String>,
    /// Base URL of the image search API
    #[serde(default = "default_images_base_url")]
    pub base_url: String,
    /// Orientation hint sent with every search
    #[serde(default = "default_orientation")]
    pub orientation: String,
    /// Number of results requested per search
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Base URL for deterministic placeholder images
    #[serde(default = "default_placeholder_base_url")]
    pub placeholder_base_url: String,
    /// Pause between successive fetches while prefetching a day
    #[serde(default = "default_prefetch_delay")]
    pub prefetch_delay_ms: u64,
    /// Request timeout in seconds
    #[serde(default = "default_images_timeout")]
    pub timeout_seconds: u32,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the built browser UI
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_generator_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_generator_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_chunk_size() -> u32 {
    7
}

fn default_generator_timeout() -> u32 {
    60
}

fn default_images_base_url() -> String {
    "https://api.unsplash.com".to_string()
}

fn default_orientation() -> String {
    "landscape".to_string()
}

fn default_per_page() -> u32 {
    1
}

fn default_placeholder_base_url() -> String {
    "https://source.unsplash.com".to_string()
}

fn default_prefetch_delay() -> u64 {
    150
}

fn default_images_timeout() -> u32 {
    15
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "frontend/dist".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_generator_base_url(),
            model: default_generator_model(),
            chunk_size: default_chunk_size(),
            timeout_seconds: default_generator_timeout(),
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_images_base_url(),
            orientation: default_orientation(),
            per_page: default_per_page(),
            placeholder_base_url: default_placeholder_base_url(),
            prefetch_delay_ms: default_prefetch_delay(),
            timeout_seconds: default_images_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for TripPlannerConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            images: ImagesConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GeneratorConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl ImagesConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    #[must_use]
    pub fn prefetch_delay(&self) -> Duration {
        Duration::from_millis(self.prefetch_delay_ms)
    }
}

impl TripPlannerConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRIP_PLANNER_GENERATOR__API_KEY -> generator.api_key
        builder = builder.add_source(
            Environment::with_prefix("TRIP_PLANNER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripPlannerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_env_keys(
            std::env::var(GEMINI_API_KEY_VAR).ok(),
            std::env::var(UNSPLASH_ACCESS_KEY_VAR).ok(),
        );

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("trip-planner").join("config.toml"))
    }

    /// Fill API keys from the conventional variables when not configured otherwise
    pub fn apply_env_keys(&mut self, gemini_key: Option<String>, unsplash_key: Option<String>) {
        if self.generator.api_key.is_none() {
            self.generator.api_key = gemini_key.filter(|key| !key.trim().is_empty());
        }
        if self.images.api_key.is_none() {
            self.images.api_key = unsplash_key.filter(|key| !key.trim().is_empty());
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.generator.base_url.is_empty() {
            self.generator.base_url = default_generator_base_url();
        }
        if self.generator.model.is_empty() {
            self.generator.model = default_generator_model();
        }
        if self.generator.chunk_size == 0 {
            self.generator.chunk_size = default_chunk_size();
        }
        if self.generator.timeout_seconds == 0 {
            self.generator.timeout_seconds = default_generator_timeout();
        }
        if self.images.base_url.is_empty() {
            self.images.base_url = default_images_base_url();
        }
        if self.images.orientation.is_empty() {
            self.images.orientation = default_orientation();
        }
        if self.images.per_page == 0 {
            self.images.per_page = default_per_page();
        }
        if self.images.placeholder_base_url.is_empty() {
            self.images.placeholder_base_url = default_placeholder_base_url();
        }
        if self.images.timeout_seconds == 0 {
            self.images.timeout_seconds = default_images_timeout();
        }
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.static_dir.is_empty() {
            self.server.static_dir = default_static_dir();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    ///
    /// Keys are optional at load time; a missing generator key surfaces as a
    /// configuration failure of the generation path instead.
    pub fn validate_api_keys(&self) -> Result<()> {
        let keys = [
            ("Generator", &self.generator.api_key),
            ("Image search", &self.images.api_key),
        ];

        for (name, key) in keys {
            if let Some(api_key) = key {
                if api_key.trim().is_empty() {
                    return Err(TripPlannerError::config(format!(
                        "{name} API key cannot be empty if provided. Either remove it or provide a valid key."
                    ))
                    .into());
                }

                if api_key.len() > 200 {
                    return Err(TripPlannerError::config(format!(
                        "{name} API key appears to be invalid (too long). Please check your API key."
                    ))
                    .into());
                }
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.generator.chunk_size > crate::models::MAX_TRIP_DAYS {
            return Err(TripPlannerError::config(format!(
                "Generator chunk size cannot exceed {} days",
                crate::models::MAX_TRIP_DAYS
            ))
            .into());
        }

        if self.generator.timeout_seconds > 300 || self.images.timeout_seconds > 300 {
            return Err(TripPlannerError::config("API timeout cannot exceed 300 seconds").into());
        }

        if self.images.per_page > 30 {
            return Err(
                TripPlannerError::config("Image search per_page cannot exceed 30").into(),
            );
        }

        if self.images.prefetch_delay_ms > 10_000 {
            return Err(
                TripPlannerError::config("Image prefetch delay cannot exceed 10000 ms").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripPlannerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripPlannerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("Generator base URL", &self.generator.base_url),
            ("Image search base URL", &self.images.base_url),
            ("Placeholder base URL", &self.images.placeholder_base_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TripPlannerError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
