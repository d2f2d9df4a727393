use anyhow::{Context, Result};
use chrono_tz::Tz;
use std::env;
use std::time::Duration;

use crate::services::ai_service::{RelayEndpoints, Route};
use crate::services::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::services::relay::DEFAULT_RELAY_TIMEOUT;

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub endpoints: RelayEndpoints,
    pub relay_timeout: Duration,
    pub response_language: String,
    pub timezone: Tz,
    pub weather_location: String,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let relay_timeout = match non_empty("RELAY_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("RELAY_TIMEOUT_SECS must be a number of seconds, got '{}'", raw))?,
            ),
            None => DEFAULT_RELAY_TIMEOUT,
        };

        let timezone_name = non_empty("DRESSIFY_TIMEZONE").unwrap_or_else(|| "Asia/Seoul".to_string());
        let timezone: Tz = timezone_name
            .parse()
            .map_err(|e| anyhow::anyhow!("DRESSIFY_TIMEZONE '{}' is not a valid timezone: {}", timezone_name, e))?;

        Ok(Self {
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            gemini_model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: non_empty("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            endpoints: RelayEndpoints {
                analyze_image: lookup("ANALYZE_IMAGE_WEBHOOK_URL"),
                outfit: lookup("OUTFIT_WEBHOOK_URL"),
                image_analyzer: lookup("IMAGE_ANALYZER_WEBHOOK_URL"),
            },
            relay_timeout,
            response_language: non_empty("RESPONSE_LANGUAGE").unwrap_or_else(|| "Korean".to_string()),
            timezone,
            weather_location: non_empty("WEATHER_LOCATION").unwrap_or_else(|| "Seoul, KR".to_string()),
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        })
    }

    /// True when analysis or outfit generation will call the model directly.
    pub fn needs_direct_model(&self) -> bool {
        Route::from_endpoint(self.endpoints.analyze_image.as_deref()).is_direct()
            || Route::from_endpoint(self.endpoints.outfit.as_deref()).is_direct()
    }
}
