use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::error::{AiError, AiResult};
use super::gemini::VisionModel;
use super::prompts;
use super::relay::Relay;
use crate::models::{ClothingAnalysisResult, ClothingItem, OutfitRecommendation, WeatherSnapshot};

/// Relay addresses, one per operation. `None` or blank means "call the
/// model directly".
#[derive(Debug, Clone, Default)]
pub struct RelayEndpoints {
    pub analyze_image: Option<String>,
    pub outfit: Option<String>,
    pub image_analyzer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Relay(String),
    Direct,
}

impl Route {
    pub fn from_endpoint(endpoint: Option<&str>) -> Self {
        match endpoint.map(str::trim) {
            Some(url) if !url.is_empty() => Route::Relay(url.to_string()),
            _ => Route::Direct,
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, Route::Direct)
    }
}

/// Picks relay or direct model per operation. Routes are fixed when the
/// service is built; a failing relay is never retried against the model.
pub struct AiService {
    relay: Arc<dyn Relay>,
    model: Option<Arc<dyn VisionModel>>,
    analysis_route: Route,
    outfit_route: Route,
    image_analyzer_route: Route,
    language: String,
}

impl AiService {
    pub fn new(
        endpoints: &RelayEndpoints,
        relay: Arc<dyn Relay>,
        model: Option<Arc<dyn VisionModel>>,
        language: &str,
    ) -> Self {
        let analysis_route = Route::from_endpoint(endpoints.analyze_image.as_deref());
        let outfit_route = Route::from_endpoint(endpoints.outfit.as_deref());
        let image_analyzer_route = Route::from_endpoint(endpoints.image_analyzer.as_deref());

        log::info!(
            "🧭 AI routes - analysis: {:?}, outfit: {:?}, image analyzer: {:?}",
            analysis_route,
            outfit_route,
            image_analyzer_route
        );

        Self {
            relay,
            model,
            analysis_route,
            outfit_route,
            image_analyzer_route,
            language: language.to_string(),
        }
    }

    fn direct_model(&self) -> AiResult<&Arc<dyn VisionModel>> {
        self.model
            .as_ref()
            .ok_or(AiError::NotConfigured("direct model client (GEMINI_API_KEY)"))
    }

    pub async fn analyze_clothing_image(&self, image: &str) -> AiResult<ClothingAnalysisResult> {
        let result = match &self.analysis_route {
            Route::Relay(endpoint) => {
                log::info!("🔀 Clothing analysis via relay");
                let payload = json!({
                    "imageBase64": image,
                    "prompt": prompts::relay_analysis_instruction(&self.language),
                });
                let value = self.relay.invoke(endpoint, &payload).await?;
                reshape::<ClothingAnalysisResult>(value, "clothing analysis")?
            }
            Route::Direct => {
                log::info!("🤖 Clothing analysis via direct model");
                self.direct_model()?.analyze_item(image).await?
            }
        };

        check_analysis(result)
    }

    pub async fn generate_outfit_suggestion(
        &self,
        weather: &WeatherSnapshot,
        closet: &[ClothingItem],
    ) -> AiResult<OutfitRecommendation> {
        let rec = match &self.outfit_route {
            Route::Relay(endpoint) => {
                log::info!("🔀 Outfit suggestion via relay ({} items)", closet.len());
                let payload = json!({
                    "weather": weather,
                    "closet": closet,
                    "closetManifest": prompts::closet_manifest(closet),
                    "weatherContext": prompts::weather_context(weather),
                    "prompt": prompts::relay_outfit_instruction(weather, closet, &self.language),
                });
                let value = self.relay.invoke(endpoint, &payload).await?;
                reshape::<OutfitRecommendation>(value, "outfit recommendation")?
            }
            Route::Direct => {
                log::info!("🤖 Outfit suggestion via direct model ({} items)", closet.len());
                self.direct_model()?.recommend_outfit(weather, closet).await?
            }
        };

        if rec.top_id.trim().is_empty() {
            return Err(AiError::MalformedResponse(
                "outfit recommendation has an empty topId".to_string(),
            ));
        }
        Ok(rec)
    }

    /// Diagnostic: asks the image-analyzer relay about an arbitrary image URL
    /// and returns its `text` answer.
    pub async fn analyze_image_url(&self, image_url: &str, prompt: &str) -> AiResult<String> {
        let Route::Relay(endpoint) = &self.image_analyzer_route else {
            return Err(AiError::NotConfigured("IMAGE_ANALYZER_WEBHOOK_URL"));
        };

        let payload = json!({
            "imageUrl": image_url.trim(),
            "prompt": prompt.trim(),
        });
        let value = self.relay.invoke(endpoint, &payload).await?;

        value
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AiError::MalformedResponse("relay answer has no text field".to_string()))
    }
}

fn reshape<T: DeserializeOwned>(value: Value, what: &str) -> AiResult<T> {
    serde_json::from_value(value.clone()).map_err(|e| {
        log::error!("❌ Relay {} does not match expected shape: {}", what, value);
        AiError::MalformedResponse(format!("{}: {}", what, e))
    })
}

fn check_analysis(result: ClothingAnalysisResult) -> AiResult<ClothingAnalysisResult> {
    if result.color.trim().is_empty() {
        return Err(AiError::MalformedResponse("analysis has no color".to_string()));
    }
    if result.season.is_empty() {
        return Err(AiError::MalformedResponse("analysis has no recognizable season".to_string()));
    }
    Ok(result)
}
