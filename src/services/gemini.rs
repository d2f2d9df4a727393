use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::{AiError, AiResult};
use super::image::strip_data_uri;
use super::prompts;
use crate::models::{ClothingAnalysisResult, ClothingItem, OutfitRecommendation, WeatherSnapshot};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The direct (non-relay) path to the multimodal model.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn analyze_item(&self, image: &str) -> AiResult<ClothingAnalysisResult>;
    async fn recommend_outfit(
        &self,
        weather: &WeatherSnapshot,
        closet: &[ClothingItem],
    ) -> AiResult<OutfitRecommendation>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Inline { inline_data: InlineData },
    Text { text: String },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "category": { "type": "STRING" },
            "color": { "type": "STRING" },
            "season": { "type": "ARRAY", "items": { "type": "STRING" } },
            "material": { "type": "STRING" },
            "careInstructions": { "type": "STRING" },
            "description": { "type": "STRING" }
        },
        "required": ["category", "color", "season", "material", "careInstructions", "description"]
    })
}

fn recommendation_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "topId": { "type": "STRING" },
            "bottomId": { "type": "STRING", "nullable": true },
            "outerwearId": { "type": "STRING", "nullable": true },
            "reasoning": { "type": "STRING" },
            "styleName": { "type": "STRING" },
            "matchScore": { "type": "NUMBER" }
        },
        "required": ["topId", "reasoning", "styleName", "matchScore"]
    })
}

pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    language: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, base_url: String, language: String) -> Self {
        Self {
            api_key,
            model,
            base_url,
            language,
            client: reqwest::Client::new(),
        }
    }

    /// Sends one `generateContent` request and returns the concatenated text
    /// of the first candidate, or `None` when the model produced no text.
    async fn generate(&self, parts: Vec<Part>, schema: Value) -> AiResult<Option<String>> {
        let request = GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: schema,
            },
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        log::info!("🤖 Sending request to Gemini with model: {}", self.model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::Model(e.to_string()))?;

        let status = response.status();
        log::debug!("📥 Gemini response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ Gemini API error response: {}", error_text);
            return Err(AiError::Model(format!("Gemini API error ({}): {}", status, error_text)));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AiError::Model(format!("unreadable Gemini response: {}", e)))?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }
}

fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    serde_json::from_str(text).map_err(|e| format!("malformed structured output: {}", e))
}

#[async_trait]
impl VisionModel for GeminiClient {
    async fn analyze_item(&self, image: &str) -> AiResult<ClothingAnalysisResult> {
        let inline = strip_data_uri(image);
        log::debug!("📸 Analyzing clothing image ({}, {} base64 chars)", inline.mime_type, inline.data.len());

        let parts = vec![
            Part::Inline {
                inline_data: InlineData {
                    mime_type: inline.mime_type.to_string(),
                    data: inline.data.to_string(),
                },
            },
            Part::Text {
                text: prompts::analysis_instruction(&self.language),
            },
        ];

        let text = self
            .generate(parts, analysis_schema())
            .await?
            .ok_or_else(|| AiError::Analysis("no response text from Gemini".to_string()))?;

        log::info!("💬 Gemini analysis: {}", text);
        parse_structured(&text).map_err(AiError::Analysis)
    }

    async fn recommend_outfit(
        &self,
        weather: &WeatherSnapshot,
        closet: &[ClothingItem],
    ) -> AiResult<OutfitRecommendation> {
        log::debug!("👗 Requesting outfit for {} closet items", closet.len());

        let parts = vec![Part::Text {
            text: prompts::outfit_instruction(weather, closet, &self.language),
        }];

        let text = self
            .generate(parts, recommendation_schema())
            .await?
            .ok_or_else(|| AiError::Recommendation("no response text from Gemini".to_string()))?;

        log::info!("💬 Gemini recommendation: {}", text);
        parse_structured(&text).map_err(AiError::Recommendation)
    }
}
