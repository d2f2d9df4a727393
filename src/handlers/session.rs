use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::models::{
    ClothingAnalysisResult, ClothingItem, DailyLog, Feedback, ItemOverrides, LoggedOutfit,
    OutfitRecommendation, OutfitSelection, WeatherSnapshot,
};
use crate::services::ai_service::AiService;
use crate::services::analytics::{wardrobe_stats, WardrobeStats};
use crate::services::error::{AiError, AiResult};
use crate::services::outfit::{self, ContractViolation};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Ai(#[from] AiError),

    #[error("outfit generation needs weather and at least one closet item")]
    NotReady,

    #[error("an outfit is already being generated")]
    Busy,

    #[error("generation was reset before it finished")]
    Cancelled,

    #[error("there is no suggestion to confirm")]
    NoSuggestion,

    #[error("unknown closet item '{0}'")]
    UnknownItem(String),

    #[error("invalid closet item: {0}")]
    InvalidItem(&'static str),

    #[error("no outfit logged on {0}")]
    UnknownLog(NaiveDate),

    #[error("rating must be between 0 and 5, got {0}")]
    InvalidRating(u8),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Suggestion {
    pub selection: OutfitSelection,
    /// Slot rules the recommender broke; shown, not corrected.
    pub violations: Vec<ContractViolation>,
}

/// idle → generating → suggested → confirmed, with failures back to idle.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OutfitFlow {
    Idle,
    Generating { generation: u64 },
    Suggested { suggestion: Suggestion },
    Confirmed { date: NaiveDate },
}

/// Inputs captured when generation starts, so the AI call can run without
/// holding the session.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub generation: u64,
    pub weather: WeatherSnapshot,
    pub closet: Vec<ClothingItem>,
}

/// Everything one user works with: closet, calendar, today's weather and the
/// outfit flow.
pub struct WardrobeSession {
    closet: Vec<ClothingItem>,
    logs: Vec<DailyLog>,
    weather: Option<WeatherSnapshot>,
    flow: OutfitFlow,
    generation: u64,
    timezone: Tz,
}

impl WardrobeSession {
    pub fn new(timezone: Tz) -> Self {
        Self {
            closet: Vec::new(),
            logs: Vec::new(),
            weather: None,
            flow: OutfitFlow::Idle,
            generation: 0,
            timezone,
        }
    }

    pub fn closet(&self) -> &[ClothingItem] {
        &self.closet
    }

    pub fn logs(&self) -> &[DailyLog] {
        &self.logs
    }

    pub fn weather(&self) -> Option<&WeatherSnapshot> {
        self.weather.as_ref()
    }

    pub fn flow(&self) -> &OutfitFlow {
        &self.flow
    }

    pub fn set_weather(&mut self, weather: WeatherSnapshot) {
        self.weather = Some(weather);
    }

    pub fn analytics(&self) -> WardrobeStats {
        wardrobe_stats(&self.closet, &self.logs)
    }

    fn next_item_id(&self, now: DateTime<Utc>) -> String {
        let mut millis = now.timestamp_millis();
        while self.closet.iter().any(|item| item.id == millis.to_string()) {
            millis += 1;
        }
        millis.to_string()
    }

    /// Builds a closet item from an analysis plus whatever the user changed.
    /// Items need a color and at least one season.
    pub fn add_item(
        &mut self,
        image_url: String,
        analysis: ClothingAnalysisResult,
        overrides: ItemOverrides,
        now: DateTime<Utc>,
    ) -> Result<ClothingItem, SessionError> {
        let non_empty = |value: String| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        };

        let color = overrides
            .color
            .and_then(non_empty)
            .or_else(|| non_empty(analysis.color))
            .ok_or(SessionError::InvalidItem("color is required"))?;
        if analysis.season.is_empty() {
            return Err(SessionError::InvalidItem("at least one season is required"));
        }

        let item = ClothingItem {
            id: self.next_item_id(now),
            image_url,
            category: overrides.category.unwrap_or(analysis.category),
            color,
            season: analysis.season,
            material: overrides.material.and_then(non_empty).or_else(|| non_empty(analysis.material)),
            care_instructions: overrides
                .care_instructions
                .and_then(non_empty)
                .or_else(|| non_empty(analysis.care_instructions)),
            wear_count: 0,
            brand: overrides.brand.and_then(non_empty),
            created_at: now,
        };

        log::info!("👕 Added {} item {} ({})", item.category, item.id, item.color);
        self.closet.insert(0, item.clone());
        Ok(item)
    }

    pub fn remove_item(&mut self, id: &str) -> Result<ClothingItem, SessionError> {
        let index = self
            .closet
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| SessionError::UnknownItem(id.to_string()))?;
        log::info!("🗑️ Removed closet item {}", id);
        Ok(self.closet.remove(index))
    }

    pub fn record_wear(&mut self, id: &str) -> Result<u32, SessionError> {
        let item = self
            .closet
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| SessionError::UnknownItem(id.to_string()))?;
        item.wear_count += 1;
        Ok(item.wear_count)
    }

    /// Moves the flow to `Generating` and snapshots the inputs. No request
    /// must be issued when this fails.
    pub fn begin_generation(&mut self) -> Result<GenerationRequest, SessionError> {
        if matches!(self.flow, OutfitFlow::Generating { .. }) {
            return Err(SessionError::Busy);
        }
        let weather = match &self.weather {
            Some(weather) if !self.closet.is_empty() => weather.clone(),
            _ => return Err(SessionError::NotReady),
        };

        self.generation += 1;
        self.flow = OutfitFlow::Generating {
            generation: self.generation,
        };
        Ok(GenerationRequest {
            generation: self.generation,
            weather,
            closet: self.closet.clone(),
        })
    }

    /// Stores the outcome of a generation started with [`begin_generation`].
    /// Any failure returns the flow to `Idle` with nothing kept. Results from
    /// an earlier cycle (reset and restarted since) are dropped.
    ///
    /// [`begin_generation`]: WardrobeSession::begin_generation
    pub fn finish_generation(
        &mut self,
        request: &GenerationRequest,
        outcome: AiResult<OutfitRecommendation>,
    ) -> Result<Suggestion, SessionError> {
        let current = OutfitFlow::Generating {
            generation: request.generation,
        };
        if self.flow != current {
            log::warn!(
                "⚠️ Dropping outfit result from generation {}, flow was reset while generating",
                request.generation
            );
            return Err(SessionError::Cancelled);
        }

        let resolved = outcome.and_then(|rec| {
            let selection = outfit::resolve(&rec, &request.closet)?;
            Ok((rec, selection))
        });

        let (rec, selection) = match resolved {
            Ok(resolved) => resolved,
            Err(e) => {
                log::error!("❌ Outfit generation failed: {}", e);
                self.flow = OutfitFlow::Idle;
                return Err(e.into());
            }
        };

        let violations = outfit::violations(&rec, &request.weather, &request.closet);
        for violation in &violations {
            log::warn!("⚠️ Outfit contract violation: {}", violation);
        }

        let suggestion = Suggestion {
            selection,
            violations,
        };
        log::info!("✨ Suggested outfit: {}", suggestion.selection.style_name);
        self.flow = OutfitFlow::Suggested {
            suggestion: suggestion.clone(),
        };
        Ok(suggestion)
    }

    /// Runs one generation cycle while holding the session. Callers that
    /// share the session across tasks use `begin_generation` and
    /// `finish_generation` instead.
    pub async fn generate_outfit(&mut self, ai: &AiService) -> Result<Suggestion, SessionError> {
        let request = self.begin_generation()?;
        let outcome = ai
            .generate_outfit_suggestion(&request.weather, &request.closet)
            .await;
        self.finish_generation(&request, outcome)
    }

    /// Persists the current suggestion as today's log entry.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> Result<DailyLog, SessionError> {
        let OutfitFlow::Suggested { suggestion } = &self.flow else {
            return Err(SessionError::NoSuggestion);
        };
        let weather = self.weather.clone().ok_or(SessionError::NotReady)?;
        let selection = suggestion.selection.clone();

        let log = DailyLog {
            date: now.with_timezone(&self.timezone).date_naive(),
            weather,
            outfit: LoggedOutfit {
                top: selection.top,
                bottom: selection.bottom,
                outerwear: selection.outerwear,
            },
            feedback: None,
        };

        log::info!("📅 Confirmed outfit for {}", log.date);
        self.logs.push(log.clone());
        self.flow = OutfitFlow::Confirmed { date: log.date };
        Ok(log)
    }

    /// Attaches feedback to the latest log written on `date`.
    pub fn attach_feedback(
        &mut self,
        date: NaiveDate,
        rating: u8,
        comment: Option<String>,
    ) -> Result<&DailyLog, SessionError> {
        if rating > 5 {
            return Err(SessionError::InvalidRating(rating));
        }
        let log = self
            .logs
            .iter_mut()
            .rev()
            .find(|log| log.date == date)
            .ok_or(SessionError::UnknownLog(date))?;

        log.feedback = Some(Feedback {
            rating,
            comment: comment.filter(|c| !c.trim().is_empty()),
        });
        Ok(log)
    }

    pub fn reset(&mut self) {
        self.flow = OutfitFlow::Idle;
    }
}
