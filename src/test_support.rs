//! Fixtures and fakes shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::models::{
    ClothingAnalysisResult, ClothingCategory, ClothingItem, OutfitRecommendation, Season,
    WeatherCondition, WeatherSnapshot,
};
use crate::services::ai_service::{AiService, RelayEndpoints};
use crate::services::error::{AiError, AiResult};
use crate::services::gemini::VisionModel;
use crate::services::outfit::needs_outerwear;
use crate::services::relay::Relay;
use std::sync::Arc;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{}", addr)
}

pub fn item(id: &str, category: ClothingCategory) -> ClothingItem {
    ClothingItem {
        id: id.to_string(),
        image_url: format!("https://images.example/{}.jpg", id),
        category,
        color: "Black".to_string(),
        season: vec![Season::Spring, Season::Autumn],
        material: Some("면 100%".to_string()),
        care_instructions: None,
        wear_count: 0,
        brand: None,
        created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
    }
}

pub fn weather(temperature: f64, condition: WeatherCondition) -> WeatherSnapshot {
    WeatherSnapshot {
        temperature,
        temp_high: temperature + 3.0,
        temp_low: temperature - 4.0,
        precip_chance: 10,
        wind_speed: 5.0,
        humidity: 45,
        uv_index: 5,
        condition,
        description: "테스트 날씨".to_string(),
        location: "Seoul, KR".to_string(),
    }
}

pub fn recommendation(top: &str, bottom: Option<&str>, outerwear: Option<&str>) -> OutfitRecommendation {
    OutfitRecommendation {
        top_id: top.to_string(),
        bottom_id: bottom.map(str::to_string),
        outerwear_id: outerwear.map(str::to_string),
        reasoning: "색감이 잘 어울립니다".to_string(),
        style_name: "미니멀 캐주얼".to_string(),
        match_score: 0.9,
    }
}

pub fn analysis() -> ClothingAnalysisResult {
    ClothingAnalysisResult {
        category: ClothingCategory::Top,
        color: "White".to_string(),
        season: vec![Season::Spring, Season::Summer],
        material: "면 100%".to_string(),
        care_instructions: "찬물 손세탁".to_string(),
        description: "깔끔한 흰색 티셔츠".to_string(),
    }
}

pub enum RelayReply {
    Value(Value),
    Timeout,
}

/// Relay fake that records every call.
pub struct MockRelay {
    reply: RelayReply,
    pub calls: AtomicUsize,
    pub last_endpoint: Mutex<Option<String>>,
    pub last_payload: Mutex<Option<Value>>,
}

impl MockRelay {
    pub fn new(reply: RelayReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_endpoint: Mutex::new(None),
            last_payload: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Relay for MockRelay {
    async fn invoke(&self, endpoint: &str, payload: &Value) -> AiResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_endpoint.lock().unwrap() = Some(endpoint.to_string());
        *self.last_payload.lock().unwrap() = Some(payload.clone());
        match &self.reply {
            RelayReply::Value(value) => Ok(value.clone()),
            RelayReply::Timeout => Err(AiError::Timeout(Duration::from_secs(60))),
        }
    }
}

/// Direct-model fake with per-operation call counters.
pub struct MockModel {
    analysis: ClothingAnalysisResult,
    recommendation: OutfitRecommendation,
    pub analyze_calls: AtomicUsize,
    pub recommend_calls: AtomicUsize,
}

impl MockModel {
    pub fn new(analysis: ClothingAnalysisResult, recommendation: OutfitRecommendation) -> Self {
        Self {
            analysis,
            recommendation,
            analyze_calls: AtomicUsize::new(0),
            recommend_calls: AtomicUsize::new(0),
        }
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn recommend_calls(&self) -> usize {
        self.recommend_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl VisionModel for MockModel {
    async fn analyze_item(&self, _image: &str) -> AiResult<ClothingAnalysisResult> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.analysis.clone())
    }

    async fn recommend_outfit(
        &self,
        _weather: &WeatherSnapshot,
        _closet: &[ClothingItem],
    ) -> AiResult<OutfitRecommendation> {
        self.recommend_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.recommendation.clone())
    }
}

/// Facade where every operation goes directly to `model`.
pub fn direct_service(model: Arc<MockModel>) -> AiService {
    let relay = Arc::new(MockRelay::new(RelayReply::Value(Value::Null)));
    AiService::new(&RelayEndpoints::default(), relay, Some(model), "Korean")
}

/// Facade where the outfit operation goes through `relay`.
pub fn outfit_relay_service(relay: Arc<MockRelay>) -> AiService {
    let endpoints = RelayEndpoints {
        outfit: Some("https://relay.example/outfit".to_string()),
        ..RelayEndpoints::default()
    };
    AiService::new(&endpoints, relay, None, "Korean")
}

/// Direct model that follows the slot rules against whatever closet it gets.
#[derive(Default)]
pub struct PickingModel;

#[async_trait::async_trait]
impl VisionModel for PickingModel {
    async fn analyze_item(&self, _image: &str) -> AiResult<ClothingAnalysisResult> {
        Ok(analysis())
    }

    async fn recommend_outfit(
        &self,
        weather: &WeatherSnapshot,
        closet: &[ClothingItem],
    ) -> AiResult<OutfitRecommendation> {
        let first = |wanted: &[ClothingCategory]| {
            closet
                .iter()
                .find(|item| wanted.contains(&item.category))
                .map(|item| item.id.clone())
        };

        let top = first(&[ClothingCategory::Top, ClothingCategory::Dress]).unwrap_or_default();
        let top_is_dress = closet
            .iter()
            .any(|item| item.id == top && item.category == ClothingCategory::Dress);
        let bottom = if top_is_dress { None } else { first(&[ClothingCategory::Bottom]) };
        let outerwear = if needs_outerwear(weather) {
            first(&[ClothingCategory::Outerwear])
        } else {
            None
        };

        Ok(OutfitRecommendation {
            top_id: top,
            bottom_id: bottom,
            outerwear_id: outerwear,
            reasoning: "규칙 기반 선택".to_string(),
            style_name: "데일리".to_string(),
            match_score: 0.75,
        })
    }
}

/// `PickingModel` that takes `.0` to answer an outfit request.
pub struct SlowModel(pub Duration);

#[async_trait::async_trait]
impl VisionModel for SlowModel {
    async fn analyze_item(&self, image: &str) -> AiResult<ClothingAnalysisResult> {
        PickingModel.analyze_item(image).await
    }

    async fn recommend_outfit(
        &self,
        weather: &WeatherSnapshot,
        closet: &[ClothingItem],
    ) -> AiResult<OutfitRecommendation> {
        tokio::time::sleep(self.0).await;
        PickingModel.recommend_outfit(weather, closet).await
    }
}
