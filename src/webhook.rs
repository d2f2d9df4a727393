use serde::Deserialize;

use crate::models::{ClothingAnalysisResult, ItemOverrides};

pub const DEFAULT_DIAGNOSTIC_PROMPT: &str = "이 이미지를 분석해서 한글로 설명해줘";

/// Request bodies accepted by the wardrobe API
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub image: String,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub image: String,
    pub analysis: ClothingAnalysisResult,
    #[serde(default)]
    pub overrides: ItemOverrides,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticRequest {
    pub image_url: String,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[cfg(feature = "http-api")]
pub mod server {
    use super::*;
    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::{delete, get, post},
        Json, Router,
    };
    use chrono::{NaiveDate, Utc};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    use crate::handlers::{SessionError, WardrobeSession};
    use crate::services::{AiError, AiService, WeatherProvider};

    pub struct AppState {
        pub session: Mutex<WardrobeSession>,
        pub ai: Arc<AiService>,
        pub weather: Arc<dyn WeatherProvider>,
    }

    impl AppState {
        pub fn new(session: WardrobeSession, ai: Arc<AiService>, weather: Arc<dyn WeatherProvider>) -> Self {
            Self {
                session: Mutex::new(session),
                ai,
                weather,
            }
        }
    }

    #[derive(Debug)]
    pub enum ApiError {
        Session(SessionError),
        BadRequest(String),
        Internal(String),
    }

    impl From<SessionError> for ApiError {
        fn from(e: SessionError) -> Self {
            ApiError::Session(e)
        }
    }

    impl From<AiError> for ApiError {
        fn from(e: AiError) -> Self {
            ApiError::Session(SessionError::Ai(e))
        }
    }

    fn status_for(e: &SessionError) -> StatusCode {
        match e {
            SessionError::Ai(ai) => match ai {
                AiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                AiError::Network(_) | AiError::Relay { .. } | AiError::Model(_) => StatusCode::BAD_GATEWAY,
                AiError::MalformedResponse(_)
                | AiError::Analysis(_)
                | AiError::Recommendation(_)
                | AiError::Reference { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                AiError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            SessionError::NotReady | SessionError::InvalidRating(_) | SessionError::InvalidItem(_) => {
                StatusCode::BAD_REQUEST
            }
            SessionError::Busy | SessionError::Cancelled => StatusCode::CONFLICT,
            SessionError::NoSuggestion | SessionError::UnknownItem(_) | SessionError::UnknownLog(_) => {
                StatusCode::NOT_FOUND
            }
        }
    }

    impl IntoResponse for ApiError {
        fn into_response(self) -> Response {
            let (status, message) = match self {
                ApiError::Session(e) => (status_for(&e), e.to_string()),
                ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
                ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
            };
            if status.is_server_error() {
                log::error!("❌ API error ({}): {}", status, message);
            } else {
                log::warn!("⚠️ API error ({}): {}", status, message);
            }
            (status, Json(json!({ "error": message }))).into_response()
        }
    }

    type ApiResult<T> = Result<T, ApiError>;

    pub fn create_router(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_check))
            .route("/weather", get(current_weather))
            .route("/weather/forecast", get(forecast))
            .route("/closet", get(list_closet).post(add_item))
            .route("/closet/analyze", post(analyze_item))
            .route("/closet/:id", delete(remove_item))
            .route("/closet/:id/wear", post(record_wear))
            .route("/outfit", get(outfit_state))
            .route("/outfit/generate", post(generate_outfit))
            .route("/outfit/confirm", post(confirm_outfit))
            .route("/outfit/reset", post(reset_outfit))
            .route("/logs", get(list_logs))
            .route("/logs/:date/feedback", post(attach_feedback))
            .route("/analytics", get(analytics))
            .route("/diagnostic/analyze-url", post(analyze_image_url))
            .with_state(state)
    }

    async fn root_handler() -> &'static str {
        "Dressify wardrobe API - see /closet, /outfit and /logs"
    }

    async fn health_check() -> &'static str {
        "OK"
    }

    async fn current_weather(State(state): State<Arc<AppState>>) -> impl IntoResponse {
        let weather = state.weather.current_weather().await;
        state.session.lock().await.set_weather(weather.clone());
        Json(weather)
    }

    async fn forecast(State(state): State<Arc<AppState>>) -> impl IntoResponse {
        Json(state.weather.forecast().await)
    }

    async fn list_closet(State(state): State<Arc<AppState>>) -> impl IntoResponse {
        Json(state.session.lock().await.closet().to_vec())
    }

    async fn analyze_item(
        State(state): State<Arc<AppState>>,
        Json(request): Json<AnalyzeRequest>,
    ) -> ApiResult<impl IntoResponse> {
        log::info!("📸 Analyze request ({} chars)", request.image.len());
        let analysis = state.ai.analyze_clothing_image(&request.image).await?;
        Ok(Json(analysis))
    }

    async fn add_item(
        State(state): State<Arc<AppState>>,
        Json(request): Json<AddItemRequest>,
    ) -> ApiResult<impl IntoResponse> {
        let item = state.session.lock().await.add_item(
            request.image,
            request.analysis,
            request.overrides,
            Utc::now(),
        )?;
        Ok((StatusCode::CREATED, Json(item)))
    }

    async fn remove_item(
        State(state): State<Arc<AppState>>,
        Path(id): Path<String>,
    ) -> ApiResult<impl IntoResponse> {
        let removed = state.session.lock().await.remove_item(&id)?;
        Ok(Json(removed))
    }

    async fn record_wear(
        State(state): State<Arc<AppState>>,
        Path(id): Path<String>,
    ) -> ApiResult<impl IntoResponse> {
        let wear_count = state.session.lock().await.record_wear(&id)?;
        Ok(Json(json!({ "id": id, "wearCount": wear_count })))
    }

    async fn outfit_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
        Json(state.session.lock().await.flow().clone())
    }

    /// The session lock is released while the AI call is in flight; the
    /// `Generating` state rejects overlapping requests. The call and its
    /// bookkeeping run on their own task so a dropped request still settles
    /// the flow.
    async fn generate_outfit(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
        let has_weather = state.session.lock().await.weather().is_some();
        if !has_weather {
            let weather = state.weather.current_weather().await;
            state.session.lock().await.set_weather(weather);
        }

        let request = state.session.lock().await.begin_generation()?;
        let task_state = state.clone();
        let generation = tokio::spawn(async move {
            let outcome = task_state
                .ai
                .generate_outfit_suggestion(&request.weather, &request.closet)
                .await;
            task_state.session.lock().await.finish_generation(&request, outcome)
        });

        let suggestion = generation
            .await
            .map_err(|e| ApiError::Internal(format!("outfit generation task failed: {}", e)))??;

        Ok(Json(suggestion))
    }

    async fn confirm_outfit(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
        let log = state.session.lock().await.confirm(Utc::now())?;
        Ok((StatusCode::CREATED, Json(log)))
    }

    async fn reset_outfit(State(state): State<Arc<AppState>>) -> impl IntoResponse {
        let mut session = state.session.lock().await;
        session.reset();
        Json(session.flow().clone())
    }

    async fn list_logs(State(state): State<Arc<AppState>>) -> impl IntoResponse {
        Json(state.session.lock().await.logs().to_vec())
    }

    async fn attach_feedback(
        State(state): State<Arc<AppState>>,
        Path(date): Path<NaiveDate>,
        Json(request): Json<FeedbackRequest>,
    ) -> ApiResult<impl IntoResponse> {
        let mut session = state.session.lock().await;
        let log = session.attach_feedback(date, request.rating, request.comment)?;
        Ok(Json(log.clone()))
    }

    async fn analytics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
        Json(state.session.lock().await.analytics())
    }

    async fn analyze_image_url(
        State(state): State<Arc<AppState>>,
        Json(request): Json<DiagnosticRequest>,
    ) -> ApiResult<impl IntoResponse> {
        if request.image_url.trim().is_empty() {
            return Err(ApiError::BadRequest("imageUrl is required".to_string()));
        }
        let prompt = request
            .prompt
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DIAGNOSTIC_PROMPT.to_string());

        let text = state.ai.analyze_image_url(&request.image_url, &prompt).await?;
        Ok(Json(json!({ "text": text })))
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::services::SimulatedWeather;
        use crate::test_support::{
            analysis, direct_service, outfit_relay_service, recommendation, MockModel, MockRelay,
            PickingModel, RelayReply, SlowModel,
        };
        use std::time::Duration;
        use axum::body::{to_bytes, Body};
        use axum::http::Request;
        use serde_json::Value;
        use tower::ServiceExt;

        fn app(ai: AiService) -> Router {
            let session = WardrobeSession::new(chrono_tz::Asia::Seoul);
            let state = AppState::new(session, Arc::new(ai), Arc::new(SimulatedWeather::default()));
            create_router(Arc::new(state))
        }

        fn direct_app(top: &str, bottom: Option<&str>) -> Router {
            app(direct_service(Arc::new(MockModel::new(
                analysis(),
                recommendation(top, bottom, None),
            ))))
        }

        async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(match body {
                    Some(json) => Body::from(json.to_string()),
                    None => Body::empty(),
                })
                .unwrap();

            let response = app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, json)
        }

        async fn add(app: &Router, category: &str) -> String {
            let mut result = serde_json::to_value(analysis()).unwrap();
            result["category"] = json!(category);
            let (status, item) = call(
                app,
                "POST",
                "/closet",
                Some(json!({ "image": "data:image/jpeg;base64,abc", "analysis": result })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            item["id"].as_str().unwrap().to_string()
        }

        #[tokio::test]
        async fn test_health() {
            let app = direct_app("t1", None);
            let response = app
                .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        #[tokio::test]
        async fn test_upload_generate_confirm_feedback() {
            let analyze_app = direct_app("unused", None);
            let (status, result) = call(
                &analyze_app,
                "POST",
                "/closet/analyze",
                Some(json!({ "image": "data:image/jpeg;base64,abc" })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(result["careInstructions"], "찬물 손세탁");

            let app = app(AiService::new(
                &Default::default(),
                Arc::new(MockRelay::new(RelayReply::Value(Value::Null))),
                Some(Arc::new(PickingModel::default())),
                "Korean",
            ));
            let top = add(&app, "Top").await;
            let bottom = add(&app, "Bottom").await;
            assert_ne!(top, bottom);

            let (status, suggestion) = call(&app, "POST", "/outfit/generate", None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(suggestion["selection"]["top"]["id"], top.as_str());
            assert_eq!(suggestion["selection"]["bottom"]["id"], bottom.as_str());
            assert_eq!(suggestion["violations"], json!([]));

            let (status, log) = call(&app, "POST", "/outfit/confirm", None).await;
            assert_eq!(status, StatusCode::CREATED);
            let date = log["date"].as_str().unwrap().to_string();

            let (status, _) = call(
                &app,
                "POST",
                &format!("/logs/{}/feedback", date),
                Some(json!({ "rating": 9 })),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);

            let (status, rated) = call(
                &app,
                "POST",
                &format!("/logs/{}/feedback", date),
                Some(json!({ "rating": 5, "comment": "딱 좋았음" })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(rated["feedback"]["rating"], 5);

            let (_, stats) = call(&app, "GET", "/analytics", None).await;
            assert_eq!(stats["total_items"], 2);
            assert_eq!(stats["items_by_category"][0]["label"], "상의");
            assert_eq!(stats["items_by_category"][0]["count"], 1);
            assert_eq!(stats["avg_rating"], 5.0);
        }

        #[tokio::test]
        async fn test_generate_with_empty_closet_is_rejected() {
            let app = direct_app("t1", None);

            let (status, body) = call(&app, "POST", "/outfit/generate", None).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"].as_str().unwrap().contains("at least one closet item"));
        }

        #[tokio::test]
        async fn test_relay_timeout_maps_to_gateway_timeout() {
            let app = app(outfit_relay_service(Arc::new(MockRelay::new(RelayReply::Timeout))));
            add(&app, "Top").await;

            let (status, _) = call(&app, "POST", "/outfit/generate", None).await;
            assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);

            let (_, flow) = call(&app, "GET", "/outfit", None).await;
            assert_eq!(flow, json!({ "state": "idle" }));
            let (_, logs) = call(&app, "GET", "/logs", None).await;
            assert_eq!(logs, json!([]));
        }

        #[tokio::test]
        async fn test_abandoned_generate_still_settles_flow() {
            let app = app(AiService::new(
                &Default::default(),
                Arc::new(MockRelay::new(RelayReply::Value(Value::Null))),
                Some(Arc::new(SlowModel(Duration::from_millis(300)))),
                "Korean",
            ));
            add(&app, "Top").await;

            let abandoned =
                tokio::time::timeout(Duration::from_millis(50), call(&app, "POST", "/outfit/generate", None)).await;
            assert!(abandoned.is_err());

            tokio::time::sleep(Duration::from_millis(500)).await;
            let (_, flow) = call(&app, "GET", "/outfit", None).await;
            assert_eq!(flow["state"], "suggested");

            let (status, _) = call(&app, "POST", "/outfit/generate", None).await;
            assert_eq!(status, StatusCode::OK);
        }

        #[tokio::test]
        async fn test_add_item_without_season_is_rejected() {
            let app = direct_app("t1", None);
            let mut result = serde_json::to_value(analysis()).unwrap();
            result["season"] = json!(["monsoon"]);

            let (status, body) = call(
                &app,
                "POST",
                "/closet",
                Some(json!({ "image": "data:image/jpeg;base64,abc", "analysis": result })),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"].as_str().unwrap().contains("season"));
            let (_, closet) = call(&app, "GET", "/closet", None).await;
            assert_eq!(closet, json!([]));
        }

        #[tokio::test]
        async fn test_dangling_reference_is_unprocessable() {
            let app = direct_app("ghost", Some("ghost-bottom"));
            add(&app, "Top").await;

            let (status, body) = call(&app, "POST", "/outfit/generate", None).await;

            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert!(body["error"].as_str().unwrap().contains("no matching item"));
        }

        #[tokio::test]
        async fn test_unknown_item_and_diagnostic_without_relay() {
            let app = direct_app("t1", None);

            let (status, _) = call(&app, "DELETE", "/closet/nope", None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);

            let (status, _) = call(
                &app,
                "POST",
                "/diagnostic/analyze-url",
                Some(json!({ "imageUrl": "https://images.example/a.jpg" })),
            )
            .await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

            let (status, _) = call(&app, "POST", "/diagnostic/analyze-url", Some(json!({ "imageUrl": " " }))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }

        #[tokio::test]
        async fn test_weather_is_stored_on_session() {
            let app = direct_app("t1", None);

            let (status, weather) = call(&app, "GET", "/weather", None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(weather["condition"], "Sunny");

            let (_, forecast) = call(&app, "GET", "/weather/forecast", None).await;
            assert_eq!(forecast.as_array().unwrap().len(), 5);
        }
    }
}
