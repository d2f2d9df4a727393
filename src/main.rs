mod config;
mod handlers;
mod models;
mod services;
#[cfg(test)]
mod test_support;
mod webhook; // wardrobe HTTP API

#[cfg(feature = "http-api")]
use webhook::server::{create_router, AppState};

use anyhow::Result;
use dotenv::dotenv;
use std::env;
use std::path::Path;
use std::sync::Arc;

use config::Config;
use handlers::WardrobeSession;
use services::{AiService, GeminiClient, RelayClient, SimulatedWeather, VisionModel, WeatherProvider};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    log::info!("🚀 Starting Dressify wardrobe service...");

    let config = Config::from_env()?;

    let model: Option<Arc<dyn VisionModel>> = match config.gemini_api_key.clone() {
        Some(api_key) => {
            log::info!("✅ Gemini client initialized with model: {}", config.gemini_model);
            Some(Arc::new(GeminiClient::new(
                api_key,
                config.gemini_model.clone(),
                config.gemini_base_url.clone(),
                config.response_language.clone(),
            )) as Arc<dyn VisionModel>)
        }
        None if config.needs_direct_model() => {
            anyhow::bail!("GEMINI_API_KEY must be set unless both ANALYZE_IMAGE_WEBHOOK_URL and OUTFIT_WEBHOOK_URL are configured");
        }
        None => {
            log::info!("ℹ️ GEMINI_API_KEY not set, every operation goes through a relay");
            None
        }
    };

    let relay = Arc::new(RelayClient::new(config.relay_timeout));
    log::info!("✅ Relay client initialized (timeout {:?})", config.relay_timeout);

    let ai = Arc::new(AiService::new(
        &config.endpoints,
        relay,
        model,
        &config.response_language,
    ));

    let args: Vec<String> = env::args().collect();
    if args.get(1).map(String::as_str) == Some("analyze") {
        let Some(path) = args.get(2) else {
            anyhow::bail!("usage: dressify analyze <image-path>");
        };
        let image = services::image::load_data_uri(Path::new(path))?;
        let analysis = ai.analyze_clothing_image(&image).await?;
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    let weather: Arc<dyn WeatherProvider> = Arc::new(SimulatedWeather::new(config.weather_location.clone()));
    let mut session = WardrobeSession::new(config.timezone);
    session.set_weather(weather.current_weather().await);
    log::info!("✅ Session ready (timezone {})", config.timezone);

    #[cfg(feature = "http-api")]
    {
        let state = Arc::new(AppState::new(session, ai.clone(), weather.clone()));
        let app = create_router(state);
        let bind_addr = config.bind_addr.clone();

        log::info!("🌐 Wardrobe API starting on {}", bind_addr);

        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("❌ Wardrobe API stopped: {}", e);
            }
        });

        log::info!("✅ Wardrobe API started");
    }

    #[cfg(not(feature = "http-api"))]
    {
        let _ = session;
        log::warn!("⚠️ Built without the http-api feature, nothing to serve");
    }

    log::info!("🎉 Dressify is ready!");

    println!("\n👗 Dressify is running!");
    println!("🌐 API: http://{}", config.bind_addr);
    println!("   POST /closet/analyze  - analyze a clothing photo");
    println!("   POST /outfit/generate - today's outfit");
    println!("   POST /outfit/confirm  - save it to the calendar");
    println!("\n🛑 Stop with Ctrl+C\n");

    tokio::signal::ctrl_c().await?;

    log::info!("🛑 Shutting down...");

    Ok(())
}
