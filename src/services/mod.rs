pub mod ai_service; // relay-or-direct facade
pub mod analytics;
pub mod error;
pub mod gemini; // direct Gemini client
pub mod image;
pub mod outfit; // outfit selection contract
pub mod prompts;
pub mod relay; // n8n-style webhook relay
pub mod weather;

pub use ai_service::AiService;
pub use error::AiError;
pub use gemini::{GeminiClient, VisionModel};
pub use relay::RelayClient;
pub use weather::{SimulatedWeather, WeatherProvider};
