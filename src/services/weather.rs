use crate::models::{WeatherCondition, WeatherSnapshot};

/// Source of weather for the outfit flow. Treated as always succeeding.
#[async_trait::async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(&self) -> WeatherSnapshot;
    /// Five daily snapshots starting today.
    async fn forecast(&self) -> Vec<WeatherSnapshot>;
}

/// Fixed Seoul weather used until a real forecast API is wired in.
pub struct SimulatedWeather {
    location: String,
}

impl SimulatedWeather {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    fn day(&self, reading: &Reading) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature: reading.temperature,
            temp_high: reading.high,
            temp_low: reading.low,
            precip_chance: reading.precip_chance,
            wind_speed: reading.wind_speed,
            humidity: reading.humidity,
            uv_index: reading.uv_index,
            condition: reading.condition,
            description: String::new(),
            location: self.location.clone(),
        }
    }
}

struct Reading {
    temperature: f64,
    high: f64,
    low: f64,
    condition: WeatherCondition,
    humidity: u8,
    uv_index: u8,
    precip_chance: u8,
    wind_speed: f64,
}

const TODAY: Reading = Reading {
    temperature: 22.0,
    high: 25.0,
    low: 18.0,
    condition: WeatherCondition::Sunny,
    humidity: 45,
    uv_index: 6,
    precip_chance: 5,
    wind_speed: 5.0,
};

const FORECAST: [Reading; 5] = [
    Reading { temperature: 22.0, high: 25.0, low: 18.0, condition: WeatherCondition::Sunny, humidity: 45, uv_index: 6, precip_chance: 0, wind_speed: 5.0 },
    Reading { temperature: 19.0, high: 21.0, low: 16.0, condition: WeatherCondition::Cloudy, humidity: 60, uv_index: 3, precip_chance: 20, wind_speed: 10.0 },
    Reading { temperature: 18.0, high: 19.0, low: 15.0, condition: WeatherCondition::Rainy, humidity: 80, uv_index: 1, precip_chance: 80, wind_speed: 15.0 },
    Reading { temperature: 24.0, high: 27.0, low: 20.0, condition: WeatherCondition::Sunny, humidity: 40, uv_index: 7, precip_chance: 0, wind_speed: 4.0 },
    Reading { temperature: 21.0, high: 23.0, low: 17.0, condition: WeatherCondition::Windy, humidity: 50, uv_index: 5, precip_chance: 10, wind_speed: 25.0 },
];

impl Default for SimulatedWeather {
    fn default() -> Self {
        Self::new("Seoul, KR")
    }
}

#[async_trait::async_trait]
impl WeatherProvider for SimulatedWeather {
    async fn current_weather(&self) -> WeatherSnapshot {
        log::debug!("🌤️ Serving simulated weather for {}", self.location);
        let mut today = self.day(&TODAY);
        today.description = "구름이 조금 있는 맑은 날씨입니다. 가벼운 옷차림이 좋습니다.".to_string();
        today
    }

    async fn forecast(&self) -> Vec<WeatherSnapshot> {
        FORECAST.iter().map(|reading| self.day(reading)).collect()
    }
}
