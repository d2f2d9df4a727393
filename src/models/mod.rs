use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ClothingCategory {
    Top,
    Bottom,
    Outerwear,
    Shoes,
    Accessory,
    Dress,
    Other,
}

impl ClothingCategory {
    pub const ALL: [ClothingCategory; 7] = [
        ClothingCategory::Top,
        ClothingCategory::Bottom,
        ClothingCategory::Outerwear,
        ClothingCategory::Shoes,
        ClothingCategory::Accessory,
        ClothingCategory::Dress,
        ClothingCategory::Other,
    ];

    /// Lenient parse used for model output: unknown labels become `Other`.
    pub fn from_string(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "top" | "tops" | "shirt" | "상의" => ClothingCategory::Top,
            "bottom" | "bottoms" | "pants" | "하의" => ClothingCategory::Bottom,
            "outerwear" | "outer" | "jacket" | "coat" | "아우터" => ClothingCategory::Outerwear,
            "shoes" | "shoe" | "footwear" | "신발" => ClothingCategory::Shoes,
            "accessory" | "accessories" | "액세서리" => ClothingCategory::Accessory,
            "dress" | "one-piece" | "원피스" => ClothingCategory::Dress,
            _ => ClothingCategory::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClothingCategory::Top => "Top",
            ClothingCategory::Bottom => "Bottom",
            ClothingCategory::Outerwear => "Outerwear",
            ClothingCategory::Shoes => "Shoes",
            ClothingCategory::Accessory => "Accessory",
            ClothingCategory::Dress => "Dress",
            ClothingCategory::Other => "Other",
        }
    }

    /// Korean label shown to users
    pub fn label(&self) -> &'static str {
        match self {
            ClothingCategory::Top => "상의",
            ClothingCategory::Bottom => "하의",
            ClothingCategory::Outerwear => "아우터",
            ClothingCategory::Shoes => "신발",
            ClothingCategory::Accessory => "액세서리",
            ClothingCategory::Dress => "원피스",
            ClothingCategory::Other => "기타",
        }
    }
}

impl std::fmt::Display for ClothingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<'de> Deserialize<'de> for ClothingCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ClothingCategory::from_string(&raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "spring" | "봄" => Some(Season::Spring),
            "summer" | "여름" => Some(Season::Summer),
            "autumn" | "fall" | "가을" => Some(Season::Autumn),
            "winter" | "겨울" => Some(Season::Winter),
            _ => None,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
        };
        write!(f, "{}", s)
    }
}

/// Drops season labels the model invents instead of failing the whole result.
fn lenient_seasons<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Season>, D::Error> {
    let raw = Vec::<String>::deserialize(deserializer)?;
    let mut seasons = Vec::new();
    for label in raw {
        match Season::from_string(&label) {
            Some(season) if !seasons.contains(&season) => seasons.push(season),
            Some(_) => {}
            None => log::warn!("⚠️ Ignoring unknown season label: {}", label),
        }
    }
    Ok(seasons)
}

/// Treats `null`, a missing key and `""` the same way for optional item ids.
fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|id| {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClothingItem {
    pub id: String,
    pub image_url: String, // data URI or remote URL
    pub category: ClothingCategory,
    pub color: String,
    pub season: Vec<Season>,
    pub material: Option<String>,
    pub care_instructions: Option<String>,
    pub wear_count: u32,
    pub brand: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
    Windy,
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WeatherCondition::Sunny => "Sunny",
            WeatherCondition::Cloudy => "Cloudy",
            WeatherCondition::Rainy => "Rainy",
            WeatherCondition::Snowy => "Snowy",
            WeatherCondition::Windy => "Windy",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub temperature: f64, // Celsius
    pub temp_high: f64,
    pub temp_low: f64,
    pub precip_chance: u8, // percent
    pub wind_speed: f64,   // km/h
    pub humidity: u8,
    pub uv_index: u8,
    pub condition: WeatherCondition,
    pub description: String,
    pub location: String,
}

/// Item ids picked by the recommender. Ids are only references until
/// resolved against the closet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutfitRecommendation {
    pub top_id: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub bottom_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub outerwear_id: Option<String>,
    pub reasoning: String,
    pub style_name: String,
    pub match_score: f64,
}

/// A recommendation whose ids were all found in the closet.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutfitSelection {
    pub top: ClothingItem,
    pub bottom: Option<ClothingItem>,
    pub outerwear: Option<ClothingItem>,
    pub reasoning: String,
    pub style_name: String,
    pub match_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggedOutfit {
    pub top: ClothingItem,
    pub bottom: Option<ClothingItem>,
    pub outerwear: Option<ClothingItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feedback {
    pub rating: u8, // 0-5
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyLog {
    pub date: NaiveDate,
    pub weather: WeatherSnapshot,
    pub outfit: LoggedOutfit,
    pub feedback: Option<Feedback>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClothingAnalysisResult {
    pub category: ClothingCategory,
    pub color: String,
    #[serde(deserialize_with = "lenient_seasons")]
    pub season: Vec<Season>,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub care_instructions: String,
    #[serde(default)]
    pub description: String,
}

/// Values the user typed over the analysis before saving the item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOverrides {
    pub category: Option<ClothingCategory>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub care_instructions: Option<String>,
    pub brand: Option<String>,
}
