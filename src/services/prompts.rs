use crate::models::{ClothingItem, WeatherSnapshot};
use crate::services::outfit::OUTERWEAR_THRESHOLD_C;

pub const ANALYSIS_KEYS: &str = "category,color,season,material,careInstructions,description";
pub const OUTFIT_KEYS: &str =
    "topId, bottomId (nullable), outerwearId (nullable), reasoning, styleName, matchScore";

pub fn analysis_instruction(language: &str) -> String {
    format!(
        "Analyze this clothing item. Identify the category (Top, Bottom, Outerwear, Shoes, Dress, Accessory), \
         dominant color, suitable seasons (Summer, Winter, Spring, Autumn). \
         Estimate the material composition (e.g., '100% Cotton') and provide short standard care instructions \
         (e.g., 'Machine wash cold'). Write a 1-sentence description. \
         IMPORTANT: Provide 'material', 'careInstructions', and 'description' in {}.",
        language
    )
}

/// Relay workflows get no response schema, so the keys are spelled out.
pub fn relay_analysis_instruction(language: &str) -> String {
    format!("{} Return JSON keys: {}.", analysis_instruction(language), ANALYSIS_KEYS)
}

/// One line per item: `- ID: .., Type: .., Color: .., Season: a/b, Material: ..`
pub fn closet_manifest(closet: &[ClothingItem]) -> String {
    closet
        .iter()
        .map(|item| {
            let seasons = item
                .season
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join("/");
            format!(
                "- ID: {}, Type: {}, Color: {}, Season: {}, Material: {}",
                item.id,
                item.category,
                item.color,
                seasons,
                item.material.as_deref().unwrap_or("Unknown")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn weather_context(weather: &WeatherSnapshot) -> String {
    format!(
        "Temperature: {}°C, Condition: {}, Humidity: {}%, UV: {}. Description: {}",
        weather.temperature, weather.condition, weather.humidity, weather.uv_index, weather.description
    )
}

pub fn outfit_instruction(weather: &WeatherSnapshot, closet: &[ClothingItem], language: &str) -> String {
    format!(
        "Context:\n\
         You are a professional fashion stylist AI.\n\
         \n\
         Task:\n\
         Create ONE perfect outfit recommendation from the user's closet for today's weather.\n\
         You MUST separate the outfit into Top, Bottom, and Outerwear.\n\
         \n\
         Weather:\n\
         {weather}\n\
         \n\
         Closet Inventory:\n\
         {manifest}\n\
         \n\
         Rules:\n\
         1. Select exactly one item for 'top' (Type: Top or Dress).\n\
         2. Select one item for 'bottom' (Type: Bottom). If 'top' is a Dress, 'bottom' can be null.\n\
         3. Select 'outerwear' ONLY if the temperature is below {threshold}°C or if it is Windy/Rainy. \
         Otherwise, return null for outerwear.\n\
         4. Ensure colors match and styles coordinate.\n\
         5. Return the IDs of the selected items. Only use IDs listed in the Closet Inventory.\n\
         6. IMPORTANT: Provide 'reasoning' and 'styleName' in {language}.",
        weather = weather_context(weather),
        manifest = closet_manifest(closet),
        threshold = OUTERWEAR_THRESHOLD_C,
        language = language,
    )
}

pub fn relay_outfit_instruction(weather: &WeatherSnapshot, closet: &[ClothingItem], language: &str) -> String {
    format!(
        "{}\n\nReturn JSON keys: {}",
        outfit_instruction(weather, closet, language),
        OUTFIT_KEYS
    )
}
