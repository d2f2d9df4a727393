//! Rules an outfit recommendation must satisfy.
//!
//! The recommender is told these rules in its instruction; nothing here
//! corrects its answer. [`resolve`] rejects dangling ids, [`violations`]
//! reports slot rules the answer broke.

use serde::Serialize;

use crate::models::{
    ClothingCategory, ClothingItem, OutfitRecommendation, OutfitSelection, WeatherCondition,
    WeatherSnapshot,
};
use crate::services::error::{AiError, AiResult};

/// Below this temperature outerwear is expected.
pub const OUTERWEAR_THRESHOLD_C: f64 = 20.0;

pub fn needs_outerwear(weather: &WeatherSnapshot) -> bool {
    weather.temperature < OUTERWEAR_THRESHOLD_C
        || matches!(weather.condition, WeatherCondition::Windy | WeatherCondition::Rainy)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContractViolation {
    UnknownItem { slot: &'static str, id: String },
    TopWrongCategory { id: String, category: ClothingCategory },
    MissingBottom,
    BottomWrongCategory { id: String, category: ClothingCategory },
    OuterwearWrongCategory { id: String, category: ClothingCategory },
    UnexpectedOuterwear { id: String },
}

impl std::fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractViolation::UnknownItem { slot, id } => {
                write!(f, "{} id '{}' is not in the closet", slot, id)
            }
            ContractViolation::TopWrongCategory { id, category } => {
                write!(f, "top '{}' is a {}, expected Top or Dress", id, category)
            }
            ContractViolation::MissingBottom => write!(f, "bottom is empty but top is not a Dress"),
            ContractViolation::BottomWrongCategory { id, category } => {
                write!(f, "bottom '{}' is a {}, expected Bottom", id, category)
            }
            ContractViolation::OuterwearWrongCategory { id, category } => {
                write!(f, "outerwear '{}' is a {}, expected Outerwear", id, category)
            }
            ContractViolation::UnexpectedOuterwear { id } => {
                write!(f, "outerwear '{}' chosen for warm, calm weather", id)
            }
        }
    }
}

fn find<'a>(closet: &'a [ClothingItem], slot: &'static str, id: &str) -> AiResult<&'a ClothingItem> {
    closet.iter().find(|item| item.id == id).ok_or_else(|| AiError::Reference {
        slot,
        id: id.to_string(),
    })
}

/// Looks up every referenced id. A dangling id fails the whole
/// recommendation; nothing is substituted.
pub fn resolve(rec: &OutfitRecommendation, closet: &[ClothingItem]) -> AiResult<OutfitSelection> {
    let top = find(closet, "top", &rec.top_id)?.clone();
    let bottom = match rec.bottom_id.as_deref() {
        Some(id) => Some(find(closet, "bottom", id)?.clone()),
        None => None,
    };
    let outerwear = match rec.outerwear_id.as_deref() {
        Some(id) => Some(find(closet, "outerwear", id)?.clone()),
        None => None,
    };

    Ok(OutfitSelection {
        top,
        bottom,
        outerwear,
        reasoning: rec.reasoning.clone(),
        style_name: rec.style_name.clone(),
        match_score: rec.match_score,
    })
}

/// Every slot rule `rec` breaks for this weather and closet. Empty means the
/// recommendation satisfies the contract.
pub fn violations(
    rec: &OutfitRecommendation,
    weather: &WeatherSnapshot,
    closet: &[ClothingItem],
) -> Vec<ContractViolation> {
    let lookup = |id: &str| closet.iter().find(|item| item.id == id);
    let mut found = Vec::new();

    let top = lookup(&rec.top_id);
    match top {
        None => found.push(ContractViolation::UnknownItem {
            slot: "top",
            id: rec.top_id.clone(),
        }),
        Some(item) if !matches!(item.category, ClothingCategory::Top | ClothingCategory::Dress) => {
            found.push(ContractViolation::TopWrongCategory {
                id: item.id.clone(),
                category: item.category,
            })
        }
        Some(_) => {}
    }

    match rec.bottom_id.as_deref() {
        None => {
            let top_is_dress = top.map_or(false, |item| item.category == ClothingCategory::Dress);
            if !top_is_dress {
                found.push(ContractViolation::MissingBottom);
            }
        }
        Some(id) => match lookup(id) {
            None => found.push(ContractViolation::UnknownItem {
                slot: "bottom",
                id: id.to_string(),
            }),
            Some(item) if item.category != ClothingCategory::Bottom => {
                found.push(ContractViolation::BottomWrongCategory {
                    id: item.id.clone(),
                    category: item.category,
                })
            }
            Some(_) => {}
        },
    }

    if let Some(id) = rec.outerwear_id.as_deref() {
        if !needs_outerwear(weather) {
            found.push(ContractViolation::UnexpectedOuterwear { id: id.to_string() });
        }
        match lookup(id) {
            None => found.push(ContractViolation::UnknownItem {
                slot: "outerwear",
                id: id.to_string(),
            }),
            Some(item) if item.category != ClothingCategory::Outerwear => {
                found.push(ContractViolation::OuterwearWrongCategory {
                    id: item.id.clone(),
                    category: item.category,
                })
            }
            Some(_) => {}
        }
    }

    found
}
