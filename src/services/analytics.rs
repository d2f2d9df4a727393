use serde::{Deserialize, Serialize};

use crate::models::{ClothingCategory, ClothingItem, DailyLog};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MostWorn {
    pub item_id: String,
    pub category: ClothingCategory,
    pub wear_count: u32,
}

/// Item count for one category, with the label the closet view shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryCount {
    pub category: ClothingCategory,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WardrobeStats {
    pub total_items: usize,
    /// Every category in display order, empty ones included.
    pub items_by_category: Vec<CategoryCount>,
    pub total_wears: u64,
    pub most_worn: Option<MostWorn>,
    pub logged_days: usize,
    pub rated_days: usize,
    pub avg_rating: Option<f64>,
}

/// Closet and calendar statistics for the analytics view.
pub fn wardrobe_stats(closet: &[ClothingItem], logs: &[DailyLog]) -> WardrobeStats {
    let items_by_category = ClothingCategory::ALL
        .iter()
        .map(|&category| CategoryCount {
            category,
            label: category.label().to_string(),
            count: closet.iter().filter(|item| item.category == category).count(),
        })
        .collect();

    let most_worn = closet
        .iter()
        .filter(|item| item.wear_count > 0)
        .max_by_key(|item| item.wear_count)
        .map(|item| MostWorn {
            item_id: item.id.clone(),
            category: item.category,
            wear_count: item.wear_count,
        });

    let ratings: Vec<u8> = logs
        .iter()
        .filter_map(|log| log.feedback.as_ref().map(|f| f.rating))
        .collect();
    let avg_rating = if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().map(|&r| r as f64).sum::<f64>() / ratings.len() as f64)
    };

    let mut days: Vec<_> = logs.iter().map(|log| log.date).collect();
    days.sort();
    days.dedup();

    WardrobeStats {
        total_items: closet.len(),
        items_by_category,
        total_wears: closet.iter().map(|item| item.wear_count as u64).sum(),
        most_worn,
        logged_days: days.len(),
        rated_days: ratings.len(),
        avg_rating,
    }
}
