// 💡 Recommendation Engine - threshold rules over category totals
// Each rule is evaluated independently; the fallback only fires when none match

use crate::config::Thresholds;
use crate::models::CategoryTotals;
use serde::{Deserialize, Serialize};

// ============================================================================
// RECOMMENDATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Which part of the footprint a recommendation is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    Transport,
    Food,
    Housing,
    Overall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Display label, e.g. "🚗 Transport"
    pub category: String,
    pub area: Area,
    pub priority: Priority,
    pub suggestion: String,
    pub actions: Vec<String>,
    pub impact: String,
}

impl Recommendation {
    fn new(
        category: &str,
        area: Area,
        priority: Priority,
        suggestion: &str,
        actions: &[&str],
        impact: &str,
    ) -> Self {
        Recommendation {
            category: category.to_string(),
            area,
            priority,
            suggestion: suggestion.to_string(),
            actions: actions.iter().map(|a| a.to_string()).collect(),
            impact: impact.to_string(),
        }
    }
}

fn transport_advice() -> Recommendation {
    Recommendation::new(
        "🚗 Transport",
        Area::Transport,
        Priority::High,
        "Your transport generates a lot of emissions",
        &[
            "Use public transport",
            "Carpool to work",
            "Consider a bike or an e-bike",
        ],
        "Possible reduction: -40% of your emissions",
    )
}

fn food_advice() -> Recommendation {
    Recommendation::new(
        "🍖 Food",
        Area::Food,
        Priority::Medium,
        "Your meat consumption is high",
        &[
            "Cut down on red meat (the most polluting)",
            "Try plant-based alternatives 2-3 times a week",
            "Favor local and seasonal products",
        ],
        "Possible reduction: -30% of your emissions",
    )
}

fn housing_advice() -> Recommendation {
    Recommendation::new(
        "🏠 Housing",
        Area::Housing,
        Priority::Medium,
        "Your home uses a lot of energy",
        &[
            "Improve your home's insulation",
            "Use LED bulbs",
            "Lowering the thermostat by 1°C cuts consumption by 7%",
        ],
        "Possible reduction: -25% of your emissions",
    )
}

fn congratulations() -> Recommendation {
    Recommendation::new(
        "🌟 Well done!",
        Area::Overall,
        Priority::Low,
        "Your footprint is low, keep it up!",
        &[
            "You are an environmental role model",
            "Share your good habits with people around you",
        ],
        "Inspire others positively",
    )
}

// ============================================================================
// ENGINE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    thresholds: Thresholds,
}

impl RecommendationEngine {
    pub fn new(thresholds: Thresholds) -> Self {
        RecommendationEngine { thresholds }
    }

    /// Ordered advice: transport, food, housing, then the fallback if empty
    pub fn recommend(&self, totals: &CategoryTotals) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        if totals.transport > self.thresholds.transport {
            recommendations.push(transport_advice());
        }

        if totals.food > self.thresholds.food {
            recommendations.push(food_advice());
        }

        if totals.habitat > self.thresholds.habitat {
            recommendations.push(housing_advice());
        }

        if recommendations.is_empty() {
            recommendations.push(congratulations());
        }

        recommendations
    }
}
