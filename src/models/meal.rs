use serde::{Deserialize, Serialize};

/// A persisted meal log row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MealLog {
    pub id: i64,
    pub ts: String,
    pub date: String,
    pub meal_type: String,
    pub name: String,
    pub kcal: f64,
}

/// Request body for logging a consumed meal.
#[derive(Debug, Deserialize)]
pub struct LogMealRequest {
    /// One of 朝 / 昼 / 晩.
    pub meal_type: String,
    pub name: String,
    pub kcal: f64,
}

#[derive(Debug, Serialize)]
pub struct LogMealResponse {
    pub id: i64,
}

/// Consumed vs. remaining calories for one day.
#[derive(Debug, Serialize)]
pub struct DailySummary {
    pub date: String,
    pub target_kcal: u32,
    pub consumed_kcal: f64,
    pub remaining_kcal: f64,
}
