use serde::{Deserialize, Serialize};

/// Estimated calories and macronutrients for one serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionEstimate {
    pub kcal: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carb_g: f64,
}

/// Inputs to a single estimation call.
#[derive(Debug, Clone)]
pub struct EstimateRequest {
    pub recipe_name: String,
    pub ingredients: Vec<String>,
    pub method: String,
    pub difficulty: String,
    pub budget_jpy: u32,
    pub season: String,
    pub feel: String,
}
