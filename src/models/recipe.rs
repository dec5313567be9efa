use serde::{Deserialize, Serialize};

use super::NutritionEstimate;

/// A recipe entry as the ranking endpoint returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecipe {
    #[serde(deserialize_with = "crate::models::de_opaque_id")]
    pub recipe_id: String,
    pub recipe_title: String,
    #[serde(default)]
    pub recipe_url: Option<String>,
    #[serde(default)]
    pub food_image_url: Option<String>,
    #[serde(default)]
    pub recipe_material: Vec<String>,
    #[serde(default)]
    pub recipe_cost: Option<String>,
    #[serde(default)]
    pub recipe_indication: Option<String>,
}

/// A normalized recipe, tagged with the resolution context that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub ingredients: Vec<String>,
    pub cost: Option<String>,
    /// Indication of effort, usually a preparation time like "約30分".
    pub indication: Option<String>,
    /// The category id actually used for the fetch that returned this recipe.
    pub category_id: String,
    pub genre: String,
    pub keyword: Option<String>,
}

impl RecipeRecord {
    pub fn from_api(
        api: ApiRecipe,
        category_id: &str,
        genre: &str,
        keyword: Option<&str>,
    ) -> Self {
        Self {
            id: api.recipe_id,
            name: api.recipe_title,
            url: api.recipe_url,
            image_url: api.food_image_url,
            ingredients: api.recipe_material,
            cost: api.recipe_cost,
            indication: api.recipe_indication,
            category_id: category_id.to_string(),
            genre: genre.to_string(),
            keyword: keyword.map(str::to_string),
        }
    }
}

/// One suggested recipe with its enrichment results.
#[derive(Debug, Serialize)]
pub struct RecipeSuggestion {
    pub recipe: RecipeRecord,
    pub nutrition: Option<NutritionEstimate>,
    pub cheer: Option<String>,
}

/// Response body for the suggestion endpoint.
#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub genre: String,
    pub season: String,
    pub feel: String,
    pub consumed_kcal: f64,
    pub remaining_kcal: f64,
    pub recipes: Vec<RecipeSuggestion>,
}
