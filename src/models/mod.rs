mod catalog;
mod meal;
mod nutrition;
mod recipe;
mod weather;

pub use catalog::{
    ApiCategory, Category, CategoryIndex, CategoryLevel, ScoredCandidate, TaxonomyPayload,
};
pub use meal::{DailySummary, LogMealRequest, LogMealResponse, MealLog};
pub use nutrition::{EstimateRequest, NutritionEstimate};
pub use recipe::{ApiRecipe, RecipeRecord, RecipeSuggestion, SuggestionResponse};
pub use weather::{ApiDailySeries, ApiForecast, WeatherDay, WeeklyWeather};

use serde::{Deserialize, Deserializer};

/// The catalog serves identifiers sometimes as JSON strings, sometimes as
/// numbers; both decode into the opaque string id used everywhere else.
pub(crate) fn de_opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

pub(crate) fn de_opt_opaque_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}
