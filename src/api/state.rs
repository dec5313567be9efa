use std::sync::Arc;

use crate::config::Config;
use crate::db::MealLogStore;
use crate::services::catalog::{
    RecipeFetcher, ReqwestTransport, ResilientClient, RetryPolicy, TaxonomyCache,
};
use crate::services::nutrition::{NutritionEstimator, OpenAiAdvisor};
use crate::services::weather::WeatherService;

/// Shared application state
///
/// Every component is an explicit, constructible object handed in by
/// reference; tests assemble the same state around mock collaborators.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<RecipeFetcher>,
    pub estimator: Arc<dyn NutritionEstimator>,
    pub weather: Arc<WeatherService>,
    pub meal_log: Arc<MealLogStore>,
    pub rakuten_application_id: String,
    pub target_kcal: u32,
}

impl AppState {
    /// Assembles state from already-built components.
    pub fn new(
        fetcher: Arc<RecipeFetcher>,
        estimator: Arc<dyn NutritionEstimator>,
        weather: Arc<WeatherService>,
        meal_log: Arc<MealLogStore>,
        rakuten_application_id: String,
        target_kcal: u32,
    ) -> Self {
        Self {
            fetcher,
            estimator,
            weather,
            meal_log,
            rakuten_application_id,
            target_kcal,
        }
    }

    /// Wires the production components from configuration.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = Arc::new(ResilientClient::new(
            Arc::new(ReqwestTransport::new()),
            RetryPolicy::default(),
        ));
        let taxonomy = Arc::new(TaxonomyCache::new(
            client.clone(),
            config.category_list_url(),
        ));
        let fetcher = Arc::new(RecipeFetcher::new(
            client,
            taxonomy,
            config.category_ranking_url(),
        ));
        let estimator: Arc<dyn NutritionEstimator> = Arc::new(OpenAiAdvisor::new(
            config.openai_api_key.clone(),
            config.openai_api_url.clone(),
            config.openai_model.clone(),
        ));
        let weather = Arc::new(WeatherService::new(config.weather_api_url.clone()));
        let meal_log = Arc::new(MealLogStore::open(&config.sqlite_path).await?);

        Ok(Self::new(
            fetcher,
            estimator,
            weather,
            meal_log,
            config.rakuten_application_id.clone(),
            config.target_kcal,
        ))
    }
}
