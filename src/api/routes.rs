use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Recipe suggestions
        .route("/recipes/suggestions", get(handlers::suggest_recipes))
        // Meal log
        .route("/meals", post(handlers::log_meal))
        .route("/meals/today", get(handlers::today_summary))
        // Weather context
        .route("/weather/:city", get(handlers::city_weather))
        .with_state(state)
}
