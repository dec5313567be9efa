use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use serde::Deserialize;

use crate::db::remaining_kcal;
use crate::error::{AppError, AppResult};
use crate::models::{
    DailySummary, LogMealRequest, LogMealResponse, RecipeSuggestion, SuggestionResponse,
    WeeklyWeather,
};
use crate::services::nutrition::{estimate_for_recipes, EnrichmentContext};
use crate::services::weather::{current_season, DEFAULT_CITY, NEUTRAL_FEEL};

use super::AppState;

const DEFAULT_GENRE: &str = "和風";
const DEFAULT_DIFFICULTY: &str = "初心者";
const DEFAULT_MEAL_BUDGET_JPY: u32 = 500;
const MEAL_TYPES: &[&str] = &["朝", "昼", "晩"];

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Deserialize)]
pub struct SuggestionParams {
    pub genre: Option<String>,
    pub keyword: Option<String>,
    pub city: Option<String>,
    pub difficulty: Option<String>,
    pub budget: Option<u32>,
    pub target_kcal: Option<u32>,
}

/// Suggests ranked recipes with nutrition estimates and cheer messages.
///
/// Catalog trouble surfaces as an empty recipe list, never as an error
/// status; weather trouble degrades to a neutral feel.
pub async fn suggest_recipes(
    State(state): State<AppState>,
    Query(params): Query<SuggestionParams>,
) -> AppResult<Json<SuggestionResponse>> {
    let genre = params.genre.unwrap_or_else(|| DEFAULT_GENRE.to_string());
    let difficulty = params
        .difficulty
        .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string());
    let budget = params.budget.unwrap_or(DEFAULT_MEAL_BUDGET_JPY);
    let city = params.city.unwrap_or_else(|| DEFAULT_CITY.to_string());
    let target_kcal = params.target_kcal.unwrap_or(state.target_kcal);

    let feel = match state.weather.weekly(&city).await {
        Ok(weather) => weather.today_feel().unwrap_or(NEUTRAL_FEEL),
        Err(e) => {
            tracing::warn!(city, error = %e, "weather lookup failed, using neutral feel");
            NEUTRAL_FEEL
        }
    };
    let season = current_season();

    let recipes = state
        .fetcher
        .fetch(&genre, &state.rakuten_application_id, params.keyword.as_deref())
        .await;

    let context = EnrichmentContext {
        difficulty,
        budget_jpy: budget,
        season: season.to_string(),
        feel: feel.to_string(),
    };
    let estimates = estimate_for_recipes(state.estimator.clone(), &recipes, &context).await;

    let mut suggestions = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        let nutrition = estimates.get(&recipe.id).cloned();
        let cheer = match &nutrition {
            Some(n) => {
                let summary = format!(
                    "{} / 約{}kcal / {} / {} / 予算{}円 / 体感:{}",
                    recipe.name, n.kcal as i64, genre, context.difficulty, budget, feel
                );
                match state.estimator.cheer(&summary).await {
                    Ok(cheer) => Some(cheer),
                    Err(e) => {
                        tracing::warn!(recipe_id = %recipe.id, error = %e, "cheer generation failed");
                        None
                    }
                }
            }
            None => None,
        };
        suggestions.push(RecipeSuggestion {
            recipe,
            nutrition,
            cheer,
        });
    }

    let consumed = state.meal_log.sum_today().await?;

    Ok(Json(SuggestionResponse {
        genre,
        season: season.to_string(),
        feel: feel.to_string(),
        consumed_kcal: consumed,
        remaining_kcal: remaining_kcal(target_kcal, consumed),
        recipes: suggestions,
    }))
}

/// Logs a consumed meal.
pub async fn log_meal(
    State(state): State<AppState>,
    Json(request): Json<LogMealRequest>,
) -> AppResult<(StatusCode, Json<LogMealResponse>)> {
    if !MEAL_TYPES.contains(&request.meal_type.as_str()) {
        return Err(AppError::InvalidInput(format!(
            "meal_type must be one of {}",
            MEAL_TYPES.join("/")
        )));
    }
    if request.name.trim().is_empty() {
        return Err(AppError::InvalidInput("name cannot be empty".to_string()));
    }
    if !request.kcal.is_finite() || request.kcal < 0.0 {
        return Err(AppError::InvalidInput(
            "kcal must be a non-negative number".to_string(),
        ));
    }

    let id = state
        .meal_log
        .insert(&request.meal_type, &request.name, request.kcal)
        .await?;

    Ok((StatusCode::CREATED, Json(LogMealResponse { id })))
}

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    pub target_kcal: Option<u32>,
}

/// Today's consumed and remaining calories.
pub async fn today_summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> AppResult<Json<DailySummary>> {
    let target_kcal = params.target_kcal.unwrap_or(state.target_kcal);
    let date = Local::now().format("%Y-%m-%d").to_string();
    let consumed = state.meal_log.sum_today().await?;

    Ok(Json(DailySummary {
        date,
        target_kcal,
        consumed_kcal: consumed,
        remaining_kcal: remaining_kcal(target_kcal, consumed),
    }))
}

/// Weekly forecast for a city, with derived feel labels.
pub async fn city_weather(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> AppResult<Json<WeeklyWeather>> {
    let weekly = state.weather.weekly(&city).await?;
    Ok(Json(weekly))
}
