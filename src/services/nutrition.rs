//! Calorie/PFC estimation and cheer messages via a chat-completions LLM.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Semaphore;

use crate::error::{AppError, AppResult};
use crate::models::{EstimateRequest, NutritionEstimate, RecipeRecord};

const ESTIMATE_TEMPERATURE: f64 = 0.3;
const CHEER_TEMPERATURE: f64 = 0.7;

/// Fallback when the model answer cannot be parsed.
const FALLBACK_KCAL: f64 = 500.0;
/// P/F/C calorie split used to backfill missing macros.
const PFC_RATIO: (f64, f64, f64) = (0.25, 0.25, 0.50);
const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;
const KCAL_PER_G_CARB: f64 = 4.0;

const MAX_PROMPT_INGREDIENTS: usize = 10;

/// Concurrent estimation calls during batch enrichment.
const ENRICH_WORKERS: usize = 3;

const SYSTEM_PROMPT: &str = "あなたは思いやりのある管理栄養士AIです。\n\
ユーザーの努力をねぎらい、前向きな短い応援メッセージを日本語で添えます。\n\
語尾は明るく丁寧に。上から目線はNG。";

/// Shared context for a batch of estimation calls.
#[derive(Debug, Clone)]
pub struct EnrichmentContext {
    pub difficulty: String,
    pub budget_jpy: u32,
    pub season: String,
    pub feel: String,
}

/// Trait for the nutrition/cheer collaborator, enabling mockability in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NutritionEstimator: Send + Sync {
    /// Estimates per-serving calories and macros for one recipe.
    async fn estimate(&self, request: &EstimateRequest) -> AppResult<NutritionEstimate>;

    /// Generates a one-line encouragement for a suggestion summary.
    async fn cheer(&self, summary: &str) -> AppResult<String>;
}

/// OpenAI-backed advisor performing one chat call per operation.
pub struct OpenAiAdvisor {
    http_client: reqwest::Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl OpenAiAdvisor {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key,
            api_url,
            model,
        }
    }

    async fn chat(&self, temperature: f64, user_prompt: &str) -> AppResult<String> {
        let url = format!("{}/chat/completions", self.api_url);
        let body = serde_json::json!({
            "model": self.model,
            "temperature": temperature,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_prompt},
            ],
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Chat API returned status {}: {}",
                status, body
            )));
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMessage,
        }
        #[derive(Deserialize)]
        struct ChoiceMessage {
            content: String,
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::ExternalApi("chat response had no choices".to_string()))
    }

    /// Parses the model's JSON answer, backfilling macros from the calorie
    /// split when they are missing, and falling back to safe defaults when
    /// the answer is not parseable at all.
    fn parse_estimate(content: &str) -> NutritionEstimate {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(content) else {
            tracing::warn!("unparseable nutrition answer, using fallback estimate");
            return fallback_estimate();
        };

        let field = |name: &str| value.get(name).and_then(|v| v.as_f64()).unwrap_or(0.0);
        let kcal = field("kcal");
        let mut protein_g = field("protein_g");
        let mut fat_g = field("fat_g");
        let mut carb_g = field("carb_g");

        if protein_g + fat_g + carb_g <= 0.0 && kcal > 0.0 {
            protein_g = kcal * PFC_RATIO.0 / KCAL_PER_G_PROTEIN;
            fat_g = kcal * PFC_RATIO.1 / KCAL_PER_G_FAT;
            carb_g = kcal * PFC_RATIO.2 / KCAL_PER_G_CARB;
        }

        NutritionEstimate {
            kcal,
            protein_g,
            fat_g,
            carb_g,
        }
    }
}

fn fallback_estimate() -> NutritionEstimate {
    NutritionEstimate {
        kcal: FALLBACK_KCAL,
        protein_g: FALLBACK_KCAL * PFC_RATIO.0 / KCAL_PER_G_PROTEIN,
        fat_g: FALLBACK_KCAL * PFC_RATIO.1 / KCAL_PER_G_FAT,
        carb_g: FALLBACK_KCAL * PFC_RATIO.2 / KCAL_PER_G_CARB,
    }
}

fn estimate_prompt(request: &EstimateRequest) -> String {
    let ingredients = request
        .ingredients
        .iter()
        .take(MAX_PROMPT_INGREDIENTS)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    let method = if request.method.is_empty() {
        "不明"
    } else {
        request.method.as_str()
    };

    format!(
        "以下の料理について、1人前の推定カロリー(kcal)とPFC(たんぱく質/脂質/炭水化物のグラム)を出力してください。\n\
         出力はJSONで、例:\n\
         {{\"kcal\": 520, \"protein_g\": 28, \"fat_g\": 18, \"carb_g\": 60}}\n\
         料理名: {}\n\
         主材料: {}\n\
         調理法: {}\n\
         難易度: {}\n\
         予算: {}円\n\
         考慮: 季節({}), 天気の体感({})\n\
         注意: 数値は妥当な範囲で整数または少数。日本の一般的な分量を想定。",
        request.recipe_name,
        ingredients,
        method,
        request.difficulty,
        request.budget_jpy,
        request.season,
        request.feel,
    )
}

fn cheer_prompt(summary: &str) -> String {
    format!(
        "以下の条件に合う、短い1文の応援メッセージを出してください（20〜40文字目安）。\n\
         条件:\n\
         - ダイエットを頑張る人への共感\n\
         - 今日の提案内容を後押し\n\
         - ポジティブ、やさしい口調\n\
         - 絵文字は1個まで\n\
         提案の要約: {}",
        summary
    )
}

#[async_trait]
impl NutritionEstimator for OpenAiAdvisor {
    async fn estimate(&self, request: &EstimateRequest) -> AppResult<NutritionEstimate> {
        let content = self
            .chat(ESTIMATE_TEMPERATURE, &estimate_prompt(request))
            .await?;
        Ok(Self::parse_estimate(&content))
    }

    async fn cheer(&self, summary: &str) -> AppResult<String> {
        let content = self.chat(CHEER_TEMPERATURE, &cheer_prompt(summary)).await?;
        Ok(content.trim().to_string())
    }
}

impl EstimateRequest {
    pub fn for_recipe(recipe: &RecipeRecord, context: &EnrichmentContext) -> Self {
        Self {
            recipe_name: recipe.name.clone(),
            ingredients: recipe.ingredients.clone(),
            method: recipe.indication.clone().unwrap_or_default(),
            difficulty: context.difficulty.clone(),
            budget_jpy: context.budget_jpy,
            season: context.season.clone(),
            feel: context.feel.clone(),
        }
    }
}

/// Estimates nutrition for a batch of recipes on a small worker pool.
///
/// Completion order is not guaranteed, so results are keyed by recipe id
/// rather than position. A failed estimate drops its recipe from the map
/// and is logged; it never fails the batch.
pub async fn estimate_for_recipes(
    estimator: Arc<dyn NutritionEstimator>,
    recipes: &[RecipeRecord],
    context: &EnrichmentContext,
) -> HashMap<String, NutritionEstimate> {
    let semaphore = Arc::new(Semaphore::new(ENRICH_WORKERS));
    let mut tasks = Vec::with_capacity(recipes.len());

    for recipe in recipes {
        let estimator = estimator.clone();
        let semaphore = semaphore.clone();
        let request = EstimateRequest::for_recipe(recipe, context);
        let recipe_id = recipe.id.clone();

        tasks.push(tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return None;
            };
            match estimator.estimate(&request).await {
                Ok(estimate) => Some((recipe_id, estimate)),
                Err(e) => {
                    tracing::warn!(recipe_id = %recipe_id, error = %e, "nutrition estimate failed");
                    None
                }
            }
        }));
    }

    let mut estimates = HashMap::new();
    for task in tasks {
        match task.await {
            Ok(Some((id, estimate))) => {
                estimates.insert(id, estimate);
            }
            Ok(None) => {}
            Err(e) => tracing::error!(error = %e, "enrichment task join error"),
        }
    }

    estimates
}
