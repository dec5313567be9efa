//! Recipe fetch orchestration: category resolution, the primary ranking
//! fetch, and the bounded fallback cascade.

use std::sync::Arc;

use crate::models::{ApiRecipe, RecipeRecord};

use super::client::ResilientClient;
use super::scorer;
use super::taxonomy::TaxonomyCache;

/// Recipes returned per successful fetch.
const TOP_N: usize = 4;

/// Used when neither the scorer nor the static table resolves a category.
const DEFAULT_CATEGORY_ID: &str = "30";

/// Last-resort genre mapping when scoring yields no candidates.
const GENRE_CATEGORY_FALLBACK: &[(&str, &str)] = &[
    ("和風", "30-1"),
    ("洋風", "27-1"),
    ("中華", "36-1"),
];

/// Resolves a genre/keyword to catalog categories and fetches ranked
/// recipes, degrading through the fallback cascade instead of failing.
pub struct RecipeFetcher {
    client: Arc<ResilientClient>,
    taxonomy: Arc<TaxonomyCache>,
    ranking_endpoint: String,
    top_n: usize,
}

impl RecipeFetcher {
    pub fn new(
        client: Arc<ResilientClient>,
        taxonomy: Arc<TaxonomyCache>,
        ranking_endpoint: String,
    ) -> Self {
        Self {
            client,
            taxonomy,
            ranking_endpoint,
            top_n: TOP_N,
        }
    }

    /// Fetches ranked recipes for a genre and optional keyword.
    ///
    /// Never fails to the caller; the worst case is an empty list. After
    /// the primary candidate, at most one fallback candidate is tried;
    /// lower-ranked candidates are not cascaded into.
    pub async fn fetch(
        &self,
        genre: &str,
        app_id: &str,
        keyword: Option<&str>,
    ) -> Vec<RecipeRecord> {
        let index = self.taxonomy.get(app_id).await;
        let term = keyword.unwrap_or(genre);
        let candidates = scorer::search(&index, term, Some(genre));

        let category_ids: Vec<String> = if candidates.is_empty() {
            let fallback = static_genre_category(genre).unwrap_or(DEFAULT_CATEGORY_ID);
            tracing::info!(genre, category_id = fallback, "no scored candidates, using static category");
            vec![fallback.to_string()]
        } else {
            tracing::debug!(
                genre,
                keyword = term,
                candidates = candidates.len(),
                top = %candidates[0].hierarchical_id,
                "category resolved"
            );
            candidates.iter().map(|c| c.hierarchical_id.clone()).collect()
        };

        if let Some(items) = self.fetch_ranking(app_id, &category_ids[0]).await {
            if !items.is_empty() {
                return self.normalize(items, &category_ids[0], genre, keyword);
            }
        }

        if let Some(second) = category_ids.get(1) {
            tracing::warn!(
                primary = %category_ids[0],
                fallback = %second,
                "primary category yielded no recipes, cascading once"
            );
            if let Some(items) = self.fetch_ranking(app_id, second).await {
                if !items.is_empty() {
                    return self.normalize(items, second, genre, keyword);
                }
            }
        }

        tracing::warn!(genre, "no recipes retrieved for any candidate category");
        Vec::new()
    }

    /// One ranking call; every failure collapses to `None`, a response
    /// without usable data to `Some(empty)`.
    async fn fetch_ranking(&self, app_id: &str, category_id: &str) -> Option<Vec<ApiRecipe>> {
        let params = [
            ("applicationId".to_string(), app_id.to_string()),
            ("categoryId".to_string(), category_id.to_string()),
        ];

        let body = match self.client.request(&self.ranking_endpoint, &params).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(category_id, error = %e, "ranking request failed");
                return None;
            }
        };

        let Some(result) = body.get("result") else {
            // recoverable "no data" condition, not a hard error
            tracing::warn!(category_id, "ranking response missing result field");
            return Some(Vec::new());
        };

        match serde_json::from_value::<Vec<ApiRecipe>>(result.clone()) {
            Ok(items) => Some(items),
            Err(e) => {
                tracing::warn!(category_id, error = %e, "malformed ranking payload");
                None
            }
        }
    }

    fn normalize(
        &self,
        items: Vec<ApiRecipe>,
        category_id: &str,
        genre: &str,
        keyword: Option<&str>,
    ) -> Vec<RecipeRecord> {
        items
            .into_iter()
            .take(self.top_n)
            .map(|item| RecipeRecord::from_api(item, category_id, genre, keyword))
            .collect()
    }
}

fn static_genre_category(genre: &str) -> Option<&'static str> {
    GENRE_CATEGORY_FALLBACK
        .iter()
        .find(|(g, _)| *g == genre)
        .map(|(_, id)| *id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::client::{
        MockApiTransport, RawResponse, RetryPolicy, TransportError,
    };
    use mockall::predicate;
    use std::time::Duration;

    const TAXONOMY_URL: &str = "http://test.local/categories";
    const RANKING_URL: &str = "http://test.local/ranking";

    const TAXONOMY_BODY: &str = r#"{
        "result": {
            "large": [{"categoryId": "10", "categoryName": "肉"}],
            "medium": [{"categoryId": "275", "categoryName": "牛肉", "parentCategoryId": "10"}],
            "small": []
        }
    }"#;

    fn ranking_body(ids: &[u64]) -> String {
        let items: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| {
                serde_json::json!({
                    "recipeId": id,
                    "recipeTitle": format!("レシピ{}", id),
                    "recipeUrl": format!("https://recipe.test/{}", id),
                    "recipeMaterial": ["牛肉"]
                })
            })
            .collect();
        serde_json::json!({ "result": items }).to_string()
    }

    fn no_delay_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 0,
            pacing_delay: Duration::ZERO,
            retry_delay: Duration::ZERO,
            timeout: Duration::from_secs(5),
        }
    }

    fn expect_taxonomy(transport: &mut MockApiTransport, body: &'static str) {
        transport
            .expect_get()
            .with(
                predicate::eq(TAXONOMY_URL),
                predicate::always(),
                predicate::always(),
            )
            .times(1)
            .returning(move |_, _, _| {
                Ok(RawResponse {
                    status: 200,
                    body: body.to_string(),
                })
            });
    }

    fn expect_ranking_for(
        transport: &mut MockApiTransport,
        category_id: &str,
        response: Result<RawResponse, TransportError>,
    ) {
        let category_id = category_id.to_string();
        transport
            .expect_get()
            .withf(move |url, params, _| {
                url == RANKING_URL
                    && params
                        .iter()
                        .any(|(k, v)| k == "categoryId" && *v == category_id)
            })
            .times(1)
            .return_once(move |_, _, _| response);
    }

    fn fetcher_with(transport: MockApiTransport) -> RecipeFetcher {
        let client = Arc::new(ResilientClient::new(Arc::new(transport), no_delay_policy()));
        let taxonomy = Arc::new(TaxonomyCache::new(client.clone(), TAXONOMY_URL.to_string()));
        RecipeFetcher::new(client, taxonomy, RANKING_URL.to_string())
    }

    #[tokio::test]
    async fn primary_candidate_success_returns_tagged_records() {
        let mut transport = MockApiTransport::new();
        expect_taxonomy(&mut transport, TAXONOMY_BODY);
        expect_ranking_for(
            &mut transport,
            "10-275",
            Ok(RawResponse {
                status: 200,
                body: ranking_body(&[1, 2]),
            }),
        );

        let fetcher = fetcher_with(transport);
        let records = fetcher.fetch("和風", "app", Some("牛肉")).await;

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.category_id == "10-275"));
        assert!(records.iter().all(|r| r.genre == "和風"));
        assert!(records.iter().all(|r| r.keyword.as_deref() == Some("牛肉")));
    }

    #[tokio::test]
    async fn empty_primary_cascades_once_to_second_candidate() {
        let mut transport = MockApiTransport::new();
        expect_taxonomy(&mut transport, TAXONOMY_BODY);
        // top candidate is the exact match "10-275"; the Large "肉"
        // category is the second
        expect_ranking_for(
            &mut transport,
            "10-275",
            Ok(RawResponse {
                status: 200,
                body: r#"{"result": []}"#.to_string(),
            }),
        );
        expect_ranking_for(
            &mut transport,
            "10",
            Ok(RawResponse {
                status: 200,
                body: ranking_body(&[7, 8]),
            }),
        );

        let fetcher = fetcher_with(transport);
        let records = fetcher.fetch("和風", "app", Some("牛肉")).await;

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.category_id == "10"));
    }

    #[tokio::test]
    async fn missing_result_field_also_cascades() {
        let mut transport = MockApiTransport::new();
        expect_taxonomy(&mut transport, TAXONOMY_BODY);
        expect_ranking_for(
            &mut transport,
            "10-275",
            Ok(RawResponse {
                status: 200,
                body: r#"{"error": "too_many_requests"}"#.to_string(),
            }),
        );
        expect_ranking_for(
            &mut transport,
            "10",
            Ok(RawResponse {
                status: 200,
                body: ranking_body(&[7]),
            }),
        );

        let fetcher = fetcher_with(transport);
        let records = fetcher.fetch("和風", "app", Some("牛肉")).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category_id, "10");
    }

    #[tokio::test]
    async fn cascade_stops_after_the_second_candidate() {
        let mut transport = MockApiTransport::new();
        expect_taxonomy(&mut transport, TAXONOMY_BODY);
        // both fetches empty; the mock would panic on a third ranking call
        expect_ranking_for(
            &mut transport,
            "10-275",
            Ok(RawResponse {
                status: 200,
                body: r#"{"result": []}"#.to_string(),
            }),
        );
        expect_ranking_for(
            &mut transport,
            "10",
            Ok(RawResponse {
                status: 200,
                body: r#"{"result": []}"#.to_string(),
            }),
        );

        let fetcher = fetcher_with(transport);
        let records = fetcher.fetch("和風", "app", Some("牛肉")).await;

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn transport_failures_collapse_to_empty() {
        let mut transport = MockApiTransport::new();
        expect_taxonomy(&mut transport, TAXONOMY_BODY);
        expect_ranking_for(
            &mut transport,
            "10-275",
            Err(TransportError("connection refused".to_string())),
        );
        expect_ranking_for(
            &mut transport,
            "10",
            Err(TransportError("connection refused".to_string())),
        );

        let fetcher = fetcher_with(transport);
        let records = fetcher.fetch("和風", "app", Some("牛肉")).await;

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn no_candidates_and_no_static_mapping_uses_default_category() {
        let mut transport = MockApiTransport::new();
        // empty taxonomy: the scorer cannot produce candidates
        expect_taxonomy(
            &mut transport,
            r#"{"result": {"large": [], "medium": [], "small": []}}"#,
        );
        expect_ranking_for(
            &mut transport,
            DEFAULT_CATEGORY_ID,
            Ok(RawResponse {
                status: 200,
                body: ranking_body(&[5]),
            }),
        );

        let fetcher = fetcher_with(transport);
        let records = fetcher.fetch("フレンチ", "app", None).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category_id, DEFAULT_CATEGORY_ID);
    }

    #[tokio::test]
    async fn static_genre_table_applies_before_the_default() {
        let mut transport = MockApiTransport::new();
        expect_taxonomy(
            &mut transport,
            r#"{"result": {"large": [], "medium": [], "small": []}}"#,
        );
        expect_ranking_for(
            &mut transport,
            "30-1",
            Ok(RawResponse {
                status: 200,
                body: ranking_body(&[5]),
            }),
        );

        let fetcher = fetcher_with(transport);
        let records = fetcher.fetch("和風", "app", None).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category_id, "30-1");
    }

    #[tokio::test]
    async fn results_truncate_to_the_configured_count() {
        let mut transport = MockApiTransport::new();
        expect_taxonomy(&mut transport, TAXONOMY_BODY);
        expect_ranking_for(
            &mut transport,
            "10-275",
            Ok(RawResponse {
                status: 200,
                body: ranking_body(&[1, 2, 3, 4, 5, 6]),
            }),
        );

        let fetcher = fetcher_with(transport);
        let records = fetcher.fetch("和風", "app", Some("牛肉")).await;

        assert_eq!(records.len(), TOP_N);
        // upstream order preserved
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }
}
