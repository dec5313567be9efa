use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The three levels of the catalog category tree.
///
/// Category ids are opaque strings and unique only within a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryLevel {
    Large,
    Medium,
    Small,
}

/// A single catalog category.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub level: CategoryLevel,
}

/// Immutable snapshot of the full category tree at a point in time.
///
/// Built once per taxonomy fetch and replaced wholesale on refresh; the
/// per-level vectors preserve the upstream enumeration order, which the
/// scorer relies on for stable tie-breaking.
#[derive(Debug, Default)]
pub struct CategoryIndex {
    large: Vec<Category>,
    medium: Vec<Category>,
    small: Vec<Category>,
}

impl CategoryIndex {
    pub fn new(large: Vec<Category>, medium: Vec<Category>, small: Vec<Category>) -> Self {
        Self {
            large,
            medium,
            small,
        }
    }

    /// Looks up a category by level and id.
    pub fn get(&self, level: CategoryLevel, id: &str) -> Option<&Category> {
        self.bucket(level).iter().find(|c| c.id == id)
    }

    /// Looks up an id across levels, Large first, then Medium, then Small.
    pub fn locate(&self, id: &str) -> Option<&Category> {
        self.get(CategoryLevel::Large, id)
            .or_else(|| self.get(CategoryLevel::Medium, id))
            .or_else(|| self.get(CategoryLevel::Small, id))
    }

    /// All categories in level-major order: the Large block, then Medium,
    /// then Small, each in upstream enumeration order.
    pub fn iter_ordered(&self) -> impl Iterator<Item = &Category> {
        self.large
            .iter()
            .chain(self.medium.iter())
            .chain(self.small.iter())
    }

    pub fn len(&self) -> usize {
        self.large.len() + self.medium.len() + self.small.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bucket(&self, level: CategoryLevel) -> &[Category] {
        match level {
            CategoryLevel::Large => &self.large,
            CategoryLevel::Medium => &self.medium,
            CategoryLevel::Small => &self.small,
        }
    }
}

/// A taxonomy entry ranked against a keyword/genre query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    /// Dash-joined ancestor path (e.g. "10-275-1132") accepted by the
    /// ranking endpoint.
    pub hierarchical_id: String,
    pub original_id: String,
    pub name: String,
    pub level: CategoryLevel,
    pub score: f64,
}

// ============================================================================
// Raw catalog API types
// ============================================================================

/// A category entry as the taxonomy endpoint returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCategory {
    #[serde(deserialize_with = "crate::models::de_opaque_id")]
    pub category_id: String,
    pub category_name: String,
    #[serde(default, deserialize_with = "crate::models::de_opt_opaque_id")]
    pub parent_category_id: Option<String>,
}

impl ApiCategory {
    /// Normalizes into a [`Category`]; an empty parent id becomes `None`.
    pub fn into_category(self, level: CategoryLevel) -> Category {
        Category {
            id: self.category_id,
            name: self.category_name,
            parent_id: self.parent_category_id.filter(|p| !p.is_empty()),
            level,
        }
    }
}

/// The taxonomy endpoint's `result` payload, decoded at the boundary.
///
/// The upstream has served two shapes over time: the keyed
/// `{large, medium, small}` structure and a legacy flat list where each
/// entry carries its own `parentCategoryId`. Anything else is
/// `Unrecognized` and treated as a failed refresh by the cache.
#[derive(Debug)]
pub enum TaxonomyPayload {
    Modern {
        large: Vec<ApiCategory>,
        medium: Vec<ApiCategory>,
        small: Vec<ApiCategory>,
    },
    Legacy(Vec<ApiCategory>),
    Unrecognized,
}

impl TaxonomyPayload {
    pub fn from_response(body: &serde_json::Value) -> Self {
        let Some(result) = body.get("result") else {
            return Self::Unrecognized;
        };

        if result.is_object() {
            #[derive(Deserialize)]
            struct Keyed {
                #[serde(default)]
                large: Vec<ApiCategory>,
                #[serde(default)]
                medium: Vec<ApiCategory>,
                #[serde(default)]
                small: Vec<ApiCategory>,
            }

            if let Ok(keyed) = serde_json::from_value::<Keyed>(result.clone()) {
                return Self::Modern {
                    large: keyed.large,
                    medium: keyed.medium,
                    small: keyed.small,
                };
            }
        }

        if result.is_array() {
            if let Ok(flat) = serde_json::from_value::<Vec<ApiCategory>>(result.clone()) {
                return Self::Legacy(flat);
            }
        }

        Self::Unrecognized
    }

    /// Builds the index, or `None` for an unrecognized payload.
    pub fn into_index(self) -> Option<CategoryIndex> {
        match self {
            Self::Modern {
                large,
                medium,
                small,
            } => {
                let convert = |entries: Vec<ApiCategory>, level| {
                    entries
                        .into_iter()
                        .map(|c| c.into_category(level))
                        .collect()
                };
                Some(CategoryIndex::new(
                    convert(large, CategoryLevel::Large),
                    convert(medium, CategoryLevel::Medium),
                    convert(small, CategoryLevel::Small),
                ))
            }
            Self::Legacy(flat) => Some(classify_legacy(flat)),
            Self::Unrecognized => None,
        }
    }
}

/// Places flat-list entries into levels: no parent means a root, a parent
/// that is itself a root means Medium, anything deeper is Small.
fn classify_legacy(flat: Vec<ApiCategory>) -> CategoryIndex {
    let root_ids: HashSet<String> = flat
        .iter()
        .filter(|c| c.parent_category_id.as_deref().map_or(true, str::is_empty))
        .map(|c| c.category_id.clone())
        .collect();

    let mut large = Vec::new();
    let mut medium = Vec::new();
    let mut small = Vec::new();

    for entry in flat {
        match entry.parent_category_id.as_deref().filter(|p| !p.is_empty()) {
            None => large.push(entry.into_category(CategoryLevel::Large)),
            Some(p) if root_ids.contains(p) => {
                medium.push(entry.into_category(CategoryLevel::Medium))
            }
            Some(_) => small.push(entry.into_category(CategoryLevel::Small)),
        }
    }

    CategoryIndex::new(large, medium, small)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn index_lookup_by_level_and_id() {
        let index = CategoryIndex::new(
            vec![Category {
                id: "10".to_string(),
                name: "肉".to_string(),
                parent_id: None,
                level: CategoryLevel::Large,
            }],
            vec![Category {
                id: "275".to_string(),
                name: "牛肉".to_string(),
                parent_id: Some("10".to_string()),
                level: CategoryLevel::Medium,
            }],
            vec![],
        );

        assert_eq!(index.get(CategoryLevel::Large, "10").unwrap().name, "肉");
        assert!(index.get(CategoryLevel::Large, "275").is_none());
        assert_eq!(index.locate("275").unwrap().level, CategoryLevel::Medium);
        assert!(index.locate("999").is_none());
    }

    #[test]
    fn iter_ordered_is_level_major() {
        let cat = |id: &str, level| Category {
            id: id.to_string(),
            name: id.to_string(),
            parent_id: None,
            level,
        };
        let index = CategoryIndex::new(
            vec![cat("l1", CategoryLevel::Large), cat("l2", CategoryLevel::Large)],
            vec![cat("m1", CategoryLevel::Medium)],
            vec![cat("s1", CategoryLevel::Small)],
        );

        let ids: Vec<&str> = index.iter_ordered().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["l1", "l2", "m1", "s1"]);
    }

    #[test]
    fn modern_payload_builds_index() {
        let body = json!({
            "result": {
                "large": [{"categoryId": "10", "categoryName": "肉"}],
                "medium": [{"categoryId": "275", "categoryName": "牛肉", "parentCategoryId": "10"}],
                "small": [{"categoryId": "1132", "categoryName": "牛すじ", "parentCategoryId": "275"}]
            }
        });

        let index = TaxonomyPayload::from_response(&body).into_index().unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(
            index.get(CategoryLevel::Small, "1132").unwrap().parent_id,
            Some("275".to_string())
        );
    }

    #[test]
    fn modern_payload_accepts_numeric_ids() {
        let body = json!({
            "result": {
                "large": [{"categoryId": 10, "categoryName": "肉"}],
                "medium": [{"categoryId": 275, "categoryName": "牛肉", "parentCategoryId": 10}],
                "small": []
            }
        });

        let index = TaxonomyPayload::from_response(&body).into_index().unwrap();
        assert_eq!(
            index.get(CategoryLevel::Medium, "275").unwrap().parent_id,
            Some("10".to_string())
        );
    }

    #[test]
    fn legacy_payload_is_classified_by_parent() {
        let body = json!({
            "result": [
                {"categoryId": "10", "categoryName": "肉", "parentCategoryId": ""},
                {"categoryId": "275", "categoryName": "牛肉", "parentCategoryId": "10"},
                {"categoryId": "1132", "categoryName": "牛すじ", "parentCategoryId": "275"}
            ]
        });

        let index = TaxonomyPayload::from_response(&body).into_index().unwrap();
        assert!(index.get(CategoryLevel::Large, "10").is_some());
        assert!(index.get(CategoryLevel::Medium, "275").is_some());
        assert!(index.get(CategoryLevel::Small, "1132").is_some());
    }

    #[test]
    fn missing_result_is_unrecognized() {
        let body = json!({"error": "wrong_parameter"});
        assert!(matches!(
            TaxonomyPayload::from_response(&body),
            TaxonomyPayload::Unrecognized
        ));
        assert!(TaxonomyPayload::from_response(&body).into_index().is_none());
    }

    #[test]
    fn scalar_result_is_unrecognized() {
        let body = json!({"result": 42});
        assert!(matches!(
            TaxonomyPayload::from_response(&body),
            TaxonomyPayload::Unrecognized
        ));
    }

    #[test]
    fn empty_parent_id_normalizes_to_none() {
        let api = ApiCategory {
            category_id: "30".to_string(),
            category_name: "人気メニュー".to_string(),
            parent_category_id: Some(String::new()),
        };
        let category = api.into_category(CategoryLevel::Large);
        assert_eq!(category.parent_id, None);
    }
}
