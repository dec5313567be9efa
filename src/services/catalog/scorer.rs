//! Keyword relevance scoring over the category taxonomy.
//!
//! Ranks every taxonomy entry against a free-text keyword and an optional
//! coarse genre hint, returning the top candidates with their hierarchical
//! ids ready for ranking requests.

use std::collections::HashSet;

use crate::models::{Category, CategoryIndex, CategoryLevel, ScoredCandidate};

use super::hierarchy;

const MAX_CANDIDATES: usize = 5;

const EXACT_MATCH_SCORE: f64 = 100.0;
const SUBSTRING_BASE_SCORE: f64 = 50.0;
const SUBSTRING_SPAN: f64 = 30.0;
const REVERSE_SUBSTRING_SCORE: f64 = 40.0;
const GENRE_HINT_SCORE: f64 = 25.0;
const GENRE_INDICATOR_SCORE: f64 = 15.0;
const CHAR_OVERLAP_SCALE: f64 = 10.0;
const CHAR_OVERLAP_FLOOR: f64 = 0.3;

/// Characteristic name fragments per genre class; a hint matching a class
/// label adds the indicator bonus when any fragment appears in the name.
const GENRE_INDICATORS: &[(&[&str], &[&str])] = &[
    (
        &["和風", "和食", "日本"],
        &[
            "和", "味噌", "醤油", "だし", "煮物", "丼", "うどん", "そば", "天ぷら", "豆腐",
        ],
    ),
    (
        &["洋風", "洋食", "西洋"],
        &[
            "洋", "パスタ", "ピザ", "グラタン", "シチュー", "ソース", "チーズ", "ハンバーグ",
            "オムライス", "サラダ",
        ],
    ),
    (
        &["中華", "中国"],
        &[
            "中華", "炒め", "餃子", "麻婆", "春巻", "チャーハン", "シュウマイ", "担々", "酢豚",
            "エビチリ",
        ],
    ),
];

/// Ranks taxonomy entries against `keyword` and `genre_hint`.
///
/// Returns at most five candidates, highest score first. The sort is
/// stable, so ties keep the index's level-major enumeration order.
pub fn search(
    index: &CategoryIndex,
    keyword: &str,
    genre_hint: Option<&str>,
) -> Vec<ScoredCandidate> {
    let keyword = keyword.trim().to_lowercase();
    let hint = genre_hint.map(str::trim).filter(|h| !h.is_empty());

    let mut scored: Vec<(&Category, f64)> = Vec::new();
    for category in index.iter_ordered() {
        let base = relevance(&keyword, &category.name, hint);
        if base <= 0.0 {
            continue;
        }
        scored.push((category, base + level_weight(category.level)));
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(MAX_CANDIDATES);

    scored
        .into_iter()
        .map(|(category, score)| ScoredCandidate {
            hierarchical_id: hierarchy::build(&category.id, index),
            original_id: category.id.clone(),
            name: category.name.clone(),
            level: category.level,
            score,
        })
        .collect()
}

/// Accumulated score of items independent of level.
///
/// Keyword matching is tiered: exact, substring, reverse substring, then
/// character overlap; only the strongest tier applies. The genre-hint
/// bonuses are evaluated independently and added on top.
fn relevance(keyword: &str, name: &str, hint: Option<&str>) -> f64 {
    let name_lower = name.to_lowercase();
    let mut score = 0.0;

    if !keyword.is_empty() {
        let keyword_len = keyword.chars().count() as f64;
        let name_len = name_lower.chars().count() as f64;

        if keyword == name_lower {
            score += EXACT_MATCH_SCORE;
        } else if name_lower.contains(keyword) {
            score += SUBSTRING_BASE_SCORE + SUBSTRING_SPAN * (keyword_len / name_len);
        } else if keyword.contains(&name_lower) && !name_lower.is_empty() {
            score += REVERSE_SUBSTRING_SCORE;
        } else {
            let overlap = char_overlap(keyword, &name_lower);
            if overlap >= CHAR_OVERLAP_FLOOR {
                score += CHAR_OVERLAP_SCALE * overlap;
            }
        }
    }

    if let Some(hint) = hint {
        if name.contains(hint) {
            score += GENRE_HINT_SCORE;
        }
        if let Some(fragments) = indicator_fragments(hint) {
            if fragments.iter().any(|f| name.contains(f)) {
                score += GENRE_INDICATOR_SCORE;
            }
        }
    }

    score
}

fn level_weight(level: CategoryLevel) -> f64 {
    match level {
        CategoryLevel::Large => 15.0,
        CategoryLevel::Medium => 8.0,
        CategoryLevel::Small => 5.0,
    }
}

/// Shared-character ratio: |chars(keyword) ∩ chars(name)| over the longer
/// of the two lengths.
fn char_overlap(keyword: &str, name: &str) -> f64 {
    let keyword_chars: HashSet<char> = keyword.chars().collect();
    let name_chars: HashSet<char> = name.chars().collect();
    let longest = keyword.chars().count().max(name.chars().count());
    if longest == 0 {
        return 0.0;
    }
    keyword_chars.intersection(&name_chars).count() as f64 / longest as f64
}

/// The fragment list of the genre class the hint belongs to, if any.
fn indicator_fragments(hint: &str) -> Option<&'static [&'static str]> {
    GENRE_INDICATORS
        .iter()
        .find(|(labels, _)| labels.iter().any(|label| hint.contains(label)))
        .map(|(_, fragments)| *fragments)
}
