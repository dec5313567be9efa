//! Hierarchical category id reconstruction.
//!
//! The ranking endpoint expects a dash-joined path of ancestor ids
//! (e.g. "10-275-1132"), not a bare leaf id.

use std::collections::HashSet;

use crate::models::{CategoryIndex, CategoryLevel};

/// Rebuilds the full parent-chain identifier for `id`.
///
/// Lookup order is Large, then Medium, then Small. A Large id is already a
/// root. A Medium id is prefixed with its parent id verbatim. A Small id
/// walks up through its parent chain. An id the index does not know, or a
/// missing parent, degrades to the path built so far rather than failing;
/// a cyclic parent chain in corrupt data truncates instead of looping.
pub fn build(id: &str, index: &CategoryIndex) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut current = id;

    loop {
        if !visited.insert(current) {
            break;
        }

        match index.locate(current) {
            Some(category) if category.level == CategoryLevel::Large => {
                segments.push(current);
                break;
            }
            Some(category) if category.level == CategoryLevel::Medium => {
                segments.push(current);
                if let Some(parent) = category.parent_id.as_deref() {
                    segments.push(parent);
                }
                break;
            }
            Some(category) => {
                segments.push(current);
                match category.parent_id.as_deref() {
                    Some(parent) => current = parent,
                    None => break,
                }
            }
            None => {
                segments.push(current);
                break;
            }
        }
    }

    segments.reverse();
    segments.join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn sample_index() -> CategoryIndex {
        CategoryIndex::new(
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
            vec![Category {
                id: "1132".to_string(),
                name: "牛すじ".to_string(),
                parent_id: Some("275".to_string()),
                level: CategoryLevel::Small,
            }],
        )
    }

    #[test]
    fn large_id_is_already_a_root() {
        assert_eq!(build("10", &sample_index()), "10");
    }

    #[test]
    fn medium_id_gets_parent_prefix() {
        assert_eq!(build("275", &sample_index()), "10-275");
    }

    #[test]
    fn small_id_walks_the_full_chain() {
        assert_eq!(build("1132", &sample_index()), "10-275-1132");
    }

    #[test]
    fn unknown_id_is_returned_unchanged() {
        assert_eq!(build("9999", &sample_index()), "9999");
    }

    #[test]
    fn medium_without_parent_stays_bare() {
        let index = CategoryIndex::new(
            vec![],
            vec![Category {
                id: "88".to_string(),
                name: "その他".to_string(),
                parent_id: None,
                level: CategoryLevel::Medium,
            }],
            vec![],
        );
        assert_eq!(build("88", &index), "88");
    }

    #[test]
    fn small_with_unknown_parent_keeps_it_verbatim() {
        let index = CategoryIndex::new(
            vec![],
            vec![],
            vec![Category {
                id: "1132".to_string(),
                name: "牛すじ".to_string(),
                parent_id: Some("275".to_string()),
                level: CategoryLevel::Small,
            }],
        );
        // "275" resolves to nothing, so it stays as-is in the path
        assert_eq!(build("1132", &index), "275-1132");
    }

    #[test]
    fn cyclic_parents_truncate_instead_of_looping() {
        let index = CategoryIndex::new(
            vec![],
            vec![],
            vec![
                Category {
                    id: "a".to_string(),
                    name: "a".to_string(),
                    parent_id: Some("b".to_string()),
                    level: CategoryLevel::Small,
                },
                Category {
                    id: "b".to_string(),
                    name: "b".to_string(),
                    parent_id: Some("a".to_string()),
                    level: CategoryLevel::Small,
                },
            ],
        );
        assert_eq!(build("a", &index), "b-a");
    }
}
