//! Category Model

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::serde_helpers;

/// Category entity
///
/// `subcategories` is stored as an array by this service, but older rows may
/// hold a JSON-encoded string or a comma separated string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "serde_helpers::string_list")]
    pub subcategories: Vec<String>,
}

/// Create category payload
///
/// `subcategories` is the comma separated form typed by an operator.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryCreate {
    #[validate(length(min = 1, max = 200, message = "name must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub subcategories: String,
}

impl CategoryCreate {
    /// Build the stored row for the given id
    pub fn into_category(self, id: i64) -> Category {
        Category {
            id,
            name: self.name.trim().to_string(),
            subcategories: parse_subcategories(&self.subcategories),
        }
    }
}

/// Update category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "name must not be empty"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategories: Option<Vec<String>>,
}

impl CategoryUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.subcategories.is_none()
    }
}

/// Category option for the submission form (name plus its subcategories)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryOption {
    pub name: String,
    pub subcategories: Vec<String>,
}

impl From<Category> for CategoryOption {
    fn from(category: Category) -> Self {
        Self {
            name: category.name,
            subcategories: category.subcategories,
        }
    }
}

/// Parse operator input `"a, b,,c"` into `["a", "b", "c"]`
pub fn parse_subcategories(input: &str) -> Vec<String> {
    serde_helpers::split_comma_list(input)
}

/// Next category id: one past the current maximum, or 1 for an empty table
pub fn next_category_id(existing: &[Category]) -> i64 {
    existing.iter().map(|c| c.id).max().unwrap_or(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_accepts_all_subcategory_shapes() {
        let from_array: Category =
            serde_json::from_value(json!({ "id": 1, "name": "Furniture", "subcategories": ["Chairs"] }))
                .unwrap();
        let from_json_text: Category = serde_json::from_value(
            json!({ "id": 1, "name": "Furniture", "subcategories": "[\"Chairs\"]" }),
        )
        .unwrap();
        let from_comma: Category =
            serde_json::from_value(json!({ "id": 1, "name": "Furniture", "subcategories": "Chairs" }))
                .unwrap();

        assert_eq!(from_array, from_json_text);
        assert_eq!(from_array, from_comma);
    }

    #[test]
    fn test_into_category_parses_input() {
        let create = CategoryCreate {
            name: " Lighting ".into(),
            subcategories: "Lamps, Bulbs,".into(),
        };
        let category = create.into_category(4);
        assert_eq!(category.id, 4);
        assert_eq!(category.name, "Lighting");
        assert_eq!(category.subcategories, vec!["Lamps", "Bulbs"]);
    }

    #[test]
    fn test_next_category_id() {
        assert_eq!(next_category_id(&[]), 1);
        let existing = vec![
            Category { id: 3, name: "a".into(), subcategories: vec![] },
            Category { id: 9, name: "b".into(), subcategories: vec![] },
        ];
        assert_eq!(next_category_id(&existing), 10);
    }

    #[test]
    fn test_create_validation() {
        let empty = CategoryCreate { name: String::new(), subcategories: String::new() };
        assert!(empty.validate().is_err());
    }
}
