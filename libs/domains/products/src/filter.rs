//! Filter builder.
//!
//! Turns raw query parameters into a [`ProductFilter`], a store-agnostic
//! description of up to four constraints joined by AND. Building a filter
//! never fails: anything malformed is dropped and the remaining constraints
//! still apply.
//!
//! | Constraint | Parameters (first non-blank wins) |
//! |---|---|
//! | category equality | `category`, `categoria` |
//! | name contains (case-insensitive, literal) | `search`, `name`, `nombre` |
//! | price >= | `min_price`, `min_precio` |
//! | price <= | `max_price`, `max_precio` |

use std::collections::HashMap;

use serde::Serialize;

use crate::models::Product;

const CATEGORY_KEYS: &[&str] = &["category", "categoria"];
const SEARCH_KEYS: &[&str] = &["search", "name", "nombre"];
const MIN_PRICE_KEYS: &[&str] = &["min_price", "min_precio"];
const MAX_PRICE_KEYS: &[&str] = &["max_price", "max_precio"];

/// Category values meaning "no restriction", compared case-insensitively.
pub const ALL_CATEGORIES: &[&str] = &["", "todas", "all"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub name_contains: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl ProductFilter {
    /// Build a filter from raw query parameters.
    ///
    /// Price bounds are independent: a malformed `max_price` does not drop a
    /// valid `min_price`, and `min > max` is kept as given (it matches nothing).
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let category = first_non_blank(params, CATEGORY_KEYS)
            .filter(|c| !is_all_categories(c))
            .map(str::to_string);

        let name_contains = first_non_blank(params, SEARCH_KEYS).map(str::to_string);

        Self {
            category,
            name_contains,
            min_price: first_non_blank(params, MIN_PRICE_KEYS).and_then(parse_bound),
            max_price: first_non_blank(params, MAX_PRICE_KEYS).and_then(parse_bound),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_name_contains(mut self, text: impl Into<String>) -> Self {
        self.name_contains = Some(text.into());
        self
    }

    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// True when no constraint is set (matches every product).
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.name_contains.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    /// Evaluate the filter in memory with the same semantics the store applies.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if product.category != *category {
                return false;
            }
        }

        if let Some(text) = &self.name_contains {
            if !product.name.to_lowercase().contains(&text.to_lowercase()) {
                return false;
            }
        }

        if let Some(min) = self.min_price {
            if product.price < min {
                return false;
            }
        }

        if let Some(max) = self.max_price {
            if product.price > max {
                return false;
            }
        }

        true
    }
}

/// Filter values echoed back into the listing form.
///
/// Dropped price bounds come back blank so the form shows what was applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterEcho {
    pub category: String,
    pub search: String,
    pub min_price: String,
    pub max_price: String,
}

impl From<&ProductFilter> for FilterEcho {
    fn from(filter: &ProductFilter) -> Self {
        Self {
            category: filter.category.clone().unwrap_or_default(),
            search: filter.name_contains.clone().unwrap_or_default(),
            min_price: filter.min_price.map(|p| p.to_string()).unwrap_or_default(),
            max_price: filter.max_price.map(|p| p.to_string()).unwrap_or_default(),
        }
    }
}

pub fn is_all_categories(value: &str) -> bool {
    let value = value.trim();
    ALL_CATEGORIES
        .iter()
        .any(|sentinel| value.eq_ignore_ascii_case(sentinel))
}

fn first_non_blank<'a>(params: &'a HashMap<String, String>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| params.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

fn parse_bound(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DEFAULT_IMAGE, NewProduct};

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn product(name: &str, price: f64, category: &str) -> Product {
        Product::new(NewProduct {
            name: name.into(),
            description: String::new(),
            price,
            stock: 1,
            category: category.into(),
            image: DEFAULT_IMAGE.into(),
        })
    }

    #[test]
    fn test_no_params_matches_all() {
        let filter = ProductFilter::from_params(&HashMap::new());
        assert!(filter.is_empty());
        assert!(filter.matches(&product("Anything", 0.0, "General")));
    }

    #[test]
    fn test_all_category_sentinels_are_ignored() {
        for value in ["", "  ", "Todas", "TODAS", "all", " All "] {
            let filter = ProductFilter::from_params(&params(&[("category", value)]));
            assert_eq!(filter.category, None, "{value:?}");
        }
    }

    #[test]
    fn test_category_is_trimmed_and_exact() {
        let filter = ProductFilter::from_params(&params(&[("category", " Red ")]));
        assert_eq!(filter.category.as_deref(), Some("Red"));
        assert!(filter.matches(&product("Malbec", 12.5, "Red")));
        assert!(!filter.matches(&product("Malbec", 12.5, "red")));
        assert!(!filter.matches(&product("Chardonnay", 12.5, "White")));
    }

    #[test]
    fn test_spanish_aliases() {
        let filter = ProductFilter::from_params(&params(&[
            ("categoria", "Tinto"),
            ("nombre", "mal"),
            ("min_precio", "5"),
            ("max_precio", "15"),
        ]));
        assert_eq!(filter.category.as_deref(), Some("Tinto"));
        assert_eq!(filter.name_contains.as_deref(), Some("mal"));
        assert_eq!(filter.min_price, Some(5.0));
        assert_eq!(filter.max_price, Some(15.0));
    }

    #[test]
    fn test_search_falls_back_to_name() {
        let filter = ProductFilter::from_params(&params(&[("search", " "), ("name", "pro")]));
        assert_eq!(filter.name_contains.as_deref(), Some("pro"));

        let filter = ProductFilter::from_params(&params(&[("search", "box"), ("name", "pro")]));
        assert_eq!(filter.name_contains.as_deref(), Some("box"));
    }

    #[test]
    fn test_name_search_is_case_insensitive_substring() {
        let filter = ProductFilter::from_params(&params(&[("search", "PRO")]));
        assert!(filter.matches(&product("Product A", 1.0, "General")));
        assert!(filter.matches(&product("reproduction", 1.0, "General")));
        assert!(!filter.matches(&product("Widget", 1.0, "General")));
    }

    #[test]
    fn test_regex_metacharacters_are_literal_in_memory() {
        let filter = ProductFilter::from_params(&params(&[("search", "a.b")]));
        assert!(filter.matches(&product("Box a.b", 1.0, "General")));
        assert!(!filter.matches(&product("Box axb", 1.0, "General")));
    }

    #[test]
    fn test_malformed_bounds_are_dropped_independently() {
        let filter =
            ProductFilter::from_params(&params(&[("min_price", "abc"), ("max_price", "20")]));
        assert_eq!(filter.min_price, None);
        assert_eq!(filter.max_price, Some(20.0));

        let filter =
            ProductFilter::from_params(&params(&[("min_price", "5"), ("max_price", "NaN")]));
        assert_eq!(filter.min_price, Some(5.0));
        assert_eq!(filter.max_price, None);

        let filter = ProductFilter::from_params(&params(&[("min_price", "inf")]));
        assert!(filter.is_empty());
    }

    #[test]
    fn test_malformed_bound_equals_absent_bound() {
        let malformed = ProductFilter::from_params(&params(&[("min_price", "12,50")]));
        let absent = ProductFilter::from_params(&HashMap::new());
        assert_eq!(malformed, absent);
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let filter =
            ProductFilter::from_params(&params(&[("min_price", "10"), ("max_price", "20")]));

        for (price, expected) in [(9.99, false), (10.0, true), (15.0, true), (20.0, true), (20.01, false)] {
            assert_eq!(
                filter.matches(&product("Box", price, "General")),
                expected,
                "price {price}"
            );
        }
    }

    #[test]
    fn test_inverted_range_is_kept_and_matches_nothing() {
        let filter =
            ProductFilter::from_params(&params(&[("min_price", "30"), ("max_price", "10")]));
        assert_eq!(filter.min_price, Some(30.0));
        assert_eq!(filter.max_price, Some(10.0));
        assert!(!filter.matches(&product("Box", 20.0, "General")));
    }

    #[test]
    fn test_negative_bound_is_accepted() {
        let filter = ProductFilter::from_params(&params(&[("min_price", "-1")]));
        assert_eq!(filter.min_price, Some(-1.0));
    }

    #[test]
    fn test_echo_blanks_dropped_bounds() {
        let filter = ProductFilter::from_params(&params(&[
            ("category", "Red"),
            ("search", " mal "),
            ("min_price", "abc"),
            ("max_price", "20"),
        ]));
        let echo = FilterEcho::from(&filter);
        assert_eq!(echo.category, "Red");
        assert_eq!(echo.search, "mal");
        assert_eq!(echo.min_price, "");
        assert_eq!(echo.max_price, "20");
    }
}
