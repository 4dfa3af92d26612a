//! Write-side validation.
//!
//! Form submissions arrive as untyped strings. [`ProductForm`] parses them
//! into [`NewProduct`] / [`ProductChanges`], reporting absent or malformed
//! numbers itself; the value rules (non-blank name, non-negative price and
//! stock) are `validator` rules declared on those types.

use std::collections::HashMap;

use serde::Serialize;
use strum::{Display, EnumString};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::models::{DEFAULT_CATEGORY, DEFAULT_IMAGE, NewProduct, ProductChanges};

/// Fields carrying `#[validate]` rules, in reporting order.
const RULE_FIELDS: [&str; 3] = ["name", "price", "stock"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{field} must be a valid number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} must not be negative")]
    NegativeValue { field: &'static str },
}

/// Which rule a [`ValidationError`] broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValidationKind {
    MissingField,
    InvalidNumber,
    NegativeValue,
}

impl ValidationError {
    pub fn kind(&self) -> ValidationKind {
        match self {
            ValidationError::MissingField { .. } => ValidationKind::MissingField,
            ValidationError::InvalidNumber { .. } => ValidationKind::InvalidNumber,
            ValidationError::NegativeValue { .. } => ValidationKind::NegativeValue,
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField { field }
            | ValidationError::InvalidNumber { field, .. }
            | ValidationError::NegativeValue { field } => field,
        }
    }

    /// First failing rule, by field order: `length` means blank, `range`
    /// means negative.
    pub fn from_rules(errors: &ValidationErrors) -> Self {
        let failures = errors.field_errors();

        RULE_FIELDS
            .iter()
            .find_map(|&field| {
                let failure = failures.get(field)?.first()?;
                Some(match &*failure.code {
                    "range" => ValidationError::NegativeValue { field },
                    _ => ValidationError::MissingField { field },
                })
            })
            // Rules are only declared on RULE_FIELDS
            .unwrap_or(ValidationError::MissingField {
                field: RULE_FIELDS[0],
            })
    }
}

/// Raw product form as submitted. `None` means the field was not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub stock: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
}

impl ProductForm {
    /// Capture the known fields from submitted form data.
    ///
    /// `quantity` is accepted for `stock`; `stock` wins when both are sent.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let field = |key: &str| params.get(key).cloned();

        Self {
            name: field("name"),
            description: field("description"),
            price: field("price"),
            stock: field("stock").or_else(|| field("quantity")),
            category: field("category"),
            image: field("image"),
        }
    }

    /// Validate a creation request. `name`, `price` and `stock` are required.
    pub fn validate_new(&self) -> Result<NewProduct, ValidationError> {
        let price = parse_price(required_number("price", self.price.as_deref())?)?;
        let stock = parse_stock(required_number("stock", self.stock.as_deref())?)?;

        let input = NewProduct {
            name: trimmed(self.name.as_deref()),
            description: trimmed(self.description.as_deref()),
            price,
            stock,
            category: or_default(self.category.as_deref(), DEFAULT_CATEGORY),
            image: or_default(self.image.as_deref(), DEFAULT_IMAGE),
        };

        input
            .validate()
            .map_err(|e| ValidationError::from_rules(&e))?;
        Ok(input)
    }

    /// Validate an edit. Only submitted fields are checked and carried over.
    pub fn validate_changes(&self) -> Result<ProductChanges, ValidationError> {
        let price = self
            .price
            .as_deref()
            .map(|raw| required_number("price", Some(raw)).and_then(parse_price))
            .transpose()?;
        let stock = self
            .stock
            .as_deref()
            .map(|raw| required_number("stock", Some(raw)).and_then(parse_stock))
            .transpose()?;

        let changes = ProductChanges {
            name: self.name.as_deref().map(|n| n.trim().to_string()),
            description: self.description.as_deref().map(|d| d.trim().to_string()),
            price,
            stock,
            category: self
                .category
                .as_deref()
                .map(|c| or_default(Some(c), DEFAULT_CATEGORY)),
            image: self
                .image
                .as_deref()
                .map(|i| or_default(Some(i), DEFAULT_IMAGE)),
        };

        changes
            .validate()
            .map_err(|e| ValidationError::from_rules(&e))?;
        Ok(changes)
    }
}

fn required_number<'a>(
    field: &'static str,
    raw: Option<&'a str>,
) -> Result<&'a str, ValidationError> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ValidationError::MissingField { field }),
    }
}

fn parse_price(raw: &str) -> Result<f64, ValidationError> {
    raw.parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or_else(|| ValidationError::InvalidNumber {
            field: "price",
            value: raw.to_string(),
        })
}

fn parse_stock(raw: &str) -> Result<i64, ValidationError> {
    raw.parse::<i64>()
        .map_err(|_| ValidationError::InvalidNumber {
            field: "stock",
            value: raw.to_string(),
        })
}

fn trimmed(raw: Option<&str>) -> String {
    raw.map(str::trim).unwrap_or_default().to_string()
}

fn or_default(raw: Option<&str>, default: &str) -> String {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> ProductForm {
        let params: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ProductForm::from_params(&params)
    }

    #[test]
    fn test_valid_create() {
        let input = form(&[
            ("name", "  Malbec "),
            ("price", "12.5"),
            ("stock", "10"),
            ("category", "Red"),
        ])
        .validate_new()
        .unwrap();

        assert_eq!(input.name, "Malbec");
        assert_eq!(input.price, 12.5);
        assert_eq!(input.stock, 10);
        assert_eq!(input.category, "Red");
        assert_eq!(input.image, DEFAULT_IMAGE);
        assert_eq!(input.description, "");
    }

    #[test]
    fn test_blank_category_and_image_use_defaults() {
        let input = form(&[
            ("name", "Box"),
            ("price", "1"),
            ("stock", "0"),
            ("category", "  "),
            ("image", ""),
        ])
        .validate_new()
        .unwrap();

        assert_eq!(input.category, DEFAULT_CATEGORY);
        assert_eq!(input.image, DEFAULT_IMAGE);
    }

    #[test]
    fn test_quantity_alias() {
        let input = form(&[("name", "Box"), ("price", "1"), ("quantity", "7")])
            .validate_new()
            .unwrap();
        assert_eq!(input.stock, 7);

        let input = form(&[("name", "Box"), ("price", "1"), ("quantity", "7"), ("stock", "3")])
            .validate_new()
            .unwrap();
        assert_eq!(input.stock, 3);
    }

    #[test]
    fn test_missing_fields() {
        let err = form(&[("price", "1"), ("stock", "1")]).validate_new().unwrap_err();
        assert_eq!(err, ValidationError::MissingField { field: "name" });

        let err = form(&[("name", "Box"), ("price", " "), ("stock", "1")])
            .validate_new()
            .unwrap_err();
        assert_eq!(err.kind(), ValidationKind::MissingField);
        assert_eq!(err.field(), "price");

        let err = form(&[("name", "Box"), ("price", "1")]).validate_new().unwrap_err();
        assert_eq!(err, ValidationError::MissingField { field: "stock" });
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let err = form(&[("name", "Box"), ("price", "-5"), ("stock", "1")])
            .validate_new()
            .unwrap_err();
        assert_eq!(err, ValidationError::NegativeValue { field: "price" });
        assert_eq!(err.kind(), ValidationKind::NegativeValue);
    }

    #[test]
    fn test_invalid_numbers() {
        let err = form(&[("name", "Box"), ("price", "cheap"), ("stock", "1")])
            .validate_new()
            .unwrap_err();
        assert_eq!(err.kind(), ValidationKind::InvalidNumber);
        assert!(err.to_string().contains("cheap"));

        for raw in ["NaN", "inf"] {
            let err = form(&[("name", "Box"), ("price", raw), ("stock", "1")])
                .validate_new()
                .unwrap_err();
            assert_eq!(err.kind(), ValidationKind::InvalidNumber, "{raw}");
        }

        let err = form(&[("name", "Box"), ("price", "1"), ("stock", "2.5")])
            .validate_new()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidNumber {
                field: "stock",
                value: "2.5".into()
            }
        );

        let err = form(&[("name", "Box"), ("price", "1"), ("stock", "-1")])
            .validate_new()
            .unwrap_err();
        assert_eq!(err, ValidationError::NegativeValue { field: "stock" });
    }

    #[test]
    fn test_changes_only_carry_submitted_fields() {
        let changes = form(&[("price", "9.99")]).validate_changes().unwrap();
        assert_eq!(
            changes,
            ProductChanges {
                price: Some(9.99),
                ..Default::default()
            }
        );
        assert!(form(&[]).validate_changes().unwrap().is_empty());
    }

    #[test]
    fn test_changes_apply_same_rules() {
        let err = form(&[("name", "  ")]).validate_changes().unwrap_err();
        assert_eq!(err, ValidationError::MissingField { field: "name" });

        let err = form(&[("price", "-1")]).validate_changes().unwrap_err();
        assert_eq!(err.kind(), ValidationKind::NegativeValue);

        let changes = form(&[("category", ""), ("description", "")])
            .validate_changes()
            .unwrap();
        assert_eq!(changes.category.as_deref(), Some(DEFAULT_CATEGORY));
        assert_eq!(changes.description.as_deref(), Some(""));
    }

    #[test]
    fn test_rules_are_declared_on_typed_input() {
        let input = NewProduct {
            name: String::new(),
            description: String::new(),
            price: -0.5,
            stock: 1,
            category: DEFAULT_CATEGORY.into(),
            image: DEFAULT_IMAGE.into(),
        };
        let errors = input.validate().unwrap_err();
        let failures = errors.field_errors();
        assert_eq!(failures["name"][0].code, "length");
        assert_eq!(failures["price"][0].code, "range");

        // name is reported first
        assert_eq!(
            ValidationError::from_rules(&errors),
            ValidationError::MissingField { field: "name" }
        );

        let changes = ProductChanges {
            stock: Some(-3),
            ..Default::default()
        };
        let errors = changes.validate().unwrap_err();
        assert_eq!(
            ValidationError::from_rules(&errors),
            ValidationError::NegativeValue { field: "stock" }
        );
        assert!(ProductChanges::default().validate().is_ok());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ValidationKind::NegativeValue.to_string(), "negative_value");
        assert_eq!(
            "invalid_number".parse::<ValidationKind>(),
            Ok(ValidationKind::InvalidNumber)
        );
    }
}
