//! Schema validation helpers.
//!
//! Validates a `serde_json::Value` against a [`Schema`] before the provider
//! acts on it, so malformed configuration is reported as diagnostics with an
//! attribute path rather than surfacing as a decode failure deep inside a
//! resource handler.
//!
//! # Example
//!
//! ```
//! use newrelic_oci_provider::schema::{Schema, Attribute};
//! use newrelic_oci_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("name", Attribute::required_string())
//!     .with_attribute("account_id", Attribute::optional_computed_int64());
//!
//! let diagnostics = validate(&schema, &json!({"name": "acct-1", "account_id": 500}));
//! assert!(diagnostics.is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"name": "acct-1", "account_id": "500"}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("account_id".to_string()));
//! ```

use crate::diagnostics::Diagnostic;
use crate::schema::{Attribute, AttributeType, Block, BlockNestingMode, NestedBlock, Schema};
use serde_json::Value;

/// Validate a JSON value against a schema.
///
/// Returns a list of diagnostics for any validation errors found.
/// An empty list means the value is valid.
///
/// # Validation Rules
///
/// - Required attributes must be present and non-null
/// - Optional attributes may be absent or null
/// - Computed-only attributes are skipped (provider sets these)
/// - Attribute types must match the schema
/// - Attributes with allowed values must use one of them (case-insensitive)
/// - Nested blocks are validated recursively with min/max item constraints
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    validate_block(&schema.block, value, "", &mut diagnostics);
    diagnostics
}

/// Validate a JSON value against a schema, returning Ok if valid or Err with diagnostics.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

/// Check if a JSON value is valid against a schema.
pub fn is_valid(schema: &Schema, value: &Value) -> bool {
    validate(schema, value).is_empty()
}

fn validate_block(block: &Block, value: &Value, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let obj = match value {
        Value::Object(map) => map,
        // An empty block (`oci_metadata_and_tags {}`) may arrive as null.
        Value::Null => return,
        _ => {
            let mut diag =
                Diagnostic::error("Expected object").with_detail(format!("Got {}", kind(value)));
            if !path.is_empty() {
                diag = diag.with_attribute(path);
            }
            diagnostics.push(diag);
            return;
        },
    };

    for (name, attr) in &block.attributes {
        validate_attribute(attr, obj.get(name), &join_path(path, name), diagnostics);
    }

    for (name, nested) in &block.blocks {
        let block_path = join_path(path, name);
        let block_value = obj.get(name);
        match nested.nesting_mode {
            BlockNestingMode::Single => {
                validate_single_block(nested, block_value, &block_path, diagnostics)
            },
            BlockNestingMode::List => {
                validate_list_block(nested, block_value, &block_path, diagnostics)
            },
        }
    }
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if attr.flags.is_computed_only() {
        return;
    }

    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        },
        Some(v) => {
            let before = diagnostics.len();
            validate_attribute_type(&attr.attr_type, v, path, diagnostics);
            if diagnostics.len() == before && !attr.allowed_values.is_empty() {
                validate_allowed_value(attr, v, path, diagnostics);
            }
        },
    }
}

fn validate_attribute_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let matches = match attr_type {
        AttributeType::String => value.is_string(),
        AttributeType::Int64 => is_int64(value),
        AttributeType::Bool => value.is_boolean(),
        AttributeType::List(element_type) => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}.{}", path, i);
                    validate_attribute_type(element_type, item, &item_path, diagnostics);
                }
                true
            },
            None => false,
        },
    };

    if !matches {
        diagnostics.push(type_error(path, type_name(attr_type), value));
    }
}

fn validate_allowed_value(
    attr: &Attribute,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(s) = value.as_str() else {
        return;
    };
    if attr
        .allowed_values
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(s))
    {
        return;
    }
    diagnostics.push(
        Diagnostic::error(format!("Invalid value for attribute '{}'", path))
            .with_detail(format!(
                "Expected one of [{}], got {:?}",
                attr.allowed_values.join(", "),
                s
            ))
            .with_attribute(path),
    );
}

fn validate_single_block(
    nested: &NestedBlock,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match value {
        None | Some(Value::Null) => {
            if nested.min_items > 0 {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required block '{}'", path))
                        .with_detail("At least one block is required")
                        .with_attribute(path),
                );
            }
        },
        Some(v) => validate_block(&nested.block, v, path, diagnostics),
    }
}

fn validate_list_block(
    nested: &NestedBlock,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let items: &[Value] = match value {
        None | Some(Value::Null) => &[],
        Some(Value::Array(items)) => items,
        Some(v) => {
            diagnostics.push(
                Diagnostic::error(format!("Expected list for block '{}'", path))
                    .with_detail(format!("Got {}", kind(v)))
                    .with_attribute(path),
            );
            return;
        },
    };

    let len = items.len() as u32;
    if len < nested.min_items {
        diagnostics.push(
            Diagnostic::error(format!(
                "Block '{}' requires at least {} item(s), got {}",
                path, nested.min_items, len
            ))
            .with_attribute(path),
        );
    }

    // max_items of 0 means unlimited
    if nested.max_items > 0 && len > nested.max_items {
        diagnostics.push(
            Diagnostic::error(format!(
                "Block '{}' allows at most {} item(s), got {}",
                path, nested.max_items, len
            ))
            .with_attribute(path),
        );
    }

    for (i, item) in items.iter().enumerate() {
        let item_path = format!("{}.{}", path, i);
        validate_block(&nested.block, item, &item_path, diagnostics);
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_name(attr_type: &AttributeType) -> &'static str {
    match attr_type {
        AttributeType::String => "string",
        AttributeType::Int64 => "int64",
        AttributeType::Bool => "bool",
        AttributeType::List(_) => "list",
    }
}

fn is_int64(value: &Value) -> bool {
    match value {
        Value::Number(n) if n.as_i64().is_some() => true,
        // Hosts sometimes send whole numbers as floats.
        Value::Number(n) => n
            .as_f64()
            .is_some_and(|f| f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64),
        _ => false,
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic::error(format!("Invalid type for attribute '{}'", path))
        .with_detail(format!("Expected {}, got {}", expected, kind(got)))
        .with_attribute(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, AttributeFlags, Block, NestedBlock, Schema};
    use serde_json::json;

    fn link_account_like() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("tenant_id", Attribute::required_string().with_force_new())
            .with_attribute("name", Attribute::required_string())
            .with_attribute("account_id", Attribute::optional_computed_int64())
            .with_block(
                "timeouts",
                NestedBlock::single(
                    Block::new().with_attribute("create", Attribute::optional_string()),
                ),
            )
    }

    #[test]
    fn test_validate_required_string() {
        let schema = link_account_like();

        let diagnostics = validate(&schema, &json!({"tenant_id": "t-1", "name": "acct"}));
        assert!(diagnostics.is_empty());

        let diagnostics = validate(&schema, &json!({"tenant_id": "t-1"}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("name".to_string()));

        let diagnostics = validate(&schema, &json!({"tenant_id": "t-1", "name": null}));
        assert_eq!(diagnostics.len(), 1);

        let diagnostics = validate(&schema, &json!({"tenant_id": "t-1", "name": 123}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Invalid type"));
    }

    #[test]
    fn test_validate_computed_attribute_skipped() {
        let schema = link_account_like();
        let diagnostics = validate(
            &schema,
            &json!({"tenant_id": "t-1", "name": "acct", "id": 42}),
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_validate_int64() {
        let schema = Schema::v0().with_attribute("linked_account_id", Attribute::required_int64());

        assert!(is_valid(&schema, &json!({"linked_account_id": 42})));
        assert!(is_valid(&schema, &json!({"linked_account_id": 42.0})));
        assert!(!is_valid(&schema, &json!({"linked_account_id": 42.5})));
        assert!(!is_valid(&schema, &json!({"linked_account_id": "42"})));
    }

    #[test]
    fn test_validate_allowed_values_case_insensitive() {
        let schema = Schema::v0().with_attribute(
            "region",
            Attribute::optional_string().with_allowed_values(["US", "EU", "Staging"]),
        );

        assert!(is_valid(&schema, &json!({"region": "eu"})));
        assert!(is_valid(&schema, &json!({"region": "STAGING"})));
        assert!(is_valid(&schema, &json!({})));

        let diagnostics = validate(&schema, &json!({"region": "APAC"}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Invalid value"));
        assert!(diagnostics[0]
            .detail
            .as_deref()
            .is_some_and(|d| d.contains("US, EU, Staging")));

        // A wrong type is reported once, not also as a disallowed value.
        let diagnostics = validate(&schema, &json!({"region": 1}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Invalid type"));
    }

    #[test]
    fn test_validate_list_block_max_items() {
        let schema = Schema::v0().with_block(
            "oci_metadata_and_tags",
            NestedBlock::list(Block::new()).with_max_items(1),
        );

        assert!(is_valid(&schema, &json!({})));
        assert!(is_valid(&schema, &json!({"oci_metadata_and_tags": []})));
        assert!(is_valid(&schema, &json!({"oci_metadata_and_tags": [{}]})));
        assert!(is_valid(&schema, &json!({"oci_metadata_and_tags": [null]})));

        let diagnostics = validate(&schema, &json!({"oci_metadata_and_tags": [{}, {}]}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("at most 1"));

        let diagnostics = validate(&schema, &json!({"oci_metadata_and_tags": "yes"}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Expected list"));
    }

    #[test]
    fn test_validate_list_block_min_items() {
        let schema = Schema::v0().with_block(
            "rule",
            NestedBlock::list(Block::new().with_attribute("name", Attribute::required_string()))
                .with_min_items(1),
        );

        let diagnostics = validate(&schema, &json!({}));
        assert_eq!(diagnostics.len(), 1);

        let diagnostics = validate(&schema, &json!({"rule": [{"name": 5}]}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("rule.0.name".to_string()));
    }

    #[test]
    fn test_validate_single_block_nested_attribute() {
        let schema = link_account_like();

        let ok = json!({"tenant_id": "t", "name": "n", "timeouts": {"create": "5m"}});
        assert!(is_valid(&schema, &ok));

        let listed = json!({"tenant_id": "t", "name": "n", "timeouts": [{"create": "5m"}]});
        assert!(!is_valid(&schema, &listed));

        let bad = json!({"tenant_id": "t", "name": "n", "timeouts": {"create": 300}});
        let diagnostics = validate(&schema, &bad);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("timeouts.create".to_string()));
    }

    #[test]
    fn test_validate_list_attribute_elements() {
        let schema = Schema::v0().with_attribute(
            "linked_account_ids",
            Attribute::new(
                AttributeType::list(AttributeType::Int64),
                AttributeFlags::optional(),
            ),
        );

        assert!(is_valid(&schema, &json!({"linked_account_ids": [42, 43]})));

        let diagnostics = validate(&schema, &json!({"linked_account_ids": [42, "43"]}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("linked_account_ids.1".to_string()));

        let diagnostics = validate(&schema, &json!({"linked_account_ids": 42}));
        assert_eq!(diagnostics[0].attribute, Some("linked_account_ids".to_string()));
    }

    #[test]
    fn test_validate_root_must_be_object() {
        let schema = link_account_like();
        let diagnostics = validate(&schema, &json!("not an object"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Expected object");
        assert!(diagnostics[0].attribute.is_none());
    }

    #[test]
    fn test_validate_result() {
        let schema = link_account_like();
        assert!(validate_result(&schema, &json!({"tenant_id": "t", "name": "n"})).is_ok());
        let errs = validate_result(&schema, &json!({})).unwrap_err();
        assert_eq!(errs.len(), 2);
    }
}
