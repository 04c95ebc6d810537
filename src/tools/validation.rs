//! Check tool call arguments against the declared schema before running a tool.
//!
//! Only the top level is checked: object shape, required fields, primitive
//! property types, and non-blank required strings. The model fills these in,
//! so a violation goes back to it as the tool output instead of reaching the
//! local function.

use serde_json::Value;

/// Validate `args` against `schema`, describing the first violation found.
pub fn validate_arguments(args: &Value, schema: &Value) -> Result<(), String> {
    let declared_object = schema.get("type").and_then(Value::as_str) == Some("object");
    let Some(fields) = args.as_object() else {
        if declared_object {
            return Err(format!("expected object arguments, got {}", type_name(args)));
        }
        return Ok(());
    };

    let properties = schema.get("properties").and_then(Value::as_object);
    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect::<Vec<_>>())
        .unwrap_or_default();

    for name in &required {
        match fields.get(*name) {
            None | Some(Value::Null) => return Err(format!("missing required field '{name}'")),
            Some(Value::String(s)) if s.trim().is_empty() => {
                return Err(format!("required field '{name}' is blank"))
            }
            Some(_) => {}
        }
    }

    let Some(properties) = properties else {
        return Ok(());
    };
    for (key, value) in fields {
        let expected = properties
            .get(key)
            .and_then(|p| p.get("type"))
            .and_then(Value::as_str);
        if let Some(expected) = expected {
            if !matches_type(value, expected) {
                return Err(format!(
                    "field '{key}' expected type '{expected}', got {}",
                    type_name(value)
                ));
            }
        }
    }
    Ok(())
}

fn matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ticket_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "email_address": { "type": "string" },
                "description": { "type": "string" },
            },
            "required": ["email_address", "description"],
        })
    }

    #[test]
    fn accepts_complete_arguments() {
        let args = json!({ "email_address": "a@b.com", "description": "printer broken" });
        assert!(validate_arguments(&args, &ticket_schema()).is_ok());
    }

    #[test]
    fn rejects_non_object_arguments() {
        let err = validate_arguments(&json!("a@b.com"), &ticket_schema()).unwrap_err();
        assert!(err.contains("expected object"));
    }

    #[test]
    fn rejects_missing_required_field() {
        let err = validate_arguments(&json!({ "email_address": "a@b.com" }), &ticket_schema())
            .unwrap_err();
        assert_eq!(err, "missing required field 'description'");
    }

    #[test]
    fn rejects_null_required_field() {
        let args = json!({ "email_address": null, "description": "x" });
        let err = validate_arguments(&args, &ticket_schema()).unwrap_err();
        assert!(err.contains("'email_address'"));
    }

    #[test]
    fn rejects_blank_required_string() {
        let args = json!({ "email_address": "a@b.com", "description": "   " });
        let err = validate_arguments(&args, &ticket_schema()).unwrap_err();
        assert_eq!(err, "required field 'description' is blank");
    }

    #[test]
    fn rejects_wrong_property_type() {
        let args = json!({ "email_address": 42, "description": "x" });
        let err = validate_arguments(&args, &ticket_schema()).unwrap_err();
        assert!(err.contains("expected type 'string', got number"));
    }

    #[test]
    fn ignores_undeclared_fields() {
        let args = json!({ "email_address": "a@b.com", "description": "x", "priority": 1 });
        assert!(validate_arguments(&args, &ticket_schema()).is_ok());
    }

    #[test]
    fn untyped_schema_accepts_anything() {
        assert!(validate_arguments(&Value::Null, &json!({})).is_ok());
        assert!(validate_arguments(&json!({ "x": 1 }), &json!({})).is_ok());
    }
}
