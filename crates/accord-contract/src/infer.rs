//! Shape inference for arbitrary JSON values.

use serde_json::Value;

const INDENT: &str = "    ";

/// Renders a minimal [`Schema`](crate::Schema) builder expression that
/// accepts `value`.
///
/// Arrays are inferred from their first element; objects recurse into every
/// field.
///
/// ```
/// use accord_contract::infer_shape;
/// use serde_json::json;
///
/// assert_eq!(infer_shape(&json!([])), "Schema::array(Schema::any())");
/// assert_eq!(
///     infer_shape(&json!({"id": "1"})),
///     "Schema::object([\n    (\"id\", Schema::string()),\n])"
/// );
/// ```
pub fn infer_shape(value: &Value) -> String {
    render(value, 0)
}

fn render(value: &Value, depth: usize) -> String {
    match value {
        Value::Null => "Schema::null()".to_string(),
        Value::Bool(_) => "Schema::boolean()".to_string(),
        Value::Number(_) => "Schema::number()".to_string(),
        Value::String(_) => "Schema::string()".to_string(),
        Value::Array(items) => match items.first() {
            Some(first) => format!("Schema::array({})", render(first, depth)),
            None => "Schema::array(Schema::any())".to_string(),
        },
        Value::Object(fields) if fields.is_empty() => "Schema::object([])".to_string(),
        Value::Object(fields) => {
            let inner = INDENT.repeat(depth + 1);
            let lines: Vec<String> = fields
                .iter()
                .map(|(key, field)| {
                    let key = serde_json::to_string(key).unwrap_or_else(|_| format!("\"{key}\""));
                    format!("{inner}({key}, {}),", render(field, depth + 1))
                })
                .collect();
            format!(
                "Schema::object([\n{}\n{}])",
                lines.join("\n"),
                INDENT.repeat(depth)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_eq!(infer_shape(&json!(null)), "Schema::null()");
        assert_eq!(infer_shape(&json!(true)), "Schema::boolean()");
        assert_eq!(infer_shape(&json!(1.5)), "Schema::number()");
        assert_eq!(infer_shape(&json!("x")), "Schema::string()");
    }

    #[test]
    fn test_nested_object() {
        let shape = infer_shape(&json!({
            "id": "not-a-number",
            "tags": [{"name": "a"}]
        }));
        let expected = "Schema::object([
    (\"id\", Schema::string()),
    (\"tags\", Schema::array(Schema::object([
        (\"name\", Schema::string()),
    ]))),
])";
        assert_eq!(shape, expected);
    }

    #[test]
    fn test_keys_are_escaped() {
        let shape = infer_shape(&json!({"say \"hi\"": 1}));
        assert!(shape.contains(r#"("say \"hi\"", Schema::number())"#));
    }
}
