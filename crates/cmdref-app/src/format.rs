// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::Value;

/// Render an argument schema as a one-line summary.
///
/// JSON-Schema-shaped input (`{ "type": "object", "properties": { .. } }`)
/// becomes a comma-joined list of `name: type` pairs, falling back to the
/// bare property name when a property declares no type. A schema without a
/// `properties` object is summarized by its own keys, skipping the `type`
/// and `$schema` markers. Anything that is not a JSON object summarizes to
/// an empty string.
pub fn format_args(schema: Option<&Value>) -> String {
    let Some(Value::Object(schema)) = schema else {
        return String::new();
    };

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        return properties
            .iter()
            .map(|(name, property)| match property_type(property) {
                Some(type_name) => format!("{name}: {type_name}"),
                None => name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");
    }

    schema
        .keys()
        .filter(|key| *key != "type" && *key != "$schema")
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

fn property_type(property: &Value) -> Option<String> {
    let declared = property.as_object()?.get("type")?;
    match declared {
        Value::Null => None,
        Value::String(name) => Some(name.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::format_args;
    use serde_json::json;

    #[test]
    fn schema_properties_become_name_type_pairs() {
        let schema = json!({ "properties": { "a": { "type": "string" }, "b": {} } });
        assert_eq!(format_args(Some(&schema)), "a: string, b");
    }

    #[test]
    fn empty_properties_summarize_to_empty_string() {
        let schema = json!({ "properties": {} });
        assert_eq!(format_args(Some(&schema)), "");
    }

    #[test]
    fn schemaless_object_joins_its_keys_without_markers() {
        let schema = json!({ "foo": 1, "type": "object", "$schema": "x" });
        assert_eq!(format_args(Some(&schema)), "foo");
    }

    #[test]
    fn non_objects_summarize_to_empty_string() {
        assert_eq!(format_args(None), "");
        assert_eq!(format_args(Some(&json!(null))), "");
        assert_eq!(format_args(Some(&json!("positional"))), "");
        assert_eq!(format_args(Some(&json!([1, 2]))), "");
    }

    #[test]
    fn non_object_properties_field_falls_back_to_key_join() {
        let schema = json!({ "properties": "broken", "path": {} });
        assert_eq!(format_args(Some(&schema)), "path, properties");
    }

    #[test]
    fn union_types_render_with_their_json_shape() {
        let schema = json!({ "properties": { "scope": { "type": ["string", "null"] } } });
        assert_eq!(format_args(Some(&schema)), r#"scope: ["string","null"]"#);
    }
}
