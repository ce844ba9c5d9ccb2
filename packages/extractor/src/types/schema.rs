//! Extraction schemas built from caller-supplied field names.
//!
//! Every field is free text. The request sent to a model wraps the record in a
//! `listings` array so one page can yield many records.

use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::error::{ExtractionError, Result, SchemaValidationError};

/// Key of the array that wraps extracted records.
pub const LISTINGS_KEY: &str = "listings";

/// Key of the URL list in a pagination result.
pub const PAGE_URLS_KEY: &str = "page_urls";

/// Type of a single schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Free-form text
    Text,
}

impl FieldType {
    fn json_schema(&self) -> Value {
        match self {
            Self::Text => json!({"type": "string"}),
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Text => value.is_string(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Text => "string",
        }
    }
}

/// Ordered field name to type mapping.
///
/// Order only affects output column order, never validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: IndexMap<String, FieldType>,
}

/// A named JSON schema ready to hand to a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSchema {
    pub name: String,
    pub json_schema: Value,
}

/// Build a schema where every named field is text.
///
/// Names are trimmed. Empty lists, blank names and duplicates are rejected.
pub fn build_schema<I, S>(field_names: I) -> Result<Schema>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut fields = IndexMap::new();

    for (position, raw) in field_names.into_iter().enumerate() {
        let name = raw.as_ref().trim();
        if name.is_empty() {
            return Err(ExtractionError::InvalidSchema {
                reason: format!("blank field name at position {}", position),
            });
        }
        if fields.insert(name.to_string(), FieldType::Text).is_some() {
            return Err(ExtractionError::InvalidSchema {
                reason: format!("duplicate field: {}", name),
            });
        }
    }

    if fields.is_empty() {
        return Err(ExtractionError::InvalidSchema {
            reason: "at least one field is required".to_string(),
        });
    }

    Ok(Schema { fields })
}

impl Schema {
    /// Field names in insertion order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Strict-mode object schema for a single record.
    pub fn to_json_schema(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, ty)| (name.clone(), ty.json_schema()))
            .collect();

        llm_client::into_strict(json!({
            "type": "object",
            "properties": properties,
        }))
    }

    /// The `{"listings": [record]}` container sent for extraction.
    pub fn listings(&self) -> TargetSchema {
        TargetSchema {
            name: "DynamicListingsContainer".to_string(),
            json_schema: llm_client::into_strict(json!({
                "type": "object",
                "properties": {
                    LISTINGS_KEY: {
                        "type": "array",
                        "items": self.to_json_schema(),
                    }
                },
            })),
        }
    }

    /// Check a normalized value against this schema.
    ///
    /// Accepts either a listings container whose items all conform or a bare
    /// record. Reports the first problem found.
    pub fn validate(&self, value: &Value) -> std::result::Result<(), SchemaValidationError> {
        let obj = value.as_object().ok_or(SchemaValidationError::NotAnObject {
            found: json_type(value),
        })?;

        let is_container = !self.fields.contains_key(LISTINGS_KEY)
            && obj.len() == 1
            && obj.contains_key(LISTINGS_KEY);

        if !is_container {
            return self.validate_record(value);
        }

        match &obj[LISTINGS_KEY] {
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    self.validate_record(item)
                        .map_err(|e| SchemaValidationError::InItem {
                            field: LISTINGS_KEY.to_string(),
                            index,
                            source: Box::new(e),
                        })?;
                }
                Ok(())
            }
            other => Err(SchemaValidationError::WrongType {
                field: LISTINGS_KEY.to_string(),
                expected: "array",
                found: json_type(other),
            }),
        }
    }

    fn validate_record(&self, value: &Value) -> std::result::Result<(), SchemaValidationError> {
        let obj = value.as_object().ok_or(SchemaValidationError::NotAnObject {
            found: json_type(value),
        })?;

        for (name, ty) in &self.fields {
            match obj.get(name) {
                None => {
                    return Err(SchemaValidationError::MissingField {
                        field: name.clone(),
                    })
                }
                Some(v) if !ty.accepts(v) => {
                    return Err(SchemaValidationError::WrongType {
                        field: name.clone(),
                        expected: ty.label(),
                        found: json_type(v),
                    })
                }
                Some(_) => {}
            }
        }

        if let Some(extra) = obj.keys().find(|k| !self.fields.contains_key(k.as_str())) {
            return Err(SchemaValidationError::UnexpectedField {
                field: extra.clone(),
            });
        }

        Ok(())
    }
}

/// The fixed `{page_urls: [string]}` schema used for pagination discovery.
pub fn pagination_schema() -> TargetSchema {
    TargetSchema {
        name: "PaginationData".to_string(),
        json_schema: llm_client::into_strict(json!({
            "type": "object",
            "properties": {
                PAGE_URLS_KEY: {
                    "type": "array",
                    "items": {"type": "string"},
                }
            },
        })),
    }
}

/// Check a normalized pagination result.
pub fn validate_pagination(value: &Value) -> std::result::Result<(), SchemaValidationError> {
    let obj = value.as_object().ok_or(SchemaValidationError::NotAnObject {
        found: json_type(value),
    })?;

    let urls = obj
        .get(PAGE_URLS_KEY)
        .ok_or_else(|| SchemaValidationError::MissingField {
            field: PAGE_URLS_KEY.to_string(),
        })?;

    let items = urls
        .as_array()
        .ok_or_else(|| SchemaValidationError::WrongType {
            field: PAGE_URLS_KEY.to_string(),
            expected: "array",
            found: json_type(urls),
        })?;

    for (index, item) in items.iter().enumerate() {
        if !item.is_string() {
            return Err(SchemaValidationError::InItem {
                field: PAGE_URLS_KEY.to_string(),
                index,
                source: Box::new(SchemaValidationError::WrongType {
                    field: PAGE_URLS_KEY.to_string(),
                    expected: "string",
                    found: json_type(item),
                }),
            });
        }
    }

    if let Some(extra) = obj.keys().find(|k| k.as_str() != PAGE_URLS_KEY) {
        return Err(SchemaValidationError::UnexpectedField {
            field: extra.clone(),
        });
    }

    Ok(())
}

/// URLs listed in a normalized pagination result. Non-string entries are dropped.
pub fn page_urls(value: &Value) -> Vec<String> {
    value
        .get(PAGE_URLS_KEY)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn json_type(value: &Value) -> &'static str {
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

    #[test]
    fn test_field_set_matches_input() {
        let schema = build_schema(["title", "price", "location"]).unwrap();
        assert_eq!(schema.field_names(), vec!["title", "price", "location"]);
        assert_eq!(schema.len(), 3);
    }

    #[test]
    fn test_names_are_trimmed() {
        let schema = build_schema([" title ", "price"]).unwrap();
        assert_eq!(schema.field_names(), vec!["title", "price"]);
    }

    #[test]
    fn test_rejects_empty_list() {
        let names: Vec<String> = Vec::new();
        assert!(matches!(
            build_schema(names),
            Err(ExtractionError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicates_after_trim() {
        let err = build_schema(["title", "title "]).unwrap_err();
        assert!(err.to_string().contains("duplicate field: title"));
    }

    #[test]
    fn test_rejects_blank_name() {
        let err = build_schema(["title", "  "]).unwrap_err();
        assert!(err.to_string().contains("position 1"));
    }

    #[test]
    fn test_json_schema_is_strict() {
        let schema = build_schema(["title", "price"]).unwrap();
        let js = schema.to_json_schema();
        assert_eq!(js["additionalProperties"], json!(false));
        assert_eq!(js["required"], json!(["title", "price"]));
        assert_eq!(js["properties"]["price"], json!({"type": "string"}));
    }

    #[test]
    fn test_listings_container_shape() {
        let schema = build_schema(["title"]).unwrap();
        let target = schema.listings();
        let items = &target.json_schema["properties"]["listings"]["items"];
        assert_eq!(items["required"], json!(["title"]));
        assert_eq!(target.json_schema["required"], json!(["listings"]));
    }

    #[test]
    fn test_validate_container_and_bare_record() {
        let schema = build_schema(["title", "price"]).unwrap();
        let record = json!({"title": "Loft", "price": "$900"});

        assert!(schema.validate(&record).is_ok());
        assert!(schema
            .validate(&json!({"listings": [record.clone(), record]}))
            .is_ok());
    }

    #[test]
    fn test_validate_reports_problems() {
        let schema = build_schema(["title", "price"]).unwrap();

        assert_eq!(
            schema.validate(&json!({"title": "Loft"})),
            Err(SchemaValidationError::MissingField {
                field: "price".into()
            })
        );
        assert_eq!(
            schema.validate(&json!({"title": "Loft", "price": 900})),
            Err(SchemaValidationError::WrongType {
                field: "price".into(),
                expected: "string",
                found: "number",
            })
        );
        assert_eq!(
            schema.validate(&json!({"title": "a", "price": "b", "beds": "2"})),
            Err(SchemaValidationError::UnexpectedField {
                field: "beds".into()
            })
        );
        assert!(matches!(
            schema.validate(&json!({"listings": [{"title": "a"}]})),
            Err(SchemaValidationError::InItem { index: 0, .. })
        ));
        assert!(schema.validate(&json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn test_pagination_schema_and_validation() {
        let target = pagination_schema();
        assert_eq!(
            target.json_schema["properties"]["page_urls"]["items"],
            json!({"type": "string"})
        );

        assert!(validate_pagination(&json!({"page_urls": ["https://a.com/p/1"]})).is_ok());
        assert!(validate_pagination(&json!({"page_urls": [1]})).is_err());
        assert!(validate_pagination(&json!({"raw_text": "nope"})).is_err());
    }

    #[test]
    fn test_page_urls_drops_non_strings() {
        let value = json!({"page_urls": ["https://a.com/1", 2, null, "https://a.com/3"]});
        assert_eq!(
            page_urls(&value),
            vec!["https://a.com/1".to_string(), "https://a.com/3".to_string()]
        );
        assert!(page_urls(&json!({"raw_text": "x"})).is_empty());
    }
}
