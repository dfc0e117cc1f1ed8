//! Tool input schema.
//!
//! Declares the string properties a tool accepts, renders them as the JSON
//! Schema advertised in `tools/list`, and validates raw call arguments.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};
use thiserror::Error;

/// Raw arguments did not match the schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("arguments must be an object")]
    NotAnObject,

    #[error("missing required property \"{0}\"")]
    Missing(&'static str),

    #[error("property \"{0}\" must be a string")]
    NotAString(&'static str),

    #[error("property \"{0}\" must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone)]
struct Property {
    name: &'static str,
    description: &'static str,
    required: bool,
}

/// Schema made of string properties.
#[derive(Debug, Clone, Default)]
pub struct InputSchema {
    properties: Vec<Property>,
}

impl InputSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property that must be present as a non-empty string.
    pub fn required_string(mut self, name: &'static str, description: &'static str) -> Self {
        self.properties.push(Property {
            name,
            description,
            required: true,
        });
        self
    }

    /// Add a property that may be absent or null.
    pub fn string(mut self, name: &'static str, description: &'static str) -> Self {
        self.properties.push(Property {
            name,
            description,
            required: false,
        });
        self
    }

    /// JSON Schema object for the tool definition.
    pub fn to_json(&self) -> Value {
        let mut properties = Map::new();
        for prop in &self.properties {
            properties.insert(
                prop.name.to_string(),
                json!({
                    "type": "string",
                    "description": prop.description
                }),
            );
        }

        let required: Vec<&str> = self
            .properties
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }

    /// Check `args` against the schema. Properties are checked in
    /// declaration order and the first violation is returned. Keys the
    /// schema does not declare are ignored.
    pub fn validate(&self, args: &Value) -> Result<ValidatedInput, SchemaError> {
        let object = args.as_object().ok_or(SchemaError::NotAnObject)?;
        let mut values = BTreeMap::new();

        for prop in &self.properties {
            match object.get(prop.name) {
                None | Some(Value::Null) if prop.required => {
                    return Err(SchemaError::Missing(prop.name));
                }
                None | Some(Value::Null) => {}
                Some(Value::String(s)) if s.is_empty() && prop.required => {
                    return Err(SchemaError::Empty(prop.name));
                }
                Some(Value::String(s)) => {
                    values.insert(prop.name, s.clone());
                }
                Some(_) => return Err(SchemaError::NotAString(prop.name)),
            }
        }

        Ok(ValidatedInput { values })
    }
}

/// Arguments that passed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedInput {
    values: BTreeMap<&'static str, String>,
}

impl ValidatedInput {
    /// Value of `name`, if it was supplied.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Value of a property the schema declares as required.
    pub fn required(&self, name: &'static str) -> Result<&str, SchemaError> {
        self.get(name).ok_or(SchemaError::Missing(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> InputSchema {
        InputSchema::new()
            .required_string("name", "agent name")
            .string("instruction", "extra guidance")
            .required_string("repo", "repository")
    }

    #[test]
    fn test_to_json() {
        let value = schema().to_json();
        assert_eq!(value["type"], "object");
        assert_eq!(value["properties"]["name"]["type"], "string");
        assert_eq!(value["properties"]["instruction"]["description"], "extra guidance");
        assert_eq!(value["required"], json!(["name", "repo"]));
    }

    #[test]
    fn test_validate_ok() {
        let input = schema()
            .validate(&json!({"name": "s1", "repo": "org/repo", "extra": 42}))
            .unwrap();
        assert_eq!(input.get("name"), Some("s1"));
        assert_eq!(input.required("repo").unwrap(), "org/repo");
        assert_eq!(input.get("instruction"), None);
        assert_eq!(input.get("extra"), None);
    }

    #[test]
    fn test_validate_optional_null_and_empty() {
        let input = schema()
            .validate(&json!({"name": "s1", "repo": "r", "instruction": null}))
            .unwrap();
        assert_eq!(input.get("instruction"), None);

        let input = schema()
            .validate(&json!({"name": "s1", "repo": "r", "instruction": ""}))
            .unwrap();
        assert_eq!(input.get("instruction"), Some(""));
    }

    #[test]
    fn test_validate_errors() {
        let s = schema();
        assert_eq!(s.validate(&json!("nope")), Err(SchemaError::NotAnObject));
        assert_eq!(
            s.validate(&json!({"repo": "r"})),
            Err(SchemaError::Missing("name"))
        );
        assert_eq!(
            s.validate(&json!({"name": null, "repo": "r"})),
            Err(SchemaError::Missing("name"))
        );
        assert_eq!(
            s.validate(&json!({"name": 7, "repo": "r"})),
            Err(SchemaError::NotAString("name"))
        );
        assert_eq!(
            s.validate(&json!({"name": "", "repo": "r"})),
            Err(SchemaError::Empty("name"))
        );
        assert_eq!(
            s.validate(&json!({"name": "s1", "repo": "r", "instruction": ["x"]})),
            Err(SchemaError::NotAString("instruction"))
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SchemaError::Missing("prompt").to_string(),
            "missing required property \"prompt\""
        );
    }
}
