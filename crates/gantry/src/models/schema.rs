use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::errors::{SchemaError, ToolError, ToolResult};

/// Primitive JSON types a tool parameter may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ParameterType {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            ParameterType::String => value.is_string(),
            ParameterType::Number => value.is_number(),
            ParameterType::Integer => value.is_i64() || value.is_u64(),
            ParameterType::Boolean => value.is_boolean(),
            ParameterType::Array => value.is_array(),
            ParameterType::Object => value.is_object(),
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterType::String => "string",
            ParameterType::Number => "number",
            ParameterType::Integer => "integer",
            ParameterType::Boolean => "boolean",
            ParameterType::Array => "array",
            ParameterType::Object => "object",
        };
        f.write_str(name)
    }
}

/// The declared shape of one named argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub kind: ParameterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Allowed values, if the argument is restricted to a fixed set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Provider specific keys that have no typed field
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PropertySchema {
    pub fn new(kind: ParameterType) -> Self {
        Self {
            kind,
            description: None,
            tags: None,
            extra: Map::new(),
        }
    }

    pub fn string<S: Into<String>>(description: S) -> Self {
        Self::new(ParameterType::String).with_description(description)
    }

    pub fn number<S: Into<String>>(description: S) -> Self {
        Self::new(ParameterType::Number).with_description(description)
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_extra<K: Into<String>>(mut self, key: K, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// A JSON-Schema-like description of the arguments a tool accepts.
///
/// Only the subset the agent relies on is typed. Anything else a provider
/// understands goes into `extra` and is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub kind: ParameterType,
    /// Declared parameters, in declaration order
    #[serde(default, with = "ordered_properties")]
    pub properties: Vec<(String, PropertySchema)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(
        default,
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ToolSchema {
    fn default() -> Self {
        Self::object()
    }
}

impl ToolSchema {
    /// An empty object schema, the starting point for every tool
    pub fn object() -> Self {
        Self {
            kind: ParameterType::Object,
            properties: Vec::new(),
            required: Vec::new(),
            additional_properties: None,
            extra: Map::new(),
        }
    }

    /// Declare a parameter. Redeclaring a name replaces it in place.
    pub fn property<S: Into<String>>(mut self, name: S, property: PropertySchema) -> Self {
        let name = name.into();
        match self.properties.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = property,
            None => self.properties.push((name, property)),
        }
        self
    }

    pub fn find_property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, property)| property)
    }

    pub fn required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn additional_properties(mut self, allowed: bool) -> Self {
        self.additional_properties = Some(allowed);
        self
    }

    pub fn with_extra<K: Into<String>>(mut self, key: K, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Check the schema itself is well formed
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.kind != ParameterType::Object {
            return Err(SchemaError::NotAnObject(self.kind.to_string()));
        }
        if let Some(missing) = self
            .required
            .iter()
            .find(|name| self.find_property(name).is_none())
        {
            return Err(SchemaError::UnknownRequired(missing.clone()));
        }
        Ok(())
    }

    /// Check a set of call arguments against this schema.
    ///
    /// Capabilities call this before reading their arguments; the agent loop
    /// never does, since a model is free to send anything.
    pub fn validate_arguments(&self, arguments: &Value) -> ToolResult<()> {
        let object = arguments.as_object().ok_or_else(|| {
            ToolError::InvalidParameters("arguments must be a JSON object".to_string())
        })?;

        for name in &self.required {
            if object.get(name).map_or(true, Value::is_null) {
                return Err(ToolError::InvalidParameters(format!(
                    "missing required parameter '{}'",
                    name
                )));
            }
        }

        for (name, value) in object {
            let Some(property) = self.find_property(name) else {
                if self.additional_properties == Some(false) {
                    return Err(ToolError::InvalidParameters(format!(
                        "unexpected parameter '{}'",
                        name
                    )));
                }
                continue;
            };

            // explicit nulls on optional parameters mean "use the default"
            if value.is_null() {
                continue;
            }

            if !property.kind.accepts(value) {
                return Err(ToolError::InvalidParameters(format!(
                    "parameter '{}' must be of type {}",
                    name, property.kind
                )));
            }

            if let (Some(tags), Some(text)) = (&property.tags, value.as_str()) {
                if !tags.iter().any(|tag| tag == text) {
                    return Err(ToolError::InvalidParameters(format!(
                        "parameter '{}' must be one of [{}], got '{}'",
                        name,
                        tags.join(", "),
                        text
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Properties travel as a JSON object but keep the order they were declared in
mod ordered_properties {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::{Map, Value};

    use super::PropertySchema;

    pub fn serialize<S: Serializer>(
        properties: &[(String, PropertySchema)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(properties.iter().map(|(name, property)| (name, property)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, PropertySchema)>, D::Error> {
        Map::<String, Value>::deserialize(deserializer)?
            .into_iter()
            .map(|(name, value)| {
                serde_json::from_value(value)
                    .map(|property| (name, property))
                    .map_err(D::Error::custom)
            })
            .collect()
    }
}
