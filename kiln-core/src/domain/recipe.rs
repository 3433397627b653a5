//! Recipe domain types
//!
//! A recipe is a named, versioned template executed by the machine. The
//! client only cares about its identity and the schema its parameters must
//! satisfy. The schema is checked once when a recipe is loaded, so every
//! later lookup works on a known-good shape.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Value of `format` that marks a parameter as a local file to transfer
pub const FILE_FORMAT: &str = "file";

/// Recipe definition as served by `GET /recipes/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    pub parameter_schema: ParameterSchema,
}

/// Catalog entry as served by `GET /recipes`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
}

impl From<Recipe> for RecipeSummary {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            description: recipe.description,
            version: recipe.version,
        }
    }
}

/// Problems found in a recipe's schema while loading it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schema lists '{0}' as required but does not declare it")]
    UndeclaredRequired(String),

    #[error("parameter schema must be of type 'object', found '{0}'")]
    NotAnObject(String),
}

/// Typed parameter schema of a recipe
///
/// Properties keep their declaration order. Every required name refers to
/// a declared property.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawSchema")]
pub struct ParameterSchema {
    properties: IndexMap<String, PropertySchema>,
    required: Vec<String>,
}

impl ParameterSchema {
    /// Build a schema, checking that every required name is declared
    pub fn new(
        properties: IndexMap<String, PropertySchema>,
        required: Vec<String>,
    ) -> Result<Self, SchemaError> {
        if let Some(missing) = required.iter().find(|name| !properties.contains_key(*name)) {
            return Err(SchemaError::UndeclaredRequired(missing.clone()));
        }
        Ok(Self {
            properties,
            required,
        })
    }

    /// Declared properties in declaration order
    pub fn properties(&self) -> &IndexMap<String, PropertySchema> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.get(name)
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Names of the file-format properties, in declaration order
    pub fn file_properties(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|(_, prop)| prop.is_file())
            .map(|(name, _)| name.as_str())
    }
}

#[derive(Deserialize)]
struct RawSchema {
    #[serde(rename = "type", default)]
    schema_type: Option<String>,
    #[serde(default)]
    properties: IndexMap<String, PropertySchema>,
    #[serde(default)]
    required: Vec<String>,
}

impl TryFrom<RawSchema> for ParameterSchema {
    type Error = SchemaError;

    fn try_from(raw: RawSchema) -> Result<Self, Self::Error> {
        if let Some(kind) = raw.schema_type.filter(|kind| kind != "object") {
            return Err(SchemaError::NotAnObject(kind));
        }
        ParameterSchema::new(raw.properties, raw.required)
    }
}

/// Definition of a single recipe parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub kind: PropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Allowed values (`enum` in the schema document)
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

impl PropertySchema {
    pub fn new(kind: PropertyType) -> Self {
        Self {
            kind,
            title: None,
            description: None,
            default: None,
            format: None,
            allowed: None,
            minimum: None,
            maximum: None,
        }
    }

    /// A string property whose value is a local file path
    pub fn file() -> Self {
        Self {
            format: Some(FILE_FORMAT.to_string()),
            ..Self::new(PropertyType::String)
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn is_file(&self) -> bool {
        self.format.as_deref() == Some(FILE_FORMAT)
    }
}

/// JSON type a parameter value must have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl PropertyType {
    /// Whether `value` is of this type. Integers are numbers with no
    /// fractional part; every integer is also a number.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => {
                value.is_i64()
                    || value.is_u64()
                    || value.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
            }
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::Null => value.is_null(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
