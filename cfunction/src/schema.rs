//! Parameter declarations, inferred schemas, and caller-supplied overlays.
//!
//! A schema is inferred from each declared parameter's default literal and
//! then augmented by an overlay. Overlay values replace inferred ones, but an
//! overlay never removes inferred structure.
//!
//! ```rust
//! use cfunction::{FunctionSchema, Parameter, ParameterType, SchemaOverlay};
//! use serde_json::json;
//!
//! let parameters = vec![
//!     Parameter::new("city").with_default("Paris"),
//!     Parameter::new("units").with_default(json!({"system": "metric"})),
//! ];
//! let overlay = SchemaOverlay::new().describe("units.system", "metric or imperial");
//!
//! let schema = FunctionSchema::derive(&parameters, &overlay).expect("schema should derive");
//! assert_eq!(schema.get("city").map(|p| &p.kind), Some(&ParameterType::String));
//!
//! let system = schema.get("units").and_then(|p| p.property("system")).expect("nested");
//! assert_eq!(system.description.as_deref(), Some("metric or imperial"));
//! ```

use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::FunctionError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParameterType {
    #[default]
    Any,
    Null,
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Null => "null",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Runtime type of a default literal. Integers report as `Number`.
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

impl Display for ParameterType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterType {
    type Err = FunctionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "any" => Ok(Self::Any),
            "null" => Ok(Self::Null),
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "integer" => Ok(Self::Integer),
            "boolean" => Ok(Self::Boolean),
            "object" => Ok(Self::Object),
            "array" => Ok(Self::Array),
            other => Err(FunctionError::invalid_arguments(format!(
                "unknown parameter type '{other}'"
            ))),
        }
    }
}

/// One declared formal parameter, with its default literal if it has one.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub default: Option<Value>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSchema {
    pub kind: ParameterType,
    pub description: Option<String>,
    pub properties: Vec<(String, ParameterSchema)>,
}

impl ParameterSchema {
    pub fn new(kind: ParameterType) -> Self {
        Self {
            kind,
            description: None,
            properties: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Infers a schema from a default literal; object members expand recursively.
    pub fn infer(default: Option<&Value>) -> Self {
        let Some(value) = default else {
            return Self::new(ParameterType::Any);
        };

        let mut schema = Self::new(ParameterType::of_value(value));
        if let Value::Object(members) = value {
            schema.properties = members
                .iter()
                .map(|(name, member)| (name.clone(), Self::infer(Some(member))))
                .collect();
        }

        schema
    }

    pub fn property(&self, name: &str) -> Option<&ParameterSchema> {
        self.properties
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, schema)| schema)
    }

    pub fn apply(&mut self, overlay: &ParameterOverlay) {
        if let Some(kind) = &overlay.kind {
            self.kind = kind.clone();
        }

        if let Some(description) = &overlay.description {
            self.description = Some(description.clone());
        }

        for (name, nested) in &overlay.properties {
            match self
                .properties
                .iter_mut()
                .find(|(existing, _)| existing == name)
            {
                Some((_, schema)) => schema.apply(nested),
                None => {
                    let mut schema = ParameterSchema::default();
                    schema.apply(nested);
                    self.properties.push((name.clone(), schema));
                }
            }
        }
    }

    /// JSON Schema fragment. `Any` is rendered without a `type` keyword.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        if self.kind != ParameterType::Any {
            object.insert("type".to_string(), Value::from(self.kind.as_str()));
        }

        if let Some(description) = &self.description {
            object.insert("description".to_string(), Value::from(description.clone()));
        }

        if !self.properties.is_empty() {
            let properties = self
                .properties
                .iter()
                .map(|(name, schema)| (name.clone(), schema.to_json()))
                .collect::<Map<_, _>>();
            object.insert("properties".to_string(), Value::Object(properties));
        }

        Value::Object(object)
    }
}

/// Ordered parameter schemas for one function.
///
/// Key order is the declared order, which is also the positional order used
/// when the function is invoked. Every parameter is listed as required.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionSchema {
    parameters: Vec<(String, ParameterSchema)>,
}

impl FunctionSchema {
    pub fn derive(
        parameters: &[Parameter],
        overlay: &SchemaOverlay,
    ) -> Result<Self, FunctionError> {
        let mut seen = HashSet::new();
        let mut derived = Vec::with_capacity(parameters.len());

        for parameter in parameters {
            if parameter.name.trim().is_empty() {
                return Err(FunctionError::schema_derivation(
                    parameter.name.clone(),
                    "parameter name must not be empty",
                ));
            }

            if !seen.insert(parameter.name.as_str()) {
                return Err(FunctionError::schema_derivation(
                    parameter.name.clone(),
                    "parameter is declared more than once",
                ));
            }

            derived.push((
                parameter.name.clone(),
                ParameterSchema::infer(parameter.default.as_ref()),
            ));
        }

        for (name, parameter_overlay) in &overlay.parameters {
            let Some((_, schema)) = derived.iter_mut().find(|(existing, _)| existing == name)
            else {
                return Err(FunctionError::schema_derivation(
                    name.clone(),
                    "overlay refers to a parameter that is not declared",
                ));
            };

            schema.apply(parameter_overlay);
        }

        Ok(Self {
            parameters: derived,
        })
    }

    pub fn parameters(&self) -> &[(String, ParameterSchema)] {
        &self.parameters
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSchema> {
        self.parameters
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, schema)| schema)
    }

    pub fn required(&self) -> Vec<&str> {
        self.names().collect()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn to_json_schema(&self) -> Value {
        let properties = self
            .parameters
            .iter()
            .map(|(name, schema)| (name.clone(), schema.to_json()))
            .collect::<Map<_, _>>();

        let mut object = Map::new();
        object.insert("type".to_string(), Value::from("object"));
        object.insert("properties".to_string(), Value::Object(properties));
        object.insert(
            "required".to_string(),
            Value::Array(self.required().into_iter().map(Value::from).collect()),
        );

        Value::Object(object)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterOverlay {
    pub kind: Option<ParameterType>,
    pub description: Option<String>,
    pub properties: Vec<(String, ParameterOverlay)>,
}

impl ParameterOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: ParameterType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn property(mut self, name: impl Into<String>, overlay: ParameterOverlay) -> Self {
        let name = name.into();
        entry_mut(&mut self.properties, &name).merge(overlay);
        self
    }

    /// Merges `other` into `self`; values set in `other` win.
    pub fn merge(&mut self, other: ParameterOverlay) {
        if other.kind.is_some() {
            self.kind = other.kind;
        }

        if other.description.is_some() {
            self.description = other.description;
        }

        for (name, nested) in other.properties {
            entry_mut(&mut self.properties, &name).merge(nested);
        }
    }
}

/// Per-parameter overlay keyed by parameter path (`"units"`, `"units.system"`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaOverlay {
    parameters: Vec<(String, ParameterOverlay)>,
}

impl SchemaOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameter(mut self, name: impl Into<String>, overlay: ParameterOverlay) -> Self {
        let name = name.into();
        entry_mut(&mut self.parameters, &name).merge(overlay);
        self
    }

    pub fn describe(mut self, path: &str, description: impl Into<String>) -> Self {
        self.path_mut(path).description = Some(description.into());
        self
    }

    pub fn retype(mut self, path: &str, kind: ParameterType) -> Self {
        self.path_mut(path).kind = Some(kind);
        self
    }

    pub fn merge(&mut self, other: SchemaOverlay) {
        for (name, overlay) in other.parameters {
            entry_mut(&mut self.parameters, &name).merge(overlay);
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParameterOverlay> {
        self.parameters
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, overlay)| overlay)
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    fn path_mut(&mut self, path: &str) -> &mut ParameterOverlay {
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        let mut overlay = entry_mut(&mut self.parameters, first);
        for segment in segments {
            overlay = entry_mut(&mut overlay.properties, segment);
        }

        overlay
    }
}

fn entry_mut<'a>(
    entries: &'a mut Vec<(String, ParameterOverlay)>,
    name: &str,
) -> &'a mut ParameterOverlay {
    let position = match entries.iter().position(|(existing, _)| existing == name) {
        Some(position) => position,
        None => {
            entries.push((name.to_string(), ParameterOverlay::default()));
            entries.len() - 1
        }
    };

    &mut entries[position].1
}
