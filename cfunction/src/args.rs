//! Argument parsing and positional argument access for prompt functions.
//!
//! ```rust
//! use cfunction::{parse_json_object, required_string};
//!
//! let args = parse_json_object(r#"{"query":"rust"}"#).expect("object should parse");
//! let query = required_string(&args, "query").expect("query should be present");
//! assert_eq!(query, "rust");
//! ```

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::FunctionError;

pub fn parse_json_value(args_json: &str) -> Result<Value, FunctionError> {
    serde_json::from_str(args_json)
        .map_err(|err| FunctionError::invalid_arguments(format!("invalid JSON arguments: {err}")))
}

/// Parses raw call arguments. Blank input is treated as an empty object.
pub fn parse_json_object(args_json: &str) -> Result<Map<String, Value>, FunctionError> {
    if args_json.trim().is_empty() {
        return Ok(Map::new());
    }

    match parse_json_value(args_json)? {
        Value::Object(object) => Ok(object),
        _ => Err(FunctionError::invalid_arguments(
            "expected JSON object arguments",
        )),
    }
}

pub fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, FunctionError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| FunctionError::invalid_arguments(format!("missing required string: '{key}'")))
}

/// Arguments in declared positional order, as handed to a host function.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionArguments {
    names: Vec<String>,
    values: Vec<Value>,
}

impl FunctionArguments {
    pub fn new(names: Vec<String>, values: Vec<Value>) -> Self {
        Self { names, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn named(&self, name: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|existing| existing == name)
            .and_then(|index| self.values.get(index))
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn string(&self, index: usize) -> Result<String, FunctionError> {
        self.typed(index, "string", |value| value.as_str().map(ToString::to_string))
    }

    pub fn number(&self, index: usize) -> Result<f64, FunctionError> {
        self.typed(index, "number", Value::as_f64)
    }

    pub fn integer(&self, index: usize) -> Result<i64, FunctionError> {
        self.typed(index, "integer", Value::as_i64)
    }

    pub fn boolean(&self, index: usize) -> Result<bool, FunctionError> {
        self.typed(index, "boolean", Value::as_bool)
    }

    pub fn object(&self, index: usize) -> Result<&Map<String, Value>, FunctionError> {
        self.typed(index, "object", Value::as_object)
    }

    pub fn deserialize<T>(&self, index: usize) -> Result<T, FunctionError>
    where
        T: DeserializeOwned,
    {
        let value = self.require(index)?;
        serde_json::from_value(value.clone()).map_err(|err| {
            FunctionError::invalid_arguments(format!("argument '{}': {err}", self.label(index)))
        })
    }

    fn typed<'a, T>(
        &'a self,
        index: usize,
        expected: &str,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T, FunctionError> {
        let value = self.require(index)?;
        extract(value).ok_or_else(|| {
            FunctionError::invalid_arguments(format!(
                "argument '{}' must be a {expected}",
                self.label(index)
            ))
        })
    }

    fn require(&self, index: usize) -> Result<&Value, FunctionError> {
        self.values.get(index).ok_or_else(|| {
            FunctionError::invalid_arguments(format!("argument #{index} was not declared"))
        })
    }

    fn label(&self, index: usize) -> String {
        self.names
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("#{index}"))
    }
}
