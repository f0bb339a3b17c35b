//! Host function return values and their textual rendering.
//!
//! ```rust
//! use cfunction::FunctionOutput;
//! use serde_json::json;
//!
//! assert_eq!(FunctionOutput::from("sunny").into_text(), "sunny");
//! assert_eq!(FunctionOutput::from(json!({"a": 1})).into_text(), r#"{"a":1}"#);
//! assert_eq!(FunctionOutput::from(()).into_text(), "");
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::FunctionError;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FunctionOutput {
    #[default]
    Empty,
    Text(String),
    Json(Value),
}

impl FunctionOutput {
    pub fn json<T>(value: &T) -> Result<Self, FunctionError>
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_value(value)
            .map(Self::from)
            .map_err(|err| FunctionError::execution(format!("result is not serializable: {err}")))
    }

    /// Text passes through, JSON is compact-encoded, and an absent value is empty.
    pub fn into_text(self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(text) => text,
            Self::Json(value) => value.to_string(),
        }
    }
}

impl From<()> for FunctionOutput {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

impl From<String> for FunctionOutput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FunctionOutput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Value> for FunctionOutput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            other => Self::Json(other),
        }
    }
}

impl From<bool> for FunctionOutput {
    fn from(value: bool) -> Self {
        Self::Json(Value::Bool(value))
    }
}

impl From<i64> for FunctionOutput {
    fn from(value: i64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<i32> for FunctionOutput {
    fn from(value: i32) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<u64> for FunctionOutput {
    fn from(value: u64) -> Self {
        Self::Json(Value::from(value))
    }
}

/// Integral values render without a fraction, so `5.0` becomes `"5"`.
impl From<f64> for FunctionOutput {
    fn from(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < 2_f64.powi(53) {
            Self::Json(Value::from(value as i64))
        } else {
            Self::Json(Value::from(value))
        }
    }
}

impl<T> From<Option<T>> for FunctionOutput
where
    T: Into<FunctionOutput>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}
