//! Function registration, derivation, and invocation errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionErrorKind {
    UnnamedFunction,
    DuplicateFunctionName,
    UnknownFunction,
    SchemaDerivation,
    InvalidArguments,
    Execution,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionError {
    pub kind: FunctionErrorKind,
    pub message: String,
    pub function_name: Option<String>,
    pub call_id: Option<String>,
    pub parameter: Option<String>,
}

impl FunctionError {
    pub fn new(kind: FunctionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            function_name: None,
            call_id: None,
            parameter: None,
        }
    }

    pub fn unnamed_function() -> Self {
        Self::new(
            FunctionErrorKind::UnnamedFunction,
            "function has no name: supply one explicitly or register a named fn item",
        )
    }

    pub fn duplicate_function_name(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            FunctionErrorKind::DuplicateFunctionName,
            format!("function '{name}' is already registered"),
        )
        .with_function_name(name)
    }

    pub fn unknown_function(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            FunctionErrorKind::UnknownFunction,
            format!("function '{name}' is not registered"),
        )
        .with_function_name(name)
    }

    pub fn schema_derivation(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        let parameter = parameter.into();
        Self::new(
            FunctionErrorKind::SchemaDerivation,
            format!("parameter '{parameter}': {}", message.into()),
        )
        .with_parameter(parameter)
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(FunctionErrorKind::InvalidArguments, message)
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(FunctionErrorKind::Execution, message)
    }

    pub fn with_function_name(mut self, function_name: impl Into<String>) -> Self {
        self.function_name = Some(function_name.into());
        self
    }

    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = Some(call_id.into());
        self
    }

    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    /// Errors raised while setting functions up, before any call is made.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self.kind,
            FunctionErrorKind::UnnamedFunction
                | FunctionErrorKind::DuplicateFunctionName
                | FunctionErrorKind::SchemaDerivation
        )
    }
}

impl Display for FunctionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.function_name, &self.call_id) {
            (Some(function_name), Some(call_id)) => write!(
                f,
                "{:?} [function={}, call_id={}]: {}",
                self.kind, function_name, call_id, self.message
            ),
            (Some(function_name), None) => {
                write!(f, "{:?} [function={}]: {}", self.kind, function_name, self.message)
            }
            _ => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for FunctionError {}
