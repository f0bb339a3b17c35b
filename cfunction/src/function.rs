//! Prompt functions: a named host callable plus its derived parameter schema.
//!
//! ```rust
//! use cfunction::{FunctionArguments, FunctionError, PromptFunction};
//!
//! fn get_weather(arguments: FunctionArguments) -> Result<String, FunctionError> {
//!     Ok(format!("sunny in {}", arguments.string(0)?))
//! }
//!
//! let function = PromptFunction::sync_builder(get_weather)
//!     .signature(r#"city = "Paris""#)
//!     .describe("city", "City to look up")
//!     .build()
//!     .expect("function should build");
//!
//! assert_eq!(function.name(), "get_weather");
//! assert_eq!(function.schema().required(), vec!["city"]);
//! ```

use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

use ccommon::BoxFuture;
use serde_json::{Map, Value};

use crate::{
    FunctionArguments, FunctionError, FunctionOutput, FunctionSchema, Parameter,
    ParameterOverlay, ParameterType, SchemaOverlay, parse_json_object, parse_signature,
};

pub type FunctionFuture<'a, T> = BoxFuture<'a, T>;

type FunctionHandler = dyn Fn(FunctionArguments) -> FunctionFuture<'static, Result<FunctionOutput, FunctionError>>
    + Send
    + Sync;

/// What a provider needs to advertise one function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: Option<String>,
    pub schema: FunctionSchema,
}

impl FunctionDefinition {
    pub fn input_schema(&self) -> Value {
        self.schema.to_json_schema()
    }
}

pub struct PromptFunction {
    name: String,
    description: Option<String>,
    parameters: Vec<Parameter>,
    schema: FunctionSchema,
    handler: Arc<FunctionHandler>,
}

impl PromptFunction {
    pub fn builder<F, Fut, O>(handler: F) -> PromptFunctionBuilder
    where
        F: Fn(FunctionArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, FunctionError>> + Send + 'static,
        O: Into<FunctionOutput>,
    {
        let discovered_name = discover_name::<F>();
        let handler: Arc<FunctionHandler> = Arc::new(
            move |arguments: FunctionArguments| -> FunctionFuture<'static, Result<FunctionOutput, FunctionError>> {
                let future = handler(arguments);
                Box::pin(async move { future.await.map(Into::into) })
            },
        );

        PromptFunctionBuilder::new(handler, discovered_name)
    }

    pub fn sync_builder<F, O>(handler: F) -> PromptFunctionBuilder
    where
        F: Fn(FunctionArguments) -> Result<O, FunctionError> + Send + Sync + 'static,
        O: Into<FunctionOutput>,
    {
        let discovered_name = discover_name::<F>();
        let handler: Arc<FunctionHandler> = Arc::new(
            move |arguments: FunctionArguments| -> FunctionFuture<'static, Result<FunctionOutput, FunctionError>> {
                let output = handler(arguments).map(Into::into);
                Box::pin(async move { output })
            },
        );

        PromptFunctionBuilder::new(handler, discovered_name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn schema(&self) -> &FunctionSchema {
        &self.schema
    }

    pub fn definition(&self) -> FunctionDefinition {
        FunctionDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            schema: self.schema.clone(),
        }
    }

    /// Reorders named arguments into declared positional order.
    ///
    /// A missing argument takes its declared default, or null when the
    /// parameter has none. Names that are not declared are ignored.
    pub fn arguments_from(&self, named: &Map<String, Value>) -> FunctionArguments {
        let names = self
            .parameters
            .iter()
            .map(|parameter| parameter.name.clone())
            .collect();
        let values = self
            .parameters
            .iter()
            .map(|parameter| {
                named
                    .get(&parameter.name)
                    .or(parameter.default.as_ref())
                    .cloned()
                    .unwrap_or(Value::Null)
            })
            .collect();

        FunctionArguments::new(names, values)
    }

    /// Invokes the host function and renders its result as text.
    ///
    /// Errors returned by the host function are passed through unchanged.
    pub async fn invoke(&self, named: &Map<String, Value>) -> Result<String, FunctionError> {
        let arguments = self.arguments_from(named);
        let output = (self.handler)(arguments).await?;
        Ok(output.into_text())
    }

    pub async fn invoke_json(&self, arguments_json: &str) -> Result<String, FunctionError> {
        let named = parse_json_object(arguments_json)
            .map_err(|error| error.with_function_name(self.name.clone()))?;
        self.invoke(&named).await
    }
}

impl Debug for PromptFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptFunction")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

pub struct PromptFunctionBuilder {
    handler: Arc<FunctionHandler>,
    discovered_name: Option<String>,
    name: Option<String>,
    description: Option<String>,
    signature: Option<String>,
    parameters: Vec<Parameter>,
    overlay: SchemaOverlay,
}

impl PromptFunctionBuilder {
    fn new(handler: Arc<FunctionHandler>, discovered_name: Option<String>) -> Self {
        Self {
            handler,
            discovered_name,
            name: None,
            description: None,
            signature: None,
            parameters: Vec::new(),
            overlay: SchemaOverlay::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parameter-list text such as `city = "Paris", days = 3`. Parameters it
    /// declares come before any added with [`Self::parameter`].
    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn parameters(mut self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    pub fn overlay(mut self, overlay: SchemaOverlay) -> Self {
        self.overlay.merge(overlay);
        self
    }

    pub fn overlay_parameter(mut self, name: impl Into<String>, overlay: ParameterOverlay) -> Self {
        self.overlay.merge(SchemaOverlay::new().parameter(name, overlay));
        self
    }

    pub fn describe(mut self, path: &str, description: impl Into<String>) -> Self {
        self.overlay = self.overlay.describe(path, description);
        self
    }

    pub fn retype(mut self, path: &str, kind: ParameterType) -> Self {
        self.overlay = self.overlay.retype(path, kind);
        self
    }

    pub fn build(self) -> Result<PromptFunction, FunctionError> {
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            Some(_) => return Err(FunctionError::unnamed_function()),
            None => self
                .discovered_name
                .ok_or_else(FunctionError::unnamed_function)?,
        };

        let mut parameters = match self.signature.as_deref() {
            Some(signature) => parse_signature(signature)
                .map_err(|error| error.with_function_name(name.clone()))?,
            None => Vec::new(),
        };
        parameters.extend(self.parameters);

        let schema = FunctionSchema::derive(&parameters, &self.overlay)
            .map_err(|error| error.with_function_name(name.clone()))?;

        Ok(PromptFunction {
            name,
            description: self.description,
            parameters,
            schema,
            handler: self.handler,
        })
    }
}

/// Recovers a name from a named `fn` item's type. Closures and generic
/// instantiations have no usable name.
fn discover_name<F>() -> Option<String> {
    let type_name = std::any::type_name::<F>();
    let last = type_name.rsplit("::").next()?;
    let mut chars = last.chars();
    let first = chars.next()?;

    let valid = (first == '_' || first.is_alphabetic())
        && chars.all(|ch| ch == '_' || ch.is_alphanumeric());
    if !valid || last == "_" {
        return None;
    }

    Some(last.to_string())
}
