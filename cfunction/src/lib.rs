//! Host functions exposed to language-model backends: declaration, schema
//! derivation, registration, and invocation.

mod args;
mod error;
mod function;
mod output;
mod registry;
mod schema;
mod signature;

pub mod prelude {
    pub use crate::{
        FunctionArguments, FunctionDefinition, FunctionError, FunctionErrorKind,
        FunctionFuture, FunctionOutput, FunctionRegistry, FunctionSchema, Parameter,
        ParameterOverlay, ParameterSchema, ParameterType, PromptFunction, SchemaOverlay,
    };
}

pub use args::{FunctionArguments, parse_json_object, parse_json_value, required_string};
pub use error::{FunctionError, FunctionErrorKind};
pub use function::{FunctionDefinition, FunctionFuture, PromptFunction, PromptFunctionBuilder};
pub use output::FunctionOutput;
pub use registry::FunctionRegistry;
pub use schema::{FunctionSchema, Parameter, ParameterOverlay, ParameterSchema, ParameterType, SchemaOverlay};
pub use signature::{parse_literal, parse_signature};
