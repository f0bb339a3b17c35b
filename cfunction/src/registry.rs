//! Function registry keyed by unique function name, in registration order.

use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

use ccommon::Registry;

use crate::{
    FunctionArguments, FunctionDefinition, FunctionError, FunctionOutput, FunctionSchema,
    PromptFunction,
};

#[derive(Default, Clone)]
pub struct FunctionRegistry {
    functions: Registry<String, Arc<PromptFunction>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from an ordered list of functions. A repeated name
    /// fails the whole construction.
    pub fn with_functions(
        functions: impl IntoIterator<Item = PromptFunction>,
    ) -> Result<Self, FunctionError> {
        let mut registry = Self::new();
        for function in functions {
            registry.register(function)?;
        }

        Ok(registry)
    }

    pub fn register(&mut self, function: PromptFunction) -> Result<(), FunctionError> {
        let name = function.name().to_string();
        if self.functions.contains_key(&name) {
            return Err(FunctionError::duplicate_function_name(name));
        }

        self.functions.insert(name, Arc::new(function));
        Ok(())
    }

    pub fn register_fn<F, Fut, O>(
        &mut self,
        name: impl Into<String>,
        signature: &str,
        handler: F,
    ) -> Result<(), FunctionError>
    where
        F: Fn(FunctionArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, FunctionError>> + Send + 'static,
        O: Into<FunctionOutput>,
    {
        let function = PromptFunction::builder(handler)
            .name(name)
            .signature(signature)
            .build()?;
        self.register(function)
    }

    pub fn register_sync_fn<F, O>(
        &mut self,
        name: impl Into<String>,
        signature: &str,
        handler: F,
    ) -> Result<(), FunctionError>
    where
        F: Fn(FunctionArguments) -> Result<O, FunctionError> + Send + Sync + 'static,
        O: Into<FunctionOutput>,
    {
        let function = PromptFunction::sync_builder(handler)
            .name(name)
            .signature(signature)
            .build()?;
        self.register(function)
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<PromptFunction>, FunctionError> {
        self.get(name)
            .ok_or_else(|| FunctionError::unknown_function(name))
    }

    pub fn get(&self, name: &str) -> Option<Arc<PromptFunction>> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<PromptFunction>> {
        self.functions.remove(name)
    }

    pub fn schema(&self, name: &str) -> Result<&FunctionSchema, FunctionError> {
        self.functions
            .get(name)
            .map(|function| function.schema())
            .ok_or_else(|| FunctionError::unknown_function(name))
    }

    pub fn definitions(&self) -> Vec<FunctionDefinition> {
        self.functions
            .values()
            .map(|function| function.definition())
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<PromptFunction>> {
        self.functions.values()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Debug for FunctionRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
