//! The contract between the turn orchestrator and one backend's wire format.

use std::fmt::{Display, Formatter};

use cfunction::FunctionRegistry;
use serde_json::Value;

use crate::{ConversationHistory, OpaqueMessage, ProviderError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenAi,
    Anthropic,
    Echo,
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Echo => "echo",
        };

        f.write_str(id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub provider: ProviderId,
    pub body: Value,
}

impl ProviderRequest {
    pub fn new(provider: ProviderId, body: Value) -> Self {
        Self { provider, body }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub provider: ProviderId,
    pub body: Value,
}

impl ProviderResponse {
    pub fn new(provider: ProviderId, body: Value) -> Self {
        Self { provider, body }
    }
}

/// A backend's request to run one registered function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCallRequest {
    pub name: String,
    pub arguments_json: String,
    pub call_id: String,
    pub wire_item: Value,
}

impl FunctionCallRequest {
    pub fn new(
        name: impl Into<String>,
        arguments_json: impl Into<String>,
        call_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            arguments_json: arguments_json.into(),
            call_id: call_id.into(),
            wire_item: Value::Null,
        }
    }

    pub fn with_wire_item(mut self, wire_item: Value) -> Self {
        self.wire_item = wire_item;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseItem {
    FinalText(String),
    FunctionCall(FunctionCallRequest),
    Opaque(OpaqueMessage),
    Unrecognized(Value),
}

/// Converts canonical history to and from one backend's wire representation.
///
/// Implementations are pure shape adapters: they never send anything and
/// never invoke functions.
pub trait ProviderAdapter: Send + Sync {
    fn id(&self) -> ProviderId;

    fn build_request(
        &self,
        history: &ConversationHistory,
        functions: &FunctionRegistry,
        instructions: Option<&str>,
    ) -> Result<ProviderRequest, ProviderError>;

    /// The response's output items, in the order the backend returned them.
    fn response_items(&self, response: &ProviderResponse) -> Result<Vec<Value>, ProviderError>;

    fn classify(&self, item: &Value) -> ResponseItem;

    fn is_turn_complete(&self, response: &ProviderResponse) -> bool;
}

/// Reads `body[key]` as an item array. A missing key means no items.
pub(crate) fn items_at(
    response: &ProviderResponse,
    key: &str,
) -> Result<Vec<Value>, ProviderError> {
    match response.body.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(other) => Err(ProviderError::unrecognized_output(format!(
            "{} response field '{key}' is not an array: {other}",
            response.provider
        ))),
    }
}

pub(crate) fn str_field<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key).and_then(Value::as_str)
}
