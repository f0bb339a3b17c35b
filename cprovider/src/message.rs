//! Canonical conversation messages shared by every provider adapter.
//!
//! ```rust
//! use cprovider::{Message, Role};
//!
//! let message = Message::user("hello");
//! assert_eq!(message.role(), Some(Role::User));
//! assert_eq!(message.text(), Some("hello"));
//! ```

use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use cfunction::{FunctionError, PromptFunction, parse_json_object};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::{FunctionCallRequest, ProviderId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    pub role: Role,
    pub text: String,
}

impl TextMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CallState {
    Unresolved,
    Resolved(String),
}

/// A function invocation requested by the backend.
///
/// The result is computed at most once. Later calls to [`Self::resolve`]
/// return the stored text without invoking the function again.
pub struct FunctionCallMessage {
    function: Arc<PromptFunction>,
    call_id: String,
    arguments: Map<String, Value>,
    wire_item: Value,
    state: Mutex<CallState>,
}

impl FunctionCallMessage {
    pub fn new(
        function: Arc<PromptFunction>,
        request: FunctionCallRequest,
    ) -> Result<Self, FunctionError> {
        let arguments = parse_json_object(&request.arguments_json).map_err(|error| {
            error
                .with_function_name(request.name.clone())
                .with_call_id(request.call_id.clone())
        })?;

        Ok(Self {
            function,
            call_id: request.call_id,
            arguments,
            wire_item: request.wire_item,
            state: Mutex::new(CallState::Unresolved),
        })
    }

    /// Marks the call as already resolved, for seeding a resumed conversation.
    pub fn with_result(self, result: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(CallState::Resolved(result.into())),
            ..self
        }
    }

    pub fn function(&self) -> &Arc<PromptFunction> {
        &self.function
    }

    pub fn function_name(&self) -> &str {
        self.function.name()
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn arguments(&self) -> &Map<String, Value> {
        &self.arguments
    }

    /// The item exactly as the backend sent it, for verbatim replay.
    pub fn wire_item(&self) -> &Value {
        &self.wire_item
    }

    pub async fn resolve(&self) -> Result<String, FunctionError> {
        let mut state = self.state.lock().await;
        if let CallState::Resolved(result) = &*state {
            return Ok(result.clone());
        }

        let result = self.function.invoke(&self.arguments).await?;
        *state = CallState::Resolved(result.clone());
        Ok(result)
    }

    pub async fn result_message(&self) -> Result<FunctionResultMessage, FunctionError> {
        let result = self.resolve().await?;
        Ok(FunctionResultMessage::new(
            self.call_id.clone(),
            self.function_name(),
            result,
        ))
    }

    /// The memoized result, if resolution already completed.
    pub fn result(&self) -> Option<String> {
        let state = self.state.try_lock().ok()?;
        match &*state {
            CallState::Resolved(result) => Some(result.clone()),
            CallState::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.result().is_some()
    }
}

impl Debug for FunctionCallMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionCallMessage")
            .field("function", &self.function.name())
            .field("call_id", &self.call_id)
            .field("arguments", &self.arguments)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionResultMessage {
    pub call_id: String,
    pub function_name: String,
    pub result: String,
}

impl FunctionResultMessage {
    pub fn new(
        call_id: impl Into<String>,
        function_name: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            function_name: function_name.into(),
            result: result.into(),
        }
    }
}

/// Backend-specific output replayed verbatim and never interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueMessage {
    pub provider: ProviderId,
    pub id: Option<String>,
    pub payload: Value,
}

impl OpaqueMessage {
    pub fn new(provider: ProviderId, payload: Value) -> Self {
        let id = payload
            .get("id")
            .and_then(Value::as_str)
            .map(ToString::to_string);

        Self {
            provider,
            id,
            payload,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text(Role),
    FunctionCall,
    FunctionResult,
    Opaque,
}

#[derive(Debug, Clone)]
pub enum Message {
    Text(TextMessage),
    FunctionCall(Arc<FunctionCallMessage>),
    FunctionResult(FunctionResultMessage),
    Opaque(OpaqueMessage),
}

impl Message {
    pub fn text_message(role: Role, text: impl Into<String>) -> Self {
        Self::Text(TextMessage::new(role, text))
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::text_message(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text_message(Role::Assistant, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::text_message(Role::System, text)
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Text(message) => MessageKind::Text(message.role),
            Self::FunctionCall(_) => MessageKind::FunctionCall,
            Self::FunctionResult(_) => MessageKind::FunctionResult,
            Self::Opaque(_) => MessageKind::Opaque,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Self::Text(message) => Some(message.role),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(message) => Some(&message.text),
            Self::FunctionResult(message) => Some(&message.result),
            _ => None,
        }
    }

    pub fn is_function_call(&self) -> bool {
        matches!(self, Self::FunctionCall(_))
    }
}

impl From<TextMessage> for Message {
    fn from(message: TextMessage) -> Self {
        Self::Text(message)
    }
}

impl From<FunctionCallMessage> for Message {
    fn from(message: FunctionCallMessage) -> Self {
        Self::FunctionCall(Arc::new(message))
    }
}

impl From<FunctionResultMessage> for Message {
    fn from(message: FunctionResultMessage) -> Self {
        Self::FunctionResult(message)
    }
}

impl From<OpaqueMessage> for Message {
    fn from(message: OpaqueMessage) -> Self {
        Self::Opaque(message)
    }
}
