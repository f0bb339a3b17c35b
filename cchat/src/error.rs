//! Turn-level errors with the context needed to diagnose them.
//!
//! ```rust
//! use cchat::{ChatError, ChatErrorKind};
//! use cfunction::FunctionError;
//!
//! let error = ChatError::from(FunctionError::unknown_function("lookup").with_call_id("call_1"));
//! assert_eq!(error.kind, ChatErrorKind::UnknownFunction);
//! assert_eq!(error.call_id.as_deref(), Some("call_1"));
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use cfunction::{FunctionError, FunctionErrorKind};
use cprovider::{ProviderError, ProviderErrorKind, ProviderId};
use serde_json::Value;

use crate::TurnState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    UnnamedFunction,
    DuplicateFunctionName,
    SchemaDerivation,
    UnknownFunction,
    UnrecognizedOutput,
    FunctionInvocation,
    InvalidRequest,
    Provider,
    MissingFinalText,
    RoundTripLimit,
}

/// The lower-level error a [`ChatError`] was raised from, kept unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatErrorSource {
    Function(FunctionError),
    Provider(ProviderError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
    pub function_name: Option<String>,
    pub call_id: Option<String>,
    pub state: Option<TurnState>,
    pub source: Option<ChatErrorSource>,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            function_name: None,
            call_id: None,
            state: None,
            source: None,
        }
    }

    pub fn unrecognized_output(provider: ProviderId, item: &Value) -> Self {
        Self::new(
            ChatErrorKind::UnrecognizedOutput,
            format!("{provider} adapter cannot classify output item {item}"),
        )
    }

    pub fn missing_final_text() -> Self {
        Self::new(
            ChatErrorKind::MissingFinalText,
            "turn completed without a final text item",
        )
    }

    pub fn round_trip_limit(limit: u32) -> Self {
        Self::new(
            ChatErrorKind::RoundTripLimit,
            format!("turn did not complete within {limit} round trips"),
        )
    }

    /// Wraps an error raised while dispatching one call.
    pub fn function_call(
        error: FunctionError,
        function_name: impl Into<String>,
        call_id: impl Into<String>,
    ) -> Self {
        Self::from(error)
            .with_function_name(function_name)
            .with_call_id(call_id)
    }

    pub fn with_function_name(mut self, function_name: impl Into<String>) -> Self {
        self.function_name = Some(function_name.into());
        self
    }

    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = Some(call_id.into());
        self
    }

    pub fn with_state(mut self, state: TurnState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn function_error(&self) -> Option<&FunctionError> {
        match &self.source {
            Some(ChatErrorSource::Function(error)) => Some(error),
            _ => None,
        }
    }

    pub fn provider_error(&self) -> Option<&ProviderError> {
        match &self.source {
            Some(ChatErrorSource::Provider(error)) => Some(error),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.provider_error().is_some_and(|error| error.retryable)
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.kind)?;
        match (&self.function_name, &self.call_id) {
            (Some(function_name), Some(call_id)) => {
                write!(f, " [function={function_name}, call_id={call_id}]")?
            }
            (Some(function_name), None) => write!(f, " [function={function_name}]")?,
            (None, Some(call_id)) => write!(f, " [call_id={call_id}]")?,
            (None, None) => {}
        }

        write!(f, ": {}", self.message)
    }
}

impl Error for ChatError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.source {
            Some(ChatErrorSource::Function(error)) => Some(error),
            Some(ChatErrorSource::Provider(error)) => Some(error),
            None => None,
        }
    }
}

impl From<FunctionError> for ChatError {
    fn from(error: FunctionError) -> Self {
        let kind = match error.kind {
            FunctionErrorKind::UnnamedFunction => ChatErrorKind::UnnamedFunction,
            FunctionErrorKind::DuplicateFunctionName => ChatErrorKind::DuplicateFunctionName,
            FunctionErrorKind::SchemaDerivation => ChatErrorKind::SchemaDerivation,
            FunctionErrorKind::UnknownFunction => ChatErrorKind::UnknownFunction,
            FunctionErrorKind::InvalidArguments | FunctionErrorKind::Execution => {
                ChatErrorKind::FunctionInvocation
            }
        };

        Self {
            kind,
            message: error.message.clone(),
            function_name: error.function_name.clone(),
            call_id: error.call_id.clone(),
            state: None,
            source: Some(ChatErrorSource::Function(error)),
        }
    }
}

impl From<ProviderError> for ChatError {
    fn from(error: ProviderError) -> Self {
        let kind = match error.kind {
            ProviderErrorKind::UnrecognizedOutput => ChatErrorKind::UnrecognizedOutput,
            ProviderErrorKind::InvalidRequest => ChatErrorKind::InvalidRequest,
            _ => ChatErrorKind::Provider,
        };

        Self {
            kind,
            message: error.message.clone(),
            function_name: None,
            call_id: None,
            state: None,
            source: Some(ChatErrorSource::Provider(error)),
        }
    }
}
