//! Structured `tracing` events for every chat lifecycle callback.
//!
//! ```rust
//! use cchat::ChatObserver;
//! use cobserve::TracingChatObserver;
//!
//! fn accepts_observer(_observer: &dyn ChatObserver) {}
//!
//! accepts_observer(&TracingChatObserver);
//! ```

use std::time::Duration;

use cchat::{ChatError, ChatObserver, TurnState};
use ccommon::ConversationId;
use cfunction::FunctionError;
use cprovider::{FunctionCallMessage, ProviderRequest, ProviderResponse};

/// Emits `phase`/`event` tagged events. Wire bodies are logged at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingChatObserver;

impl ChatObserver for TracingChatObserver {
    fn on_turn_start(&self, conversation: &ConversationId, prompt: &str) {
        tracing::info!(
            phase = "turn",
            event = "start",
            conversation_id = %conversation,
            prompt_chars = prompt.chars().count() as u64
        );
    }

    fn on_state_change(&self, conversation: &ConversationId, from: TurnState, to: TurnState) {
        tracing::trace!(
            phase = "turn",
            event = "state_change",
            conversation_id = %conversation,
            from = %from,
            to = %to
        );
    }

    fn on_request(&self, conversation: &ConversationId, round_trip: u32, request: &ProviderRequest) {
        tracing::debug!(
            phase = "provider",
            event = "request",
            conversation_id = %conversation,
            provider = %request.provider,
            round_trip,
            body = %request.body
        );
    }

    fn on_response(
        &self,
        conversation: &ConversationId,
        round_trip: u32,
        response: &ProviderResponse,
    ) {
        tracing::debug!(
            phase = "provider",
            event = "response",
            conversation_id = %conversation,
            provider = %response.provider,
            round_trip,
            body = %response.body
        );
    }

    fn on_function_start(&self, conversation: &ConversationId, call: &FunctionCallMessage) {
        tracing::info!(
            phase = "function",
            event = "start",
            conversation_id = %conversation,
            function_name = call.function_name(),
            call_id = call.call_id()
        );
    }

    fn on_function_success(
        &self,
        conversation: &ConversationId,
        call: &FunctionCallMessage,
        result: &str,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "function",
            event = "success",
            conversation_id = %conversation,
            function_name = call.function_name(),
            call_id = call.call_id(),
            result_chars = result.chars().count() as u64,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_function_failure(
        &self,
        conversation: &ConversationId,
        call: &FunctionCallMessage,
        error: &FunctionError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "function",
            event = "failure",
            conversation_id = %conversation,
            function_name = call.function_name(),
            call_id = call.call_id(),
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_turn_complete(&self, conversation: &ConversationId, round_trips: u32, elapsed: Duration) {
        tracing::info!(
            phase = "turn",
            event = "complete",
            conversation_id = %conversation,
            round_trips,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_turn_failure(
        &self,
        conversation: &ConversationId,
        error: &ChatError,
        round_trips: u32,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "turn",
            event = "failure",
            conversation_id = %conversation,
            round_trips,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            turn_state = error.state.map(|state| state.as_str()),
            function_name = error.function_name.as_deref(),
            call_id = error.call_id.as_deref(),
            error = %error
        );
    }
}
