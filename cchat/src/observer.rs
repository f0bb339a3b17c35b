//! Lifecycle hooks for turns, round trips, and function dispatch.
//!
//! ```rust
//! use cchat::{ChatObserver, NoopChatObserver};
//!
//! fn accepts_observer(_observer: &dyn ChatObserver) {}
//!
//! accepts_observer(&NoopChatObserver);
//! ```

use std::time::Duration;

use ccommon::ConversationId;
use cfunction::FunctionError;
use cprovider::{FunctionCallMessage, ProviderRequest, ProviderResponse};

use crate::{ChatError, TurnState};

/// Observes a bot without influencing it. Request and response hooks only
/// fire when the bot's debug flag is set.
pub trait ChatObserver: Send + Sync {
    fn on_turn_start(&self, _conversation: &ConversationId, _prompt: &str) {}

    fn on_state_change(&self, _conversation: &ConversationId, _from: TurnState, _to: TurnState) {}

    fn on_request(
        &self,
        _conversation: &ConversationId,
        _round_trip: u32,
        _request: &ProviderRequest,
    ) {
    }

    fn on_response(
        &self,
        _conversation: &ConversationId,
        _round_trip: u32,
        _response: &ProviderResponse,
    ) {
    }

    fn on_function_start(&self, _conversation: &ConversationId, _call: &FunctionCallMessage) {}

    fn on_function_success(
        &self,
        _conversation: &ConversationId,
        _call: &FunctionCallMessage,
        _result: &str,
        _elapsed: Duration,
    ) {
    }

    fn on_function_failure(
        &self,
        _conversation: &ConversationId,
        _call: &FunctionCallMessage,
        _error: &FunctionError,
        _elapsed: Duration,
    ) {
    }

    fn on_turn_complete(&self, _conversation: &ConversationId, _round_trips: u32, _elapsed: Duration) {}

    fn on_turn_failure(
        &self,
        _conversation: &ConversationId,
        _error: &ChatError,
        _round_trips: u32,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChatObserver;

impl ChatObserver for NoopChatObserver {}
