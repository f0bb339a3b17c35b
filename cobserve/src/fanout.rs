use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use cchat::{ChatError, ChatObserver, TurnState};
use ccommon::ConversationId;
use cfunction::FunctionError;
use cprovider::{FunctionCallMessage, ProviderRequest, ProviderResponse};

/// Forwards every callback to each observer in the order they were added.
#[derive(Clone, Default)]
pub struct FanoutChatObserver {
    observers: Vec<Arc<dyn ChatObserver>>,
}

impl FanoutChatObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: impl ChatObserver + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    pub fn with_shared(mut self, observer: Arc<dyn ChatObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn push(&mut self, observer: Arc<dyn ChatObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl Debug for FanoutChatObserver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutChatObserver")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ChatObserver for FanoutChatObserver {
    fn on_turn_start(&self, conversation: &ConversationId, prompt: &str) {
        for observer in &self.observers {
            observer.on_turn_start(conversation, prompt);
        }
    }

    fn on_state_change(&self, conversation: &ConversationId, from: TurnState, to: TurnState) {
        for observer in &self.observers {
            observer.on_state_change(conversation, from, to);
        }
    }

    fn on_request(&self, conversation: &ConversationId, round_trip: u32, request: &ProviderRequest) {
        for observer in &self.observers {
            observer.on_request(conversation, round_trip, request);
        }
    }

    fn on_response(
        &self,
        conversation: &ConversationId,
        round_trip: u32,
        response: &ProviderResponse,
    ) {
        for observer in &self.observers {
            observer.on_response(conversation, round_trip, response);
        }
    }

    fn on_function_start(&self, conversation: &ConversationId, call: &FunctionCallMessage) {
        for observer in &self.observers {
            observer.on_function_start(conversation, call);
        }
    }

    fn on_function_success(
        &self,
        conversation: &ConversationId,
        call: &FunctionCallMessage,
        result: &str,
        elapsed: Duration,
    ) {
        for observer in &self.observers {
            observer.on_function_success(conversation, call, result, elapsed);
        }
    }

    fn on_function_failure(
        &self,
        conversation: &ConversationId,
        call: &FunctionCallMessage,
        error: &FunctionError,
        elapsed: Duration,
    ) {
        for observer in &self.observers {
            observer.on_function_failure(conversation, call, error, elapsed);
        }
    }

    fn on_turn_complete(&self, conversation: &ConversationId, round_trips: u32, elapsed: Duration) {
        for observer in &self.observers {
            observer.on_turn_complete(conversation, round_trips, elapsed);
        }
    }

    fn on_turn_failure(
        &self,
        conversation: &ConversationId,
        error: &ChatError,
        round_trips: u32,
        elapsed: Duration,
    ) {
        for observer in &self.observers {
            observer.on_turn_failure(conversation, error, round_trips, elapsed);
        }
    }
}
