use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use cchat::{ChatError, ChatObserver, TurnState};
use ccommon::ConversationId;
use cfunction::FunctionError;
use cprovider::{FunctionCallMessage, ProviderRequest, ProviderResponse};

/// Swallows panics raised by the wrapped observer.
pub struct SafeChatObserver<H> {
    inner: H,
}

impl<H> SafeChatObserver<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H> ChatObserver for SafeChatObserver<H>
where
    H: ChatObserver,
{
    fn on_turn_start(&self, conversation: &ConversationId, prompt: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_start(conversation, prompt)
        }));
    }

    fn on_state_change(&self, conversation: &ConversationId, from: TurnState, to: TurnState) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_state_change(conversation, from, to)
        }));
    }

    fn on_request(&self, conversation: &ConversationId, round_trip: u32, request: &ProviderRequest) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_request(conversation, round_trip, request)
        }));
    }

    fn on_response(
        &self,
        conversation: &ConversationId,
        round_trip: u32,
        response: &ProviderResponse,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_response(conversation, round_trip, response)
        }));
    }

    fn on_function_start(&self, conversation: &ConversationId, call: &FunctionCallMessage) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_function_start(conversation, call)
        }));
    }

    fn on_function_success(
        &self,
        conversation: &ConversationId,
        call: &FunctionCallMessage,
        result: &str,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_function_success(conversation, call, result, elapsed)
        }));
    }

    fn on_function_failure(
        &self,
        conversation: &ConversationId,
        call: &FunctionCallMessage,
        error: &FunctionError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_function_failure(conversation, call, error, elapsed)
        }));
    }

    fn on_turn_complete(&self, conversation: &ConversationId, round_trips: u32, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_complete(conversation, round_trips, elapsed)
        }));
    }

    fn on_turn_failure(
        &self,
        conversation: &ConversationId,
        error: &ChatError,
        round_trips: u32,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_turn_failure(conversation, error, round_trips, elapsed)
        }));
    }
}
