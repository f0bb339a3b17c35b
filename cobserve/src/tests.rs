use std::sync::{Arc, Mutex};
use std::time::Duration;

use cchat::{ChatBot, ChatError, ChatObserver, TurnState};
use ccommon::ConversationId;
use cfunction::{FunctionArguments, FunctionError, PromptFunction};
use cprovider::echo::{EchoProvider, function_call_response, text_response};
use cprovider::{
    FunctionCallMessage, FunctionCallRequest, ProviderId, ProviderRequest, ProviderResponse,
    ScriptedTransport,
};
use serde_json::json;

use crate::{FanoutChatObserver, MetricsChatObserver, SafeChatObserver, TracingChatObserver};

fn conversation() -> ConversationId {
    ConversationId::from("conversation-1")
}

fn sample_call() -> FunctionCallMessage {
    let function = PromptFunction::sync_builder(|_arguments: FunctionArguments| Ok("ok"))
        .name("lookup")
        .build()
        .expect("lookup should build");

    FunctionCallMessage::new(
        Arc::new(function),
        FunctionCallRequest::new("lookup", "{}", "call-1"),
    )
    .expect("call should build")
}

fn sample_request() -> ProviderRequest {
    ProviderRequest::new(ProviderId::Echo, json!({"messages": []}))
}

fn sample_response() -> ProviderResponse {
    text_response("ok")
}

fn exercise_all_callbacks(observer: &dyn ChatObserver) {
    let conversation = conversation();
    let call = sample_call();
    let function_error = FunctionError::execution("lookup failed");
    let chat_error = ChatError::from(function_error.clone()).with_state(TurnState::Dispatching);

    observer.on_turn_start(&conversation, "hello");
    observer.on_state_change(&conversation, TurnState::Idle, TurnState::AwaitingResponse);
    observer.on_request(&conversation, 1, &sample_request());
    observer.on_response(&conversation, 1, &sample_response());
    observer.on_function_start(&conversation, &call);
    observer.on_function_success(&conversation, &call, "ok", Duration::from_millis(5));
    observer.on_function_failure(&conversation, &call, &function_error, Duration::from_millis(5));
    observer.on_turn_complete(&conversation, 2, Duration::from_millis(20));
    observer.on_turn_failure(&conversation, &chat_error, 2, Duration::from_millis(20));
}

#[derive(Default, Clone)]
struct RecordingObserver {
    label: &'static str,
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingObserver {
    fn labelled(label: &'static str, events: Arc<Mutex<Vec<String>>>) -> Self {
        Self { label, events }
    }

    fn record(&self, event: &str) {
        self.events
            .lock()
            .expect("events lock")
            .push(format!("{}:{event}", self.label));
    }
}

impl ChatObserver for RecordingObserver {
    fn on_turn_start(&self, _conversation: &ConversationId, _prompt: &str) {
        self.record("turn_start");
    }

    fn on_function_start(&self, _conversation: &ConversationId, _call: &FunctionCallMessage) {
        self.record("function_start");
    }

    fn on_function_success(
        &self,
        _conversation: &ConversationId,
        _call: &FunctionCallMessage,
        _result: &str,
        _elapsed: Duration,
    ) {
        self.record("function_success");
    }

    fn on_turn_complete(&self, _conversation: &ConversationId, _round_trips: u32, _elapsed: Duration) {
        self.record("turn_complete");
    }
}

struct PanicObserver;

impl ChatObserver for PanicObserver {
    fn on_turn_start(&self, _conversation: &ConversationId, _prompt: &str) {
        panic!("turn_start panic");
    }

    fn on_state_change(&self, _conversation: &ConversationId, _from: TurnState, _to: TurnState) {
        panic!("state_change panic");
    }

    fn on_request(&self, _conversation: &ConversationId, _round_trip: u32, _request: &ProviderRequest) {
        panic!("request panic");
    }

    fn on_response(
        &self,
        _conversation: &ConversationId,
        _round_trip: u32,
        _response: &ProviderResponse,
    ) {
        panic!("response panic");
    }

    fn on_function_start(&self, _conversation: &ConversationId, _call: &FunctionCallMessage) {
        panic!("function_start panic");
    }

    fn on_function_success(
        &self,
        _conversation: &ConversationId,
        _call: &FunctionCallMessage,
        _result: &str,
        _elapsed: Duration,
    ) {
        panic!("function_success panic");
    }

    fn on_function_failure(
        &self,
        _conversation: &ConversationId,
        _call: &FunctionCallMessage,
        _error: &FunctionError,
        _elapsed: Duration,
    ) {
        panic!("function_failure panic");
    }

    fn on_turn_complete(&self, _conversation: &ConversationId, _round_trips: u32, _elapsed: Duration) {
        panic!("turn_complete panic");
    }

    fn on_turn_failure(
        &self,
        _conversation: &ConversationId,
        _error: &ChatError,
        _round_trips: u32,
        _elapsed: Duration,
    ) {
        panic!("turn_failure panic");
    }
}

#[test]
fn tracing_observer_smoke_test_all_callbacks() {
    exercise_all_callbacks(&TracingChatObserver);
}

#[test]
fn metrics_observer_smoke_test_all_callbacks() {
    exercise_all_callbacks(&MetricsChatObserver);
}

#[test]
fn safe_observer_delegates_when_inner_succeeds() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let observer = SafeChatObserver::new(RecordingObserver::labelled("inner", Arc::clone(&events)));

    exercise_all_callbacks(&observer);

    assert_eq!(
        *events.lock().expect("events lock"),
        vec![
            "inner:turn_start",
            "inner:function_start",
            "inner:function_success",
            "inner:turn_complete",
        ]
    );
}

#[test]
fn safe_observer_swallows_panics() {
    exercise_all_callbacks(&SafeChatObserver::new(PanicObserver));
}

#[test]
fn fanout_forwards_in_insertion_order() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let observer = FanoutChatObserver::new()
        .with(RecordingObserver::labelled("first", Arc::clone(&events)))
        .with(RecordingObserver::labelled("second", Arc::clone(&events)));

    observer.on_turn_start(&conversation(), "hello");

    assert_eq!(observer.len(), 2);
    assert_eq!(
        *events.lock().expect("events lock"),
        vec!["first:turn_start", "second:turn_start"]
    );
}

#[tokio::test]
async fn panicking_observer_cannot_break_a_turn() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let observer = FanoutChatObserver::new()
        .with(SafeChatObserver::new(PanicObserver))
        .with(TracingChatObserver)
        .with(MetricsChatObserver)
        .with(RecordingObserver::labelled("recorder", Arc::clone(&events)));

    let lookup = PromptFunction::sync_builder(|_arguments: FunctionArguments| Ok("found"))
        .name("lookup")
        .build()
        .expect("lookup should build");
    let transport = ScriptedTransport::new()
        .with_response(function_call_response("lookup", json!({}), "call-1"))
        .with_response(text_response("all done"));
    let mut bot = ChatBot::builder(Arc::new(EchoProvider), Arc::new(transport))
        .function(lookup)
        .observer(Arc::new(observer))
        .debug(true)
        .build()
        .expect("bot should build");

    assert_eq!(bot.prompt("find it").await.expect("turn"), "all done");
    assert_eq!(
        *events.lock().expect("events lock"),
        vec![
            "recorder:turn_start",
            "recorder:function_start",
            "recorder:function_success",
            "recorder:turn_complete",
        ]
    );
}
