use std::sync::{Arc, Mutex};

use cchat::prelude::*;
use cprovider::echo::{
    EchoProvider, function_call_response, function_calls_response, text_response,
};
use cprovider::{MessageKind, ProviderRequest, ProviderResponse};
use serde_json::json;

fn bot_with(transport: &ScriptedTransport) -> ChatBotBuilder {
    ChatBot::builder(Arc::new(EchoProvider), Arc::new(transport.clone()))
}

fn greeting(arguments: FunctionArguments) -> Result<String, FunctionError> {
    Ok(format!("Hello, {}!", arguments.string(0)?))
}

fn greeting_function() -> PromptFunction {
    PromptFunction::sync_builder(greeting)
        .name("greet")
        .signature("name")
        .build()
        .expect("greet should build")
}

fn recording_function(name: &'static str, calls: Arc<Mutex<Vec<String>>>) -> PromptFunction {
    PromptFunction::sync_builder(move |_arguments: FunctionArguments| {
        calls.lock().expect("calls lock").push(name.to_string());
        Ok(name)
    })
    .name(name)
    .build()
    .expect("function should build")
}

#[derive(Default)]
struct DebugRecorder {
    events: Mutex<Vec<String>>,
}

impl DebugRecorder {
    fn events(&self) -> Vec<String> {
        self.events.lock().expect("events lock").clone()
    }
}

impl ChatObserver for DebugRecorder {
    fn on_request(&self, _conversation: &ConversationId, round_trip: u32, _request: &ProviderRequest) {
        self.events
            .lock()
            .expect("events lock")
            .push(format!("request:{round_trip}"));
    }

    fn on_response(
        &self,
        _conversation: &ConversationId,
        round_trip: u32,
        _response: &ProviderResponse,
    ) {
        self.events
            .lock()
            .expect("events lock")
            .push(format!("response:{round_trip}"));
    }
}

#[tokio::test]
async fn function_call_then_text_completes_the_turn() {
    let transport = ScriptedTransport::new()
        .with_response(function_call_response("greet", json!({"name": "Ada"}), "call_1"))
        .with_response(text_response("I greeted Ada."));
    let mut bot = bot_with(&transport)
        .function(greeting_function())
        .build()
        .expect("bot should build");

    let reply = bot.prompt("Say hi to Ada").await.expect("turn should complete");

    assert_eq!(reply, "I greeted Ada.");
    assert_eq!(bot.state(), TurnState::Done);

    let kinds = bot.history().iter().map(Message::kind).collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![
            MessageKind::Text(Role::User),
            MessageKind::FunctionCall,
            MessageKind::FunctionResult,
            MessageKind::Text(Role::Assistant),
        ]
    );
    assert_eq!(bot.history().get(2).and_then(Message::text), Some("Hello, Ada!"));

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body["functions"], json!(["greet"]));
}

#[tokio::test]
async fn unknown_function_fails_without_appending_the_call() {
    let transport = ScriptedTransport::new()
        .with_response(function_call_response("missing", json!({}), "call_7"));
    let mut bot = bot_with(&transport)
        .function(greeting_function())
        .build()
        .expect("bot should build");

    let error = bot.prompt("call something").await.expect_err("unknown function");

    assert_eq!(error.kind, ChatErrorKind::UnknownFunction);
    assert_eq!(error.function_name.as_deref(), Some("missing"));
    assert_eq!(error.call_id.as_deref(), Some("call_7"));
    assert_eq!(error.state, Some(TurnState::Dispatching));
    assert_eq!(bot.history().len(), 1);
    assert_eq!(bot.state(), TurnState::Idle);
}

#[tokio::test]
async fn calls_in_one_response_run_in_order() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let transport = ScriptedTransport::new()
        .with_response(function_calls_response([
            ("first".to_string(), json!({}), "call_a".to_string()),
            ("second".to_string(), json!({}), "call_b".to_string()),
        ]))
        .with_response(text_response("both done"));
    let mut bot = bot_with(&transport)
        .function(recording_function("first", Arc::clone(&calls)))
        .function(recording_function("second", Arc::clone(&calls)))
        .build()
        .expect("bot should build");

    bot.prompt("run both").await.expect("turn should complete");

    assert_eq!(*calls.lock().expect("calls lock"), vec!["first", "second"]);
    let results = bot
        .history()
        .iter()
        .filter_map(|message| match message {
            Message::FunctionResult(result) => Some(result.call_id.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(results, vec!["call_a", "call_b"]);
}

#[tokio::test]
async fn unrecognized_items_abort_the_turn() {
    let transport = ScriptedTransport::new().with_response(ProviderResponse::new(
        ProviderId::Echo,
        json!({"content": [{"type": "hologram"}]}),
    ));
    let mut bot = bot_with(&transport).build().expect("bot should build");

    let error = bot.prompt("hi").await.expect_err("unrecognized item");

    assert_eq!(error.kind, ChatErrorKind::UnrecognizedOutput);
    assert!(error.message.contains("hologram"));
}

#[tokio::test]
async fn opaque_items_are_kept_in_history() {
    let transport = ScriptedTransport::new().with_response(ProviderResponse::new(
        ProviderId::Echo,
        json!({"content": [
            {"type": "note", "id": "note_1", "text": "thinking"},
            {"type": "text", "text": "answer"},
        ]}),
    ));
    let mut bot = bot_with(&transport).build().expect("bot should build");

    assert_eq!(bot.prompt("q").await.expect("turn"), "answer");
    assert_eq!(bot.history().get(1).map(Message::kind), Some(MessageKind::Opaque));
}

#[tokio::test]
async fn host_errors_reach_the_caller_unmodified() {
    let original = FunctionError::execution("disk full");
    let raised = original.clone();
    let failing = PromptFunction::sync_builder(move |_arguments: FunctionArguments| {
        Err::<(), _>(raised.clone())
    })
    .name("save")
    .build()
    .expect("save should build");

    let transport = ScriptedTransport::new()
        .with_response(function_call_response("save", json!({}), "call_s"));
    let mut bot = bot_with(&transport)
        .function(failing)
        .build()
        .expect("bot should build");

    let error = bot.prompt("save it").await.expect_err("host error");

    assert_eq!(error.kind, ChatErrorKind::FunctionInvocation);
    assert_eq!(error.function_error(), Some(&original));
    assert_eq!(error.function_name.as_deref(), Some("save"));
    assert_eq!(error.call_id.as_deref(), Some("call_s"));
    assert_eq!(bot.history().len(), 2);
    assert!(bot.history().get(1).is_some_and(Message::is_function_call));
}

#[tokio::test]
async fn provider_errors_are_surfaced_with_their_source() {
    let transport =
        ScriptedTransport::new().with_error(cprovider::ProviderError::rate_limited("slow down"));
    let mut bot = bot_with(&transport).build().expect("bot should build");

    let error = bot.prompt("hi").await.expect_err("provider error");

    assert_eq!(error.kind, ChatErrorKind::Provider);
    assert!(error.is_retryable());
    assert_eq!(error.state, Some(TurnState::AwaitingResponse));
}

#[tokio::test]
async fn round_trip_limit_stops_endless_calls() {
    let transport = ScriptedTransport::new()
        .with_default_response(function_call_response("greet", json!({"name": "Bo"}), "call_n"));
    let mut bot = bot_with(&transport)
        .function(greeting_function())
        .max_round_trips(2)
        .build()
        .expect("bot should build");

    let error = bot.prompt("loop forever").await.expect_err("limit");

    assert_eq!(error.kind, ChatErrorKind::RoundTripLimit);
    assert_eq!(transport.requests().len(), 2);
    assert_eq!(bot.history().len(), 5);
}

#[tokio::test]
async fn debug_hooks_fire_only_in_debug_mode() {
    let recorder = Arc::new(DebugRecorder::default());
    let mut bot = ChatBot::builder(Arc::new(EchoProvider), Arc::new(EchoProvider))
        .observer(recorder.clone())
        .build()
        .expect("bot should build");

    bot.prompt("quiet").await.expect("turn");
    assert!(recorder.events().is_empty());

    bot.set_debug(true);
    assert_eq!(bot.prompt("loud").await.expect("turn"), "loud");
    assert_eq!(recorder.events(), vec!["request:1", "response:1"]);
}

#[tokio::test]
async fn seeded_history_is_sent_with_the_next_prompt() {
    let transport = ScriptedTransport::new().with_response(text_response("noted"));
    let mut bot = bot_with(&transport)
        .instructions("Be brief.")
        .message(Message::user("earlier question"))
        .message(Message::assistant("earlier answer"))
        .build()
        .expect("bot should build");

    bot.prompt("follow up").await.expect("turn");

    let body = &transport.requests()[0].body;
    assert_eq!(body["system"], "Be brief.");
    assert_eq!(body["messages"].as_array().map(Vec::len), Some(3));
    assert_eq!(bot.history().len(), 4);
}
