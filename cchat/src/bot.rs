//! The turn orchestrator.
//!
//! One call to [`ChatBot::prompt`] appends the user text, then alternates
//! between sending a request and dispatching the function calls in the
//! response until the adapter reports the turn complete. Every intermediate
//! message stays in the history, including when a turn fails partway.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use cchat::ChatBot;
//! use cprovider::echo::EchoProvider;
//!
//! # tokio_test_block_on(async {
//! let mut bot = ChatBot::builder(Arc::new(EchoProvider), Arc::new(EchoProvider))
//!     .build()
//!     .expect("bot should build");
//!
//! let reply = bot.prompt("hello").await.expect("turn should complete");
//! assert_eq!(reply, "hello");
//! assert_eq!(bot.history().len(), 2);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(future: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(future)
//! # }
//! ```

use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Instant;

use ccommon::ConversationId;
use cfunction::{FunctionRegistry, PromptFunction};
use cprovider::{
    ConversationHistory, FunctionCallMessage, FunctionCallRequest, Message, ProviderAdapter,
    ProviderId, ProviderTransport, ResponseItem,
};

use crate::{ChatError, ChatObserver, ChatPolicy, NoopChatObserver, TurnState};

pub struct ChatBot {
    conversation_id: ConversationId,
    adapter: Arc<dyn ProviderAdapter>,
    transport: Arc<dyn ProviderTransport>,
    functions: FunctionRegistry,
    history: ConversationHistory,
    instructions: Option<String>,
    debug: bool,
    observer: Arc<dyn ChatObserver>,
    policy: ChatPolicy,
    state: TurnState,
}

impl ChatBot {
    pub fn builder(
        adapter: Arc<dyn ProviderAdapter>,
        transport: Arc<dyn ProviderTransport>,
    ) -> ChatBotBuilder {
        ChatBotBuilder::new(adapter, transport)
    }

    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    pub fn provider(&self) -> ProviderId {
        self.adapter.id()
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn policy(&self) -> ChatPolicy {
        self.policy
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Forgets the conversation so far. Instructions and functions are kept.
    pub fn reset(&mut self) {
        self.history.clear();
        self.transition(TurnState::Idle);
    }

    /// Runs one turn and returns the backend's final text.
    ///
    /// On failure the history keeps every message appended before the
    /// error and the bot returns to [`TurnState::Idle`].
    pub async fn prompt(&mut self, text: impl Into<String>) -> Result<String, ChatError> {
        let text = text.into();
        let started = Instant::now();
        self.transition(TurnState::Idle);
        self.observer.on_turn_start(&self.conversation_id, &text);

        self.history.push(Message::user(text));
        self.transition(TurnState::AwaitingResponse);

        let mut round_trips = 0;
        match self.run_round_trips(&mut round_trips).await {
            Ok(reply) => {
                self.transition(TurnState::Done);
                self.observer
                    .on_turn_complete(&self.conversation_id, round_trips, started.elapsed());
                Ok(reply)
            }
            Err(error) => {
                let error = error.with_state(self.state);
                self.transition(TurnState::Idle);
                self.observer.on_turn_failure(
                    &self.conversation_id,
                    &error,
                    round_trips,
                    started.elapsed(),
                );
                Err(error)
            }
        }
    }

    async fn run_round_trips(&mut self, round_trips: &mut u32) -> Result<String, ChatError> {
        loop {
            if !self.policy.allows(*round_trips) {
                return Err(ChatError::round_trip_limit(*round_trips));
            }
            *round_trips += 1;

            let request = self.adapter.build_request(
                &self.history,
                &self.functions,
                self.instructions.as_deref(),
            )?;
            if self.debug {
                self.observer
                    .on_request(&self.conversation_id, *round_trips, &request);
            }

            let response = self.transport.send(&request).await?;
            if self.debug {
                self.observer
                    .on_response(&self.conversation_id, *round_trips, &response);
            }

            let mut dispatched = false;
            let mut final_text = None;
            for item in self.adapter.response_items(&response)? {
                match self.adapter.classify(&item) {
                    ResponseItem::FinalText(text) => {
                        self.history.push(Message::assistant(text.clone()));
                        final_text = Some(text);
                    }
                    ResponseItem::FunctionCall(call) => {
                        self.transition(TurnState::Dispatching);
                        self.dispatch(call).await?;
                        dispatched = true;
                    }
                    ResponseItem::Opaque(opaque) => self.history.push(opaque),
                    ResponseItem::Unrecognized(item) => {
                        return Err(ChatError::unrecognized_output(self.adapter.id(), &item));
                    }
                }
            }

            if dispatched {
                self.transition(TurnState::AwaitingResponse);
                continue;
            }

            if self.adapter.is_turn_complete(&response) {
                return final_text.ok_or_else(ChatError::missing_final_text);
            }
        }
    }

    /// Looks the function up, records the call, runs it, and records the result.
    /// An unknown name fails before anything is appended.
    async fn dispatch(&mut self, request: FunctionCallRequest) -> Result<(), ChatError> {
        let function = self
            .functions
            .lookup(&request.name)
            .map_err(|error| ChatError::from(error.with_call_id(request.call_id.clone())))?;

        let call = Arc::new(FunctionCallMessage::new(function, request)?);
        self.history.push(Message::FunctionCall(Arc::clone(&call)));
        self.observer.on_function_start(&self.conversation_id, &call);

        let started = Instant::now();
        match call.result_message().await {
            Ok(result) => {
                self.observer.on_function_success(
                    &self.conversation_id,
                    &call,
                    &result.result,
                    started.elapsed(),
                );
                self.history.push(result);
                Ok(())
            }
            Err(error) => {
                self.observer.on_function_failure(
                    &self.conversation_id,
                    &call,
                    &error,
                    started.elapsed(),
                );
                Err(ChatError::function_call(
                    error,
                    call.function_name(),
                    call.call_id(),
                ))
            }
        }
    }

    fn transition(&mut self, to: TurnState) {
        if self.state != to {
            self.observer
                .on_state_change(&self.conversation_id, self.state, to);
            self.state = to;
        }
    }
}

impl Debug for ChatBot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatBot")
            .field("conversation_id", &self.conversation_id)
            .field("provider", &self.adapter.id())
            .field("functions", &self.functions)
            .field("history_len", &self.history.len())
            .field("instructions", &self.instructions)
            .field("debug", &self.debug)
            .field("policy", &self.policy)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

pub struct ChatBotBuilder {
    adapter: Arc<dyn ProviderAdapter>,
    transport: Arc<dyn ProviderTransport>,
    conversation_id: ConversationId,
    registry: FunctionRegistry,
    functions: Vec<PromptFunction>,
    history: ConversationHistory,
    instructions: Option<String>,
    debug: bool,
    observer: Option<Arc<dyn ChatObserver>>,
    policy: ChatPolicy,
}

impl ChatBotBuilder {
    pub fn new(adapter: Arc<dyn ProviderAdapter>, transport: Arc<dyn ProviderTransport>) -> Self {
        Self {
            adapter,
            transport,
            conversation_id: ConversationId::default(),
            registry: FunctionRegistry::new(),
            functions: Vec::new(),
            history: ConversationHistory::new(),
            instructions: None,
            debug: false,
            observer: None,
            policy: ChatPolicy::default(),
        }
    }

    pub fn conversation_id(mut self, conversation_id: impl Into<ConversationId>) -> Self {
        self.conversation_id = conversation_id.into();
        self
    }

    pub fn function(mut self, function: PromptFunction) -> Self {
        self.functions.push(function);
        self
    }

    pub fn functions(mut self, functions: impl IntoIterator<Item = PromptFunction>) -> Self {
        self.functions.extend(functions);
        self
    }

    /// Starts from an existing registry. Functions added individually are
    /// registered after it.
    pub fn registry(mut self, registry: FunctionRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn history(mut self, history: ConversationHistory) -> Self {
        self.history = history;
        self
    }

    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.history.push(message);
        self
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ChatObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn has_observer(&self) -> bool {
        self.observer.is_some()
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn max_round_trips(mut self, max_round_trips: u32) -> Self {
        self.policy = self.policy.with_max_round_trips(max_round_trips);
        self
    }

    /// Registers functions in the order given. A repeated name fails the build.
    pub fn build(self) -> Result<ChatBot, ChatError> {
        let mut functions = self.registry;
        for function in self.functions {
            functions.register(function)?;
        }

        Ok(ChatBot {
            conversation_id: self.conversation_id,
            adapter: self.adapter,
            transport: self.transport,
            functions,
            history: self.history,
            instructions: self.instructions,
            debug: self.debug,
            observer: self
                .observer
                .unwrap_or_else(|| Arc::new(NoopChatObserver)),
            policy: self.policy,
            state: TurnState::Idle,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use cfunction::{FunctionArguments, FunctionError};
    use cprovider::ScriptedTransport;
    use cprovider::echo::{EchoProvider, function_call_response, text_response};
    use serde_json::json;

    use super::*;
    use crate::ChatErrorKind;

    fn ping(_arguments: FunctionArguments) -> Result<&'static str, FunctionError> {
        Ok("pong")
    }

    fn ping_function() -> PromptFunction {
        PromptFunction::sync_builder(ping)
            .build()
            .expect("function should build")
    }

    #[derive(Default)]
    struct StateRecorder {
        transitions: Mutex<Vec<(TurnState, TurnState)>>,
    }

    impl ChatObserver for StateRecorder {
        fn on_state_change(&self, _conversation: &ConversationId, from: TurnState, to: TurnState) {
            self.transitions
                .lock()
                .expect("transitions lock")
                .push((from, to));
        }
    }

    #[tokio::test]
    async fn empty_prompts_run_a_normal_turn() {
        let recorder = Arc::new(StateRecorder::default());
        let mut bot = ChatBot::builder(Arc::new(EchoProvider), Arc::new(EchoProvider))
            .observer(recorder.clone())
            .build()
            .expect("bot");

        assert_eq!(bot.prompt("").await.expect("turn"), "");
        assert_eq!(bot.history().len(), 2);
        assert_eq!(bot.state(), TurnState::Done);
        assert_eq!(recorder.transitions.lock().expect("transitions lock").len(), 2);
    }

    #[tokio::test]
    async fn next_turn_reports_the_return_to_idle() {
        let recorder = Arc::new(StateRecorder::default());
        let mut bot = ChatBot::builder(Arc::new(EchoProvider), Arc::new(EchoProvider))
            .observer(recorder.clone())
            .build()
            .expect("bot");

        bot.prompt("one").await.expect("turn");
        bot.prompt("two").await.expect("turn");

        assert_eq!(
            *recorder.transitions.lock().expect("transitions lock"),
            vec![
                (TurnState::Idle, TurnState::AwaitingResponse),
                (TurnState::AwaitingResponse, TurnState::Done),
                (TurnState::Done, TurnState::Idle),
                (TurnState::Idle, TurnState::AwaitingResponse),
                (TurnState::AwaitingResponse, TurnState::Done),
            ]
        );
    }

    #[tokio::test]
    async fn unclassifiable_items_fail_with_the_item_in_the_message() {
        let transport = ScriptedTransport::new().with_response(cprovider::ProviderResponse::new(
            ProviderId::Echo,
            json!({"content": [{"type": "audio"}]}),
        ));
        let mut bot = ChatBot::builder(Arc::new(EchoProvider), Arc::new(transport))
            .build()
            .expect("bot");

        let error = bot.prompt("hi").await.expect_err("unrecognized item");

        assert_eq!(error.kind, ChatErrorKind::UnrecognizedOutput);
        assert!(error.message.starts_with("echo adapter"));
        assert!(error.message.contains("audio"));
        assert_eq!(bot.history().len(), 1);
    }

    #[test]
    fn duplicate_functions_fail_the_build() {
        let error = ChatBot::builder(Arc::new(EchoProvider), Arc::new(EchoProvider))
            .function(ping_function())
            .function(ping_function())
            .build()
            .expect_err("duplicate");

        assert_eq!(error.kind, ChatErrorKind::DuplicateFunctionName);
    }

    #[tokio::test]
    async fn states_follow_the_dispatch_cycle() {
        let recorder = Arc::new(StateRecorder::default());
        let transport = ScriptedTransport::new()
            .with_response(function_call_response("ping", json!({}), "call_1"))
            .with_response(text_response("done"));
        let mut bot = ChatBot::builder(Arc::new(EchoProvider), Arc::new(transport))
            .function(ping_function())
            .observer(recorder.clone())
            .build()
            .expect("bot");

        bot.prompt("go").await.expect("turn");

        assert_eq!(bot.state(), TurnState::Done);
        assert_eq!(
            *recorder.transitions.lock().expect("transitions lock"),
            vec![
                (TurnState::Idle, TurnState::AwaitingResponse),
                (TurnState::AwaitingResponse, TurnState::Dispatching),
                (TurnState::Dispatching, TurnState::AwaitingResponse),
                (TurnState::AwaitingResponse, TurnState::Done),
            ]
        );
    }

    #[tokio::test]
    async fn completed_turn_without_text_is_an_error() {
        let transport = ScriptedTransport::new()
            .with_response(cprovider::ProviderResponse::new(ProviderId::Echo, json!({"content": []})));
        let mut bot = ChatBot::builder(Arc::new(EchoProvider), Arc::new(transport))
            .build()
            .expect("bot");

        let error = bot.prompt("hi").await.expect_err("no text");

        assert_eq!(error.kind, ChatErrorKind::MissingFinalText);
        assert_eq!(error.state, Some(TurnState::AwaitingResponse));
        assert_eq!(bot.state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn reset_clears_history_but_keeps_functions() {
        let mut bot = ChatBot::builder(Arc::new(EchoProvider), Arc::new(EchoProvider))
            .function(ping_function())
            .instructions("echo")
            .build()
            .expect("bot");

        bot.prompt("one").await.expect("turn");
        bot.reset();

        assert!(bot.history().is_empty());
        assert!(bot.functions().contains("ping"));
        assert_eq!(bot.instructions(), Some("echo"));
        assert_eq!(bot.state(), TurnState::Idle);
    }
}
