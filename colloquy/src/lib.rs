//! Chat bots that let a hosted model call back into your functions.
//!
//! This crate is the single dependency most applications need. It re-exports
//! the colloquy crates and adds ready-made bots and macros.
//!
//! ```rust
//! use colloquy::prelude::*;
//!
//! fn shout(arguments: FunctionArguments) -> Result<String, FunctionError> {
//!     Ok(arguments.string(0)?.to_uppercase())
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let mut bot = build_bot(
//!     echo_bot()
//!         .instructions("Repeat after me.")
//!         .function(prompt_fn!(shout, text = "").expect("shout should build")),
//! )
//! .expect("bot should build");
//!
//! assert_eq!(bot.prompt("hello").await.expect("turn"), "hello");
//! assert!(bot.functions().contains("shout"));
//! # });
//! ```

mod macros;

pub mod prelude;
pub mod util;

pub use cchat;
pub use ccommon;
pub use cfunction;
pub use cobserve;
pub use cprovider;

pub use cchat::{
    ChatBot, ChatBotBuilder, ChatError, ChatErrorKind, ChatErrorSource, ChatObserver, ChatPolicy,
    NoopChatObserver, TurnState,
};
pub use ccommon::{BoxFuture, ConversationId, GenerationOptions};
pub use cfunction::{
    FunctionArguments, FunctionDefinition, FunctionError, FunctionErrorKind, FunctionFuture,
    FunctionOutput, FunctionRegistry, FunctionSchema, Parameter, ParameterOverlay,
    ParameterSchema, ParameterType, PromptFunction, PromptFunctionBuilder, SchemaOverlay,
    parse_json_object, parse_json_value, parse_signature, required_string,
};
pub use cobserve::{FanoutChatObserver, MetricsChatObserver, SafeChatObserver, TracingChatObserver};
pub use cprovider::echo::EchoProvider;
pub use cprovider::{
    ConversationHistory, FunctionCallMessage, FunctionCallRequest, FunctionResultMessage, Message,
    MessageKind, OpaqueMessage, ProviderAdapter, ProviderError, ProviderErrorKind, ProviderFuture,
    ProviderId, ProviderRequest, ProviderResponse, ProviderTransport, ResponseItem, Role,
    ScriptedTransport, TextMessage,
};

#[cfg(feature = "provider-anthropic")]
pub use cprovider::anthropic::AnthropicMessagesAdapter;
#[cfg(feature = "http-transport")]
pub use cprovider::HttpTransport;
#[cfg(feature = "provider-openai")]
pub use cprovider::openai::{InstructionPlacement, OpenAiResponsesAdapter};

pub use util::{
    MOCK_DEFAULT_RESPONSE, NETWORK_MAX_ROUND_TRIPS, assistant_message, build_bot, echo_bot,
    mock_bot, network_limited, system_message, user_message,
};
#[cfg(all(feature = "provider-anthropic", feature = "http-transport"))]
pub use util::{anthropic_bot, anthropic_bot_with};
#[cfg(all(feature = "provider-openai", feature = "http-transport"))]
pub use util::{openai_bot, openai_bot_with};
