//! Common imports for most colloquy applications.

pub use crate::{
    ChatBot, ChatBotBuilder, ChatError, ChatErrorKind, ChatObserver, ChatPolicy,
    ConversationHistory, ConversationId, FunctionArguments, FunctionError, FunctionErrorKind,
    FunctionOutput, FunctionRegistry, GenerationOptions, Message, ProviderError, ProviderId,
    PromptFunction, Role, ScriptedTransport, TracingChatObserver, TurnState,
};
pub use crate::{
    MOCK_DEFAULT_RESPONSE, assistant_message, build_bot, echo_bot, mock_bot, system_message,
    user_message,
};
pub use crate::{cq_history, cq_msg, prompt_fn};

#[cfg(all(feature = "provider-anthropic", feature = "http-transport"))]
pub use crate::anthropic_bot;
#[cfg(all(feature = "provider-openai", feature = "http-transport"))]
pub use crate::openai_bot;
