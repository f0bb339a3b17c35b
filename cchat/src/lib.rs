//! Turn orchestration over provider adapters and registered functions.

mod bot;
mod error;
mod observer;
mod state;

pub mod prelude {
    pub use crate::{
        ChatBot, ChatBotBuilder, ChatError, ChatErrorKind, ChatErrorSource, ChatObserver,
        ChatPolicy, NoopChatObserver, TurnState,
    };
    pub use ccommon::ConversationId;
    pub use cfunction::{
        FunctionArguments, FunctionError, FunctionErrorKind, FunctionOutput, FunctionRegistry,
        PromptFunction,
    };
    pub use cprovider::{
        ConversationHistory, Message, ProviderAdapter, ProviderId, ProviderTransport, Role,
        ScriptedTransport,
    };
}

pub use bot::{ChatBot, ChatBotBuilder};
pub use ccommon::ConversationId;
pub use error::{ChatError, ChatErrorKind, ChatErrorSource};
pub use observer::{ChatObserver, NoopChatObserver};
pub use state::{ChatPolicy, TurnState};
