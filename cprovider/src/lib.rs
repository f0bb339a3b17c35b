//! Conversation messages, history, and the provider boundary.
//!
//! A [`ProviderAdapter`] turns history into a backend request and classifies
//! what comes back. A [`ProviderTransport`] moves requests over the wire.
//!
//! ```rust
//! use cfunction::FunctionRegistry;
//! use cprovider::echo::{EchoProvider, text_response};
//! use cprovider::{ConversationHistory, Message, ProviderAdapter};
//!
//! let history = ConversationHistory::from_messages([Message::user("hello")]);
//! let request = EchoProvider
//!     .build_request(&history, &FunctionRegistry::new(), None)
//!     .expect("request should build");
//!
//! assert_eq!(EchoProvider::reply(&request), text_response("hello"));
//! ```

mod adapter;
mod adapters;
mod error;
mod history;
mod message;
mod transport;

#[cfg(feature = "http-transport")]
mod http;

pub mod prelude;

pub use adapter::{
    FunctionCallRequest, ProviderAdapter, ProviderId, ProviderRequest, ProviderResponse,
    ResponseItem,
};
pub use adapters::echo;
pub use error::{ProviderError, ProviderErrorKind};
pub use history::ConversationHistory;
pub use message::{
    FunctionCallMessage, FunctionResultMessage, Message, MessageKind, OpaqueMessage, Role,
    TextMessage,
};
pub use transport::{ProviderFuture, ProviderTransport, ScriptedTransport};

#[cfg(feature = "provider-anthropic")]
pub use adapters::anthropic;
#[cfg(feature = "provider-openai")]
pub use adapters::openai;
#[cfg(feature = "http-transport")]
pub use http::{
    ANTHROPIC_API_KEY_ENV, ANTHROPIC_BASE_URL, DEFAULT_TIMEOUT, HttpTransport, OPENAI_API_KEY_ENV,
    OPENAI_BASE_URL,
};
