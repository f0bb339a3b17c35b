//! Common `cprovider` imports for downstream crates.

pub use crate::{
    ConversationHistory, FunctionCallMessage, FunctionCallRequest, FunctionResultMessage,
    Message, MessageKind, OpaqueMessage, ProviderAdapter, ProviderError, ProviderErrorKind,
    ProviderFuture, ProviderId, ProviderRequest, ProviderResponse, ProviderTransport,
    ResponseItem, Role, ScriptedTransport, TextMessage,
};
pub use ccommon::{BoxFuture, GenerationOptions};
