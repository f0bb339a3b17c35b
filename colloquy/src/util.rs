//! Ready-made bots and message constructors.
//!
//! Every constructor returns a [`ChatBotBuilder`] so callers can add
//! functions, instructions, or history before calling [`build_bot`].

use std::sync::Arc;

use cchat::{ChatBot, ChatBotBuilder, ChatError};
use cobserve::TracingChatObserver;
use cprovider::echo::{EchoProvider, text_response};
use cprovider::{Message, ScriptedTransport};

#[cfg(all(feature = "http-transport", any(feature = "provider-openai", feature = "provider-anthropic")))]
use cprovider::{HttpTransport, ProviderError, ProviderId};

pub const MOCK_DEFAULT_RESPONSE: &str = "Mock response";

/// Round-trip limit the networked constructors start with. Each round trip
/// is a billed request, so a backend that keeps answering with an incomplete
/// status cannot loop forever.
pub const NETWORK_MAX_ROUND_TRIPS: u32 = 16;

pub fn system_message(text: impl Into<String>) -> Message {
    Message::system(text)
}

pub fn user_message(text: impl Into<String>) -> Message {
    Message::user(text)
}

pub fn assistant_message(text: impl Into<String>) -> Message {
    Message::assistant(text)
}

/// Finishes a builder. A debug bot with no observer logs through `tracing`.
pub fn build_bot(builder: ChatBotBuilder) -> Result<ChatBot, ChatError> {
    let builder = if builder.is_debug() && !builder.has_observer() {
        builder.observer(Arc::new(TracingChatObserver))
    } else {
        builder
    };

    builder.build()
}

/// A bot that answers every prompt with the prompt itself.
pub fn echo_bot() -> ChatBotBuilder {
    ChatBot::builder(Arc::new(EchoProvider), Arc::new(EchoProvider))
}

/// A bot that answers with `responses` in order, then with
/// [`MOCK_DEFAULT_RESPONSE`].
///
/// The returned transport shares its script with the bot, so responses and
/// errors can still be queued after the bot is built.
pub fn mock_bot<I, S>(responses: I) -> (ChatBotBuilder, ScriptedTransport)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let transport =
        ScriptedTransport::new().with_default_response(text_response(MOCK_DEFAULT_RESPONSE));
    transport.push_responses(responses.into_iter().map(text_response));

    let builder = ChatBot::builder(Arc::new(EchoProvider), Arc::new(transport.clone()));
    (builder, transport)
}

/// Caps a builder at [`NETWORK_MAX_ROUND_TRIPS`]. A later call to
/// `max_round_trips` or `policy` replaces the cap.
pub fn network_limited(builder: ChatBotBuilder) -> ChatBotBuilder {
    builder.max_round_trips(NETWORK_MAX_ROUND_TRIPS)
}

/// An OpenAI "responses" bot keyed from `OPENAI_API_KEY`.
#[cfg(all(feature = "provider-openai", feature = "http-transport"))]
pub fn openai_bot() -> Result<ChatBotBuilder, ProviderError> {
    openai_bot_with(cprovider::openai::OpenAiResponsesAdapter::new())
}

#[cfg(all(feature = "provider-openai", feature = "http-transport"))]
pub fn openai_bot_with(
    adapter: cprovider::openai::OpenAiResponsesAdapter,
) -> Result<ChatBotBuilder, ProviderError> {
    let transport = HttpTransport::from_env(ProviderId::OpenAi)?;
    Ok(network_limited(ChatBot::builder(Arc::new(adapter), Arc::new(transport))))
}

/// An Anthropic "messages" bot keyed from `ANTHROPIC_API_KEY`.
#[cfg(all(feature = "provider-anthropic", feature = "http-transport"))]
pub fn anthropic_bot() -> Result<ChatBotBuilder, ProviderError> {
    anthropic_bot_with(cprovider::anthropic::AnthropicMessagesAdapter::new())
}

#[cfg(all(feature = "provider-anthropic", feature = "http-transport"))]
pub fn anthropic_bot_with(
    adapter: cprovider::anthropic::AnthropicMessagesAdapter,
) -> Result<ChatBotBuilder, ProviderError> {
    let transport = HttpTransport::from_env(ProviderId::Anthropic)?;
    Ok(network_limited(ChatBot::builder(Arc::new(adapter), Arc::new(transport))))
}

#[cfg(test)]
mod tests {
    use cchat::ChatErrorKind;
    use cfunction::{FunctionArguments, PromptFunction};
    use cprovider::Role;
    use cprovider::echo::function_call_response;
    use serde_json::json;

    use super::*;

    #[test]
    fn message_helpers_set_roles() {
        assert_eq!(system_message("s").role(), Some(Role::System));
        assert_eq!(user_message("u").role(), Some(Role::User));
        assert_eq!(assistant_message("a").role(), Some(Role::Assistant));
    }

    #[test]
    fn debug_without_observer_still_builds() {
        let bot = build_bot(echo_bot().debug(true)).expect("bot should build");
        assert!(bot.is_debug());
    }

    #[test]
    fn mock_transport_starts_with_the_given_responses() {
        let (_builder, transport) = mock_bot(["one", "two"]);
        assert_eq!(transport.remaining(), 2);
    }

    #[tokio::test]
    async fn network_limit_stops_a_turn_that_never_completes() {
        let transport = ScriptedTransport::new()
            .with_default_response(function_call_response("tick", json!({}), "call_t"));
        let tick = PromptFunction::sync_builder(|_arguments: FunctionArguments| Ok("tock"))
            .name("tick")
            .build()
            .expect("tick should build");
        let builder = ChatBot::builder(Arc::new(EchoProvider), Arc::new(transport.clone()))
            .function(tick);

        let mut bot = build_bot(network_limited(builder)).expect("bot should build");
        let error = bot.prompt("go").await.expect_err("limit");

        assert_eq!(error.kind, ChatErrorKind::RoundTripLimit);
        assert_eq!(transport.requests().len(), NETWORK_MAX_ROUND_TRIPS as usize);
    }

    #[test]
    fn network_limit_can_be_replaced() {
        let bot = build_bot(network_limited(echo_bot()).max_round_trips(3))
            .expect("bot should build");
        assert_eq!(bot.policy().max_round_trips, Some(3));
    }
}
