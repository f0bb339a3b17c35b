use colloquy::prelude::*;
use colloquy::{ChatErrorKind, ProviderErrorKind};

fn mock(responses: &[&str]) -> (ChatBot, ScriptedTransport) {
    let (builder, transport) = mock_bot(responses.iter().copied());
    (build_bot(builder).expect("mock bot should build"), transport)
}

fn history_texts(bot: &ChatBot) -> Vec<&str> {
    bot.history().iter().filter_map(Message::text).collect()
}

#[test]
fn default_settings_start_empty() {
    let (bot, _transport) = mock(&[]);

    assert_eq!(bot.instructions(), None);
    assert!(bot.history().is_empty());
    assert!(!bot.is_debug());
    assert_eq!(bot.state(), TurnState::Idle);
}

#[test]
fn custom_settings_are_kept() {
    let (builder, _transport) = mock_bot(Vec::<String>::new());
    let bot = build_bot(builder.instructions("Test instructions").debug(true))
        .expect("mock bot should build");

    assert_eq!(bot.instructions(), Some("Test instructions"));
    assert!(bot.is_debug());
}

#[tokio::test]
async fn default_response_is_used_without_a_script() {
    let (mut bot, _transport) = mock(&[]);
    assert_eq!(bot.prompt("Hello").await.expect("turn"), MOCK_DEFAULT_RESPONSE);
}

#[tokio::test]
async fn scripted_responses_are_served_in_sequence_then_default() {
    let (mut bot, transport) = mock(&["First response", "Second response"]);
    transport.set_default_response(colloquy::cprovider::echo::text_response("Default response"));

    assert_eq!(bot.prompt("Message 1").await.expect("turn"), "First response");
    assert_eq!(bot.prompt("Message 2").await.expect("turn"), "Second response");
    assert_eq!(bot.prompt("Message 3").await.expect("turn"), "Default response");
    assert_eq!(bot.prompt("Message 4").await.expect("turn"), "Default response");
}

#[tokio::test]
async fn responses_can_be_added_after_the_bot_is_built() {
    let (mut bot, transport) = mock(&["Constructor response"]);
    transport.push_response(colloquy::cprovider::echo::text_response("Added response"));

    assert_eq!(bot.prompt("Message 1").await.expect("turn"), "Constructor response");
    assert_eq!(bot.prompt("Message 2").await.expect("turn"), "Added response");
}

#[tokio::test]
async fn history_alternates_user_and_bot_messages() {
    let (mut bot, _transport) = mock(&["Hello there!", "How can I help you?"]);

    bot.prompt("Hi").await.expect("turn");
    bot.prompt("What can you do?").await.expect("turn");

    assert_eq!(
        history_texts(&bot),
        vec!["Hi", "Hello there!", "What can you do?", "How can I help you?"]
    );
}

#[tokio::test]
async fn resetting_bot_and_script_replays_from_the_start() {
    let (mut bot, transport) = mock(&["Response 1", "Response 2"]);

    bot.prompt("Message 1").await.expect("turn");
    bot.prompt("Message 2").await.expect("turn");
    assert_eq!(bot.history().len(), 4);

    bot.reset();
    transport.reset();

    assert!(bot.history().is_empty());
    assert_eq!(bot.prompt("New message").await.expect("turn"), "Response 1");
}

#[tokio::test]
async fn resetting_responses_falls_back_to_default() {
    let (mut bot, transport) = mock(&["Response 1", "Response 2"]);

    assert_eq!(bot.prompt("Message 1").await.expect("turn"), "Response 1");
    transport.reset_responses();

    assert_eq!(bot.prompt("Message 2").await.expect("turn"), MOCK_DEFAULT_RESPONSE);
}

#[tokio::test]
async fn seeded_history_is_kept() {
    let (builder, _transport) = mock_bot(Vec::<String>::new());
    let bot = build_bot(builder.history(cq_history![
        user => "Previous user message",
        assistant => "Previous bot response",
    ]))
    .expect("mock bot should build");

    assert_eq!(
        history_texts(&bot),
        vec!["Previous user message", "Previous bot response"]
    );
}

#[tokio::test]
async fn scripted_errors_are_mixed_with_responses() {
    let (mut bot, transport) = mock(&["Success"]);
    transport.push_error(ProviderError::other("API error"));
    transport.push_response(colloquy::cprovider::echo::text_response("Recovery"));

    assert_eq!(bot.prompt("Test 1").await.expect("turn"), "Success");

    let error = bot.prompt("Test 2").await.expect_err("scripted error");
    assert_eq!(error.kind, ChatErrorKind::Provider);
    assert_eq!(error.message, "API error");
    assert_eq!(
        error.provider_error().map(|error| error.kind),
        Some(ProviderErrorKind::Other)
    );

    assert_eq!(bot.prompt("Test 3").await.expect("turn"), "Recovery");
}

#[tokio::test]
async fn default_error_repeats_once_the_script_is_exhausted() {
    let (mut bot, transport) = mock(&["One response"]);
    transport.set_default_error(ProviderError::unavailable("Default error"));

    assert_eq!(bot.prompt("Test 1").await.expect("turn"), "One response");
    for prompt in ["Test 2", "Test 3"] {
        let error = bot.prompt(prompt).await.expect_err("default error");
        assert_eq!(error.message, "Default error");
        assert!(error.is_retryable());
    }
}

#[tokio::test]
async fn history_keeps_the_user_message_when_a_turn_fails() {
    let (mut bot, transport) = mock(&["Success"]);
    transport.push_error(ProviderError::other("Test error"));

    bot.prompt("Message 1").await.expect("turn");
    bot.prompt("Message 2").await.expect_err("scripted error");

    assert_eq!(history_texts(&bot), vec!["Message 1", "Success", "Message 2"]);
    assert_eq!(bot.state(), TurnState::Idle);
}
