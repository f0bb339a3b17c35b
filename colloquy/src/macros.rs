/// Builds a [`PromptFunction`](crate::PromptFunction) from a named handler and
/// its parameter list.
///
/// The function takes the handler's name. Defaults must be literals; each one
/// decides its parameter's schema type. Prefix the handler with `async` when
/// it returns a future.
///
/// ```rust
/// use colloquy::{FunctionArguments, FunctionError, prompt_fn};
///
/// fn weather(arguments: FunctionArguments) -> Result<String, FunctionError> {
///     Ok(format!("Sunny in {}", arguments.string(0)?))
/// }
///
/// let function = prompt_fn!(weather, city = "Paris", days = 3).expect("weather should build");
/// assert_eq!(function.name(), "weather");
/// assert_eq!(function.parameters().len(), 2);
/// ```
#[macro_export]
macro_rules! prompt_fn {
    (async $handler:ident $(, $($parameters:tt)*)?) => {
        $crate::PromptFunction::builder($handler)
            .name(stringify!($handler))
            .signature(stringify!($($($parameters)*)?))
            .build()
    };
    ($handler:ident $(, $($parameters:tt)*)?) => {
        $crate::PromptFunction::sync_builder($handler)
            .name(stringify!($handler))
            .signature(stringify!($($($parameters)*)?))
            .build()
    };
}

/// Creates a single history [`Message`](crate::Message) from a role shorthand.
///
/// ```rust
/// use colloquy::{Role, cq_msg};
///
/// let message = cq_msg!(assistant => "Done.");
/// assert_eq!(message.role(), Some(Role::Assistant));
/// assert_eq!(message.text(), Some("Done."));
/// ```
#[macro_export]
macro_rules! cq_msg {
    (system => $text:expr $(,)?) => {
        $crate::Message::system($text)
    };
    (user => $text:expr $(,)?) => {
        $crate::Message::user($text)
    };
    (assistant => $text:expr $(,)?) => {
        $crate::Message::assistant($text)
    };
    ($role:ident => $text:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, or assistant");
    };
}

/// Creates a [`ConversationHistory`](crate::ConversationHistory) from
/// role/text pairs.
///
/// ```rust
/// use colloquy::{Role, cq_history};
///
/// let history = cq_history![
///     user => "What is 2 + 2?",
///     assistant => "4",
/// ];
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.last().and_then(|message| message.role()), Some(Role::Assistant));
/// ```
#[macro_export]
macro_rules! cq_history {
    () => {
        $crate::ConversationHistory::new()
    };
    ($($role:ident => $text:expr),+ $(,)?) => {
        $crate::ConversationHistory::from_messages([$($crate::cq_msg!($role => $text)),+])
    };
}
