//! A backend-free adapter and transport pair.
//!
//! `EchoProvider` answers every request with the latest user text. Its wire
//! shape is also what scripted conversations are written in, see
//! [`text_response`] and [`function_call_response`].
//!
//! ```rust
//! use cfunction::FunctionRegistry;
//! use cprovider::echo::EchoProvider;
//! use cprovider::{ConversationHistory, Message, ProviderAdapter, ResponseItem};
//!
//! let history = ConversationHistory::from_messages([Message::user("ping")]);
//! let request = EchoProvider
//!     .build_request(&history, &FunctionRegistry::new(), None)
//!     .expect("request should build");
//! let response = EchoProvider::reply(&request);
//!
//! let items = EchoProvider.response_items(&response).expect("items");
//! assert_eq!(EchoProvider.classify(&items[0]), ResponseItem::FinalText("ping".to_string()));
//! ```

use cfunction::FunctionRegistry;
use serde_json::{Map, Value, json};

use crate::adapter::{items_at, str_field};
use crate::{
    ConversationHistory, FunctionCallRequest, Message, OpaqueMessage, ProviderAdapter,
    ProviderError, ProviderFuture, ProviderId, ProviderRequest, ProviderResponse,
    ProviderTransport, ResponseItem,
};

pub fn text_response(text: impl Into<String>) -> ProviderResponse {
    ProviderResponse::new(
        ProviderId::Echo,
        json!({"content": [{"type": "text", "text": text.into()}]}),
    )
}

pub fn function_call_response(
    name: impl Into<String>,
    arguments: Value,
    call_id: impl Into<String>,
) -> ProviderResponse {
    function_calls_response([(name.into(), arguments, call_id.into())])
}

/// One response asking for several calls, in the given order.
pub fn function_calls_response(
    calls: impl IntoIterator<Item = (String, Value, String)>,
) -> ProviderResponse {
    let content = calls
        .into_iter()
        .map(|(name, arguments, call_id)| {
            json!({
                "type": "function_call",
                "name": name,
                "arguments": arguments.to_string(),
                "call_id": call_id,
            })
        })
        .collect::<Vec<_>>();

    ProviderResponse::new(ProviderId::Echo, json!({ "content": content }))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EchoProvider;

impl EchoProvider {
    pub fn new() -> Self {
        Self
    }

    /// The response this provider gives to `request`.
    pub fn reply(request: &ProviderRequest) -> ProviderResponse {
        let text = request
            .body
            .get("messages")
            .and_then(Value::as_array)
            .and_then(|messages| {
                messages
                    .iter()
                    .rev()
                    .find(|message| str_field(message, "role") == Some("user"))
            })
            .and_then(|message| str_field(message, "content"))
            .unwrap_or_default();

        text_response(text)
    }

    fn render(message: &Message) -> Value {
        match message {
            Message::Text(text) => json!({"role": text.role.as_str(), "content": text.text}),
            Message::FunctionCall(call) => json!({
                "type": "function_call",
                "name": call.function_name(),
                "arguments": Value::Object(call.arguments().clone()).to_string(),
                "call_id": call.call_id(),
            }),
            Message::FunctionResult(result) => json!({
                "type": "function_result",
                "call_id": result.call_id,
                "output": result.result,
            }),
            Message::Opaque(opaque) => opaque.payload.clone(),
        }
    }
}

impl ProviderAdapter for EchoProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Echo
    }

    fn build_request(
        &self,
        history: &ConversationHistory,
        functions: &FunctionRegistry,
        instructions: Option<&str>,
    ) -> Result<ProviderRequest, ProviderError> {
        let mut body = Map::new();
        if let Some(instructions) = instructions {
            body.insert("system".to_string(), Value::from(instructions));
        }

        body.insert(
            "messages".to_string(),
            history.iter().map(Self::render).collect(),
        );

        if !functions.is_empty() {
            body.insert(
                "functions".to_string(),
                functions.names().map(Value::from).collect(),
            );
        }

        Ok(ProviderRequest::new(ProviderId::Echo, Value::Object(body)))
    }

    fn response_items(&self, response: &ProviderResponse) -> Result<Vec<Value>, ProviderError> {
        items_at(response, "content")
    }

    fn classify(&self, item: &Value) -> ResponseItem {
        match str_field(item, "type") {
            Some("text") => match str_field(item, "text") {
                Some(text) => ResponseItem::FinalText(text.to_string()),
                None => ResponseItem::Unrecognized(item.clone()),
            },
            Some("function_call") => {
                let (Some(name), Some(call_id)) = (str_field(item, "name"), str_field(item, "call_id"))
                else {
                    return ResponseItem::Unrecognized(item.clone());
                };

                let arguments = str_field(item, "arguments").unwrap_or("{}");
                ResponseItem::FunctionCall(
                    FunctionCallRequest::new(name, arguments, call_id).with_wire_item(item.clone()),
                )
            }
            Some("note") => ResponseItem::Opaque(OpaqueMessage::new(ProviderId::Echo, item.clone())),
            _ => ResponseItem::Unrecognized(item.clone()),
        }
    }

    fn is_turn_complete(&self, _response: &ProviderResponse) -> bool {
        true
    }
}

impl ProviderTransport for EchoProvider {
    fn send<'a>(
        &'a self,
        request: &'a ProviderRequest,
    ) -> ProviderFuture<'a, Result<ProviderResponse, ProviderError>> {
        Box::pin(async move { Ok(Self::reply(request)) })
    }
}
