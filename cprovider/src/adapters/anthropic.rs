//! Anthropic "messages" wire shape.
//!
//! Consecutive history entries that render to the same role are merged into
//! one message, so a text reply followed by a tool call becomes a single
//! assistant turn and the tool result becomes the following user turn.

use ccommon::GenerationOptions;
use cfunction::{FunctionDefinition, FunctionRegistry};
use serde_json::{Map, Value, json};

use crate::adapter::{items_at, str_field};
use crate::{
    ConversationHistory, FunctionCallRequest, Message, OpaqueMessage, ProviderAdapter,
    ProviderError, ProviderId, ProviderRequest, ProviderResponse, ResponseItem, Role,
};

pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";
pub const ANTHROPIC_DEFAULT_MAX_TOKENS: u32 = 1000;
pub const ANTHROPIC_DEFAULT_TEMPERATURE: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AnthropicMessagesAdapter {
    model: String,
    options: GenerationOptions,
}

impl Default for AnthropicMessagesAdapter {
    fn default() -> Self {
        Self {
            model: ANTHROPIC_DEFAULT_MODEL.to_string(),
            options: GenerationOptions::default()
                .with_max_tokens(ANTHROPIC_DEFAULT_MAX_TOKENS)
                .with_temperature(ANTHROPIC_DEFAULT_TEMPERATURE),
        }
    }
}

impl AnthropicMessagesAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn tool(definition: &FunctionDefinition) -> Value {
        let mut tool = Map::new();
        tool.insert("name".to_string(), Value::from(definition.name.as_str()));
        if let Some(description) = &definition.description {
            tool.insert("description".to_string(), Value::from(description.as_str()));
        }
        tool.insert("input_schema".to_string(), definition.input_schema());

        Value::Object(tool)
    }

    fn content_block(message: &Message) -> Option<(Role, Value)> {
        match message {
            Message::Text(text) if text.role == Role::System => None,
            Message::Text(text) => Some((text.role, json!({"type": "text", "text": text.text}))),
            Message::FunctionCall(call) => {
                let block = if str_field(call.wire_item(), "type") == Some("tool_use") {
                    call.wire_item().clone()
                } else {
                    json!({
                        "type": "tool_use",
                        "id": call.call_id(),
                        "name": call.function_name(),
                        "input": Value::Object(call.arguments().clone()),
                    })
                };

                Some((Role::Assistant, block))
            }
            Message::FunctionResult(result) => Some((
                Role::User,
                json!({
                    "type": "tool_result",
                    "tool_use_id": result.call_id,
                    "content": result.result,
                }),
            )),
            Message::Opaque(opaque) if opaque.provider == ProviderId::Anthropic => {
                Some((Role::Assistant, opaque.payload.clone()))
            }
            Message::Opaque(_) => None,
        }
    }

    fn messages(history: &ConversationHistory) -> Vec<Value> {
        let mut turns: Vec<(Role, Vec<Value>)> = Vec::new();
        for (role, block) in history.iter().filter_map(Self::content_block) {
            match turns.last_mut() {
                Some((last_role, blocks)) if *last_role == role => blocks.push(block),
                _ => turns.push((role, vec![block])),
            }
        }

        turns
            .into_iter()
            .map(|(role, content)| json!({"role": role.as_str(), "content": content}))
            .collect()
    }

    fn system(history: &ConversationHistory, instructions: Option<&str>) -> Option<String> {
        let parts = instructions
            .into_iter()
            .chain(history.iter().filter_map(|message| match message {
                Message::Text(text) if text.role == Role::System => Some(text.text.as_str()),
                _ => None,
            }))
            .collect::<Vec<_>>();

        (!parts.is_empty()).then(|| parts.join("\n\n"))
    }
}

impl ProviderAdapter for AnthropicMessagesAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    fn build_request(
        &self,
        history: &ConversationHistory,
        functions: &FunctionRegistry,
        instructions: Option<&str>,
    ) -> Result<ProviderRequest, ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        let max_tokens = self
            .options
            .max_tokens
            .unwrap_or(ANTHROPIC_DEFAULT_MAX_TOKENS);
        if max_tokens == 0 {
            return Err(ProviderError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        let mut body = Map::new();
        body.insert("model".to_string(), Value::from(self.model.as_str()));
        body.insert("max_tokens".to_string(), Value::from(max_tokens));
        if let Some(temperature) = self.options.temperature {
            body.insert("temperature".to_string(), Value::from(temperature));
        }
        if let Some(system) = Self::system(history, instructions) {
            body.insert("system".to_string(), Value::from(system));
        }

        if !functions.is_empty() {
            let tools = functions.definitions().iter().map(Self::tool).collect();
            body.insert("tools".to_string(), Value::Array(tools));
        }

        body.insert(
            "messages".to_string(),
            Value::Array(Self::messages(history)),
        );

        Ok(ProviderRequest::new(
            ProviderId::Anthropic,
            Value::Object(body),
        ))
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
            Some("tool_use") => {
                let (Some(name), Some(id)) = (str_field(item, "name"), str_field(item, "id"))
                else {
                    return ResponseItem::Unrecognized(item.clone());
                };

                let arguments = item
                    .get("input")
                    .map(Value::to_string)
                    .unwrap_or_default();
                ResponseItem::FunctionCall(
                    FunctionCallRequest::new(name, arguments, id).with_wire_item(item.clone()),
                )
            }
            Some("thinking") | Some("redacted_thinking") => {
                ResponseItem::Opaque(OpaqueMessage::new(ProviderId::Anthropic, item.clone()))
            }
            _ => ResponseItem::Unrecognized(item.clone()),
        }
    }

    fn is_turn_complete(&self, response: &ProviderResponse) -> bool {
        matches!(
            str_field(&response.body, "stop_reason"),
            Some("end_turn") | Some("stop_sequence")
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cfunction::{FunctionArguments, FunctionError, PromptFunction};

    use super::*;
    use crate::{FunctionCallMessage, FunctionResultMessage};

    fn add(arguments: FunctionArguments) -> Result<f64, FunctionError> {
        Ok(arguments.number(0)? + arguments.number(1)?)
    }

    fn add_function() -> Arc<PromptFunction> {
        Arc::new(
            PromptFunction::sync_builder(add)
                .description("Adds two numbers")
                .signature("a = 0, b = 0")
                .build()
                .expect("function should build"),
        )
    }

    #[test]
    fn default_request_uses_documented_settings() {
        let adapter = AnthropicMessagesAdapter::new();
        let history = ConversationHistory::from_messages([Message::user("hi")]);

        let request = adapter
            .build_request(&history, &FunctionRegistry::new(), Some("be kind"))
            .expect("request");

        assert_eq!(
            request.body,
            json!({
                "model": "claude-3-7-sonnet-20250219",
                "max_tokens": 1000,
                "temperature": 1.0,
                "system": "be kind",
                "messages": [{"role": "user", "content": [{"type": "text", "text": "hi"}]}],
            })
        );
    }

    #[test]
    fn tool_round_trip_renders_as_assistant_then_user_turns() {
        let tool_use = json!({"type": "tool_use", "id": "toolu_1", "name": "add", "input": {"a": 1, "b": 2}});
        let call = FunctionCallMessage::new(
            add_function(),
            FunctionCallRequest::new("add", r#"{"a":1,"b":2}"#, "toolu_1")
                .with_wire_item(tool_use.clone()),
        )
        .expect("call");
        let history = ConversationHistory::from_messages([
            Message::system("seeded system"),
            Message::user("add 1 and 2"),
            Message::assistant("Let me add those."),
            Message::from(call),
            Message::from(FunctionResultMessage::new("toolu_1", "add", "3")),
        ]);

        let registry = cfunction::FunctionRegistry::new();
        let request = AnthropicMessagesAdapter::new()
            .build_request(&history, &registry, None)
            .expect("request");

        assert_eq!(request.body["system"], "seeded system");
        assert_eq!(
            request.body["messages"],
            json!([
                {"role": "user", "content": [{"type": "text", "text": "add 1 and 2"}]},
                {"role": "assistant", "content": [
                    {"type": "text", "text": "Let me add those."},
                    tool_use,
                ]},
                {"role": "user", "content": [
                    {"type": "tool_result", "tool_use_id": "toolu_1", "content": "3"},
                ]},
            ])
        );
    }

    #[test]
    fn tools_carry_input_schema_with_every_parameter_required() {
        let definition = add_function().definition();
        assert_eq!(
            AnthropicMessagesAdapter::tool(&definition),
            json!({
                "name": "add",
                "description": "Adds two numbers",
                "input_schema": {
                    "type": "object",
                    "properties": {"a": {"type": "number"}, "b": {"type": "number"}},
                    "required": ["a", "b"],
                },
            })
        );
    }

    #[test]
    fn classify_and_completion_follow_content_and_stop_reason() {
        let adapter = AnthropicMessagesAdapter::new();

        let ResponseItem::FunctionCall(call) = adapter.classify(&json!({
            "type": "tool_use", "id": "toolu_9", "name": "add", "input": {"a": 2}
        })) else {
            panic!("expected tool use");
        };
        assert_eq!(call.arguments_json, r#"{"a":2}"#);
        assert_eq!(call.call_id, "toolu_9");

        assert!(matches!(
            adapter.classify(&json!({"type": "thinking", "thinking": "hmm", "signature": "s"})),
            ResponseItem::Opaque(_)
        ));
        assert!(matches!(
            adapter.classify(&json!({"type": "server_tool_use"})),
            ResponseItem::Unrecognized(_)
        ));

        let done = ProviderResponse::new(ProviderId::Anthropic, json!({"stop_reason": "end_turn"}));
        let tool = ProviderResponse::new(ProviderId::Anthropic, json!({"stop_reason": "tool_use"}));
        assert!(adapter.is_turn_complete(&done));
        assert!(!adapter.is_turn_complete(&tool));
    }

    #[test]
    fn zero_max_tokens_is_rejected() {
        let adapter = AnthropicMessagesAdapter::new()
            .with_options(GenerationOptions::default().with_max_tokens(0));
        let error = adapter
            .build_request(&ConversationHistory::new(), &FunctionRegistry::new(), None)
            .expect_err("zero max tokens");

        assert_eq!(error.kind, crate::ProviderErrorKind::InvalidRequest);
    }
}
