//! OpenAI "responses" wire shape.
//!
//! ```rust
//! use cfunction::FunctionRegistry;
//! use cprovider::openai::OpenAiResponsesAdapter;
//! use cprovider::{ConversationHistory, Message, ProviderAdapter};
//!
//! let adapter = OpenAiResponsesAdapter::new();
//! let history = ConversationHistory::from_messages([Message::user("hi")]);
//! let request = adapter
//!     .build_request(&history, &FunctionRegistry::new(), Some("be brief"))
//!     .expect("request should build");
//!
//! assert_eq!(request.body["model"], "gpt-4o-mini");
//! assert_eq!(request.body["input"][0]["role"], "system");
//! assert!(request.body.get("tools").is_none());
//! ```

use ccommon::GenerationOptions;
use cfunction::{FunctionDefinition, FunctionRegistry};
use serde_json::{Map, Value, json};

use crate::adapter::{items_at, str_field};
use crate::{
    ConversationHistory, FunctionCallRequest, Message, OpaqueMessage, ProviderAdapter,
    ProviderError, ProviderId, ProviderRequest, ProviderResponse, ResponseItem,
};

pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Where instructions go in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstructionPlacement {
    /// A leading `system` input item.
    #[default]
    SystemMessage,
    /// The top-level `instructions` field.
    InstructionsField,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiResponsesAdapter {
    model: String,
    options: GenerationOptions,
    strict: bool,
    placement: InstructionPlacement,
}

impl Default for OpenAiResponsesAdapter {
    fn default() -> Self {
        Self {
            model: OPENAI_DEFAULT_MODEL.to_string(),
            options: GenerationOptions::default(),
            strict: true,
            placement: InstructionPlacement::default(),
        }
    }
}

impl OpenAiResponsesAdapter {
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

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_instruction_placement(mut self, placement: InstructionPlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn tool(&self, definition: &FunctionDefinition) -> Value {
        let mut parameters = definition.input_schema();
        if self.strict {
            make_strict(&mut parameters);
        }

        let mut tool = Map::new();
        tool.insert("type".to_string(), Value::from("function"));
        tool.insert("name".to_string(), Value::from(definition.name.as_str()));
        if let Some(description) = &definition.description {
            tool.insert("description".to_string(), Value::from(description.as_str()));
        }
        tool.insert("parameters".to_string(), parameters);
        tool.insert("strict".to_string(), Value::Bool(self.strict));

        Value::Object(tool)
    }

    fn input_item(message: &Message) -> Option<Value> {
        match message {
            Message::Text(text) => Some(json!({"role": text.role.as_str(), "content": text.text})),
            Message::FunctionCall(call) => {
                if str_field(call.wire_item(), "type") == Some("function_call") {
                    return Some(call.wire_item().clone());
                }

                Some(json!({
                    "type": "function_call",
                    "call_id": call.call_id(),
                    "name": call.function_name(),
                    "arguments": Value::Object(call.arguments().clone()).to_string(),
                }))
            }
            Message::FunctionResult(result) => Some(json!({
                "type": "function_call_output",
                "call_id": result.call_id,
                "output": result.result,
            })),
            Message::Opaque(opaque) if opaque.provider == ProviderId::OpenAi => {
                Some(opaque.payload.clone())
            }
            Message::Opaque(_) => None,
        }
    }

    fn message_text(item: &Value) -> Option<String> {
        let parts = item.get("content")?.as_array()?;
        let texts = parts
            .iter()
            .filter(|part| str_field(part, "type") == Some("output_text"))
            .filter_map(|part| str_field(part, "text"))
            .collect::<Vec<_>>();

        if !texts.is_empty() {
            return Some(texts.concat());
        }

        parts
            .iter()
            .find_map(|part| match str_field(part, "type") {
                Some("refusal") => str_field(part, "refusal"),
                _ => None,
            })
            .map(ToString::to_string)
    }
}

impl ProviderAdapter for OpenAiResponsesAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
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

        let mut input = Vec::with_capacity(history.len() + 1);
        if let (Some(instructions), InstructionPlacement::SystemMessage) =
            (instructions, self.placement)
        {
            input.push(json!({"role": "system", "content": instructions}));
        }
        input.extend(history.iter().filter_map(Self::input_item));

        let mut body = Map::new();
        body.insert("model".to_string(), Value::from(self.model.as_str()));
        if let (Some(instructions), InstructionPlacement::InstructionsField) =
            (instructions, self.placement)
        {
            body.insert("instructions".to_string(), Value::from(instructions));
        }
        body.insert("input".to_string(), Value::Array(input));

        if !functions.is_empty() {
            let tools = functions
                .definitions()
                .iter()
                .map(|definition| self.tool(definition))
                .collect();
            body.insert("tools".to_string(), Value::Array(tools));
        }

        if let Some(temperature) = self.options.temperature {
            body.insert("temperature".to_string(), Value::from(temperature));
        }
        if let Some(max_tokens) = self.options.max_tokens {
            body.insert("max_output_tokens".to_string(), Value::from(max_tokens));
        }

        Ok(ProviderRequest::new(ProviderId::OpenAi, Value::Object(body)))
    }

    fn response_items(&self, response: &ProviderResponse) -> Result<Vec<Value>, ProviderError> {
        items_at(response, "output")
    }

    fn classify(&self, item: &Value) -> ResponseItem {
        match str_field(item, "type") {
            Some("function_call") => {
                let (Some(name), Some(call_id)) =
                    (str_field(item, "name"), str_field(item, "call_id"))
                else {
                    return ResponseItem::Unrecognized(item.clone());
                };

                let arguments = str_field(item, "arguments").unwrap_or_default();
                ResponseItem::FunctionCall(
                    FunctionCallRequest::new(name, arguments, call_id)
                        .with_wire_item(item.clone()),
                )
            }
            Some("message") => match Self::message_text(item) {
                Some(text) => ResponseItem::FinalText(text),
                None => ResponseItem::Unrecognized(item.clone()),
            },
            Some("reasoning") => {
                ResponseItem::Opaque(OpaqueMessage::new(ProviderId::OpenAi, item.clone()))
            }
            _ => ResponseItem::Unrecognized(item.clone()),
        }
    }

    fn is_turn_complete(&self, response: &ProviderResponse) -> bool {
        let completed = matches!(str_field(&response.body, "status"), None | Some("completed"));
        let pending_call = response
            .body
            .get("output")
            .and_then(Value::as_array)
            .is_some_and(|items| {
                items
                    .iter()
                    .any(|item| str_field(item, "type") == Some("function_call"))
            });

        completed && !pending_call
    }
}

/// JSON types an untyped property may hold once strict mode demands a `type`.
const ANY_JSON_TYPE: [&str; 6] = ["string", "number", "boolean", "object", "array", "null"];

/// Strict function schemas forbid extra keys, list every property as
/// required, and give every property a `type`, at every object level.
fn make_strict(schema: &mut Value) {
    let Some(object) = schema.as_object_mut() else {
        return;
    };

    if let Some(Value::Object(properties)) = object.get_mut("properties") {
        let required = properties.keys().cloned().map(Value::from).collect::<Vec<_>>();
        for property in properties.values_mut() {
            if let Some(property) = property.as_object_mut()
                && !property.contains_key("type")
                && !property.contains_key("properties")
            {
                property.insert("type".to_string(), Value::from(ANY_JSON_TYPE.to_vec()));
            }
            make_strict(property);
        }

        object.insert("required".to_string(), Value::Array(required));
        object.insert("additionalProperties".to_string(), Value::Bool(false));
    } else if object.get("type").and_then(Value::as_str) == Some("object") {
        object.insert("properties".to_string(), Value::Object(Map::new()));
        object.insert("required".to_string(), Value::Array(Vec::new()));
        object.insert("additionalProperties".to_string(), Value::Bool(false));
    }

    if let Some(items) = object.get_mut("items") {
        make_strict(items);
    }
}
