//! Model inference over an OpenAI-compatible chat completions API.
//!
//! Supports tool-use (function calling) and provider-enforced structured
//! output via the `json_schema` response format.

use crate::tools::ToolDefinition;
use crate::types::*;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// One request through the model seam.
#[derive(Debug, Clone)]
pub struct ChatRequestSpec {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
    pub response_format: Option<ResponseFormat>,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// The model-call seam. The HTTP client implements it for real runs; tests
/// implement it with scripted responses.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, request: &ChatRequestSpec) -> Result<InferenceResponse>;
}

/// Observer for outgoing requests. Hooked into the client instead of
/// patching anything at runtime.
pub trait RequestInspector: Send + Sync {
    fn on_request(&self, request: &ChatRequestSpec);
}

// -- Provider-enforced response format ---------------------------------------

/// OpenAI `response_format` payload in `json_schema` mode.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    r#type: &'static str,
    json_schema: JsonSchemaSpec,
}

#[derive(Debug, Clone, Serialize)]
struct JsonSchemaSpec {
    name: String,
    strict: bool,
    schema: serde_json::Value,
}

impl ResponseFormat {
    /// Strict provider-side enforcement of the given schema.
    pub fn json_schema(name: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            r#type: "json_schema",
            json_schema: JsonSchemaSpec {
                name: name.into(),
                strict: true,
                schema,
            },
        }
    }

    /// Schema name, as sent to the provider.
    pub fn name(&self) -> &str {
        &self.json_schema.name
    }
}

// -- OpenAI-compatible request/response types --------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<MessagePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolPayload<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'a ResponseFormat>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct MessagePayload {
    role: String,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCallPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ToolPayload<'a> {
    r#type: &'a str,
    function: FunctionPayload<'a>,
}

#[derive(Debug, Serialize)]
struct FunctionPayload<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCallPayload {
    id: String,
    r#type: String,
    function: FunctionCallPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCallPayload {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCallPayload>,
}

#[derive(Debug, Deserialize)]
struct UsagePayload {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Inference client for an OpenAI-compatible `/v1/chat/completions` endpoint.
#[derive(Clone)]
pub struct InferenceClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
    inspector: Option<Arc<dyn RequestInspector>>,
}

impl InferenceClient {
    /// Create a new inference client.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            inspector: None,
        }
    }

    /// Attach a request inspector that sees every outgoing request.
    pub fn with_inspector(mut self, inspector: Arc<dyn RequestInspector>) -> Self {
        self.inspector = Some(inspector);
        self
    }

    fn to_message_payload(message: &ChatMessage) -> MessagePayload {
        let role = match message.role {
            ChatRole::System => "system".into(),
            ChatRole::User => "user".into(),
            ChatRole::Assistant => "assistant".into(),
            ChatRole::Tool => "tool".into(),
        };
        // Tool-call arguments travel as a JSON string on the wire.
        let tool_calls = message.tool_calls.as_ref().map(|calls| {
            calls
                .iter()
                .map(|tc| ToolCallPayload {
                    id: tc.id.clone(),
                    r#type: "function".into(),
                    function: FunctionCallPayload {
                        name: tc.name.clone(),
                        arguments: tc.arguments.to_string(),
                    },
                })
                .collect()
        });
        MessagePayload {
            role,
            content: message.content.clone(),
            tool_calls,
            tool_call_id: message.tool_call_id.clone(),
        }
    }
}

#[async_trait]
impl ChatModel for InferenceClient {
    async fn chat(&self, request: &ChatRequestSpec) -> Result<InferenceResponse> {
        if let Some(inspector) = &self.inspector {
            inspector.on_request(request);
        }

        let url = format!("{}/v1/chat/completions", self.base_url);

        let msg_payloads: Vec<MessagePayload> = request
            .messages
            .iter()
            .map(Self::to_message_payload)
            .collect();

        let tool_payloads: Option<Vec<ToolPayload>> = if request.tools.is_empty() {
            None
        } else {
            Some(
                request
                    .tools
                    .iter()
                    .map(|t| ToolPayload {
                        r#type: "function",
                        function: FunctionPayload {
                            name: &t.name,
                            description: &t.description,
                            parameters: &t.parameters,
                        },
                    })
                    .collect(),
            )
        };

        let payload = ChatRequest {
            model: &request.model,
            messages: msg_payloads,
            tools: tool_payloads,
            response_format: request.response_format.as_ref(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!(
            "Inference request to model {} ({} messages)",
            request.model,
            request.messages.len()
        );

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Inference request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Inference failed ({}): {}", status, body);
        }

        let body: ChatResponse = resp
            .json()
            .await
            .context("Failed to parse inference response")?;

        let choice = body.choices.into_iter().next().unwrap_or(Choice {
            message: ResponseMessage {
                content: None,
                tool_calls: Vec::new(),
            },
        });

        // Parse tool calls
        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .into_iter()
            .map(|tc| {
                let args: serde_json::Value =
                    serde_json::from_str(&tc.function.arguments).unwrap_or_default();
                ToolCall {
                    id: tc.id,
                    name: tc.function.name,
                    arguments: args,
                }
            })
            .collect();

        let usage = body
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(InferenceResponse {
            content: choice.message.content,
            tool_calls,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_format_serializes_as_json_schema() {
        let format = ResponseFormat::json_schema("final_answer", json!({"type": "object"}));
        let value = serde_json::to_value(&format).unwrap();
        assert_eq!(value["type"], "json_schema");
        assert_eq!(value["json_schema"]["name"], "final_answer");
        assert_eq!(value["json_schema"]["strict"], true);
        assert_eq!(value["json_schema"]["schema"]["type"], "object");
    }

    #[test]
    fn assistant_tool_calls_are_stringified_on_the_wire() {
        let message = ChatMessage::assistant_with_tools(
            None,
            vec![ToolCall {
                id: "call_1".into(),
                name: "add".into(),
                arguments: json!({"a": 1.0, "b": 2.0}),
            }],
        );
        let payload = InferenceClient::to_message_payload(&message);
        let calls = payload.tool_calls.expect("tool calls present");
        assert_eq!(calls[0].function.name, "add");
        let roundtrip: serde_json::Value =
            serde_json::from_str(&calls[0].function.arguments).unwrap();
        assert_eq!(roundtrip["a"], 1.0);
    }

    #[test]
    fn tool_message_carries_its_call_id() {
        let payload = InferenceClient::to_message_payload(&ChatMessage::tool("call_7", "40"));
        assert_eq!(payload.role, "tool");
        assert_eq!(payload.tool_call_id.as_deref(), Some("call_7"));
        assert_eq!(payload.content.as_deref(), Some("40"));
    }

    #[tokio::test]
    async fn the_inspector_sees_requests_before_dispatch() {
        #[derive(Default)]
        struct Recorder(std::sync::Mutex<Vec<String>>);

        impl RequestInspector for Recorder {
            fn on_request(&self, request: &ChatRequestSpec) {
                self.0.lock().unwrap().push(request.model.clone());
            }
        }

        let recorder = Arc::new(Recorder::default());
        let client = InferenceClient::new("http://127.0.0.1:9", "test-key")
            .with_inspector(recorder.clone());
        let request = ChatRequestSpec {
            model: "test-model".into(),
            messages: vec![ChatMessage::user("hi")],
            tools: Vec::new(),
            response_format: None,
            max_tokens: 16,
            temperature: 0.0,
        };

        // The endpoint is unreachable; the inspector still runs first.
        let _ = client.chat(&request).await;

        assert_eq!(recorder.0.lock().unwrap().as_slice(), ["test-model"]);
    }
}
