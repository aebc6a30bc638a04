//! Scripted model implementations shared by unit tests.

use super::{ChatModel, ChatRequestSpec};
use crate::types::{InferenceResponse, TokenUsage, ToolCall};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Plays back a fixed response sequence and records every request it saw.
/// An exhausted script makes further calls fail, so `ScriptedModel::new([])`
/// doubles as an always-erroring model.
pub struct ScriptedModel {
    script: Mutex<VecDeque<InferenceResponse>>,
    requests: Mutex<Vec<ChatRequestSpec>>,
}

impl ScriptedModel {
    pub fn new(responses: impl IntoIterator<Item = InferenceResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A content-only reply (ends the run in free and provider modes).
    pub fn content_reply(text: &str) -> InferenceResponse {
        InferenceResponse {
            content: Some(text.to_string()),
            tool_calls: Vec::new(),
            usage: TokenUsage::default(),
        }
    }

    /// A reply requesting one tool call.
    pub fn tool_reply(name: &str, arguments: serde_json::Value) -> InferenceResponse {
        InferenceResponse {
            content: None,
            tool_calls: vec![ToolCall {
                id: format!("call_{}", name),
                name: name.to_string(),
                arguments,
            }],
            usage: TokenUsage::default(),
        }
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<ChatRequestSpec> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, request: &ChatRequestSpec) -> Result<InferenceResponse> {
        self.requests.lock().unwrap().push(request.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(response) => Ok(response),
            None => bail!("scripted model has no response left"),
        }
    }
}

/// Returns the same response for every call, forever.
pub struct RepeatModel {
    response: InferenceResponse,
}

impl RepeatModel {
    pub fn new(response: InferenceResponse) -> Self {
        Self { response }
    }
}

#[async_trait]
impl ChatModel for RepeatModel {
    async fn chat(&self, _request: &ChatRequestSpec) -> Result<InferenceResponse> {
        Ok(self.response.clone())
    }
}
