//! Shared types used across the schemaprobe harness.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Inference types
// ---------------------------------------------------------------------------

/// A chat message in the multi-turn conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: Option<String>,
    /// Tool calls carried by an assistant message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Identifier linking a tool-role message back to the call it answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Assistant message requesting tool execution.
    pub fn assistant_with_tools(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content,
            tool_calls: Some(tool_calls),
            tool_call_id: None,
        }
    }

    /// Tool-role message carrying the output of one executed call.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tool,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool call request from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Result of executing a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub output: String,
    pub success: bool,
}

/// Response from inference including potential tool calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub usage: TokenUsage,
}

/// Token usage from an inference call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ---------------------------------------------------------------------------
// Experiment configuration
// ---------------------------------------------------------------------------

/// Which mechanism coerces the agent's final output into a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// No enforcement; the system prompt alone requests a JSON shape.
    NoFormat,
    /// A dedicated finalization tool carries the schema.
    ToolStrategy,
    /// The provider API enforces the schema on the final message.
    ProviderStrategy,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFormat => write!(f, "no_format"),
            Self::ToolStrategy => write!(f, "tool_strategy"),
            Self::ProviderStrategy => write!(f, "provider_strategy"),
        }
    }
}

/// Whether the target schema carries the optional verification-result field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    WithValidation,
    Simple,
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WithValidation => write!(f, "with_validation"),
            Self::Simple => write!(f, "simple"),
        }
    }
}

// ---------------------------------------------------------------------------
// Trial results
// ---------------------------------------------------------------------------

/// Outcome of one task executed under one configuration.
///
/// Failures are recorded here, never raised: `success == false` carries the
/// rendered error, and `validate_calls` holds whatever the tracker saw before
/// the trial died.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialResult {
    pub mode: Mode,
    pub schema_variant: Option<SchemaVariant>,
    pub validate_calls: u64,
    pub success: bool,
    pub error: Option<String>,
}
