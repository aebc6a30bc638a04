//! Agent construction and the bounded tool-calling loop.
//!
//! The agent repeatedly:
//! 1. Calls inference with the registered tools
//! 2. Executes every returned tool call
//! 3. Feeds the results back as tool messages
//! 4. Stops when the configured shaping says the run is final
//!
//! What counts as "final" depends on the shaping: a content-only reply for
//! the free and provider-enforced modes, a finalization-tool call for the
//! tool-mediated mode.

pub mod prompts;
pub mod schema;

use crate::config::ProbeConfig;
use crate::provider::{ChatModel, ChatRequestSpec, ResponseFormat};
use crate::tools::{self, ToolContext, ToolDefinition};
use crate::types::ChatMessage;
use anyhow::{bail, Result};
use schema::FinalAnswer;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Name of the finalization tool registered under tool-mediated shaping.
pub const FINAL_TOOL: &str = "submit_result";

/// How the agent's final output is coerced into a structure.
#[derive(Debug, Clone)]
pub enum OutputShaping {
    /// No enforcement; the system prompt alone governs the output shape.
    Free,
    /// A dedicated finalization tool carries the schema; calling it ends
    /// the run and its arguments are the answer.
    FinalTool(Value),
    /// The request carries the schema as a provider-enforced response
    /// format; a content-only reply must parse against it.
    Provider(Value),
}

/// Invocation limits and sampling settings, drawn from the harness config.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub model: String,
    pub max_turns: u32,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl AgentSettings {
    pub fn from_config(config: &ProbeConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_turns: config.max_turns,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Outcome of a completed agent invocation.
#[derive(Debug, Clone)]
pub struct AgentRun {
    pub final_text: Option<String>,
    /// Parsed answer when the shaping demands one; `None` in free mode.
    pub structured: Option<FinalAnswer>,
    pub turns: u32,
}

/// An agent bound to a model, a tool registry, a shaping mechanism and a
/// system prompt.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: Vec<ToolDefinition>,
    shaping: OutputShaping,
    system_prompt: String,
    settings: AgentSettings,
}

impl Agent {
    pub fn new(
        model: Arc<dyn ChatModel>,
        tools: Vec<ToolDefinition>,
        shaping: OutputShaping,
        system_prompt: &str,
        settings: AgentSettings,
    ) -> Self {
        Self {
            model,
            tools,
            shaping,
            system_prompt: system_prompt.to_string(),
            settings,
        }
    }

    /// The registry plus, under tool-mediated shaping, the finalization tool.
    fn effective_tools(&self) -> Vec<ToolDefinition> {
        let mut tools = self.tools.clone();
        if let OutputShaping::FinalTool(schema) = &self.shaping {
            tools.push(ToolDefinition {
                name: FINAL_TOOL.into(),
                description: "Submit the final structured answer. Call this exactly once, when the calculation is complete.".into(),
                parameters: schema.clone(),
            });
        }
        tools
    }

    fn response_format(&self) -> Option<ResponseFormat> {
        match &self.shaping {
            OutputShaping::Provider(schema) => {
                Some(ResponseFormat::json_schema("final_answer", schema.clone()))
            }
            _ => None,
        }
    }

    /// Run the task to completion or error. The caller records failures;
    /// nothing here retries.
    pub async fn invoke(&self, ctx: &ToolContext, task: &str) -> Result<AgentRun> {
        let mut messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(task),
        ];
        let tools = self.effective_tools();
        let response_format = self.response_format();

        for turn in 1..=self.settings.max_turns {
            let request = ChatRequestSpec {
                model: self.settings.model.clone(),
                messages: messages.clone(),
                tools: tools.clone(),
                response_format: response_format.clone(),
                max_tokens: self.settings.max_tokens,
                temperature: self.settings.temperature,
            };

            let response = self.model.chat(&request).await?;
            debug!(
                "[turn {}] {} tool calls, {} tokens",
                turn,
                response.tool_calls.len(),
                response.usage.total_tokens
            );

            if response.tool_calls.is_empty() {
                let content = response.content.clone().unwrap_or_default();
                let structured = match &self.shaping {
                    OutputShaping::Provider(_) => Some(schema::parse_final_answer(&content)?),
                    OutputShaping::FinalTool(_) => {
                        bail!("run ended without a {} call", FINAL_TOOL)
                    }
                    OutputShaping::Free => None,
                };
                return Ok(AgentRun {
                    final_text: response.content,
                    structured,
                    turns: turn,
                });
            }

            messages.push(ChatMessage::assistant_with_tools(
                response.content.clone(),
                response.tool_calls.clone(),
            ));

            for tc in &response.tool_calls {
                if tc.name == FINAL_TOOL && matches!(self.shaping, OutputShaping::FinalTool(_)) {
                    let structured = schema::parse_final_answer_value(&tc.arguments)?;
                    return Ok(AgentRun {
                        final_text: response.content,
                        structured: Some(structured),
                        turns: turn,
                    });
                }

                debug!("[turn {}] tool: {}({})", turn, tc.name, tc.arguments);
                let result = tools::execute_tool(ctx, &tc.name, &tc.arguments);
                if !result.success {
                    warn!("[turn {}] tool error: {}", turn, result.output);
                }
                messages.push(ChatMessage::tool(tc.id.clone(), result.output));
            }
        }

        bail!("no final answer after {} turns", self.settings.max_turns)
    }
}
