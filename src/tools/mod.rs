//! Arithmetic and verification tools exposed to the agent.
//!
//! The registry is built once at startup and handed by reference into agent
//! construction; execution dispatches by name and records every successful
//! invocation on the trial's `CallTracker`.

pub mod tracker;

pub use tracker::CallTracker;

use crate::types::ToolResult;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Absolute tolerance of the verification predicate.
pub const VALIDATION_TOLERANCE: f64 = 1e-6;

/// Name of the verification tool whose usage the experiment measures.
pub const VALIDATE_TOOL: &str = "validate_calculation";

/// Definition of a tool exposed to the inference model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Errors raised by tool execution.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("missing or invalid '{0}' argument")]
    InvalidArgument(&'static str),
}

// ---------------------------------------------------------------------------
// Tool definitions for the inference API
// ---------------------------------------------------------------------------

/// JSON Schema for a two-operand arithmetic tool.
fn operand_pair_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "a": {
                "type": "number",
                "description": "First operand"
            },
            "b": {
                "type": "number",
                "description": "Second operand"
            }
        },
        "required": ["a", "b"]
    })
}

/// Build the list of tool definitions exposed to the inference model.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "add".into(),
            description: "Add two numbers.".into(),
            parameters: operand_pair_schema(),
        },
        ToolDefinition {
            name: "subtract".into(),
            description: "Subtract two numbers (a - b).".into(),
            parameters: operand_pair_schema(),
        },
        ToolDefinition {
            name: "multiply".into(),
            description: "Multiply two numbers.".into(),
            parameters: operand_pair_schema(),
        },
        ToolDefinition {
            name: "divide".into(),
            description: "Divide two numbers (a / b). Fails on a zero divisor.".into(),
            parameters: operand_pair_schema(),
        },
        ToolDefinition {
            name: VALIDATE_TOOL.into(),
            description: "Check a computed result against an expected value.".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "expected": {
                        "type": "number",
                        "description": "The value the calculation should produce"
                    },
                    "actual": {
                        "type": "number",
                        "description": "The value the calculation did produce"
                    },
                    "operation": {
                        "type": "string",
                        "description": "Label for the operation being checked"
                    }
                },
                "required": ["expected", "actual", "operation"]
            }),
        },
    ]
}

// ---------------------------------------------------------------------------
// Tool execution engine
// ---------------------------------------------------------------------------

/// Context passed to tool execution.
pub struct ToolContext {
    pub tracker: CallTracker,
}

/// Execute a tool call by name.
pub fn execute_tool(ctx: &ToolContext, name: &str, args: &serde_json::Value) -> ToolResult {
    let result = match name {
        "add" => execute_add(ctx, args),
        "subtract" => execute_subtract(ctx, args),
        "multiply" => execute_multiply(ctx, args),
        "divide" => execute_divide(ctx, args),
        VALIDATE_TOOL => execute_validate(ctx, args),
        _ => Err(ToolError::UnknownTool(name.to_string())),
    };

    match result {
        Ok(output) => ToolResult {
            output,
            success: true,
        },
        Err(e) => ToolResult {
            output: format!("Error: {}", e),
            success: false,
        },
    }
}

fn require_number(args: &serde_json::Value, key: &'static str) -> Result<f64, ToolError> {
    args[key].as_f64().ok_or(ToolError::InvalidArgument(key))
}

fn execute_add(ctx: &ToolContext, args: &serde_json::Value) -> Result<String, ToolError> {
    let a = require_number(args, "a")?;
    let b = require_number(args, "b")?;
    ctx.tracker.record("add");
    Ok((a + b).to_string())
}

fn execute_subtract(ctx: &ToolContext, args: &serde_json::Value) -> Result<String, ToolError> {
    let a = require_number(args, "a")?;
    let b = require_number(args, "b")?;
    ctx.tracker.record("subtract");
    Ok((a - b).to_string())
}

fn execute_multiply(ctx: &ToolContext, args: &serde_json::Value) -> Result<String, ToolError> {
    let a = require_number(args, "a")?;
    let b = require_number(args, "b")?;
    ctx.tracker.record("multiply");
    Ok((a * b).to_string())
}

fn execute_divide(ctx: &ToolContext, args: &serde_json::Value) -> Result<String, ToolError> {
    let a = require_number(args, "a")?;
    let b = require_number(args, "b")?;
    if b == 0.0 {
        // Checked before recording: a zero-divisor call must not count.
        return Err(ToolError::DivisionByZero);
    }
    ctx.tracker.record("divide");
    Ok((a / b).to_string())
}

fn execute_validate(ctx: &ToolContext, args: &serde_json::Value) -> Result<String, ToolError> {
    let expected = require_number(args, "expected")?;
    let actual = require_number(args, "actual")?;
    let operation = args["operation"]
        .as_str()
        .ok_or(ToolError::InvalidArgument("operation"))?;

    ctx.tracker.record(VALIDATE_TOOL);
    let is_correct = (expected - actual).abs() < VALIDATION_TOLERANCE;
    Ok(json!({ "operation": operation, "is_correct": is_correct }).to_string())
}
