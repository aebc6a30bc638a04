//! Target output schemas for the shaped final answer.

use crate::types::SchemaVariant;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Parsed structured final answer.
///
/// `validation_result` is whatever `validate_calculation` returned, if the
/// model chose to call it and carry the result through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalAnswer {
    pub final_answer: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_result: Option<Value>,
    pub reasoning: String,
}

/// JSON Schema for the given variant.
///
/// Strict provider enforcement requires every property listed in `required`,
/// so the optional verification field is expressed as a nullable type.
pub fn answer_schema(variant: SchemaVariant) -> Value {
    match variant {
        SchemaVariant::WithValidation => json!({
            "type": "object",
            "properties": {
                "final_answer": {
                    "type": "number",
                    "description": "The final numeric result"
                },
                "validation_result": {
                    "type": ["object", "null"],
                    "description": "Result reported by validate_calculation, if any",
                    "additionalProperties": true
                },
                "reasoning": {
                    "type": "string",
                    "description": "How the result was computed"
                }
            },
            "required": ["final_answer", "validation_result", "reasoning"],
            "additionalProperties": false
        }),
        SchemaVariant::Simple => json!({
            "type": "object",
            "properties": {
                "final_answer": {
                    "type": "number",
                    "description": "The final numeric result"
                },
                "reasoning": {
                    "type": "string",
                    "description": "How the result was computed"
                }
            },
            "required": ["final_answer", "reasoning"],
            "additionalProperties": false
        }),
    }
}

/// Parse a provider-shaped text reply against the answer schema.
pub fn parse_final_answer(raw: &str) -> Result<FinalAnswer> {
    serde_json::from_str(raw).context("final reply did not match the answer schema")
}

/// Parse finalization-tool arguments against the answer schema.
pub fn parse_final_answer_value(value: &Value) -> Result<FinalAnswer> {
    serde_json::from_value(value.clone())
        .context("finalization arguments did not match the answer schema")
}
