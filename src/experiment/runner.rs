//! Single-trial execution.

use crate::agent::{prompts, schema, Agent, AgentSettings, OutputShaping};
use crate::config::ProbeConfig;
use crate::provider::ChatModel;
use crate::tools::{self, CallTracker, ToolContext, ToolDefinition};
use crate::types::{Mode, SchemaVariant, TrialResult};
use std::sync::Arc;
use tracing::{debug, warn};

/// Map a (mode, schema variant) configuration onto the agent's shaping.
/// Configurations without an explicit variant fall back to the one that
/// carries the verification field.
pub fn output_shaping(mode: Mode, schema_variant: Option<SchemaVariant>) -> OutputShaping {
    let variant = schema_variant.unwrap_or(SchemaVariant::WithValidation);
    match mode {
        Mode::NoFormat => OutputShaping::Free,
        Mode::ToolStrategy => OutputShaping::FinalTool(schema::answer_schema(variant)),
        Mode::ProviderStrategy => OutputShaping::Provider(schema::answer_schema(variant)),
    }
}

/// Runs trials against a shared model handle. The handle is reused across
/// trials purely to amortize construction cost; each trial is otherwise
/// stateless (reset, run, record).
pub struct ExperimentRunner {
    model: Arc<dyn ChatModel>,
    tools: Vec<ToolDefinition>,
    tracker: CallTracker,
    settings: AgentSettings,
}

impl ExperimentRunner {
    pub fn new(model: Arc<dyn ChatModel>, config: &ProbeConfig) -> Self {
        Self {
            model,
            tools: tools::tool_definitions(),
            tracker: CallTracker::new(),
            settings: AgentSettings::from_config(config),
        }
    }

    /// Run one task under one configuration. Failures are recorded on the
    /// result, never propagated; the verification count is whatever the
    /// tracker accumulated before the trial ended.
    pub async fn run_test(
        &self,
        mode: Mode,
        schema_variant: Option<SchemaVariant>,
        task: &str,
    ) -> TrialResult {
        self.tracker.reset();

        // Only the unconstrained mode gets the explicit JSON instruction.
        let prompt = match mode {
            Mode::NoFormat => prompts::SYSTEM_PROMPT_NO_FORMAT,
            _ => prompts::SYSTEM_PROMPT,
        };

        let agent = Agent::new(
            self.model.clone(),
            self.tools.clone(),
            output_shaping(mode, schema_variant),
            prompt,
            self.settings.clone(),
        );
        let ctx = ToolContext {
            tracker: self.tracker.clone(),
        };

        let outcome = agent.invoke(&ctx, task).await;
        let validate_calls = self.tracker.count(tools::VALIDATE_TOOL);

        match outcome {
            Ok(run) => {
                debug!(
                    "trial ok: {} in {} turns, {} validate calls",
                    mode, run.turns, validate_calls
                );
                TrialResult {
                    mode,
                    schema_variant,
                    validate_calls,
                    success: true,
                    error: None,
                }
            }
            Err(e) => {
                warn!("trial failed under {}: {:#}", mode, e);
                TrialResult {
                    mode,
                    schema_variant,
                    validate_calls,
                    success: false,
                    error: Some(format!("{:#}", e)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::ScriptedModel;
    use crate::types::ChatRole;
    use serde_json::json;

    fn config() -> ProbeConfig {
        ProbeConfig::default()
    }

    #[tokio::test]
    async fn consecutive_trials_never_leak_counts() {
        let model = Arc::new(ScriptedModel::new([
            // First trial: one verification call, then a final reply.
            ScriptedModel::tool_reply(
                tools::VALIDATE_TOOL,
                json!({"expected": 5.0, "actual": 5.0, "operation": "total"}),
            ),
            ScriptedModel::content_reply(r#"{"final_answer": 5, "reasoning": "checked"}"#),
            // Second trial: no verification at all.
            ScriptedModel::content_reply(r#"{"final_answer": 7, "reasoning": "direct"}"#),
        ]));
        let runner = ExperimentRunner::new(model, &config());

        let first = runner.run_test(Mode::NoFormat, None, "first task").await;
        let second = runner.run_test(Mode::NoFormat, None, "second task").await;

        assert_eq!(first.validate_calls, 1);
        assert_eq!(second.validate_calls, 0);
    }

    #[tokio::test]
    async fn a_failing_invocation_still_yields_a_result() {
        // An empty script makes the very first model call fail.
        let runner = ExperimentRunner::new(Arc::new(ScriptedModel::new([])), &config());

        let result = runner
            .run_test(
                Mode::ToolStrategy,
                Some(SchemaVariant::WithValidation),
                "task",
            )
            .await;

        assert!(!result.success);
        assert_eq!(result.validate_calls, 0);
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn counts_accumulated_before_a_failure_are_kept() {
        let model = Arc::new(ScriptedModel::new([
            ScriptedModel::tool_reply(
                tools::VALIDATE_TOOL,
                json!({"expected": 1.0, "actual": 1.0, "operation": "x"}),
            ),
            // Script runs dry on the second turn, so the trial fails.
        ]));
        let runner = ExperimentRunner::new(model, &config());

        let result = runner.run_test(Mode::NoFormat, None, "task").await;

        assert!(!result.success);
        assert_eq!(result.validate_calls, 1);
    }

    #[tokio::test]
    async fn only_the_unconstrained_mode_gets_the_json_prompt() {
        let model = Arc::new(ScriptedModel::new([
            ScriptedModel::content_reply(r#"{"final_answer": 1, "reasoning": "a"}"#),
            ScriptedModel::content_reply(
                r#"{"final_answer": 1, "validation_result": null, "reasoning": "a"}"#,
            ),
        ]));
        let runner = ExperimentRunner::new(model.clone(), &config());

        runner.run_test(Mode::NoFormat, None, "task").await;
        runner
            .run_test(
                Mode::ProviderStrategy,
                Some(SchemaVariant::WithValidation),
                "task",
            )
            .await;

        let requests = model.requests();
        let system_of = |i: usize| {
            requests[i]
                .messages
                .iter()
                .find(|m| m.role == ChatRole::System)
                .and_then(|m| m.content.clone())
                .unwrap()
        };
        assert!(system_of(0).contains("Output format"));
        assert!(!system_of(1).contains("Output format"));
    }

    #[test]
    fn shaping_follows_the_mode() {
        assert!(matches!(
            output_shaping(Mode::NoFormat, None),
            OutputShaping::Free
        ));
        assert!(matches!(
            output_shaping(Mode::ToolStrategy, Some(SchemaVariant::WithValidation)),
            OutputShaping::FinalTool(_)
        ));
        assert!(matches!(
            output_shaping(Mode::ProviderStrategy, Some(SchemaVariant::Simple)),
            OutputShaping::Provider(_)
        ));
    }
}
