//! Experiment driver and console report.

use crate::experiment::catalog;
use crate::experiment::runner::ExperimentRunner;
use crate::types::{Mode, SchemaVariant};
use colored::Colorize;
use std::io::{self, Write};

/// Verification counts collected for one configuration, in task order.
#[derive(Debug, Clone)]
pub struct ModeSummary {
    pub mode: Mode,
    pub schema_variant: Option<SchemaVariant>,
    pub counts: Vec<u64>,
}

impl ModeSummary {
    pub fn label(&self) -> String {
        match self.schema_variant {
            Some(variant) => format!("{} ({})", self.mode, variant),
            None => format!("{} (no schema)", self.mode),
        }
    }

    /// Arithmetic mean of the per-trial counts, 0 when empty.
    pub fn mean(&self) -> f64 {
        if self.counts.is_empty() {
            return 0.0;
        }
        self.counts.iter().sum::<u64>() as f64 / self.counts.len() as f64
    }
}

/// The fixed three-branch comparison on mean verification counts. The
/// provider-below-tool case lands in `Unexpected`; the table is minimal,
/// not exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conclusion {
    HypothesisConfirmed,
    NoDifference,
    Unexpected,
}

pub fn conclude(provider_mean: f64, tool_mean: f64) -> Conclusion {
    if provider_mean > tool_mean {
        Conclusion::HypothesisConfirmed
    } else if provider_mean == tool_mean && provider_mean >= 1.0 {
        Conclusion::NoDifference
    } else {
        Conclusion::Unexpected
    }
}

/// Run every configuration against every task, strictly in order, with an
/// in-place progress counter. Returns one summary per configuration.
pub async fn run_experiment(runner: &ExperimentRunner) -> Vec<ModeSummary> {
    let configs = catalog::configs();
    let total = configs.len() * catalog::TASK_CASES.len();
    println!(
        "Running {} trials ({} tasks x {} configurations)...",
        total,
        catalog::TASK_CASES.len(),
        configs.len()
    );

    let mut summaries: Vec<ModeSummary> = configs
        .iter()
        .map(|(mode, variant)| ModeSummary {
            mode: *mode,
            schema_variant: *variant,
            counts: Vec::new(),
        })
        .collect();

    let mut index = 0;
    for (slot, (mode, variant)) in configs.iter().enumerate() {
        for case in catalog::TASK_CASES {
            index += 1;
            print!("\r  [{}/{}]", index, total);
            let _ = io::stdout().flush();
            let result = runner.run_test(*mode, *variant, case.task).await;
            summaries[slot].counts.push(result.validate_calls);
        }
    }
    println!("\n");

    summaries
}

/// Print the comparison table and the conclusion paragraph.
pub fn print_report(summaries: &[ModeSummary]) {
    let rule = "=".repeat(60);
    let thin_rule = "-".repeat(60);

    println!("{}", rule);
    println!("{}", "Results: validate_calculation invocations".bold());
    println!("{}", rule);
    println!("{:<35} {:>14} {:>8}", "configuration", "per trial", "mean");
    println!("{}", thin_rule);
    for summary in summaries {
        println!(
            "{:<35} {:>14} {:>7.1}",
            summary.label(),
            format!("{:?}", summary.counts),
            summary.mean()
        );
    }

    let mean_of = |mode: Mode| {
        summaries
            .iter()
            .find(|s| s.mode == mode)
            .map(|s| s.mean())
            .unwrap_or(0.0)
    };
    let provider = mean_of(Mode::ProviderStrategy);
    let tool = mean_of(Mode::ToolStrategy);
    let unconstrained = mean_of(Mode::NoFormat);

    println!();
    println!("{}", rule);
    println!("{}", "Conclusion".bold());
    println!("{}", rule);
    println!();
    println!("Mean verification calls per task:");
    println!("   provider_strategy: {:.1}", provider);
    println!("   tool_strategy:     {:.1}", tool);
    println!("   no_format:         {:.1}", unconstrained);
    println!();

    match conclude(provider, tool) {
        Conclusion::HypothesisConfirmed => {
            println!("{}", "Hypothesis confirmed:".green().bold());
            println!("   The provider-enforced schema pushes the model to fill the");
            println!("   verification field; the tool-mediated schema leaves the");
            println!("   optional field easy to skip.");
        }
        Conclusion::NoDifference => {
            println!("{}", "No difference observed:".yellow().bold());
            println!("   Both strategies trigger verification equally often.");
        }
        Conclusion::Unexpected => {
            println!("{}", "Unexpected result.".red().bold());
        }
    }
}
