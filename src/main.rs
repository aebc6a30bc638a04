//! Schemaprobe — measures how structured-output configuration shapes an
//! agent's use of a verification tool.
//!
//! Usage:
//!   schemaprobe run        Run the full experiment and print the report
//!   schemaprobe inspect    Show what each configuration sends to the API
//!   schemaprobe tasks      List the task catalog

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use schemaprobe::config;
use schemaprobe::experiment::{catalog, report, ExperimentRunner};
use schemaprobe::provider::{ChatRequestSpec, InferenceClient, RequestInspector};
use schemaprobe::types::ChatRole;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "schemaprobe")]
#[command(version = "0.1.0")]
#[command(about = "Probe how structured-output strategies shape agent tool use")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (defaults to ~/.schemaprobe/config.toml).
    #[arg(long)]
    config: Option<String>,

    /// Log level (debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every configuration against every task and print the report.
    Run,

    /// Send one small task through each configuration and show what the
    /// requests carry.
    Inspect,

    /// List the task catalog with expected results.
    Tasks,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let config_path = cli
        .config
        .as_deref()
        .map(|p| PathBuf::from(shellexpand::tilde(p).into_owned()))
        .unwrap_or_else(config::default_config_path);
    let cfg = config::load_config(&config_path)?;

    match cli.command {
        Commands::Run => cmd_run(cfg).await,
        Commands::Inspect => cmd_inspect(cfg).await,
        Commands::Tasks => cmd_tasks(),
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

async fn cmd_run(cfg: config::ProbeConfig) -> Result<()> {
    let Some(api_key) = config::api_key() else {
        println!(
            "{} {} is not set; no trials were run.",
            "Note:".yellow().bold(),
            config::API_KEY_ENV
        );
        return Ok(());
    };

    println!(
        "{} schemaprobe run started {} (model: {})",
        ">>>".green().bold(),
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        cfg.model,
    );

    let client = InferenceClient::new(&cfg.api_base_url, &api_key);
    let runner = ExperimentRunner::new(Arc::new(client), &cfg);

    let summaries = report::run_experiment(&runner).await;
    report::print_report(&summaries);

    Ok(())
}

async fn cmd_inspect(cfg: config::ProbeConfig) -> Result<()> {
    let Some(api_key) = config::api_key() else {
        println!(
            "{} {} is not set; nothing to inspect.",
            "Note:".yellow().bold(),
            config::API_KEY_ENV
        );
        return Ok(());
    };

    let client = InferenceClient::new(&cfg.api_base_url, &api_key)
        .with_inspector(Arc::new(ConsoleInspector));
    let runner = ExperimentRunner::new(Arc::new(client), &cfg);

    for (mode, variant) in catalog::configs() {
        println!();
        println!("{} configuration: {}", ">>>".green().bold(), mode);
        let result = runner.run_test(mode, variant, "Compute 10 + 5.").await;
        if result.success {
            println!(
                "    finished, {} verification calls",
                result.validate_calls
            );
        } else {
            // Failures are part of the exercise here; show and move on.
            println!(
                "    {} {}",
                "error (tolerated):".yellow(),
                result.error.unwrap_or_default()
            );
        }
    }

    Ok(())
}

fn cmd_tasks() -> Result<()> {
    println!();
    println!("{}", "=== Task catalog ===".bold());
    println!();
    println!("  {:<10} {:>10}   {}", "name", "expected", "task");
    println!("  {}", "-".repeat(66));
    for case in catalog::TASK_CASES {
        println!("  {:<10} {:>10}   {}", case.name, case.expected, case.task);
    }
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// Request inspection
// ---------------------------------------------------------------------------

/// Prints the interesting parts of every outgoing request.
struct ConsoleInspector;

impl RequestInspector for ConsoleInspector {
    fn on_request(&self, request: &ChatRequestSpec) {
        let rule = "-".repeat(60);
        println!("{}", rule);
        println!("{}", "Request to the API:".bold());

        let names: Vec<&str> = request.tools.iter().map(|t| t.name.as_str()).collect();
        println!("  tools ({}): {}", names.len(), names.join(", "));

        match &request.response_format {
            Some(format) => println!("  response_format: {} (json_schema)", format.name()),
            None => println!("  response_format: none"),
        }

        let user_msg = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .and_then(|m| m.content.as_deref());
        if let Some(msg) = user_msg {
            println!("  user message: {}", msg);
        }
        println!("{}", rule);
    }
}
