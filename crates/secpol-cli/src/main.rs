// SPDX-License-Identifier: MIT OR Apache-2.0
//! Demo binary: builds a single [`RuntimePolicy`], feeds it one JSON event
//! and prints the rendered output/trace pair. Wires the in-process testkit
//! controller in place of a real policy compiler, so the whole pipeline runs
//! without any external process.
#![deny(unsafe_code)]

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use secpol_runtime::{DebugMode, RuntimePolicy};
use secpol_testkit::{AlwaysBuildsPolicyBuilder, InProcessControllerFactory};
use tracing_subscriber::EnvFilter;

const EXIT_RUNTIME_ERROR: i32 = 1;
const EXIT_USAGE_ERROR: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "secpol", version, about = "Runtime policy execution engine demo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a policy, ingest one event, and print its render.
    Run {
        /// Identifier of the policy to build, e.g. `decoder/example/0`.
        #[arg(long)]
        policy_id: String,
        /// Path to a JSON event, or `-` to read it from stdin.
        #[arg(long)]
        event: PathBuf,
        /// Engine config TOML file. Falls back to defaults when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// What the render should include.
        #[arg(long, value_enum, default_value_t = ModeArg::Traces)]
        mode: ModeArg,
    },
    /// Validate an engine config file and print any warnings.
    CheckConfig {
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Output,
    Traces,
    Detailed,
}

impl From<ModeArg> for DebugMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Output => DebugMode::OutputOnly,
            ModeArg::Traces => DebugMode::OutputAndTraces,
            ModeArg::Detailed => DebugMode::OutputAndTracesWithDetails,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("secpol=debug")
    } else {
        EnvFilter::new("secpol=info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Run {
            policy_id,
            event,
            config,
            mode,
        } => cmd_run(&policy_id, &event, config.as_deref(), mode.into()).await,
        Commands::CheckConfig { config } => cmd_check_config(&config),
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(exit_code_for(&err));
    }
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<secpol_config::ConfigError>().is_some() {
        EXIT_USAGE_ERROR
    } else {
        EXIT_RUNTIME_ERROR
    }
}

async fn cmd_run(
    policy_id: &str,
    event_path: &PathBuf,
    config_path: Option<&std::path::Path>,
    mode: DebugMode,
) -> anyhow::Result<()> {
    let config = secpol_config::load_config(config_path)?;
    secpol_config::validate_config(&config)?;

    let event = read_event(event_path)?;

    let policy = RuntimePolicy::new(policy_id, config.max_verbose_per_asset);
    policy
        .build(&AlwaysBuildsPolicyBuilder, &InProcessControllerFactory::echo())
        .await?;
    policy.ingest(event).await?;

    // The testkit controller reacts on a spawned task; give it a moment to
    // land before rendering.
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let (output, trace) = policy.render(mode).await;
    println!("{output}");
    if !matches!(mode, DebugMode::OutputOnly) {
        println!("{trace}");
    }
    Ok(())
}

fn cmd_check_config(path: &std::path::Path) -> anyhow::Result<()> {
    let config = secpol_config::load_config(Some(path))?;
    let warnings = secpol_config::validate_config(&config)?;
    if warnings.is_empty() {
        println!("config is valid, no warnings");
    } else {
        for warning in warnings {
            println!("warning: {warning}");
        }
    }
    Ok(())
}

fn read_event(path: &PathBuf) -> anyhow::Result<secpol_core::Event> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    Ok(value.into())
}
