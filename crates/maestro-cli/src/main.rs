//! `maestro` command-line entry point.

mod config;

use clap::{Parser, Subcommand};
use config::{LogConfig, LogFormat, MaestroConfig};
use maestro_agent::default_profiles;
use maestro_orchestrator::{AgentRegistry, Orchestrator};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "maestro", about = "Maestro — multi-agent task orchestration")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "maestro.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decompose a command, run it and print the validated result
    Run {
        /// Natural-language command
        #[arg(required = true, num_args = 1..)]
        command: Vec<String>,
    },
    /// Print the task graph a command decomposes into, without running it
    Plan {
        /// Natural-language command
        #[arg(required = true, num_args = 1..)]
        command: Vec<String>,
    },
    /// List the built-in agent profiles with effective model settings
    Profiles,
}

fn init_tracing(log: &LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

fn orchestrator(config: &MaestroConfig) -> anyhow::Result<Orchestrator> {
    let mut registry = AgentRegistry::with_defaults();
    for (role, model) in config.model_overrides()? {
        registry.set_model(role, model);
    }
    Ok(Orchestrator::new(config.orchestrator.clone()).with_registry(registry))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = MaestroConfig::load(&cli.config).await?;
    init_tracing(&config.log);

    match cli.command {
        Commands::Run { command } => {
            let command = command.join(" ");
            let orchestrator = orchestrator(&config)?;
            let outcome = orchestrator.run_command(&command).await?;
            info!(
                summary = %outcome.result.aggregate.summary,
                deadlocked = outcome.deadlocked,
                "Run complete"
            );
            orchestrator.cleanup().await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Plan { command } => {
            let tasks = orchestrator(&config)?.plan(&command.join(" "));
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        Commands::Profiles => {
            let overrides = config.model_overrides()?;
            let profiles: Vec<_> = default_profiles()
                .into_iter()
                .map(|profile| {
                    match overrides.iter().find(|(role, _)| *role == profile.role) {
                        Some((_, model)) => profile.with_model(model.clone()),
                        None => profile,
                    }
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&profiles)?);
        }
    }

    Ok(())
}
