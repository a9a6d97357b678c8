use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use code_assistant::{
    agents::AgentOrchestrator,
    config::Config,
    history::{AnalysisStore, MemoryStore, NoopStore},
    llm::client_from_config,
    server::{self, AppState},
    types::AnalysisEnvelope,
};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "code-assistant")]
#[command(about = "Multi-agent code assistant with LLM delegation and heuristic fallback")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Port override
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Analyze a code file (reads stdin when no file is given)
    Analyze {
        /// Path to the code file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Agents to run (bugDetector, testGenerator, docGenerator,
        /// optimization, all)
        #[arg(short, long)]
        agents: Vec<String>,

        /// Output format (json, text)
        #[arg(short, long, default_value = "text")]
        output: String,
    },

    /// Check agent registration and delegation availability
    HealthCheck,

    /// Initialize configuration file
    Init {
        /// Configuration file path
        #[arg(short = 'f', long, default_value = "code-assistant.yml")]
        config_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    init_tracing(&cli.log_level)?;

    let config = load_config(cli.config.as_ref()).await?;
    config.validate()?;

    match cli.command {
        Commands::Serve { port } => serve(config, port).await?,
        Commands::Analyze {
            file,
            agents,
            output,
        } => analyze(config, file, agents, output).await?,
        Commands::HealthCheck => health_check(config),
        Commands::Init { config_file } => init_config(config_file).await?,
    }

    Ok(())
}

/// Initialize tracing with the specified log level
fn init_tracing(log_level: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .context("Failed to create env filter")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true),
        )
        .with(env_filter)
        .init();

    Ok(())
}

/// Load configuration from file or use defaults, then apply env overrides.
async fn load_config(config_path: Option<&PathBuf>) -> Result<Config> {
    let mut config = if let Some(path) = config_path {
        if path.exists() {
            info!("Loading configuration from: {:?}", path);
            Config::load_from_file(path)
                .await
                .with_context(|| format!("Failed to load config file: {path:?}"))?
        } else {
            warn!("Configuration file not found: {:?}. Using defaults.", path);
            Config::default()
        }
    } else {
        Config::default()
    };

    config.apply_env_overrides()?;
    Ok(config)
}

fn build_state(config: &Config) -> AppState {
    let client = client_from_config(&config.llm);
    let orchestrator = Arc::new(AgentOrchestrator::new(client));

    let store: Arc<dyn AnalysisStore> = if config.history.enabled {
        Arc::new(MemoryStore::new(config.history.capacity))
    } else {
        Arc::new(NoopStore)
    };

    AppState {
        orchestrator,
        store,
    }
}

async fn serve(config: Config, port: Option<u16>) -> Result<()> {
    let state = build_state(&config);
    let port = port.unwrap_or(config.server.port);

    info!("Starting code assistant server");
    server::serve(state, &config.server.host, port).await
}

async fn analyze(
    config: Config,
    file: Option<PathBuf>,
    agents: Vec<String>,
    output: String,
) -> Result<()> {
    let code = match file {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {path:?}"))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read code from stdin")?;
            buffer
        }
    };

    let state = build_state(&config);
    let envelope = state.orchestrator.analyze_code(&code, &agents).await;

    let content = match output.to_lowercase().as_str() {
        "json" => serde_json::to_string_pretty(&envelope)?,
        "text" => generate_text_report(&envelope),
        other => {
            warn!("Unknown output format '{}', using text", other);
            generate_text_report(&envelope)
        }
    };

    println!("{content}");
    Ok(())
}

fn health_check(config: Config) {
    let client = client_from_config(&config.llm);
    let orchestrator = AgentOrchestrator::new(client.clone());

    println!("System Status: OK");
    println!("Delegation client: {}", client.name());
    println!("Registered agents:");
    for name in orchestrator.agent_names() {
        println!("  - {name}");
    }
}

async fn init_config(config_file: PathBuf) -> Result<()> {
    if config_file.exists() {
        anyhow::bail!("Configuration file already exists: {config_file:?}");
    }

    Config::default()
        .save_to_file(&config_file)
        .await
        .with_context(|| format!("Failed to write configuration file: {config_file:?}"))?;

    println!("Configuration file created: {config_file:?}");
    println!("Edit this file to customize the assistant behavior.");
    Ok(())
}

/// Plain text rendering of the analysis envelope.
fn generate_text_report(envelope: &AnalysisEnvelope) -> String {
    let mut out = String::from("Code Analysis Report\n====================\n\n");

    match envelope {
        AnalysisEnvelope::Failure { error, .. } => {
            out.push_str(&format!("Analysis failed: {error}\n"));
        }
        AnalysisEnvelope::Success {
            results, timestamp, ..
        } => {
            if let Some(bugs) = &results.bugs {
                out.push_str(&format!(
                    "Bugs ({} found, severity {:?}):\n",
                    bugs.count, bugs.severity
                ));
                for issue in &bugs.issues {
                    out.push_str(&format!("  - {issue}\n"));
                }
                out.push('\n');
            }

            if let Some(tests) = &results.tests {
                out.push_str(&format!(
                    "Generated tests ({}, {} coverage {}):\n",
                    tests.count, tests.framework, tests.coverage
                ));
                for test in &tests.tests {
                    out.push_str(&format!("  - {test}\n"));
                }
                out.push('\n');
            }

            if let Some(documentation) = &results.documentation {
                out.push_str(&format!(
                    "Documentation ({} sections):\n{}\n",
                    documentation.sections, documentation.documentation
                ));
            }

            if let Some(optimizations) = &results.optimizations {
                out.push_str(&format!(
                    "Optimizations ({}, potential gain {}):\n",
                    optimizations.count, optimizations.potential_gain
                ));
                for suggestion in &optimizations.suggestions {
                    out.push_str(&format!("  - {suggestion}\n"));
                }
                out.push('\n');
            }

            out.push_str(&format!(
                "Generated at: {}\n",
                timestamp.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
    }

    out
}
