use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dvlens::types::severity::EntityEvent;

/// Parse triggering event from string
fn parse_event(s: &str) -> Result<EntityEvent, String> {
    match s.to_lowercase().as_str() {
        "create" => Ok(EntityEvent::Create),
        "update" => Ok(EntityEvent::Update),
        "delete" => Ok(EntityEvent::Delete),
        _ => Err(format!(
            "Invalid event '{}'. Valid values: create, update, delete",
            s
        )),
    }
}

#[derive(Parser)]
#[command(name = "dvlens")]
#[command(
    version,
    about = "Automation topology and risk analyzer for Dataverse environments"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, help = "Read configuration from this file only")]
    config: Option<PathBuf>,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis over an environment snapshot
    Analyze {
        #[arg(long, short, help = "Path to the environment snapshot JSON")]
        snapshot: PathBuf,
        #[arg(long, short, help = "Write the report here instead of stdout")]
        output: Option<PathBuf>,
    },

    /// Reconstruct the execution pipeline for one entity and event
    Pipeline {
        #[arg(long, short, help = "Path to the environment snapshot JSON")]
        snapshot: PathBuf,
        #[arg(long, short, help = "Entity logical name")]
        entity: String,
        #[arg(long, value_parser = parse_event, help = "Triggering event: create, update, delete")]
        event: EntityEvent,
        #[arg(long, help = "Print the pipeline as JSON")]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(long, help = "Print as JSON instead of TOML")]
        json: bool,
    },
    /// Show configuration file paths
    Path,
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            dvlens::cli::Output::new().error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Analyze { snapshot, output } => {
            dvlens::cli::commands::analyze::run(
                &snapshot,
                output.as_deref(),
                cli.config.as_deref(),
            )?;
        }
        Commands::Pipeline {
            snapshot,
            entity,
            event,
            json,
        } => {
            dvlens::cli::commands::pipeline::run(
                &snapshot,
                &entity,
                event,
                json,
                cli.config.as_deref(),
            )?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => {
                dvlens::cli::commands::config::show(json)?;
            }
            ConfigAction::Path => {
                dvlens::cli::commands::config::path();
            }
        },
    }

    Ok(())
}
