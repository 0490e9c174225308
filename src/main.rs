/// Generates (and optionally applies) the lesson seed script.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The command to execute. If no command is given, help is shown.
    #[command(subcommand)]
    command: Option<Commands>,

    /// TOML file with target keys and content fragments. Built-in defaults otherwise.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Writes the seed script to stdout or to a file.
    #[command(name = "generate", alias = "g")]
    Generate {
        /// File to write the script to instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Generates the seed script and runs it against the database.
    Apply {
        /// Postgres connection string of the target database.
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SeedConfig> {
    match path {
        Some(path) => {
            info!("Using config file {}", path.display());
            SeedConfig::load(path)
        }
        None => Ok(SeedConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- Logging goes to stderr; stdout is reserved for the script ---
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // --- Parse CLI commands ---
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        // If no command was given, print help.
        Cli::parse_from(["", "--help"]);
        return Ok(());
    };

    let config = load_config(cli.config.as_deref())?;

    // The whole script is built before anything is written or sent.
    let script = generate(&config).context("Seed generation aborted, nothing was written")?;

    match command {
        Commands::Generate { output } => match output {
            Some(path) => {
                fs::write(&path, &script)
                    .with_context(|| format!("Failed to write seed script to {}", path.display()))?;
                info!("Seed script written to {}", path.display());
            }
            None => {
                io::stdout()
                    .lock()
                    .write_all(script.as_bytes())
                    .context("Failed to write seed script to stdout")?;
            }
        },
        Commands::Apply { database_url } => {
            let rows = apply_batch(&database_url, &script).await?;
            info!("Seed batch applied, {} rows affected", rows);
        }
    }

    Ok(())
}

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use lesson_seed::apply::apply_batch;
use lesson_seed::{generate, SeedConfig};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
