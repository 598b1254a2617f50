//! lectio - command-line front end for the study gateway.
//!
//! Builds a [`StudyGateway`](lectio::StudyGateway) from the standard
//! configuration and secrets, runs one command, and prints the result.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;

use lectio::study::RUBRICS;
use lectio::{Config, Secrets, StudyGateway, StudyRequest};

/// Lectio: Bible-study content gateway
#[derive(Parser)]
#[command(name = "lectio")]
#[command(version = lectio::PKG_VERSION)]
#[command(about = "Generate Bible-study content with key rotation, caching and fallback")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "LECTIO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate verse-by-verse content for a passage
    Generate {
        /// Passage, e.g. "Genèse 1" or "Jean 3:16"
        passage: String,
        /// Target content length
        #[arg(short, long, default_value_t = 500)]
        length: u32,
        /// Skip the primary provider and use fallback content only
        #[arg(long)]
        no_primary: bool,
    },

    /// Generate a multi-section study
    Study {
        /// Passage, e.g. "Jean 3"
        passage: String,
        /// Rubric index (repeatable, at most 5; default: 0-4)
        #[arg(short, long = "rubric")]
        rubrics: Vec<usize>,
        /// Skip the primary provider and use fallback content only
        #[arg(long)]
        no_primary: bool,
    },

    /// List the study rubrics
    Rubrics,

    /// Show per-key and retrieval status as JSON
    Status,

    /// Check gateway health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: info; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Generate {
            passage,
            length,
            no_primary,
        } => {
            let gateway = build_gateway(args.config.as_deref())?;
            let generated = gateway.generate(&passage, length, !no_primary).await;
            println!("{}", generated.content);
            eprintln!(
                "source: {} ({})",
                generated.source,
                generated.outcome.as_str()
            );
        }

        Command::Study {
            passage,
            rubrics,
            no_primary,
        } => {
            let gateway = build_gateway(args.config.as_deref())?;
            let mut request = StudyRequest::new(passage).use_primary(!no_primary);
            if !rubrics.is_empty() {
                request = request.rubrics(rubrics);
            }
            let study = gateway.generate_study(&request).await;
            println!("{}", study.content);
            eprintln!(
                "source: {} ({} rubrics)",
                study.source, study.rubrics_generated
            );
        }

        // Static listing; needs neither config nor secrets.
        Command::Rubrics => {
            for line in rubric_lines() {
                println!("{line}");
            }
        }

        Command::Status => {
            let gateway = build_gateway(args.config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&gateway.status())?);
        }

        Command::Health => {
            let gateway = build_gateway(args.config.as_deref())?;
            let health = gateway.health().await;
            println!("lectio {}", health.version);
            if let Some(built_at) = lectio::BuildInfo::current().built_at {
                println!("built: {built_at}");
            }
            println!("status: {}", health.status);
            for line in &health.keys {
                println!("  {line}");
            }
            println!(
                "current key: {}",
                health.current_key.as_deref().unwrap_or("none")
            );
            println!("retrieval configured: {}", health.retrieval_configured);
            println!("cache entries: {}", health.cache_entries);
        }
    }

    Ok(())
}

/// Load config and secrets, then build the gateway.
fn build_gateway(config: Option<&Path>) -> Result<StudyGateway, Box<dyn std::error::Error>> {
    let config = Config::load(config)?;
    let secrets = Secrets::load()?;
    let gateway = config.builder(&secrets).build()?;
    info!(version = lectio::version_string(), "lectio starting");
    Ok(gateway)
}

fn rubric_lines() -> Vec<String> {
    RUBRICS
        .iter()
        .enumerate()
        .map(|(index, title)| format!("{index:>2}  {title}"))
        .collect()
}
