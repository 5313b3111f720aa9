//! # NotiVet CLI
//!
//! Command-line interface for the NotiVet drug lookup.
//!
//! ## Commands
//!
//! - `notivet load <FILE>` - Import drugs from a JSON array
//! - `notivet search <QUERY>` - Show the drugs the matcher selects for a query
//! - `notivet ask <QUERY>` - Answer a question grounded on the matched drugs
//!
//! ## Examples
//!
//! ```bash
//! notivet --db vet.db load drugs.json
//! notivet --db vet.db search "rimadyl for dogs"
//! OPENAI_API_KEY=... notivet --db vet.db ask "withdrawal time for excede in cattle" --format json
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use notivet_core::matcher::{DrugMatcher, MatchReport};
use notivet_core::Database;
use notivet_llm::{Assistant, AssistantReply, ChatCompletionsClient};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod config;
mod load;

use config::Config;

#[derive(Parser)]
#[command(name = "notivet")]
#[command(about = "Veterinary drug lookup with grounded answers")]
#[command(version)]
struct Cli {
    /// Path to the drug database
    #[arg(long, global = true, default_value = "notivet.db")]
    db: PathBuf,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Import drugs from a JSON file
    Load {
        /// JSON array of drug entries
        file: PathBuf,
    },

    /// Show matched drugs for a query
    Search {
        /// Free-text query
        query: String,
    },

    /// Ask a question answered from the matched drugs
    Ask {
        /// Free-text question
        query: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    // Setup logging
    let directive = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let stdout = std::io::stdout();
    run(cli, config, &mut stdout.lock())
}

/// Execute one command. An error here becomes a non-zero exit status.
fn run(cli: Cli, config: Config, out: &mut dyn Write) -> Result<()> {
    let mut db = Database::open(&cli.db)
        .with_context(|| format!("Failed to open database {}", cli.db.display()))?;

    match cli.command {
        Commands::Load { file } => {
            let drugs = load::read_entries(&file)?;
            let loaded = db.upsert_drugs(&drugs).context("Failed to store drugs")?;
            info!(loaded, file = %file.display(), "imported drugs");

            match cli.format {
                OutputFormat::Json => writeln!(out, "{}", serde_json::json!({ "loaded": loaded }))?,
                OutputFormat::Text => {
                    writeln!(out, "Loaded {loaded} drugs into {}", cli.db.display())?
                }
            }
        }

        Commands::Search { query } => {
            let matcher = DrugMatcher::with_config(&db, config.matcher);
            let report = matcher.search(&query).context("Search failed")?;

            match cli.format {
                OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?,
                OutputFormat::Text => print_report(out, &report)?,
            }
        }

        Commands::Ask { query } => {
            let matcher = DrugMatcher::with_config(&db, config.matcher);
            let mut assistant = Assistant::new(matcher);
            match ChatCompletionsClient::new(&config.generator) {
                Ok(client) => assistant = assistant.with_generator(Box::new(client)),
                Err(e) => warn!(error = %e, "answers unavailable, showing matches only"),
            }

            let reply = assistant.ask(&query).context("Ask failed")?;

            match cli.format {
                OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&reply)?)?,
                OutputFormat::Text => print_reply(out, &reply)?,
            }
        }
    }

    Ok(())
}

fn print_report(out: &mut dyn Write, report: &MatchReport) -> std::io::Result<()> {
    writeln!(out, "Query: {}\n", report.query)?;
    if report.ranked.is_empty() {
        return writeln!(out, "No matching drugs found.");
    }

    for (i, candidate) in report.ranked.iter().enumerate() {
        let drug = &candidate.drug;
        let species: Vec<String> = drug.species_set().iter().map(|s| s.to_string()).collect();
        writeln!(out, "{}. {} (score: {})", i + 1, drug.display_name(), candidate.score)?;
        writeln!(out, "   {} | {}", drug.manufacturer, drug.active_ingredient)?;
        if !species.is_empty() {
            writeln!(out, "   Species: {}", species.join(", "))?;
        }
    }

    if let Some(pass) = report.retrieval_pass {
        writeln!(
            out,
            "\n({} of {} retrieved, {} pass)",
            report.ranked.len(),
            report.retrieved,
            pass.as_str()
        )?;
    }
    Ok(())
}

fn print_reply(out: &mut dyn Write, reply: &AssistantReply) -> std::io::Result<()> {
    match (&reply.answer, &reply.generation_error) {
        (Some(answer), _) => writeln!(out, "{answer}\n")?,
        (None, Some(e)) => writeln!(out, "Answer service unavailable: {e}\n")?,
        (None, None) => {}
    }

    if reply.matched_drugs.is_empty() {
        return writeln!(out, "No matching drugs found.");
    }

    writeln!(out, "Sources:")?;
    for (i, source) in reply.sources.iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, source)?;
    }
    Ok(())
}
