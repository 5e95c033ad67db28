use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use tracing::info;
use tracing_subscriber::EnvFilter;

use counterpoint_common::{Config, HistoryEntry, Topic};
use counterpoint_verifier::render::{
    confidence_line, html_to_plain_text, render_social_terminal, render_terminal,
};
use counterpoint_verifier::{HistoryStore, RunOutcome, Verifier};

#[derive(Parser)]
#[command(name = "counterpoint", about = "Cross-check a news topic against web sources and X")]
struct Cli {
    /// Emit log lines as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify a topic and record the run in history
    Verify {
        /// Topic to verify (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        topic: Vec<String>,

        /// Print the run as JSON
        #[arg(long)]
        json: bool,
    },
    /// List past runs, or show one
    History {
        /// Entry to show (0 = most recent)
        #[arg(long, allow_negative_numbers = true)]
        index: Option<i64>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::from_default_env().add_directive("counterpoint=info".parse()?);
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Command::Verify { topic, json } => verify(&config, &topic.join(" "), json).await,
        Command::History { index, json } => history(&config, index, json),
    }
}

async fn verify(config: &Config, raw_topic: &str, json: bool) -> Result<()> {
    let topic = Topic::new(raw_topic)?;
    info!(topic = topic.as_str(), "Starting verification");

    let verifier = Verifier::from_config(config);
    let outcome = verifier.run(&topic).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        RunOutcome::Unavailable { reason } => {
            println!("{}", style(format!("⚠ Verification unavailable: {reason}")).yellow());
        }
        RunOutcome::NoEvidence => {
            println!(
                "{}",
                style(format!("No recent web sources found for '{topic}'.")).yellow()
            );
        }
        RunOutcome::Completed(run) => {
            print!(
                "{}",
                render_terminal(&run.topic, &run.report, &run.sources, &run.social)
            );
            if let Some(err) = &run.persist_error {
                println!("{}", style(format!("⚠ Run not saved to history: {err}")).red());
            }
        }
    }
    Ok(())
}

fn history(config: &Config, index: Option<i64>, json: bool) -> Result<()> {
    let store = HistoryStore::new(&config.history_path);

    let Some(index) = index else {
        let entries = store.load_all();
        if json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }
        if entries.is_empty() {
            println!("No verification history yet.");
        }
        for (i, entry) in entries.iter().enumerate() {
            println!(
                "{:>3}  {}  {:<28}  {}",
                i,
                style(&entry.timestamp).dim(),
                confidence_line(&entry.confidence_score),
                entry.topic
            );
        }
        return Ok(());
    };

    let Some(entry) = store.get_by_index(index) else {
        eprintln!("No history entry at index {index}");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        print_entry(&entry);
    }
    Ok(())
}

fn print_entry(entry: &HistoryEntry) {
    println!("{}", style(format!("Verification: {}", entry.topic)).bold());
    println!("Recorded:   {}", entry.timestamp);
    println!("Confidence: {}", confidence_line(&entry.confidence_score));
    println!();
    print!("{}", html_to_plain_text(&entry.report_html));
    if let Some(social) = &entry.x_intel_data {
        println!();
        print!("{}", render_social_terminal(social));
    }
}
