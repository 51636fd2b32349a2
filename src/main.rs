//! Atelier - Luxury-Brand Customer Feedback Service
//!
//! Main entry point: serve the HTTP API, export stored records, or print
//! the analytics snapshot for the configured data directory.

use atelier_core::{
    analytics,
    api::ApiServer,
    config::AtelierConfig,
    error::Result,
    store::FeedbackStore,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "atelier", version, about = "Customer feedback collection and analytics service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the feedback API server
    Serve {
        /// Bind address, e.g. 127.0.0.1:3000
        #[arg(long, env = "ATELIER_ADDR")]
        addr: Option<String>,

        /// Data directory holding feedback.json and voice clips
        #[arg(long, env = "ATELIER_DATA_DIR")]
        data_dir: Option<PathBuf>,
    },

    /// Export all feedback records (legacy items upgraded) as JSON
    Export {
        /// Data directory holding feedback.json
        #[arg(long, env = "ATELIER_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the current analytics snapshot
    Stats {
        /// Data directory holding feedback.json
        #[arg(long, env = "ATELIER_DATA_DIR")]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { addr, data_dir } => {
            let config = AtelierConfig::resolve(data_dir, addr)?;
            ApiServer::new(config).serve().await
        }
        Commands::Export { data_dir, output } => {
            export(data_dir, output).await?;
            Ok(())
        }
        Commands::Stats { data_dir } => {
            stats(data_dir).await?;
            Ok(())
        }
    }
}

async fn export(data_dir: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let config = AtelierConfig::resolve(data_dir, None)?;
    let store = FeedbackStore::new(config.feedback_file());
    let records = store.load_all().await?;
    let serialized = serde_json::to_string_pretty(&records)?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, serialized).await?;
            println!("Exported {} record(s) to {}", records.len(), path.display());
        }
        None => println!("{serialized}"),
    }
    Ok(())
}

async fn stats(data_dir: Option<PathBuf>) -> Result<()> {
    let config = AtelierConfig::resolve(data_dir, None)?;
    let store = FeedbackStore::new(config.feedback_file());
    let records = store.load_all().await?;
    let snapshot = analytics::aggregate(&records, Utc::now().date_naive());

    println!("Responses:          {}", snapshot.total_responses);
    println!(
        "Average sentiment:  {:.0}%",
        snapshot.average_sentiment * 100.0
    );
    println!(
        "By type:            {} text / {} voice",
        snapshot.responses_by_type.text, snapshot.responses_by_type.voice
    );
    println!(
        "Distribution:       {} positive / {} neutral / {} negative",
        snapshot.sentiment_distribution.positive,
        snapshot.sentiment_distribution.neutral,
        snapshot.sentiment_distribution.negative
    );

    if !snapshot.top_sections.is_empty() {
        println!("Top sections:");
        for section in &snapshot.top_sections {
            println!(
                "  {:<24} {} response(s), {:.0}% sentiment",
                section.section_id,
                section.response_count,
                section.average_sentiment * 100.0
            );
        }
    }

    println!("Last 7 days:");
    for trend in &snapshot.recent_trends {
        println!(
            "  {}  {:>3} response(s), {:.0}% sentiment",
            trend.date,
            trend.count,
            trend.average_sentiment * 100.0
        );
    }
    Ok(())
}
