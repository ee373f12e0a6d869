use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use ats_cli::prelude::*;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a resume through the ingestion pipeline against in-memory stubs
    Ingest {
        path: PathBuf,
        #[arg(long, default_value = "all")]
        modules: String,
    },
    /// Classify a resume's mastercategory and category
    Classify { path: PathBuf },
    /// Parse a free-text recruiter query into its structured form
    ParseQuery { query: String },
    /// Retry a resume currently parked in failed:insufficient_text
    Retry { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Ingest { path, modules } => run_ingest(path, modules).await?,
        Commands::Classify { path } => run_classify(path).await?,
        Commands::ParseQuery { query } => run_parse_query(query).await?,
        Commands::Retry { id } => run_retry(*id),
    }

    Ok(())
}

async fn run_ingest(path: &PathBuf, modules: &str) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("resume").to_string();

    let repo = InMemoryResumeRepository::new();
    let llm = EchoLlm::new("IT");
    let config = PipelineConfig::default();
    let ctx = TextExtractionContext::default();

    let record = ingest(&repo, &llm, &config, &ctx, &bytes, &filename, modules).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn run_classify(path: &PathBuf) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("resume").to_string();
    let ctx = TextExtractionContext::default();
    let text = extract_text(&bytes, &filename, &ctx)?;

    let llm = EchoLlm::new("IT");
    let (mastercategory, category) = classify(&llm, &text).await;
    println!(
        "mastercategory={} category={}",
        mastercategory.map(|m| m.as_str().to_string()).unwrap_or_else(|| "none".to_string()),
        category.unwrap_or_else(|| "none".to_string()),
    );
    Ok(())
}

async fn run_parse_query(query: &str) -> Result<()> {
    let llm = EchoLlm::new("not valid json");
    let parsed = parse_query(&llm, query).await;
    println!("{parsed:#?}");
    Ok(())
}

fn run_retry(id: i64) {
    println!(
        "retry of resume {id} requires a persistent repository and file store; \
         this facade only demonstrates single-run ingest/classify/parse-query"
    );
}
