use std::sync::Arc;

use clap::Parser;
use clap::Subcommand;
use satsangrag::config::AppConfig;
use satsangrag::database::Database;
use satsangrag::database::NewChunk;
use satsangrag::embeddings::EmbeddingClient;
use satsangrag::Result;
use tracing::info;
use tracing::warn;

#[derive(Parser)]
#[command(name = "satsangrag")]
#[command(about = "Retrieval-augmented chat backend over a spiritual-teachings corpus")]
#[command(version)]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Host to bind, overriding the config file
        #[arg(long)]
        host: Option<String>,
        /// Port to bind, overriding the config file
        #[arg(long)]
        port: Option<u16>,
    },
    /// Ingest a JSONL file of chunk records into the knowledge base
    Ingest {
        /// Path to the JSONL file (one chunk object per line)
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    satsangrag::logging::init_logging(Some(&config))?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            satsangrag::api::serve_api(&config, host, port).await
        }
        Commands::Ingest { file } => ingest_file(&config, &file).await,
    }
}

/// Read chunk records line by line, embed each content, and insert.
async fn ingest_file(config: &AppConfig, path: &str) -> Result<()> {
    let database = Arc::new(Database::from_config(config).await?);
    let embeddings = EmbeddingClient::new(config)?;

    let content = std::fs::read_to_string(path)?;
    let mut inserted = 0_usize;
    let mut skipped = 0_usize;

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let chunk: NewChunk = match serde_json::from_str(line) {
            Ok(chunk) => chunk,
            Err(err) => {
                warn!("Skipping malformed record at line {}: {}", line_no + 1, err);
                skipped += 1;
                continue;
            }
        };
        let embedding = embeddings.embed(&chunk.content).await?;
        let id = database.insert_chunk(&chunk, &embedding).await?;
        inserted += 1;
        if inserted % 100 == 0 {
            info!("Ingested {} chunks (latest id {})", inserted, id);
        }
    }

    info!("Ingestion complete: {} inserted, {} skipped", inserted, skipped);
    Ok(())
}
