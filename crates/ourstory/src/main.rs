//! OurStory - relationship memory backend.
//!
//! Main entry point: parses configuration from flags and environment,
//! initializes logging, and serves the HTTP API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use ourstory_llm::{GroqBackend, GroqConfig};
use ourstory_memory::MemoryStore;
use ourstory_server::{Server, ServerConfig};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// OurStory - relationship memory backend
#[derive(Parser)]
#[command(name = "ourstory")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, env = "OURSTORY_BIND", default_value = "127.0.0.1:8787")]
    pub bind: SocketAddr,

    /// Path to the SQLite database file
    #[arg(long, env = "OURSTORY_DB", default_value = "ourstory.db")]
    pub db: PathBuf,

    /// Comma-separated origin allow-list ("*" allows any origin)
    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        default_value = "*",
        value_delimiter = ','
    )]
    pub allowed_origins: Vec<String>,

    /// Override the model requested from the completion API
    #[arg(long)]
    pub model: Option<String>,

    /// Signing secret reserved for future authentication (unused)
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing: console output, filtered per crate
    let filter = if cli.verbose {
        "ourstory=debug,ourstory_server=debug,ourstory_llm=debug,ourstory_memory=debug,info"
    } else {
        "ourstory=info,ourstory_server=info,ourstory_llm=info,ourstory_memory=info,warn"
    };

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    // Completion backend from GROQ_* environment, with optional model override
    let mut groq = GroqConfig::from_env()?;
    if let Some(model) = cli.model {
        groq = groq.with_model(model);
    }
    let backend = Arc::new(GroqBackend::new(groq)?);

    let store = Arc::new(MemoryStore::open(&cli.db)?);

    let config = ServerConfig::new()
        .with_bind_address(cli.bind)
        .with_allowed_origins(cli.allowed_origins)
        .with_signing_secret(cli.jwt_secret);

    tracing::info!(bind = %config.bind_address, db = %cli.db.display(), "Starting OurStory");

    Server::new(store, backend, config).run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["ourstory"]).unwrap();
        assert_eq!(cli.bind.port(), 8787);
        assert_eq!(cli.db, PathBuf::from("ourstory.db"));
        assert_eq!(cli.allowed_origins, vec!["*".to_string()]);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_origin_list_splits_on_commas() {
        let cli = Cli::try_parse_from([
            "ourstory",
            "--allowed-origins",
            "https://a.example,https://b.example",
        ])
        .unwrap();
        assert_eq!(
            cli.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }
}
