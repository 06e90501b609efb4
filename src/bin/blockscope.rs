#![forbid(unsafe_code)]
//! Look up blocks, transactions, addresses and network stats.

use blockscope::cli::{
    build_service, render_address, render_block, render_stats, render_transaction,
};
use blockscope::{BlockIdentifier, ConfigResolver};
use clap::{ArgGroup, Parser, Subcommand};
use colored::*;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a block by hash or height
    #[command(group(ArgGroup::new("id").required(true).args(["hash", "height"])))]
    Block {
        /// Block hash
        #[arg(long)]
        hash: Option<String>,
        /// Block height
        #[arg(long)]
        height: Option<u64>,
    },
    /// Show a transaction
    Tx {
        /// Transaction ID (hash)
        #[arg(long)]
        txid: String,
    },
    /// Show the transaction history of an address
    Address {
        /// Bitcoin address
        #[arg(long)]
        address: String,
    },
    /// Show node and chain statistics
    Stats,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Configuration problems are fatal before any lookup.
    let config = match ConfigResolver::default().resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Configuration error:".red().bold(), e);
            return ExitCode::from(2);
        }
    };
    tracing::debug!(?config, "configuration loaded");

    let service = match build_service(&config) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("{} {}", "Initialization error:".red().bold(), e);
            return ExitCode::from(2);
        }
    };

    let output = match cli.command {
        Commands::Block { hash, height } => {
            let id = match (hash, height) {
                (Some(hash), _) => BlockIdentifier::Hash(hash),
                (None, Some(height)) => BlockIdentifier::Height(height),
                (None, None) => {
                    eprintln!(
                        "{}",
                        "Please provide a block hash or height using --hash or --height.".yellow()
                    );
                    return ExitCode::from(2);
                }
            };
            service.lookup_block(&id).await.map(|b| render_block(&b))
        }
        Commands::Tx { txid } => service
            .lookup_transaction(&txid)
            .await
            .map(|tx| render_transaction(&tx)),
        Commands::Address { address } => service
            .lookup_address(&address)
            .await
            .map(|body| render_address(&body)),
        Commands::Stats => service.network_stats().await.map(|s| render_stats(&s)),
    };

    match output {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            let mut message = e.to_string();
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                if !message.contains(&cause.to_string()) {
                    message.push_str(&format!(": {}", cause));
                }
                source = cause.source();
            }
            eprintln!("{} {}", "Error:".red().bold(), message);
            ExitCode::FAILURE
        }
    }
}
