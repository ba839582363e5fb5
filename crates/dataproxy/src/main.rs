use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use dataproxy::{AllowAllGate, DataProxy, DemoRequest, MemoryStore, ProxyConfig};

#[derive(Parser)]
#[command(name = "dataproxy")]
#[command(about = "Proxy re-encryption data sharing demo")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full encrypt, delegate, re-encrypt, decrypt round trip
    Demo(DemoArgs),
}

#[derive(Args)]
struct DemoArgs {
    /// Plaintext payload to encrypt
    #[arg(long, default_value = "Sample data")]
    data: String,

    /// Unique data asset identifier
    #[arg(long, default_value = "asset-001")]
    asset_id: String,

    /// URL recorded in the metadata document
    #[arg(long, default_value = "https://example.com/data")]
    access_url: String,

    /// Minimum key fragments for decryption [default: PRE_THRESHOLD or 2]
    #[arg(long)]
    threshold: Option<u16>,

    /// Total key fragments to generate [default: PRE_SHARES or 3]
    #[arg(long)]
    shares: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = ProxyConfig::from_env()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_filter()));
    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Some(Commands::Demo(args)) => demo(args, config).await,
        None => {
            Cli::command().print_help()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn demo(args: DemoArgs, mut config: ProxyConfig) -> Result<ExitCode> {
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(shares) = args.shares {
        config.shares = shares;
    }

    let request = DemoRequest {
        data: args.data.into_bytes(),
        asset_id: args.asset_id,
        access_url: args.access_url,
        threshold: config.threshold,
        shares: config.shares,
        selection: None,
    };

    let outcome = match DataProxy::new(MemoryStore::new(), AllowAllGate, config) {
        Ok(proxy) => proxy.run_demo(&request).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(outcome) => {
            println!("Decrypted : {}", String::from_utf8_lossy(&outcome.plaintext));
            println!("Access URL: {}", outcome.access_url);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!(kind = %e.kind(), "demo failed: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
