//! # dpp-cli
//!
//! Command-line interface for Digital Product Passport registry contracts.
//!
//! ## Usage
//!
//! ```bash
//! # Deploy the three registries and remember their addresses
//! dpp --abi-dir artifacts/contracts deploy passport --save
//! dpp --abi-dir artifacts/contracts deploy batch --save
//! dpp --abi-dir artifacts/contracts deploy geolocation --save
//!
//! # Write and read records
//! dpp product set 1 --file product.json
//! dpp product get 1
//! dpp batch create 1 --batch-number BRG-2023-001 --production-date 2023-03-01 \
//!     --expiry-date 2024-03-01 --quantity 5000
//! dpp geo add 1 --latitude 48.8566 --longitude 2.3522
//! dpp geo get 1
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;
mod output;

pub use commands::Context;
pub use config::Config;
pub use error::CliError;
pub use output::Output;

/// Digital Product Passport CLI
#[derive(Parser, Debug)]
#[command(name = "dpp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// RPC endpoint URL
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Signing key (hex)
    #[arg(long, global = true, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Directory of compiler artifacts
    #[arg(long, global = true)]
    abi_dir: Option<PathBuf>,

    /// Base URL of compiler artifacts
    #[arg(long, global = true)]
    abi_url: Option<String>,

    /// Config file (default: ~/.dpp/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Deploy a registry contract
    #[command(subcommand)]
    Deploy(commands::deploy::DeployCommand),
    /// Product passport records
    #[command(subcommand)]
    Product(commands::product::ProductCommand),
    /// Extended product data records
    #[command(subcommand)]
    ProductData(commands::product::ProductDataCommand),
    /// Authorize an entity to write passports
    Authorize(commands::product::AuthorizeArgs),
    /// Batch records
    #[command(subcommand)]
    Batch(commands::batch::BatchCommand),
    /// Geolocation trail
    #[command(subcommand)]
    Geo(commands::geo::GeoCommand),
    /// Show or edit configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Set RPC URL
        #[arg(long)]
        set_rpc: Option<String>,
        /// Set chain ID
        #[arg(long)]
        set_chain_id: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json);

    let ctx = load_context(&cli);
    let result = run(cli.command, ctx).await;

    if let Err(e) = result {
        if cli.json {
            println!(
                "{}",
                serde_json::json!({
                    "error": e.to_string(),
                    "indeterminate": e.exit_code() == 2,
                    "success": false
                })
            );
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(e.exit_code());
    }
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_context(cli: &Cli) -> Result<Context, CliError> {
    let mut config = Config::load(cli.config.as_deref())?;

    // Flags override the config file
    if let Some(rpc_url) = &cli.rpc_url {
        config.rpc_url = rpc_url.clone();
    }
    if let Some(abi_dir) = &cli.abi_dir {
        config.abi_dir = Some(abi_dir.clone());
    }
    if let Some(abi_url) = &cli.abi_url {
        config.abi_dir = None;
        config.abi_url = Some(abi_url.clone());
    }

    Ok(Context {
        config,
        config_path: cli.config.clone(),
        private_key: cli.private_key.clone(),
        json: cli.json,
    })
}

async fn run(command: Commands, ctx: Result<Context, CliError>) -> Result<(), CliError> {
    let mut ctx = ctx?;
    match command {
        Commands::Deploy(cmd) => cmd.execute(&mut ctx).await,
        Commands::Product(cmd) => cmd.execute(&ctx).await,
        Commands::ProductData(cmd) => cmd.execute(&ctx).await,
        Commands::Authorize(args) => args.execute(&ctx).await,
        Commands::Batch(cmd) => cmd.execute(&ctx).await,
        Commands::Geo(cmd) => cmd.execute(&ctx).await,
        Commands::Config {
            show,
            set_rpc,
            set_chain_id,
        } => handle_config(&mut ctx, show, set_rpc, set_chain_id),
    }
}

fn handle_config(
    ctx: &mut Context,
    show: bool,
    set_rpc: Option<String>,
    set_chain_id: Option<u64>,
) -> Result<(), CliError> {
    let mut modified = false;

    if let Some(rpc) = set_rpc {
        ctx.config.rpc_url = rpc;
        modified = true;
    }

    if let Some(chain_id) = set_chain_id {
        ctx.config.chain_id = Some(chain_id);
        modified = true;
    }

    let config = &ctx.config;
    if modified {
        let path = ctx.save_config()?;
        Output::new(ctx.json)
            .field("status", "saved")
            .field("path", &path.display().to_string())
            .message(&format!("Configuration saved to {}", path.display()))
            .print();
    } else if show {
        let show_addr = |a: Option<dpp_sdk::Address>| a.map_or_else(|| "-".to_string(), |a| a.to_string());
        Output::new(ctx.json)
            .field("rpc_url", &config.rpc_url)
            .field_value("chain_id", config.chain_id)
            .field("key_env", &config.key_env)
            .field_value("abi_dir", &config.abi_dir)
            .field_value("abi_url", &config.abi_url)
            .field_value("contracts", &config.contracts)
            .message(&format!(
                "RPC URL:     {}\nChain ID:    {}\nKey env:     {}\nPassport:    {}\nBatch:       {}\nGeolocation: {}",
                config.rpc_url,
                config.chain_id.map_or_else(|| "from node".to_string(), |id| id.to_string()),
                config.key_env,
                show_addr(config.contracts.passport),
                show_addr(config.contracts.batch),
                show_addr(config.contracts.geolocation),
            ))
            .print();
    } else {
        Output::new(ctx.json)
            .message("Use --show to display config, or --set-rpc/--set-chain-id to modify")
            .print();
    }

    Ok(())
}
