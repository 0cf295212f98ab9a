mod generate_tool;
mod server;

use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use ideogram_contracts::tools::ToolRegistry;
use ideogram_engine::{IdeogramClient, IdeogramConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::generate_tool::GenerateImageTool;
use crate::server::ToolServer;

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Parser)]
#[command(
    name = "ideogram-mcp",
    version,
    about = "Ideogram image generation tool server over stdio"
)]
struct Cli {
    /// Directory generated images are written to. Overrides IDEOGRAM_OUTPUT_DIR.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Upstream API base URL. Overrides IDEOGRAM_API_BASE.
    #[arg(long)]
    api_base: Option<String>,
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

impl Cli {
    fn apply(&self, mut config: IdeogramConfig) -> IdeogramConfig {
        if let Some(api_base) = &self.api_base {
            config = config.with_api_base(api_base.as_str());
        }
        if let Some(output_dir) = &self.output_dir {
            config = config.with_output_dir(output_dir.clone());
        }
        config
    }
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("ideogram-mcp error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            return Err(err).context("failed to load .env file");
        }
    }
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    let config = cli.apply(IdeogramConfig::from_env());
    info!(api_base = %config.api_base, output_dir = %config.output_dir.display(), "starting");
    let client = IdeogramClient::new(config).context("failed to configure Ideogram client")?;

    let mut registry = ToolRegistry::new();
    registry.register(GenerateImageTool::new(client));
    let server = ToolServer::new(registry);
    server.serve(io::stdin().lock(), io::stdout().lock())?;
    Ok(0)
}

// Stdout carries the protocol, so logs go to stderr.
fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);
    match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|err| anyhow!("failed to install log subscriber: {err}"))
}
