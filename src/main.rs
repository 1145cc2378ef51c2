//! Bankform main entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use bankform_api::start_server;
use bankform_backend::HttpBackend;
use bankform_config::{Config, ConfigErrorSeverity};
use clap::Parser;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "bankform")]
#[command(author = "Bankform Contributors")]
#[command(version = "0.1.0")]
#[command(about = "A web front end for creating and viewing bank-account transactions", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    // A missing file is not fatal: run on defaults and say so once logging is up
    let (config, missing) = match Config::load(args.config.clone()) {
        Ok(config) => (config, None),
        Err(e) if e.severity() == ConfigErrorSeverity::Warning => (Config::default(), Some(e)),
        Err(e) => anyhow::bail!("{}", e.to_details()),
    };

    // RUST_LOG, when set, wins over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level)).init();

    if let Some(e) = missing {
        log::warn!("{}; using default configuration", e);
    } else {
        log::info!("Config loaded from {}", args.config.display());
    }
    log::info!("Backend: {}", config.backend.base());

    let rt = Runtime::new().context("failed to start the tokio runtime")?;
    rt.block_on(async {
        let backend = Arc::new(HttpBackend::from_config(&config.backend));
        start_server(config, backend.clone(), backend).await
    })
}
