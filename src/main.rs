use std::{process, sync::Arc};

use bookmarkhub::{App, BookmarkStore, Cli, Commands, Config, Result};
use clap::Parser;
use log::{error, info};
use tokio::sync::Mutex;

pub fn initialize_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;

    if let Commands::Config { show, set, reset } = cli.command {
        return App::configure(&config, cli.config.as_deref(), show, set, reset);
    }

    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let store = BookmarkStore::from_config(&config)?;
    let app = App::new(Arc::new(Mutex::new(store)), config, cli.verbose);
    app.run(cli.command).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    info!("Application starting up");

    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    info!("Application shutting down");
}
