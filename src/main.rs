mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use idiom_polish::config::Config;

use cli::{init_logging, Cli, Command};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.log_format);

    let mut config = Config::from_env().context("Invalid configuration")?;
    if let Some(db) = cli.db {
        config.cache.path = db;
    }

    let command = cli.command.unwrap_or(Command::Serve {
        bind: None,
        port: None,
        workers: None,
    });

    if let Command::Serve {
        bind,
        port,
        workers,
    } = &command
    {
        if let Some(bind) = bind {
            config.server.bind = bind.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
        if workers.is_some() {
            config.server.workers = *workers;
        }
    }

    let mut runtime = tokio::runtime::Builder::new_multi_thread();
    runtime.enable_all();
    if let Some(workers) = config.server.workers {
        runtime.worker_threads(workers.max(1));
    }
    let runtime = runtime.build().context("Failed to build tokio runtime")?;

    runtime.block_on(async move {
        match command {
            Command::Serve { .. } => cli::serve::cmd_serve(config).await,
            Command::Polish { text } => cli::polish::cmd_polish(config, &text).await,
        }
    })
}
