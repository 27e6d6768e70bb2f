//! `idiom-polish serve` — run the HTTP API.

use anyhow::{anyhow, Result};
use idiom_polish::api::server::{start_server, AppState};
use idiom_polish::config::Config;

pub async fn cmd_serve(config: Config) -> Result<()> {
    let polisher = super::build_polisher(&config)?;
    let state = AppState::new(polisher);

    println!("Polish API: http://{}", config.server.addr());
    start_server(&config.server, state)
        .await
        .map_err(|e| anyhow!("Server error: {e}"))
}
