//! `idiom-polish polish <TEXT>` — resolve one phrase through the same pipeline.

use anyhow::{Context, Result};
use idiom_polish::config::Config;

pub async fn cmd_polish(config: Config, text: &str) -> Result<()> {
    let polisher = super::build_polisher(&config)?;
    let outcome = polisher.polish(text).await?;
    let rendered =
        serde_json::to_string_pretty(outcome.document()).context("Failed to render document")?;
    println!("{rendered}");
    Ok(())
}
