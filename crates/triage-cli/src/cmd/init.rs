use anyhow::Context;
use std::path::Path;
use triage_core::config::{Config, WarnLevel, TOKEN_ENV};
use triage_core::paths;

pub fn run(root: &Path, base_url: &str) -> anyhow::Result<()> {
    let config = Config::new(base_url.trim());
    if let Some(err) = config.validate().into_iter().find(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("{}", err.message);
    }

    println!("Initializing triage in: {}", root.display());

    if paths::config_path(root).exists() {
        println!("  exists:  {} (left unchanged)", paths::CONFIG_FILE);
        return Ok(());
    }

    config.save(root).context("failed to write config.yaml")?;
    println!("  created: {}", paths::CONFIG_FILE);
    println!("\nSet {TOKEN_ENV} to authenticate against the API.");
    Ok(())
}
