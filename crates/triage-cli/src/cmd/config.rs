use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use triage_core::config::{Config, WarnLevel};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the loaded configuration (the token is masked)
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let mut config = Config::load(root).context("failed to load config")?;
    let has_token = config.api.resolved_token().is_some();
    if config.api.token.is_some() {
        config.api.token = Some("********".to_string());
    }

    if json {
        let mut value = serde_json::to_value(&config)?;
        value["api"]["authenticated"] = serde_json::Value::Bool(has_token);
        return print_json(&value);
    }

    let timeout = match config.actions.timeout() {
        Some(d) => format!("{}s", d.as_secs()),
        None => "disabled".to_string(),
    };
    println!("API base URL:      {}", config.api.base_url);
    println!("Token:             {}", if has_token { "set" } else { "not set" });
    println!("Request timeout:   {}s", config.api.request_timeout_secs);
    println!("Action timeout:    {timeout}");
    println!("Endpoints:");
    println!("  overdue list     {}", config.endpoints.overdue_submissions);
    println!("  notify           {}", config.endpoints.notify);
    println!("  upload           {}", config.endpoints.upload);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
