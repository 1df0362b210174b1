pub mod config;
pub mod init;
pub mod list;
pub mod notify;
pub mod serve;
pub mod submit;

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use triage_client::HttpGateway;
use triage_core::config::Config;
use triage_core::{ActionOutcome, Workqueue};

/// Load a valid config and build a workqueue over the HTTP gateway.
pub(crate) fn open_queue(root: &Path) -> anyhow::Result<Arc<Workqueue>> {
    let config = Config::load_valid(root).context("failed to load config")?;
    let gateway = HttpGateway::from_config(&config).context("failed to build API client")?;
    let queue = Workqueue::new(Arc::new(gateway)).with_action_timeout(config.actions.timeout());
    Ok(Arc::new(queue))
}

pub(crate) fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start async runtime")
}

/// Turn anything but a completed action into an error.
pub(crate) fn expect_completed(outcome: ActionOutcome) -> anyhow::Result<()> {
    match outcome {
        ActionOutcome::Completed => Ok(()),
        ActionOutcome::Skipped(reason) => Err(anyhow::anyhow!("skipped: {reason}")),
        ActionOutcome::Failed(failure) => Err(failure.into()),
    }
}
