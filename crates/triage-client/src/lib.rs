//! `triage-client` — HTTP gateway to the LMS overdue-submission API.
//!
//! # Architecture
//!
//! ```text
//! Workqueue (triage-core)
//!     │  Gateway trait
//!     ▼
//! HttpGateway   ← reqwest client, bearer token, endpoint paths from Config
//!     │
//!     ▼
//! classify()    ← status + body → payload | Failure (Transport/Validation/Unknown)
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use triage_client::HttpGateway;
//! use triage_core::{config::Config, Workqueue};
//!
//! let config = Config::load(root)?;
//! let gateway = HttpGateway::from_config(&config)?;
//! let queue = Workqueue::new(Arc::new(gateway)).with_action_timeout(config.actions.timeout());
//! queue.reload().await?;
//! ```

pub mod error;
pub mod gateway;
pub(crate) mod response;
pub mod types;


pub use error::ClientError;
pub use gateway::HttpGateway;
