//! 🩺 ocv — does the freshly built OpenSearch container actually work?
//!
//! Load a `ConnectionConfig`, hand it to `run`, and find out: health must be green,
//! and `container_test` must be created and acknowledged by every shard.

pub mod app_config;
pub mod health;
pub mod index_spec;
pub mod transport;
pub mod verifier;

use anyhow::{Context, Result};

use crate::app_config::ConnectionConfig;
use crate::transport::OpenSearchTransport;
use crate::verifier::{ClusterVerifier, VerificationReport};

/// 🚀 Build the HTTP transport for `config` and run the full verification against it.
pub async fn run(config: &ConnectionConfig) -> Result<VerificationReport> {
    let mut transport = OpenSearchTransport::new(config)
        .context("💀 Could not set up the transport to the cluster")?;

    let report = ClusterVerifier::new()
        .run_verification(&mut transport)
        .await?;
    Ok(report)
}
