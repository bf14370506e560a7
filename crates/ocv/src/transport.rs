//! 🔌 Transport — the thing that actually talks to the cluster.
//!
//! 🚰 The verifier asks questions, the transport carries them over the wire and
//! brings back whatever the cluster mumbled in reply.
//!
//! 🎭 Two faces: `OpenSearchTransport` does real HTTP; the in-memory one is a
//! stunt double for tests that want to count calls and check the lights went off.

use anyhow::Result;
use async_trait::async_trait;

use crate::health::{HealthRequest, HealthResponse};
use crate::index_spec::{CreateIndexResponse, IndexSpec};

pub mod opensearch;
#[cfg(test)]
pub(crate) mod in_mem;

pub use opensearch::OpenSearchTransport;

/// 📡 The two cluster calls the verifier needs, plus the goodbye.
///
/// # Contract
/// - Non-2xx answers and network trouble come back as `Err`. No retries in here.
/// - `close` releases the connection pool. MUST be called, on every path. After it,
///   the other calls fail.
#[async_trait]
pub trait ClusterTransport: std::fmt::Debug + Send {
    /// 🩺 `GET /_cluster/health/...`
    async fn cluster_health(&mut self, request: &HealthRequest) -> Result<HealthResponse>;
    /// 🏗️ `PUT /{index}` with settings and mappings.
    async fn create_index(&mut self, spec: &IndexSpec) -> Result<CreateIndexResponse>;
    /// 🗑️ Release pooled connections. Idempotent.
    async fn close(&mut self) -> Result<()>;
}
