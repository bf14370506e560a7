//! 🧪 In-memory transport — a cluster that lives entirely in a struct.
//!
//! Canned answers, call counters, and a `closed` flag the tests can peek at.

use anyhow::Result;
use async_trait::async_trait;

use crate::health::{HealthRequest, HealthResponse, HealthStatus};
use crate::index_spec::{CreateIndexResponse, IndexSpec};
use crate::transport::ClusterTransport;

/// 📦 A pretend cluster. `None` for a canned answer means "fail like a dropped connection".
#[derive(Debug)]
pub(crate) struct InMemoryTransport {
    health: Option<HealthResponse>,
    create: Option<CreateIndexResponse>,
    fail_close: bool,
    pub(crate) health_calls: usize,
    pub(crate) create_calls: usize,
    pub(crate) closed: bool,
    pub(crate) last_health_request: Option<HealthRequest>,
    pub(crate) last_index_spec: Option<IndexSpec>,
}

impl InMemoryTransport {
    /// ✅ Green health, both acknowledgements true. The happy path, pre-baked.
    pub(crate) fn healthy() -> Self {
        Self {
            health: Some(HealthResponse {
                status: HealthStatus::Green,
                cluster_name: "in-mem-cluster".to_string(),
                number_of_nodes: 1,
                active_shards: 0,
                unassigned_shards: 0,
                timed_out: false,
            }),
            create: Some(CreateIndexResponse {
                acknowledged: true,
                shards_acknowledged: true,
                index: "container_test".to_string(),
            }),
            fail_close: false,
            health_calls: 0,
            create_calls: 0,
            closed: false,
            last_health_request: None,
            last_index_spec: None,
        }
    }

    pub(crate) fn with_status(mut self, status: HealthStatus) -> Self {
        if let Some(health) = self.health.as_mut() {
            health.status = status;
        }
        self
    }

    pub(crate) fn with_acknowledgements(mut self, acknowledged: bool, shards: bool) -> Self {
        if let Some(create) = self.create.as_mut() {
            create.acknowledged = acknowledged;
            create.shards_acknowledged = shards;
        }
        self
    }

    pub(crate) fn with_health_error(mut self) -> Self {
        self.health = None;
        self
    }

    pub(crate) fn with_create_error(mut self) -> Self {
        self.create = None;
        self
    }

    pub(crate) fn with_close_error(mut self) -> Self {
        self.fail_close = true;
        self
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            anyhow::bail!("💀 in-memory transport already closed");
        }
        Ok(())
    }
}

#[async_trait]
impl ClusterTransport for InMemoryTransport {
    async fn cluster_health(&mut self, request: &HealthRequest) -> Result<HealthResponse> {
        self.ensure_open()?;
        self.health_calls += 1;
        self.last_health_request = Some(request.clone());
        self.health
            .clone()
            .ok_or_else(|| anyhow::anyhow!("💀 connection refused (in-memory, on purpose)"))
    }

    async fn create_index(&mut self, spec: &IndexSpec) -> Result<CreateIndexResponse> {
        self.ensure_open()?;
        self.create_calls += 1;
        self.last_index_spec = Some(spec.clone());
        self.create
            .clone()
            .ok_or_else(|| anyhow::anyhow!("💀 timed out (in-memory, on purpose)"))
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        if self.fail_close {
            anyhow::bail!("💀 close failed (in-memory, on purpose)");
        }
        Ok(())
    }
}
