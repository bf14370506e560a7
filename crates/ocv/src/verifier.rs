//! 🎬 *[a container boots. a port opens. a pipeline holds its breath.]*
//! 🎬 "In a world where images ship broken..."
//! 🎬 "One verifier dared to ask two questions."
//! 🎬 *[record scratch]* 🦆
//!
//! 🩺 The ClusterVerifier — a strictly linear, three-beat routine:
//!   1. ask for cluster health, demand green
//!   2. create `container_test`, demand both acknowledgements
//!   3. close the transport, no matter how 1 and 2 went
//!
//! No retries. No branching beyond "that's a failure". The cluster is expected to
//! already be up; waiting for it is somebody else's job.

use std::fmt;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::health::{HealthRequest, HealthStatus};
use crate::index_spec::IndexSpec;
use crate::transport::ClusterTransport;

/// 🏷️ What we call this run in the logs.
pub const VERIFICATION_NAME: &str = "index_creation";

/// 👣 Where in the routine something went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    HealthCheck,
    CreateIndex,
    Close,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::HealthCheck => "health check",
            Step::CreateIndex => "index creation",
            Step::Close => "transport close",
        })
    }
}

/// 💀 Every way a verification run can fail. None of them are retried.
#[derive(Debug, Error)]
pub enum VerificationFailure {
    /// 📡 network trouble, a non-2xx, or a body we couldn't parse
    #[error("💀 Transport failure during {step}")]
    Transport {
        step: Step,
        #[source]
        source: anyhow::Error,
    },
    #[error("💀 Cluster status not green: the cluster reported '{status}'")]
    Unhealthy { status: HealthStatus },
    #[error("💀 Index '{index}' creation was not acknowledged")]
    NotAcknowledged { index: String },
    #[error("💀 Index '{index}' was acknowledged but not all shards were copied")]
    ShardsNotAcknowledged { index: String },
}

/// ✅ What a passing run learned about the cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    pub cluster_name: String,
    pub status: HealthStatus,
    pub number_of_nodes: u32,
    pub index: String,
}

/// 🩺 Runs the health-then-create routine against any `ClusterTransport`.
#[derive(Debug, Clone, Default)]
pub struct ClusterVerifier {
    health_request: HealthRequest,
    index_spec: IndexSpec,
}

impl ClusterVerifier {
    /// 🚀 Health over `*,-.*` with wildcards expanded to `all`, then `container_test`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index_spec(mut self, index_spec: IndexSpec) -> Self {
        self.index_spec = index_spec;
        self
    }

    /// 🧪 Run the whole routine, then close the transport on every exit path.
    ///
    /// ⚠️ If the routine fails and the close fails too, the routine's failure is the
    /// one returned; the close error is only logged.
    pub async fn run_verification<T>(
        &self,
        transport: &mut T,
    ) -> Result<VerificationReport, VerificationFailure>
    where
        T: ClusterTransport + ?Sized,
    {
        info!("🧪 Running verification: {}", VERIFICATION_NAME);

        let outcome = self.verify(transport).await;
        let closed = transport.close().await;

        let result = match (outcome, closed) {
            (Ok(report), Ok(())) => Ok(report),
            (Ok(_), Err(source)) => Err(VerificationFailure::Transport {
                step: Step::Close,
                source,
            }),
            (Err(failure), Ok(())) => Err(failure),
            (Err(failure), Err(close_err)) => {
                warn!(
                    "⚠️ Transport also failed to close after the verification failed: {:#}",
                    close_err
                );
                Err(failure)
            }
        };

        match &result {
            Ok(report) => info!(
                "✅ Verification '{}' passed — cluster '{}' is {} and index '{}' exists",
                VERIFICATION_NAME, report.cluster_name, report.status, report.index
            ),
            Err(failure) => error!(
                "💀 Verification '{}' failed: {}",
                VERIFICATION_NAME, failure
            ),
        }
        result
    }

    async fn verify<T>(&self, transport: &mut T) -> Result<VerificationReport, VerificationFailure>
    where
        T: ClusterTransport + ?Sized,
    {
        info!("🩺 Running HealthCheck...");
        let health = transport
            .cluster_health(&self.health_request)
            .await
            .map_err(|source| VerificationFailure::Transport {
                step: Step::HealthCheck,
                source,
            })?;

        info!("🩺 Got HealthStatus: {}", health.status);
        if health.status != HealthStatus::Green {
            return Err(VerificationFailure::Unhealthy {
                status: health.status,
            });
        }

        info!("🏗️ Creating index {}...", self.index_spec.name);
        let created = transport
            .create_index(&self.index_spec)
            .await
            .map_err(|source| VerificationFailure::Transport {
                step: Step::CreateIndex,
                source,
            })?;

        // 🎯 acknowledged first: an unacknowledged index says nothing useful about its shards
        if !created.acknowledged {
            return Err(VerificationFailure::NotAcknowledged {
                index: self.index_spec.name.clone(),
            });
        }
        if !created.shards_acknowledged {
            return Err(VerificationFailure::ShardsNotAcknowledged {
                index: self.index_spec.name.clone(),
            });
        }

        Ok(VerificationReport {
            cluster_name: health.cluster_name,
            status: health.status,
            number_of_nodes: health.number_of_nodes,
            index: self.index_spec.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::ExpandWildcards;
    use crate::transport::in_mem::InMemoryTransport;

    #[tokio::test]
    async fn the_one_where_green_leads_to_an_index_and_everyone_goes_home_happy() {
        let mut transport = InMemoryTransport::healthy();

        let report = ClusterVerifier::new()
            .run_verification(&mut transport)
            .await
            .expect("💀 the happy path should be happy");

        assert_eq!(report.status, HealthStatus::Green);
        assert_eq!(report.cluster_name, "in-mem-cluster");
        assert_eq!(report.index, "container_test");
        assert_eq!(transport.health_calls, 1);
        assert_eq!(transport.create_calls, 1);
        assert!(transport.closed);
    }

    #[tokio::test]
    async fn the_one_where_the_health_request_asks_about_the_right_indices() {
        let mut transport = InMemoryTransport::healthy();

        ClusterVerifier::new()
            .run_verification(&mut transport)
            .await
            .expect("💀 should pass");

        let request = transport
            .last_health_request
            .expect("💀 health should have been asked");
        assert_eq!(request.expand_wildcards, ExpandWildcards::All);
        assert_eq!(request.indices, vec!["*".to_string(), "-.*".to_string()]);
        assert_eq!(transport.last_index_spec, Some(IndexSpec::container_test()));
    }

    #[tokio::test]
    async fn the_one_where_yellow_and_red_never_get_to_create_an_index() {
        for status in [HealthStatus::Yellow, HealthStatus::Red] {
            let mut transport = InMemoryTransport::healthy().with_status(status);

            let failure = ClusterVerifier::new()
                .run_verification(&mut transport)
                .await
                .expect_err("💀 not-green must fail");

            match failure {
                VerificationFailure::Unhealthy { status: reported } => assert_eq!(reported, status),
                honestly_who_knows => panic!(
                    "💀 Expected Unhealthy for {status}, got {honestly_who_knows:?}. Plot twist energy."
                ),
            }
            assert_eq!(transport.create_calls, 0);
            assert!(transport.closed);
        }
    }

    #[tokio::test]
    async fn the_one_where_shards_cannot_vouch_for_an_unacknowledged_index() {
        let mut transport = InMemoryTransport::healthy().with_acknowledgements(false, true);

        let failure = ClusterVerifier::new()
            .run_verification(&mut transport)
            .await
            .expect_err("💀 acknowledged=false must fail");

        assert!(matches!(failure, VerificationFailure::NotAcknowledged { .. }));
        assert!(transport.closed);
    }

    #[tokio::test]
    async fn the_one_where_the_shards_did_not_all_make_it() {
        let mut transport = InMemoryTransport::healthy().with_acknowledgements(true, false);

        let failure = ClusterVerifier::new()
            .run_verification(&mut transport)
            .await
            .expect_err("💀 shards_acknowledged=false must fail");

        assert!(matches!(
            failure,
            VerificationFailure::ShardsNotAcknowledged { ref index } if index == "container_test"
        ));
        assert!(transport.closed);
    }

    #[tokio::test]
    async fn the_one_where_the_health_call_falls_over() {
        let mut transport = InMemoryTransport::healthy().with_health_error();

        let failure = ClusterVerifier::new()
            .run_verification(&mut transport)
            .await
            .expect_err("💀 a transport error must fail");

        assert!(matches!(
            failure,
            VerificationFailure::Transport { step: Step::HealthCheck, .. }
        ));
        assert_eq!(transport.create_calls, 0);
        assert!(transport.closed);
    }

    #[tokio::test]
    async fn the_one_where_the_create_call_falls_over() {
        let mut transport = InMemoryTransport::healthy().with_create_error();

        let failure = ClusterVerifier::new()
            .run_verification(&mut transport)
            .await
            .expect_err("💀 a transport error must fail");

        assert!(matches!(
            failure,
            VerificationFailure::Transport { step: Step::CreateIndex, .. }
        ));
        assert!(transport.closed);
    }

    #[tokio::test]
    async fn the_one_where_a_perfect_run_trips_on_the_way_out() {
        let mut transport = InMemoryTransport::healthy().with_close_error();

        let failure = ClusterVerifier::new()
            .run_verification(&mut transport)
            .await
            .expect_err("💀 a failed close after success is still a failure");

        assert!(matches!(
            failure,
            VerificationFailure::Transport { step: Step::Close, .. }
        ));
    }

    #[tokio::test]
    async fn the_one_where_the_first_failure_outranks_the_close_failure() {
        let mut transport = InMemoryTransport::healthy()
            .with_status(HealthStatus::Red)
            .with_close_error();

        let failure = ClusterVerifier::new()
            .run_verification(&mut transport)
            .await
            .expect_err("💀 red must fail");

        assert!(matches!(
            failure,
            VerificationFailure::Unhealthy { status: HealthStatus::Red }
        ));
        assert!(transport.closed);
    }

    #[tokio::test]
    async fn the_one_where_a_custom_index_spec_gets_used() {
        let mut spec = IndexSpec::container_test();
        spec.name = "another_test".to_string();
        let mut transport = InMemoryTransport::healthy();

        let report = ClusterVerifier::new()
            .with_index_spec(spec)
            .run_verification(&mut transport)
            .await
            .expect("💀 should pass");

        assert_eq!(report.index, "another_test");
        assert_eq!(
            transport.last_index_spec.map(|s| s.name),
            Some("another_test".to_string())
        );
    }

    #[test]
    fn the_one_where_the_failure_messages_say_what_happened() {
        let unhealthy = VerificationFailure::Unhealthy {
            status: HealthStatus::Yellow,
        };
        assert!(unhealthy.to_string().contains("not green"));
        assert!(unhealthy.to_string().contains("yellow"));

        let transport = VerificationFailure::Transport {
            step: Step::HealthCheck,
            source: anyhow::anyhow!("connection refused"),
        };
        assert!(transport.to_string().contains("health check"));
        assert_eq!(
            std::error::Error::source(&transport).map(|e| e.to_string()),
            Some("connection refused".to_string())
        );
    }
}
