//! # 📡 THE OPENSEARCH TRANSPORT
//!
//! 🎬 COLD OPEN — INT. CI RUNNER — 3:47 AM
//!
//! A freshly built container blinks awake. Port 9200 yawns. A self-signed
//! certificate, minted thirty seconds ago, sits proudly on the TLS listener.
//! Somewhere a pipeline waits to learn whether the image is any good.
//!
//! 🚀 This module is the HTTP half of that conversation: a `reqwest::Client`
//! with basic auth on every request, generous timeouts, a pool that keeps idle
//! connections for an hour, and (only when explicitly asked) a TLS stance of
//! "sure, whatever cert you've got".

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, trace, warn};

use crate::app_config::{ConnectionConfig, TlsMode};
use crate::health::{HealthRequest, HealthResponse};
use crate::index_spec::{CreateIndexResponse, IndexSpec};
use crate::transport::ClusterTransport;

/// 📡 Real HTTP transport to an OpenSearch cluster.
///
/// Holds the client in an `Option` so `close()` can drop it and release the pool
/// while the struct itself lives on. After close, every call errors out.
pub struct OpenSearchTransport {
    client: Option<reqwest::Client>,
    base_url: String,
    user: String,
    password: String,
}

// 🎭 manual Debug impl: the password stays home.
impl std::fmt::Debug for OpenSearchTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenSearchTransport")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("open", &self.client.is_some())
            .finish()
    }
}

// 🔧 The settings every client gets, insecure or not.
fn base_builder(config: &ConnectionConfig) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(config.connect_timeout())
        .timeout(config.socket_timeout())
        .pool_idle_timeout(config.keep_alive())
}

/// 🏗️ Build the HTTP client for `config`.
///
/// With `TlsMode::InsecureTestOnly` certificate verification is switched off, which
/// also skips the hostname check. If the TLS backend refuses to build that client,
/// the failure is logged and we fall back to a client with default verification.
pub(crate) fn build_client(config: &ConnectionConfig) -> Result<reqwest::Client> {
    info!("🔧 Creating HTTP client...");
    if config.tls == TlsMode::InsecureTestOnly {
        warn!(
            "⚠️ TLS verification is OFF for {}. Any certificate, any hostname. Test containers only.",
            config.base_url()
        );
        match base_builder(config).danger_accept_invalid_certs(true).build() {
            Ok(client) => return Ok(client),
            Err(err) => {
                // 🔄 degrade, don't die: the verified client may still get through
                error!(
                    "💀 Error configuring http client with insecure TLS, continuing with default trust: {:#}",
                    err
                );
            }
        }
    }

    base_builder(config)
        .build()
        .context("💀 The HTTP client refused to be born. We asked reqwest for a client and the TLS stack said 'no'. Probably a cursed system OpenSSL. Either way: tragic.")
}

impl OpenSearchTransport {
    /// 🚀 Wire up a transport for the cluster described by `config`. No requests are sent here.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        info!("🌐 Server URL {}", config.base_url());
        let client = build_client(config)?;
        info!("🔌 Creating OpenSearchTransport...");
        Ok(Self {
            client: Some(client),
            base_url: config.base_url(),
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    fn client(&self) -> Result<&reqwest::Client> {
        self.client.as_ref().context(
            "💀 This transport was already closed. The connection pool has left the building.",
        )
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path_and_query)
    }

    /// 📡 Send with basic auth, insist on a 2xx, parse the JSON body into `T`.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T> {
        let response = request
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .await
            .with_context(|| {
                format!(
                    "💀 The {} request never made it to {}. Connection refused, timed out, or the container is still stretching.",
                    what, self.base_url
                )
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("💀 Failed to read the {} response body", what))?;

        if !status.is_success() {
            anyhow::bail!(
                "💀 The {} request arrived, but the cluster answered '{}'. The body of the response read: '{}'.",
                what,
                status,
                body
            );
        }
        trace!("📦 {} response: {}", what, body);

        serde_json::from_str(&body).with_context(|| {
            format!(
                "💀 The {} response was a 2xx but not the JSON we expected: '{}'",
                what, body
            )
        })
    }
}

#[async_trait]
impl ClusterTransport for OpenSearchTransport {
    async fn cluster_health(&mut self, request: &HealthRequest) -> Result<HealthResponse> {
        let url = self.url(&request.path_and_query());
        debug!("🩺 GET {}", url);
        let builder = self.client()?.get(&url);
        self.send_json(builder, "cluster health").await
    }

    async fn create_index(&mut self, spec: &IndexSpec) -> Result<CreateIndexResponse> {
        let url = self.url(&format!("/{}", spec.name));
        let body = serde_json::to_vec(spec)
            .context("💀 Could not serialize the index spec. The mapping has feelings serde can't express.")?;
        debug!("🏗️ PUT {} ({} bytes)", url, body.len());
        let builder = self
            .client()?
            .put(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        self.send_json(builder, "create index").await
    }

    async fn close(&mut self) -> Result<()> {
        if self.client.take().is_some() {
            debug!("🗑️ OpenSearch transport closing — connection pool released");
        }
        Ok(())
    }
}
