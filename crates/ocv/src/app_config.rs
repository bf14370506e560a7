//! 🔧 App Configuration — where "which cluster, and who am I to it?" gets answered.
//!
//! 📡 Three layers, stacked like a lasagna of opinions:
//!   1. `OPENSEARCH_*` environment variables (the container orchestrator speaks here)
//!   2. an optional TOML file (wins over env)
//!   3. process-level overrides from the CLI (`--user`, `--password`, `--insecure-tls`), which win over everything
//!
//! 🏗️ Powered by Figment, because manually parsing env vars is a form of
//! self-harm that even the borrow checker wouldn't approve of.
//!
//! ⚠️ The config is built once, up front, and handed to the transport explicitly.
//! Nobody downstream gets to go rummaging through `std::env` on their own. 🦆

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// 📡 Every env var we care about starts with this. `OPENSEARCH_PORT` → `port`, and so on.
pub const ENV_PREFIX: &str = "OPENSEARCH_";

/// ⏱️ 60 seconds to shake hands. Containers boot slowly; we are patient, not infinite.
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(60_000);
/// ⏱️ 60 seconds for the cluster to answer once we're connected.
pub const SOCKET_TIMEOUT: Duration = Duration::from_millis(60_000);
/// 🔄 Idle pooled connections are kept around for an hour.
pub const KEEP_ALIVE: Duration = Duration::from_secs(3600);

fn default_user() -> String {
    "admin".to_string()
}

// 🔒 "admin"/"admin" — the factory default of every demo container ever shipped.
fn default_password() -> String {
    "admin".to_string()
}

/// 🔒 How much we trust the certificate the cluster hands us.
///
/// `Verified` is the default and the only sane choice outside a throwaway container.
/// `InsecureTestOnly` accepts any certificate chain for any hostname. It exists for
/// ephemeral test clusters with self-signed certs. Never point it at anything you love.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TlsMode {
    #[default]
    Verified,
    InsecureTestOnly,
}

/// 📦 Everything needed to reach the cluster. Built once, never mutated, dropped at exit.
#[derive(Deserialize, Clone)]
pub struct ConnectionConfig {
    /// 📡 `http` or `https`. Nothing else survives validation.
    pub scheme: String,
    pub host: String,
    /// 🔢 Required. Missing or non-numeric and we stop before a single packet leaves.
    pub port: u16,
    #[serde(default = "default_user", alias = "username")]
    pub user: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default)]
    pub tls: TlsMode,
}

// 🎭 manual Debug impl so the password never ends up in a log line at 3am.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("tls", &self.tls)
            .finish()
    }
}

impl ConnectionConfig {
    /// 🌐 `{scheme}://{host}:{port}` — the front door of the cluster.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        CONNECT_TIMEOUT
    }

    pub fn socket_timeout(&self) -> Duration {
        SOCKET_TIMEOUT
    }

    pub fn keep_alive(&self) -> Duration {
        KEEP_ALIVE
    }

    fn validate(mut self) -> anyhow::Result<Self> {
        self.scheme = self.scheme.trim().to_ascii_lowercase();
        if self.scheme != "http" && self.scheme != "https" {
            anyhow::bail!(
                "💀 Scheme '{}' is neither 'http' nor 'https'. We only speak two dialects of HTTP and this isn't one of them.",
                self.scheme
            );
        }
        if self.host.trim().is_empty() {
            anyhow::bail!(
                "💀 Host is empty. We can't knock on a door that has no address."
            );
        }
        Ok(self)
    }
}

/// 🎛️ Process-level knobs that beat every other layer. `None` means "no opinion".
#[derive(Debug, Default, Serialize, Clone)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsMode>,
}

/// 🚀 Load the connection config from env, an optional TOML file, and CLI overrides.
///
/// 📐 Layering: env < TOML file < overrides. Later layers win on conflicts.
///
/// 💀 Returns an error if anything required is missing or malformed. This happens
/// before any client is built, so a bad port never costs a network round trip.
pub fn load_config(
    config_file_name: Option<&Path>,
    overrides: &ConfigOverrides,
) -> anyhow::Result<ConnectionConfig> {
    info!(
        "🔧 Loading configuration: {:#?}",
        config_file_name.unwrap_or(Path::new(""))
    );

    let figment = Figment::new().merge(Env::prefixed(ENV_PREFIX));
    let figment = match config_file_name {
        Some(file_name) => figment.merge(Toml::file(file_name)),
        None => figment,
    };
    let figment = figment.merge(Serialized::defaults(overrides));

    let context_msg = match config_file_name {
        Some(path) => format!(
            "💀 Failed to build the connection config from file '{}', environment variables ({}*) and CLI overrides. \
             Check that scheme, host and port are all set, and that the port is actually a number.",
            path.display(),
            ENV_PREFIX
        ),
        None => format!(
            "💀 Failed to build the connection config from environment variables ({}*) and CLI overrides. \
             {}SCHEME, {}HOST and {}PORT are required. The port has to be a number, not a feeling.",
            ENV_PREFIX, ENV_PREFIX, ENV_PREFIX, ENV_PREFIX
        ),
    };

    extract_config(&figment).context(context_msg)
}

/// 🔧 Pull a validated `ConnectionConfig` out of an already layered Figment.
pub fn extract_config(figment: &Figment) -> anyhow::Result<ConnectionConfig> {
    let config: ConnectionConfig = figment.extract()?;
    config.validate()
}
