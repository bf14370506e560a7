//! 🩺 Cluster health — the request we send and the verdict we get back.
//!
//! `GET /_cluster/health/{indices}?expand_wildcards={mode}` → `{"status": "green", ...}`
//!
//! 🟢 green: every shard and replica is home for dinner.
//! 🟡 yellow: primaries are fine, some replicas are still stuck in traffic.
//! 🔴 red: someone's primary shard didn't show up at all. Call the on-call.

use std::fmt;

use serde::Deserialize;

/// 🃏 Which kinds of indices a wildcard pattern is allowed to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandWildcards {
    All,
    Open,
    Closed,
    Hidden,
    None,
}

impl ExpandWildcards {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpandWildcards::All => "all",
            ExpandWildcards::Open => "open",
            ExpandWildcards::Closed => "closed",
            ExpandWildcards::Hidden => "hidden",
            ExpandWildcards::None => "none",
        }
    }
}

/// 📦 A cluster health request, scoped to an index pattern list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthRequest {
    pub expand_wildcards: ExpandWildcards,
    pub indices: Vec<String>,
}

impl HealthRequest {
    /// 🎯 Everything, minus the dot-prefixed system indices (`*,-.*`), wildcards expanded to `all`.
    pub fn all_visible_indices() -> Self {
        Self {
            expand_wildcards: ExpandWildcards::All,
            indices: vec!["*".to_string(), "-.*".to_string()],
        }
    }

    /// 📡 Path plus query string, e.g. `/_cluster/health/*,-.*?expand_wildcards=all`.
    pub fn path_and_query(&self) -> String {
        let path = if self.indices.is_empty() {
            "/_cluster/health".to_string()
        } else {
            format!("/_cluster/health/{}", self.indices.join(","))
        };
        format!("{}?expand_wildcards={}", path, self.expand_wildcards.as_str())
    }
}

impl Default for HealthRequest {
    fn default() -> Self {
        Self::all_visible_indices()
    }
}

/// 🚦 The cluster's mood ring.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Green,
    Yellow,
    Red,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Green => "green",
            HealthStatus::Yellow => "yellow",
            HealthStatus::Red => "red",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 📊 The slice of the health response we actually read. Everything but `status` is informational.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(default)]
    pub cluster_name: String,
    #[serde(default)]
    pub number_of_nodes: u32,
    #[serde(default)]
    pub active_shards: u32,
    #[serde(default)]
    pub unassigned_shards: u32,
    #[serde(default)]
    pub timed_out: bool,
}
