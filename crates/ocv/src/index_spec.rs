//! 🏗️ Index spec — the one index we create to prove the cluster takes writes.
//!
//! Sent once as the body of `PUT /{index}`, never retained. The mapping is tiny on
//! purpose: one `text` field named `message` with a `text` sub-field that opts out
//! of storing its original value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 📛 The index the verifier creates. It is left behind afterwards; the container is disposable.
pub const CONTAINER_TEST_INDEX: &str = "container_test";

/// 📦 Name, settings, and mappings for a create-index request.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct IndexSpec {
    #[serde(skip)]
    pub name: String,
    pub settings: IndexSettings,
    pub mappings: Mappings,
}

/// 🔢 Shard counts, string-encoded because that's how the index settings API likes them.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct IndexSettings {
    pub number_of_shards: String,
    pub number_of_replicas: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct Mappings {
    pub properties: BTreeMap<String, Property>,
}

/// 🧬 A mapped field. Only `text` so far; the tag becomes the `"type"` key on the wire.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Property {
    Text(TextProperty),
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct TextProperty {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<bool>,
    /// 🪆 multi-fields: the same value, indexed again under another name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Property>,
}

impl IndexSpec {
    /// 🧪 `container_test`: 1 shard, 0 replicas, `message` → text with an unstored `text` sub-field.
    pub fn container_test() -> Self {
        let unstored_text = Property::Text(TextProperty {
            store: Some(false),
            fields: BTreeMap::new(),
        });
        let message = Property::Text(TextProperty {
            store: None,
            fields: BTreeMap::from([("text".to_string(), unstored_text)]),
        });

        Self {
            name: CONTAINER_TEST_INDEX.to_string(),
            settings: IndexSettings {
                number_of_shards: "1".to_string(),
                number_of_replicas: "0".to_string(),
            },
            mappings: Mappings {
                properties: BTreeMap::from([("message".to_string(), message)]),
            },
        }
    }
}

impl Default for IndexSpec {
    fn default() -> Self {
        Self::container_test()
    }
}

/// ✅ What the cluster says after `PUT /{index}`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CreateIndexResponse {
    pub acknowledged: bool,
    pub shards_acknowledged: bool,
    #[serde(default)]
    pub index: String,
}
