//! ProducerConfig - Config Loader output
//!
//! Describes which delivery client to build and how.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Top-level producer configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Delivery client settings
    #[serde(default)]
    pub client: ClientConfig,
}

/// Delivery client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Client name
    #[serde(default = "default_client_name")]
    pub name: String,

    /// Client type
    #[serde(default)]
    pub kind: ClientKind,

    /// Submission queue capacity (records accepted but not yet delivered)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            name: default_client_name(),
            kind: ClientKind::default(),
            queue_capacity: default_queue_capacity(),
            params: HashMap::new(),
        }
    }
}

impl ClientConfig {
    /// Apply `key=value` overrides on top of the configured params
    pub fn apply_overrides<I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.params.extend(overrides);
    }
}

fn default_client_name() -> String {
    "default".to_string()
}

fn default_queue_capacity() -> usize {
    1024
}

/// Delivery client type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    /// Log each record via tracing
    #[default]
    Log,
    /// Append records to per-topic files
    File,
    /// Send records as UDP datagrams
    Network,
}
