use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub broker: BrokerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QueueConfig {
    #[serde(default = "default_queue_name")]
    pub name: String,
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// how long the demo waits for its job's result
    #[serde(default = "default_result_timeout_ms")]
    pub result_timeout_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: default_queue_name(),
            workers: default_workers(),
            result_timeout_ms: default_result_timeout_ms(),
        }
    }
}

fn default_queue_name() -> String {
    "default".to_string()
}

fn default_workers() -> usize {
    2
}

fn default_result_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BrokerConfig {
    #[serde(default)]
    pub backend: Backend,
    /// e.g. redis://127.0.0.1:6379
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Memory,
    Redis,
}

impl Settings {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let data = fs::read_to_string(p)?;
                Ok(toml::from_str(&data)?)
            }
            None => Ok(Self::default()),
        }
    }
}
