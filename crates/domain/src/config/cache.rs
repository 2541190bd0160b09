use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Lower bound applied to the TTL derived from an answer's records.
    #[serde(default)]
    pub min_ttl_secs: u32,

    #[serde(default = "default_max_ttl_secs")]
    pub max_ttl_secs: u32,

    /// Pending inserts beyond this are dropped instead of queued.
    #[serde(default = "default_insert_queue_capacity")]
    pub insert_queue_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: default_max_entries(),
            min_ttl_secs: 0,
            max_ttl_secs: default_max_ttl_secs(),
            insert_queue_capacity: default_insert_queue_capacity(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_entries() -> usize {
    10_000
}

fn default_max_ttl_secs() -> u32 {
    86_400
}

fn default_insert_queue_capacity() -> usize {
    1024
}
