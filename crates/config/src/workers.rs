//! Worker pool configuration

use serde::Deserialize;

/// Worker pool sizing
///
/// # Example
///
/// ```toml
/// [workers]
/// count = 8
/// queue_size = 1024
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    /// Number of long-lived workers
    /// Default: 8
    pub count: usize,

    /// Bounded queue capacity; messages beyond it are dropped
    /// Default: 1024
    pub queue_size: usize,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            count: 8,
            queue_size: 1024,
        }
    }
}
