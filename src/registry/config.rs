//! Registry configuration

use std::time::Duration;

/// Room registry configuration options
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum participants per room
    pub max_room_size: usize,

    /// Evict a participant whose last activity is older than this
    pub idle_threshold: Duration,

    /// How often the idle reaper runs
    pub sweep_interval: Duration,

    /// Capacity of each session's outbound frame channel
    pub outbound_buffer: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_room_size: 10,
            idle_threshold: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(60),
            outbound_buffer: 256,
        }
    }
}

impl RegistryConfig {
    /// Set the per-room participant cap
    pub fn max_room_size(mut self, max: usize) -> Self {
        self.max_room_size = max;
        self
    }

    /// Set the idle eviction threshold
    pub fn idle_threshold(mut self, threshold: Duration) -> Self {
        self.idle_threshold = threshold;
        self
    }

    /// Set the reaper sweep interval
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Set the per-session outbound channel capacity
    pub fn outbound_buffer(mut self, capacity: usize) -> Self {
        self.outbound_buffer = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();

        assert_eq!(config.max_room_size, 10);
        assert_eq!(config.idle_threshold, Duration::from_secs(300));
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
        assert_eq!(config.outbound_buffer, 256);
    }

    #[test]
    fn test_builder_chaining() {
        let config = RegistryConfig::default()
            .max_room_size(4)
            .idle_threshold(Duration::from_secs(30))
            .sweep_interval(Duration::from_secs(5))
            .outbound_buffer(64);

        assert_eq!(config.max_room_size, 4);
        assert_eq!(config.idle_threshold, Duration::from_secs(30));
        assert_eq!(config.sweep_interval, Duration::from_secs(5));
        assert_eq!(config.outbound_buffer, 64);
    }
}
