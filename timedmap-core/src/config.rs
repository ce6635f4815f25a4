use std::time::Duration;

/// Smallest tick accepted by the sweep; `tokio::time::interval` rejects zero
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration for a map and its background sweep
///
/// # Example
///
/// ```rust
/// use timedmap_core::MapConfig;
/// use std::time::Duration;
///
/// let config = MapConfig::default()
///     .with_tick_interval(Duration::from_millis(500))
///     .with_initial_capacity(1024);
/// ```
#[derive(Debug, Clone)]
pub struct MapConfig {
    /// Time between sweep ticks; each tick decrements every TTL by one (default: 1 second)
    pub tick_interval: Duration,
    /// Number of entries to preallocate (default: 0)
    pub initial_capacity: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            initial_capacity: 0,
        }
    }
}

impl MapConfig {
    /// Creates a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tick interval
    ///
    /// TTLs are expressed in ticks, so with the default interval a TTL of 10
    /// means roughly ten seconds. A zero interval is raised to one millisecond.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(MIN_TICK_INTERVAL);
        self
    }

    /// Sets how many entries the map preallocates room for
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}
