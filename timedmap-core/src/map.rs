use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Display;
use std::io::{self, Write};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::config::MapConfig;
use crate::entry::{Entry, Ttl};
use crate::error::MapError;

/// Internal shared state for the map
struct MapInner<V> {
    data: RwLock<HashMap<String, Entry<V>>>,
    /// Sender to signal shutdown to the sweep task
    shutdown_tx: watch::Sender<bool>,
}

/// Thread-safe in-memory key-value map whose entries decay once per tick
///
/// A single `RwLock` guards the whole map. Writers, `get`, `touch` and the
/// background sweep take it exclusively; pure observations share it.
///
/// Each map spawns its own sweep task. Every tick the sweep decrements the TTL
/// of each non-permanent entry and evicts the ones that reach zero. The task
/// stops on [`shutdown`](TimedMap::shutdown) or when the last handle is dropped.
///
/// Cloning a `TimedMap` yields another handle to the same map and sweep.
///
/// # Example
///
/// ```rust,no_run
/// use timedmap_core::TimedMap;
///
/// #[tokio::main]
/// async fn main() {
///     let map = TimedMap::new();
///
///     map.put_with_ttl("token", 42u32, 30).unwrap(); // 30 second TTL
///     assert_eq!(map.get_ttl("token").unwrap(), 30);
///
///     // Reading resets the countdown
///     assert_eq!(map.get("token").unwrap(), 42);
/// }
/// ```
pub struct TimedMap<V> {
    inner: Arc<MapInner<V>>,
}

impl<V> Clone for TimedMap<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> TimedMap<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a new map ticking once per second
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context. The map requires
    /// a runtime to spawn its background sweep task.
    pub fn new() -> Self {
        Self::with_config(MapConfig::default())
    }

    /// Creates a new map with custom configuration
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context. The map requires
    /// a runtime to spawn its background sweep task.
    pub fn with_config(config: MapConfig) -> Self {
        if tokio::runtime::Handle::try_current().is_err() {
            panic!(
                "timedmap_core::TimedMap requires a Tokio runtime. \
                 Create the map from within a #[tokio::main] or #[tokio::test] \
                 context, or from code running on a Tokio runtime."
            );
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let inner = Arc::new(MapInner {
            data: RwLock::new(HashMap::with_capacity(config.initial_capacity)),
            shutdown_tx,
        });

        // The task only holds a weak reference so dropping the last handle frees the map
        tokio::spawn(Self::sweep_task(
            Arc::downgrade(&inner),
            config.tick_interval,
            shutdown_rx,
        ));

        Self { inner }
    }

    /// Background task that decays every TTL once per tick
    async fn sweep_task(
        inner: Weak<MapInner<V>>,
        interval: Duration,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(interval);
        // Ticks missed while the lock is contended are dropped, not replayed
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; TTLs start decaying one interval in
        ticker.tick().await;

        tracing::info!(interval = ?interval, "sweep task started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(map) = inner.upgrade() else {
                        break;
                    };
                    Self::sweep_internal(&map);
                }
                changed = shutdown_rx.changed() => {
                    // Err means the map itself is gone
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("sweep task stopped");
    }

    /// One decay pass over the whole map, under the write lock
    fn sweep_internal(inner: &MapInner<V>) -> usize {
        let mut data = inner.data.write();
        let before = data.len();

        data.retain(|key, entry| {
            if entry.tick() {
                tracing::trace!(key = %key, "entry expired");
                false
            } else {
                true
            }
        });

        let evicted = before - data.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = data.len(), "sweep evicted expired entries");
        }
        evicted
    }

    /// Stores a permanent value, replacing any existing entry for the key
    ///
    /// Returns the previous value if the key was present.
    pub fn put(&self, key: impl Into<String>, value: V) -> Option<V> {
        self.inner
            .data
            .write()
            .insert(key.into(), Entry::permanent(value))
            .map(Entry::into_value)
    }

    /// Stores a value that expires after `ttl` ticks unless read or touched
    ///
    /// Returns the previous value if the key was present. A TTL of zero is
    /// evicted by the next sweep.
    ///
    /// # Errors
    ///
    /// Returns `MapError::InvalidArgument` if `ttl` is negative; the map is left
    /// unchanged. Use [`put`](TimedMap::put) for permanent entries.
    pub fn put_with_ttl(
        &self,
        key: impl Into<String>,
        value: V,
        ttl: i64,
    ) -> Result<Option<V>, MapError> {
        let secs = u64::try_from(ttl).map_err(|_| MapError::InvalidArgument { ttl })?;

        Ok(self
            .inner
            .data
            .write()
            .insert(key.into(), Entry::expiring(value, secs))
            .map(Entry::into_value))
    }

    /// Retrieves a value and resets its TTL to the base TTL
    ///
    /// # Errors
    ///
    /// Returns `MapError::NotFound` if the key is absent.
    pub fn get(&self, key: &str) -> Result<V, MapError> {
        let mut data = self.inner.data.write();
        let entry = data.get_mut(key).ok_or_else(|| MapError::not_found(key))?;
        entry.touch();
        Ok(entry.value().clone())
    }

    /// Retrieves a value without resetting its TTL
    ///
    /// # Errors
    ///
    /// Returns `MapError::NotFound` if the key is absent.
    pub fn get_without_touch(&self, key: &str) -> Result<V, MapError> {
        self.inner
            .data
            .read()
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| MapError::not_found(key))
    }

    /// Returns the remaining TTL of a key, or `-1` for a permanent entry
    ///
    /// # Errors
    ///
    /// Returns `MapError::NotFound` if the key is absent.
    pub fn get_ttl(&self, key: &str) -> Result<i64, MapError> {
        self.ttl(key).map(|ttl| ttl.remaining())
    }

    /// Returns the TTL state of a key
    ///
    /// # Errors
    ///
    /// Returns `MapError::NotFound` if the key is absent.
    pub fn ttl(&self, key: &str) -> Result<Ttl, MapError> {
        self.inner
            .data
            .read()
            .get(key)
            .map(Entry::ttl)
            .ok_or_else(|| MapError::not_found(key))
    }

    /// Replaces both the remaining and the base TTL of an existing key
    ///
    /// A negative `ttl` makes the entry permanent; this is the only way to turn
    /// an expiring entry into a permanent one without rewriting its value.
    /// Returns the TTL as [`get_ttl`](TimedMap::get_ttl) now reports it.
    ///
    /// # Errors
    ///
    /// Returns `MapError::NotFound` if the key is absent.
    pub fn set_ttl(&self, key: &str, ttl: i64) -> Result<i64, MapError> {
        let mut data = self.inner.data.write();
        let entry = data.get_mut(key).ok_or_else(|| MapError::not_found(key))?;
        let ttl = Ttl::from_secs(ttl);
        entry.set_ttl(ttl);
        Ok(ttl.remaining())
    }

    /// Resets the TTL of a key to its base TTL without reading the value
    ///
    /// Returns the base TTL, or `-1` for a permanent entry.
    ///
    /// # Errors
    ///
    /// Returns `MapError::NotFound` if the key is absent.
    pub fn touch(&self, key: &str) -> Result<i64, MapError> {
        let mut data = self.inner.data.write();
        let entry = data.get_mut(key).ok_or_else(|| MapError::not_found(key))?;
        Ok(entry.touch())
    }

    /// Checks if a key is present. Does not affect its TTL.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.data.read().contains_key(key)
    }

    /// Removes a key and returns its value
    ///
    /// Removing an absent key is not an error and returns `None`.
    pub fn remove(&self, key: &str) -> Option<V> {
        self.inner.data.write().remove(key).map(Entry::into_value)
    }

    /// Removes every entry and returns how many were removed
    ///
    /// The sweep task keeps running.
    pub fn clear(&self) -> usize {
        let mut data = self.inner.data.write();
        let count = data.len();
        data.clear();
        count
    }

    /// Returns the number of entries in the map
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.data.read().len()
    }

    /// Returns `true` if the map is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.data.read().is_empty()
    }

    /// Returns a snapshot of the current keys, in no particular order
    pub fn keys(&self) -> Vec<String> {
        self.inner.data.read().keys().cloned().collect()
    }

    /// Returns a snapshot of `(key, value, ttl)` triples sorted by key
    ///
    /// The TTL is reported as by [`get_ttl`](TimedMap::get_ttl).
    pub fn entries(&self) -> Vec<(String, V, i64)> {
        let mut entries: Vec<_> = self
            .inner
            .data
            .read()
            .iter()
            .map(|(key, entry)| (key.clone(), entry.value().clone(), entry.ttl().remaining()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Runs one decay pass immediately and returns the number of evicted entries
    ///
    /// Note: this is also done automatically by the background task on every tick.
    pub fn sweep(&self) -> usize {
        Self::sweep_internal(&self.inner)
    }

    /// Stops the background sweep task
    ///
    /// Entries stay readable and writable, but TTLs no longer decay. This is
    /// called automatically when the last handle is dropped.
    pub fn shutdown(&self) {
        let _ = self.inner.shutdown_tx.send(true);
    }

    /// Returns `true` while the sweep task is alive
    ///
    /// The task exits asynchronously, so this can still read `true` right
    /// after [`shutdown`](TimedMap::shutdown) until the task observes the signal.
    pub fn is_running(&self) -> bool {
        !self.inner.shutdown_tx.is_closed()
    }
}

impl<V> TimedMap<V>
where
    V: Clone + Display + Send + Sync + 'static,
{
    /// Prints every entry as `key : value - TTL: n` to stdout
    pub fn print_map(&self) {
        // Diagnostic output only; a closed stdout is not worth surfacing
        let _ = self.write_map(io::stdout().lock());
    }

    /// Writes every entry as `key : value - TTL: n`, one per line, sorted by key
    ///
    /// The map is snapshotted first so the lock is not held during I/O.
    pub fn write_map<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for (key, value, ttl) in self.entries() {
            writeln!(writer, "{} : {} - TTL: {}", key, value, ttl)?;
        }
        writer.flush()
    }
}

impl<V> Default for TimedMap<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Drop for MapInner<V> {
    fn drop(&mut self) {
        // Signal the sweep task to stop when the map is dropped
        let _ = self.shutdown_tx.send(true);
    }
}
