//! # TimedMap Core
//!
//! An in-memory key-value map where every entry carries an optional TTL that
//! decays once per tick (one second by default). Entries whose TTL reaches
//! zero are evicted by a background sweep.
//!
//! ## Features
//!
//! - One `RwLock` guards the whole map; the sweep serializes with writers
//! - Sliding expiration: `get` and `touch` reset an entry to its base TTL
//! - Permanent entries that never decay
//! - A background sweep task per map instance, stopped by `shutdown` or drop
//!
//! ## Example
//!
//! ```rust,no_run
//! use timedmap_core::{MapConfig, TimedMap};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     // One-second ticks
//!     let map: TimedMap<String> = TimedMap::new();
//!
//!     // Or with a custom tick
//!     let config = MapConfig::default()
//!         .with_tick_interval(Duration::from_millis(100));
//!     let fast: TimedMap<String> = TimedMap::with_config(config);
//!
//!     // Expires after 60 ticks unless read or touched
//!     map.put_with_ttl("session", "abc".to_string(), 60).unwrap();
//!
//!     // Never expires
//!     map.put("config", "on".to_string());
//!
//!     if let Ok(value) = map.get("session") {
//!         println!("session: {}", value);
//!     }
//!
//!     map.remove("session");
//!     fast.shutdown();
//! }
//! ```

mod config;
mod entry;
mod error;
mod map;

pub use config::MapConfig;
pub use entry::{Ttl, PERMANENT_TTL};
pub use error::MapError;
pub use map::TimedMap;
