use anyhow::{ensure, Result};
use std::time::Duration;
use timedmap_core::{MapConfig, TimedMap};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_TICK_MS: u64 = 1000;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timedmap_demo=info,timedmap_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration from environment variables
    let tick_ms = parse_tick_ms(std::env::var("TIMEDMAP_TICK_MS").ok().as_deref());
    let tick = Duration::from_millis(tick_ms);

    let map = TimedMap::with_config(MapConfig::default().with_tick_interval(tick));

    tracing::info!("⏱️  TimedMap demo");
    tracing::info!("   Tick interval: {}ms", tick_ms);
    println!();

    // Land between ticks so the TTLs printed below are exact
    tokio::time::sleep(tick / 2).await;

    expiry(&map, tick).await?;
    sliding_expiration(&map, tick).await?;
    permanence(&map, tick).await?;

    map.shutdown();
    println!();
    tracing::info!("✅ Demo finished");

    Ok(())
}

/// Tick length in milliseconds; missing, unparseable or zero values fall back to the default
fn parse_tick_ms(value: Option<&str>) -> u64 {
    value
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .unwrap_or(DEFAULT_TICK_MS)
}

/// An entry with TTL 3 is gone five ticks later
async fn expiry(map: &TimedMap<String>, tick: Duration) -> Result<()> {
    tracing::info!("put key:value with TTL 3, then wait 5 ticks");
    map.put_with_ttl("key", "value".to_string(), 3)?;
    map.print_map();

    tokio::time::sleep(tick * 5).await;

    match map.get("key") {
        Err(err) => tracing::info!("expired as expected: {}", err),
        Ok(value) => anyhow::bail!("key should have expired, still holds {}", value),
    }
    Ok(())
}

/// TTL 10 decays to 5, touch resets it, six ticks later it reads 4
async fn sliding_expiration(map: &TimedMap<String>, tick: Duration) -> Result<()> {
    tracing::info!("put key:value again with TTL 10");
    map.put_with_ttl("key", "value".to_string(), 10)?;
    tracing::info!("TTL now {} (expect 10)", map.get_ttl("key")?);

    tokio::time::sleep(tick * 5).await;
    let ttl = map.get_ttl("key")?;
    tracing::info!("TTL after 5 ticks: {} (expect 5)", ttl);
    ensure!((4..=6).contains(&ttl), "unexpected TTL {}", ttl);

    let base = map.touch("key")?;
    tracing::info!("touched, TTL reset to {}", base);

    tokio::time::sleep(tick * 6).await;
    let ttl = map.get_ttl("key")?;
    tracing::info!("TTL after 6 more ticks: {} (expect 4)", ttl);
    ensure!((3..=5).contains(&ttl), "unexpected TTL {}", ttl);

    map.print_map();
    Ok(())
}

/// A negative `set_ttl` pins an entry; `put` entries never decay
async fn permanence(map: &TimedMap<String>, tick: Duration) -> Result<()> {
    map.put("pinned", "forever".to_string());
    map.set_ttl("key", -1)?;
    tracing::info!("pinned both entries, waiting 3 ticks");

    tokio::time::sleep(tick * 3).await;
    ensure!(map.get_ttl("key")? == -1, "key should be permanent");
    ensure!(map.contains_key("pinned"), "pinned entry should survive");

    map.print_map();

    let removed = map.remove("pinned");
    tracing::info!("removed pinned: {:?}", removed);
    tracing::info!("cleared {} remaining entries", map.clear());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_defaults_when_unset() {
        assert_eq!(parse_tick_ms(None), DEFAULT_TICK_MS);
    }

    #[test]
    fn test_tick_parses_milliseconds() {
        assert_eq!(parse_tick_ms(Some("250")), 250);
        assert_eq!(parse_tick_ms(Some(" 40 ")), 40);
    }

    #[test]
    fn test_zero_or_invalid_tick_falls_back_to_default() {
        assert_eq!(parse_tick_ms(Some("0")), DEFAULT_TICK_MS);
        assert_eq!(parse_tick_ms(Some("fast")), DEFAULT_TICK_MS);
        assert_eq!(parse_tick_ms(Some("-5")), DEFAULT_TICK_MS);
    }
}
