/// Value reported for permanent entries by the integer TTL accessors
pub const PERMANENT_TTL: i64 = -1;

/// Lifetime state of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Never decays and is never evicted
    Permanent,
    /// Counts down once per tick and is evicted on reaching zero
    Expiring {
        /// Ticks left before eviction
        remaining: u64,
        /// Value `remaining` is reset to by `get` and `touch`
        base: u64,
    },
}

impl Ttl {
    /// Builds a TTL from the integer form, where any negative value means permanent
    pub fn from_secs(ttl: i64) -> Self {
        match u64::try_from(ttl) {
            Ok(secs) => Ttl::Expiring {
                remaining: secs,
                base: secs,
            },
            Err(_) => Ttl::Permanent,
        }
    }

    /// Remaining ticks, or [`PERMANENT_TTL`] for permanent entries
    pub fn remaining(&self) -> i64 {
        match self {
            Ttl::Permanent => PERMANENT_TTL,
            Ttl::Expiring { remaining, .. } => saturating_i64(*remaining),
        }
    }

    /// Base TTL, or [`PERMANENT_TTL`] for permanent entries
    pub fn base(&self) -> i64 {
        match self {
            Ttl::Permanent => PERMANENT_TTL,
            Ttl::Expiring { base, .. } => saturating_i64(*base),
        }
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self, Ttl::Permanent)
    }
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// A stored value together with its TTL state
#[derive(Debug, Clone)]
pub(crate) struct Entry<V> {
    value: V,
    ttl: Ttl,
}

impl<V> Entry<V> {
    /// Creates an entry that never expires
    pub(crate) fn permanent(value: V) -> Self {
        Self {
            value,
            ttl: Ttl::Permanent,
        }
    }

    /// Creates an entry that expires after `secs` ticks
    pub(crate) fn expiring(value: V, secs: u64) -> Self {
        Self {
            value,
            ttl: Ttl::Expiring {
                remaining: secs,
                base: secs,
            },
        }
    }

    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    pub(crate) fn ttl(&self) -> Ttl {
        self.ttl
    }

    pub(crate) fn into_value(self) -> V {
        self.value
    }

    /// Replaces both the remaining and the base TTL
    pub(crate) fn set_ttl(&mut self, ttl: Ttl) {
        self.ttl = ttl;
    }

    /// Resets the countdown to the base TTL and returns the base
    pub(crate) fn touch(&mut self) -> i64 {
        if let Ttl::Expiring { remaining, base } = &mut self.ttl {
            *remaining = *base;
        }
        self.ttl.base()
    }

    /// Advances the countdown by one tick.
    ///
    /// Returns `true` once the entry has run out and must be evicted.
    /// Permanent entries are left untouched.
    pub(crate) fn tick(&mut self) -> bool {
        match &mut self.ttl {
            Ttl::Permanent => false,
            Ttl::Expiring { remaining, .. } => {
                *remaining = remaining.saturating_sub(1);
                *remaining == 0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permanent_entry_never_runs_out() {
        let mut entry = Entry::permanent("test_value");

        for _ in 0..100 {
            assert!(!entry.tick());
        }
        assert_eq!(*entry.value(), "test_value");
        assert_eq!(entry.ttl().remaining(), PERMANENT_TTL);
    }

    #[test]
    fn test_expiring_entry_counts_down() {
        let mut entry = Entry::expiring("test_value", 3);

        assert!(!entry.tick());
        assert_eq!(entry.ttl().remaining(), 2);
        assert!(!entry.tick());
        assert!(entry.tick());
        assert_eq!(entry.ttl().remaining(), 0);
    }

    #[test]
    fn test_zero_ttl_runs_out_on_first_tick() {
        let mut entry = Entry::expiring("test_value", 0);
        assert!(entry.tick());
    }

    #[test]
    fn test_touch_resets_to_base() {
        let mut entry = Entry::expiring("test_value", 10);
        entry.tick();
        entry.tick();
        assert_eq!(entry.ttl().remaining(), 8);

        assert_eq!(entry.touch(), 10);
        assert_eq!(entry.ttl().remaining(), 10);
    }

    #[test]
    fn test_touch_permanent_reports_sentinel() {
        let mut entry = Entry::permanent(1);
        assert_eq!(entry.touch(), PERMANENT_TTL);
        assert!(entry.ttl().is_permanent());
    }

    #[test]
    fn test_ttl_from_secs() {
        assert_eq!(Ttl::from_secs(-1), Ttl::Permanent);
        assert_eq!(Ttl::from_secs(-42), Ttl::Permanent);
        assert_eq!(
            Ttl::from_secs(5),
            Ttl::Expiring {
                remaining: 5,
                base: 5
            }
        );
    }

    #[test]
    fn test_huge_ttl_reports_saturated() {
        let entry = Entry::expiring((), u64::MAX);
        assert_eq!(entry.ttl().remaining(), i64::MAX);
        assert_eq!(entry.ttl().base(), i64::MAX);
    }
}
