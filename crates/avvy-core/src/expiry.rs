//! Expiry timestamps for registration and renewal
//!
//! Years are a fixed number of seconds (365 days by default). Leap days are
//! not added, for registration and renewal alike, so totals stay comparable.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::Years;
use crate::error::{Error, Result};

/// Maps (years, current expiry) to a new expiry, in seconds since the epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryCalculator {
    seconds_per_year: u64,
}

impl ExpiryCalculator {
    /// Create a calculator with a fixed year length
    pub fn new(seconds_per_year: u64) -> Self {
        Self { seconds_per_year }
    }

    /// Seconds per year in use
    pub fn seconds_per_year(&self) -> u64 {
        self.seconds_per_year
    }

    /// New expiry for a registration (`current` absent) or renewal
    ///
    /// Registration counts from `now`, renewal from the current on-chain
    /// expiry. The result is strictly later than its base or the call fails
    /// with `ExpiryOverflow`.
    pub fn new_expiry(&self, years: Years, current: Option<u64>, now: u64) -> Result<u64> {
        let base = current.unwrap_or(now);
        let overflow = || Error::ExpiryOverflow {
            base,
            years: years.get(),
        };

        let extension = years
            .get()
            .checked_mul(self.seconds_per_year)
            .ok_or_else(overflow)?;
        let expiry = base.checked_add(extension).ok_or_else(overflow)?;

        if expiry <= base {
            return Err(overflow());
        }
        Ok(expiry)
    }

    /// Expiry of a fresh registration made at `now`
    pub fn registration_expiry(&self, years: Years, now: u64) -> Result<u64> {
        self.new_expiry(years, None, now)
    }

    /// Expiry after extending `current` by `years`
    pub fn renewal_expiry(&self, years: Years, current: u64) -> Result<u64> {
        self.new_expiry(years, Some(current), current)
    }
}

/// Current wall-clock time in whole seconds since the epoch
pub fn now_unix() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}

/// RFC 3339 rendering of a timestamp, if chrono can represent it
pub fn to_rfc3339(timestamp: u64) -> Option<String> {
    let secs = i64::try_from(timestamp).ok()?;
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SECONDS_PER_YEAR;
    use proptest::prelude::*;

    fn calculator() -> ExpiryCalculator {
        ExpiryCalculator::new(SECONDS_PER_YEAR)
    }

    fn years(n: u64) -> Years {
        Years::new(n).unwrap()
    }

    #[test]
    fn test_scenario_renewal_one_year() {
        let t0 = 1_735_689_600; // 2025-01-01T00:00:00Z
        let expiry = calculator().renewal_expiry(years(1), t0).unwrap();
        assert_eq!(expiry, t0 + 31_536_000);
    }

    #[test]
    fn test_registration_counts_from_now() {
        let now = 1_700_000_000;
        let expiry = calculator().new_expiry(years(2), None, now).unwrap();
        assert_eq!(expiry, now + 2 * 31_536_000);
    }

    #[test]
    fn test_renewal_ignores_now() {
        let current = 2_000_000_000;
        let expiry = calculator()
            .new_expiry(years(1), Some(current), 1_000)
            .unwrap();
        assert_eq!(expiry, current + SECONDS_PER_YEAR);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let err = calculator()
            .new_expiry(years(u64::MAX), None, 1)
            .unwrap_err();
        assert!(matches!(err, Error::ExpiryOverflow { base: 1, .. }));

        let err = calculator()
            .renewal_expiry(years(1), u64::MAX - 10)
            .unwrap_err();
        assert!(matches!(err, Error::ExpiryOverflow { .. }));
    }

    #[test]
    fn test_rfc3339() {
        assert_eq!(
            to_rfc3339(1_735_689_600).as_deref(),
            Some("2025-01-01T00:00:00Z")
        );
        assert_eq!(to_rfc3339(u64::MAX), None);
    }

    proptest! {
        #[test]
        fn prop_renewal_strictly_increases(current in 0u64..4_000_000_000, y in 1u64..=1000) {
            let expiry = calculator().renewal_expiry(years(y), current).unwrap();
            prop_assert!(expiry > current);
            prop_assert_eq!(expiry - current, y * SECONDS_PER_YEAR);
        }

        #[test]
        fn prop_registration_after_now(now in 0u64..4_000_000_000, y in 1u64..=1000) {
            let expiry = calculator().registration_expiry(years(y), now).unwrap();
            prop_assert!(expiry > now);
        }
    }
}
