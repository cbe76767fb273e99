//! Duration Policy Module
//!
//! Resolves how long an auction stays open and how often the sweeper runs.

use std::time::Duration;

use tracing::info;

use crate::config::Config;
use crate::error::DurationParseError;

// == Policy Constants ==
/// Lifetime used when configuration is missing or malformed.
pub const DEFAULT_AUCTION_LIFETIME: Duration = Duration::from_secs(5 * 60);

/// Upper bound on the sweep interval.
pub const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Lower bound on the sweep interval; tokio intervals reject a zero period.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

const NANOS_PER_SEC: u128 = 1_000_000_000;

// == Duration Policy ==
/// Auction lifetime resolved once from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationPolicy {
    lifetime: Duration,
}

impl DurationPolicy {
    /// Resolves the lifetime from `config`.
    ///
    /// Reads the primary key, then the legacy alias. Anything absent or
    /// unparsable yields [`DEFAULT_AUCTION_LIFETIME`]; this never fails.
    pub fn from_config(config: &Config) -> Self {
        let lifetime = match config.lifetime_expr().map(parse_duration) {
            Some(Ok(lifetime)) => lifetime,
            Some(Err(err)) => {
                info!(
                    "Using default auction duration of {:?}: {}",
                    DEFAULT_AUCTION_LIFETIME, err
                );
                DEFAULT_AUCTION_LIFETIME
            }
            None => {
                info!(
                    "Using default auction duration of {:?}",
                    DEFAULT_AUCTION_LIFETIME
                );
                DEFAULT_AUCTION_LIFETIME
            }
        };

        Self { lifetime }
    }

    /// Builds a policy around an already-known lifetime.
    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self { lifetime }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// How often the sweeper should run: half the lifetime, capped at one
    /// minute.
    pub fn sweep_interval(&self) -> Duration {
        (self.lifetime / 2).clamp(MIN_SWEEP_INTERVAL, MAX_SWEEP_INTERVAL)
    }
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self::with_lifetime(DEFAULT_AUCTION_LIFETIME)
    }
}

// == Parse Duration ==
/// Parses expressions such as `"90s"`, `"10m"` or `"1h30m"`.
///
/// Grammar: one or more `<integer><unit>` tokens with units `ns`, `us`
/// (or `µs`), `ms`, `s`, `m`, `h`. No signs, fractions or whitespace.
pub fn parse_duration(expr: &str) -> Result<Duration, DurationParseError> {
    if expr.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let mut total_nanos: u128 = 0;
    let mut rest = expr;

    while !rest.is_empty() {
        let position = expr.len() - rest.len();
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if digits_end == 0 {
            return Err(DurationParseError::MissingNumber(position));
        }

        let value: u64 = rest[..digits_end]
            .parse()
            .map_err(|_| DurationParseError::Overflow)?;
        rest = &rest[digits_end..];

        let unit_end = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        let nanos_per_unit: u128 = match unit {
            "" => return Err(DurationParseError::MissingUnit(value)),
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "h" => 3_600 * NANOS_PER_SEC,
            other => return Err(DurationParseError::UnknownUnit(other.to_string())),
        };
        rest = &rest[unit_end..];

        total_nanos = total_nanos
            .checked_add(u128::from(value) * nanos_per_unit)
            .ok_or(DurationParseError::Overflow)?;
    }

    if total_nanos == 0 {
        return Err(DurationParseError::Zero);
    }

    let secs = u64::try_from(total_nanos / NANOS_PER_SEC).map_err(|_| DurationParseError::Overflow)?;
    let nanos = (total_nanos % NANOS_PER_SEC) as u32;
    Ok(Duration::new(secs, nanos))
}
