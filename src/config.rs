//! Configuration Module
//!
//! Loads the raw auction settings from environment variables. Values are kept
//! as strings here; interpretation belongs to [`crate::auction::DurationPolicy`].

use std::env;

/// Primary environment key for the auction lifetime.
pub const AUCTION_DURATION_KEY: &str = "AUCTION_DURATION";

/// Legacy alias still honoured when the primary key is unset.
pub const AUCTION_INTERVAL_KEY: &str = "AUCTION_INTERVAL";

/// Auction server configuration parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Lifetime expression, e.g. `"5m"` or `"1h30m"`
    pub auction_duration: Option<String>,
    /// Legacy lifetime expression
    pub auction_interval: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `AUCTION_DURATION` - Auction lifetime expression
    /// - `AUCTION_INTERVAL` - Legacy alias for `AUCTION_DURATION`
    pub fn from_env() -> Self {
        Self {
            auction_duration: env::var(AUCTION_DURATION_KEY).ok(),
            auction_interval: env::var(AUCTION_INTERVAL_KEY).ok(),
        }
    }

    /// Builds a config with only the primary lifetime key set.
    pub fn with_duration(expr: impl Into<String>) -> Self {
        Self {
            auction_duration: Some(expr.into()),
            auction_interval: None,
        }
    }

    /// Returns the lifetime expression in effect, preferring the primary key.
    ///
    /// An empty primary value counts as unset.
    pub fn lifetime_expr(&self) -> Option<&str> {
        self.auction_duration
            .as_deref()
            .filter(|v| !v.is_empty())
            .or_else(|| self.auction_interval.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.auction_duration.is_none());
        assert!(config.auction_interval.is_none());
        assert!(config.lifetime_expr().is_none());
    }

    #[test]
    fn test_config_from_env() {
        env::set_var(AUCTION_DURATION_KEY, "10m");
        env::remove_var(AUCTION_INTERVAL_KEY);

        let config = Config::from_env();
        assert_eq!(config.auction_duration.as_deref(), Some("10m"));
        assert!(config.auction_interval.is_none());

        env::remove_var(AUCTION_DURATION_KEY);
    }

    #[test]
    fn test_lifetime_expr_prefers_primary() {
        let config = Config {
            auction_duration: Some("10m".to_string()),
            auction_interval: Some("2h".to_string()),
        };
        assert_eq!(config.lifetime_expr(), Some("10m"));
    }

    #[test]
    fn test_lifetime_expr_falls_back_to_legacy() {
        let config = Config {
            auction_duration: Some(String::new()),
            auction_interval: Some("2h".to_string()),
        };
        assert_eq!(config.lifetime_expr(), Some("2h"));

        let config = Config {
            auction_duration: None,
            auction_interval: Some("30s".to_string()),
        };
        assert_eq!(config.lifetime_expr(), Some("30s"));
    }
}
