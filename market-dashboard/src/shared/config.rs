/// Dashboard tunables
///
/// Every constant of the refresh pipeline lives here so it can be adjusted
/// through the builder or `DASHBOARD_*` environment variables.

use crate::shared::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Dashboard configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Total authorized shares used when recomputing market caps
    pub authorized_shares: u64,
    /// Maximum number of transactions kept in the log
    pub retention_cap: usize,
    /// Period of the full re-render cycle
    pub slow_cycle: Duration,
    /// Period of the live price cycle
    pub fast_cycle: Duration,
    /// Simulated latency of a manual refresh
    pub refresh_delay: Duration,
    /// Chance that a manual refresh synthesizes a transaction
    pub transaction_probability: f64,
    /// Jitter magnitude of a manual refresh
    pub manual_jitter: f64,
    /// Jitter magnitude of the live price cycle
    pub fast_jitter: f64,
    /// Number of cards in the top businesses grid
    pub top_businesses: usize,
    /// Number of entries in the transaction feed
    pub recent_transactions: usize,
    /// Seed for the random source, `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            authorized_shares: 20_000,
            retention_cap: 20,
            slow_cycle: Duration::from_secs(300),
            fast_cycle: Duration::from_secs(30),
            refresh_delay: Duration::from_secs(1),
            transaction_probability: 0.3,
            manual_jitter: 10.0,
            fast_jitter: 2.0,
            top_businesses: 6,
            recent_transactions: 10,
            seed: None,
        }
    }
}

impl DashboardConfig {
    /// Build a configuration from `DASHBOARD_*` environment variables,
    /// falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DashboardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = parse_var(&lookup, "DASHBOARD_AUTHORIZED_SHARES")? {
            config.authorized_shares = v;
        }
        if let Some(v) = parse_var(&lookup, "DASHBOARD_RETENTION_CAP")? {
            config.retention_cap = v;
        }
        if let Some(v) = parse_var(&lookup, "DASHBOARD_SLOW_CYCLE_SECS")? {
            config.slow_cycle = Duration::from_secs(v);
        }
        if let Some(v) = parse_var(&lookup, "DASHBOARD_FAST_CYCLE_SECS")? {
            config.fast_cycle = Duration::from_secs(v);
        }
        if let Some(v) = parse_var(&lookup, "DASHBOARD_REFRESH_DELAY_MS")? {
            config.refresh_delay = Duration::from_millis(v);
        }
        if let Some(v) = parse_var(&lookup, "DASHBOARD_TX_PROBABILITY")? {
            config.transaction_probability = v;
        }
        if let Some(v) = parse_var(&lookup, "DASHBOARD_MANUAL_JITTER")? {
            config.manual_jitter = v;
        }
        if let Some(v) = parse_var(&lookup, "DASHBOARD_FAST_JITTER")? {
            config.fast_jitter = v;
        }
        if let Some(v) = parse_var(&lookup, "DASHBOARD_TOP_BUSINESSES")? {
            config.top_businesses = v;
        }
        if let Some(v) = parse_var(&lookup, "DASHBOARD_RECENT_TRANSACTIONS")? {
            config.recent_transactions = v;
        }
        if let Some(v) = parse_var(&lookup, "DASHBOARD_SEED")? {
            config.seed = Some(v);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that every tunable is usable by the refresh pipeline.
    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.retention_cap == 0 {
            return Err(DashboardError::Config(
                "retention cap must be at least 1".to_string(),
            ));
        }
        if self.slow_cycle.is_zero() || self.fast_cycle.is_zero() {
            return Err(DashboardError::Config(
                "cycle periods must be non-zero".to_string(),
            ));
        }
        if !(self.transaction_probability > 0.0 && self.transaction_probability <= 1.0) {
            return Err(DashboardError::Config(format!(
                "transaction probability {} outside (0, 1]",
                self.transaction_probability
            )));
        }
        for (name, magnitude) in [
            ("manual jitter", self.manual_jitter),
            ("fast jitter", self.fast_jitter),
        ] {
            if !(magnitude.is_finite() && magnitude > 0.0) {
                return Err(DashboardError::Config(format!(
                    "{name} {magnitude} must be a finite number greater than zero"
                )));
            }
        }
        Ok(())
    }

    /// Set the authorized share count
    pub fn with_authorized_shares(mut self, shares: u64) -> Self {
        self.authorized_shares = shares;
        self
    }

    /// Set the transaction retention cap
    pub fn with_retention_cap(mut self, cap: usize) -> Self {
        self.retention_cap = cap;
        self
    }

    /// Set both periodic cycle periods
    pub fn with_cycles(mut self, slow: Duration, fast: Duration) -> Self {
        self.slow_cycle = slow;
        self.fast_cycle = fast;
        self
    }

    /// Set the simulated manual refresh delay
    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    /// Set the new-transaction probability
    pub fn with_transaction_probability(mut self, probability: f64) -> Self {
        self.transaction_probability = probability;
        self
    }

    /// Set the manual and fast jitter magnitudes
    pub fn with_jitter(mut self, manual: f64, fast: f64) -> Self {
        self.manual_jitter = manual;
        self.fast_jitter = fast;
        self
    }

    /// Set the top businesses and recent transactions counts
    pub fn with_view_sizes(mut self, top_businesses: usize, recent_transactions: usize) -> Self {
        self.top_businesses = top_businesses;
        self.recent_transactions = recent_transactions;
        self
    }

    /// Seed the random source for reproducible runs
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, DashboardError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| DashboardError::Config(format!("{key}={raw:?}: {e}"))),
    }
}
