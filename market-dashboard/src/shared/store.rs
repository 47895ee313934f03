//! In-memory market owned by the dashboard.
//!
//! The store is the single writer of indicators, instruments and the
//! transaction log. Readers take an owned [`MarketSnapshot`] so aggregation and
//! rendering never hold a borrow into live state.

use crate::shared::config::DashboardConfig;
use crate::shared::error::DashboardError;
use crate::shared::types::{IndicatorSet, Instrument, Side, Transaction};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Lowest price an instrument can reach
pub const PRICE_FLOOR: f64 = 1.0;

/// Largest share count a synthesized transaction can carry
const MAX_SYNTHETIC_SHARES: u64 = 100;

/// Read-only copy of the store at a point in time
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MarketSnapshot {
    pub indicators: IndicatorSet,
    pub instruments: Vec<Instrument>,
    /// Newest first
    pub transactions: Vec<Transaction>,
    /// Time of the last store mutation
    pub last_updated: DateTime<Utc>,
    /// Time the snapshot was taken, used for time-relative labels
    pub taken_at: DateTime<Utc>,
}

/// Owner of the simulated market state
#[derive(Debug, Clone)]
pub struct MarketStore {
    indicators: IndicatorSet,
    instruments: Vec<Instrument>,
    transactions: VecDeque<Transaction>,
    authorized_shares: u64,
    retention_cap: usize,
    last_updated: DateTime<Utc>,
}

impl MarketStore {
    /// Create a store from explicit state.
    ///
    /// The transaction log is expected newest first and is truncated to the
    /// configured retention cap.
    pub fn new(
        indicators: IndicatorSet,
        instruments: Vec<Instrument>,
        transactions: Vec<Transaction>,
        config: &DashboardConfig,
        now: DateTime<Utc>,
    ) -> Self {
        let mut transactions: VecDeque<Transaction> = transactions.into();
        transactions.truncate(config.retention_cap);

        Self {
            indicators,
            instruments,
            transactions,
            authorized_shares: config.authorized_shares,
            retention_cap: config.retention_cap,
            last_updated: now,
        }
    }

    /// Create a store seeded with the built-in sample market.
    pub fn with_sample_data(config: &DashboardConfig, now: DateTime<Utc>) -> Self {
        Self::new(
            sample_indicators(),
            sample_instruments(),
            sample_transactions(now),
            config,
            now,
        )
    }

    pub fn indicators(&self) -> &IndicatorSet {
        &self.indicators
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    /// Transaction log, newest first
    pub fn transactions(&self) -> &VecDeque<Transaction> {
        &self.transactions
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn retention_cap(&self) -> usize {
        self.retention_cap
    }

    /// Owned copy of the current state
    pub fn snapshot(&self, now: DateTime<Utc>) -> MarketSnapshot {
        MarketSnapshot {
            indicators: self.indicators,
            instruments: self.instruments.clone(),
            transactions: self.transactions.iter().cloned().collect(),
            last_updated: self.last_updated,
            taken_at: now,
        }
    }

    /// Replace the indicator set wholesale
    pub fn replace_indicators(&mut self, indicators: IndicatorSet, now: DateTime<Utc>) {
        self.indicators = indicators;
        self.last_updated = now;
    }

    /// Move every instrument price by a uniform draw in
    /// `[-magnitude/2, +magnitude/2]`, recording the draw as its last change.
    ///
    /// Prices are clamped to [`PRICE_FLOOR`] and market caps recomputed from
    /// the authorized share count.
    pub fn apply_jitter<R>(
        &mut self,
        magnitude: f64,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<(), DashboardError>
    where
        R: Rng,
    {
        self.jitter_prices(magnitude, rng, now, true)
    }

    /// Live-price variant of [`apply_jitter`](Self::apply_jitter) that leaves
    /// each instrument's last change untouched.
    pub fn nudge_prices<R>(
        &mut self,
        magnitude: f64,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<(), DashboardError>
    where
        R: Rng,
    {
        self.jitter_prices(magnitude, rng, now, false)
    }

    fn jitter_prices<R>(
        &mut self,
        magnitude: f64,
        rng: &mut R,
        now: DateTime<Utc>,
        record_change: bool,
    ) -> Result<(), DashboardError>
    where
        R: Rng,
    {
        if !(magnitude.is_finite() && magnitude > 0.0) {
            warn!(magnitude, "rejected jitter magnitude");
            return Err(DashboardError::InvalidMagnitude(magnitude));
        }

        let half = magnitude / 2.0;
        for instrument in &mut self.instruments {
            let delta = rng.random_range(-half..=half);
            if record_change {
                instrument.change = delta;
            }
            instrument.price = (instrument.price + delta).max(PRICE_FLOOR);
            instrument.market_cap = instrument.implied_market_cap(self.authorized_shares);
        }

        self.last_updated = now;
        debug!(
            magnitude,
            instruments = self.instruments.len(),
            record_change,
            "jittered prices"
        );
        Ok(())
    }

    /// With the given probability, synthesize a transaction against a random
    /// instrument and prepend it to the log.
    ///
    /// Returns the new transaction, or `None` when the draw missed or there is
    /// no instrument to trade.
    pub fn record_transaction<R>(
        &mut self,
        probability: f64,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<Option<Transaction>, DashboardError>
    where
        R: Rng,
    {
        if !(probability.is_finite() && probability > 0.0 && probability <= 1.0) {
            warn!(probability, "rejected transaction probability");
            return Err(DashboardError::InvalidProbability(probability));
        }

        if self.instruments.is_empty() || !rng.random_bool(probability) {
            return Ok(None);
        }

        let instrument = &self.instruments[rng.random_range(0..self.instruments.len())];
        let side = if rng.random_bool(0.5) {
            Side::Buy
        } else {
            Side::Sell
        };
        let transaction = Transaction {
            side,
            instrument: instrument.name.clone(),
            shares: rng.random_range(1..=MAX_SYNTHETIC_SHARES),
            price: instrument.price,
            user: instrument.owner.clone(),
            created_at: now,
        };

        self.transactions.push_front(transaction.clone());
        self.transactions.truncate(self.retention_cap);
        self.last_updated = now;

        debug!(
            side = %transaction.side,
            instrument = %transaction.instrument,
            shares = transaction.shares,
            log_len = self.transactions.len(),
            "recorded transaction"
        );
        Ok(Some(transaction))
    }
}

/// Indicator values of the sample market
pub fn sample_indicators() -> IndicatorSet {
    IndicatorSet {
        growth_rate: 1.3,
        inflation_rate: 2.5,
        confidence_index: 78.0,
        interest_rate: 4.5,
        tax_rate: 25.0,
    }
}

/// The five listed companies of the sample market
pub fn sample_instruments() -> Vec<Instrument> {
    #[allow(clippy::too_many_arguments)]
    fn listed(
        name: &str,
        sector: &str,
        price: f64,
        change: f64,
        market_cap: f64,
        available_shares: u64,
        owner: &str,
        profit: f64,
        employees: u64,
    ) -> Instrument {
        Instrument {
            name: name.to_string(),
            sector: sector.to_string(),
            price,
            change,
            market_cap,
            available_shares,
            owner: owner.to_string(),
            profit,
            employees,
        }
    }

    vec![
        listed(
            "TechCorp Industries",
            "Technology",
            125.0,
            5.2,
            2_500_000.0,
            15_000,
            "Alice Johnson",
            45_000.0,
            120,
        ),
        listed(
            "Green Energy Solutions",
            "Energy",
            89.0,
            -2.1,
            1_780_000.0,
            8_500,
            "Bob Smith",
            32_000.0,
            85,
        ),
        listed(
            "Retail Empire",
            "Retail",
            67.0,
            1.8,
            1_340_000.0,
            12_000,
            "Carol Davis",
            28_000.0,
            200,
        ),
        listed(
            "HealthTech Innovations",
            "Healthcare",
            156.0,
            8.7,
            3_120_000.0,
            6_000,
            "David Wilson",
            52_000.0,
            95,
        ),
        listed(
            "Financial Services Ltd",
            "Finance",
            92.0,
            -1.5,
            1_840_000.0,
            9_200,
            "Eve Thompson",
            38_000.0,
            150,
        ),
    ]
}

/// Five historical transactions, 15 to 75 minutes before `now`, newest first
pub fn sample_transactions(now: DateTime<Utc>) -> Vec<Transaction> {
    let trade = |side, instrument: &str, shares, price, user: &str, minutes_ago| Transaction {
        side,
        instrument: instrument.to_string(),
        shares,
        price,
        user: user.to_string(),
        created_at: now - ChronoDuration::minutes(minutes_ago),
    };

    vec![
        trade(Side::Buy, "TechCorp Industries", 100, 125.0, "Alice Johnson", 15),
        trade(Side::Sell, "Green Energy Solutions", 50, 89.0, "Bob Smith", 30),
        trade(Side::Buy, "HealthTech Innovations", 25, 156.0, "Carol Davis", 45),
        trade(Side::Buy, "Retail Empire", 200, 67.0, "David Wilson", 60),
        trade(Side::Sell, "Financial Services Ltd", 75, 92.0, "Eve Thompson", 75),
    ]
}
