/// Core data types for the simulated market
///
/// These types describe the in-memory market owned by the
/// [`MarketStore`](crate::shared::store::MarketStore): macro indicators,
/// listed instruments and the transaction log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Named macro-economic figures shown in the indicators panel
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct IndicatorSet {
    /// GDP growth rate in percent
    pub growth_rate: f64,
    /// Inflation rate in percent
    pub inflation_rate: f64,
    /// Consumer confidence index (0-100)
    pub confidence_index: f64,
    /// Central bank interest rate in percent
    pub interest_rate: f64,
    /// Corporate tax rate in percent
    pub tax_rate: f64,
}

/// A tradable company listed on the market
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Instrument {
    /// Company name, also used as the instrument identifier
    pub name: String,
    /// Sector label (e.g., "Technology")
    pub sector: String,
    /// Current share price, never below the price floor
    pub price: f64,
    /// Last price change applied by a jitter
    pub change: f64,
    /// Market capitalization
    pub market_cap: f64,
    /// Shares still available for purchase
    pub available_shares: u64,
    /// Owner label
    pub owner: String,
    /// Monthly profit
    pub profit: f64,
    /// Number of employees
    pub employees: u64,
}

impl Instrument {
    /// Market capitalization for `authorized_shares` total shares.
    ///
    /// Only the shares no longer available count towards the cap.
    pub fn implied_market_cap(&self, authorized_shares: u64) -> f64 {
        self.price * authorized_shares.saturating_sub(self.available_shares) as f64
    }

    /// Presentation class for the last price change
    pub fn change_class(&self) -> ChangeClass {
        ChangeClass::of(self.change)
    }
}

/// Sign classification of a price change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ChangeClass {
    Positive,
    Negative,
    Neutral,
}

impl ChangeClass {
    pub fn of(change: f64) -> Self {
        if change > 0.0 {
            ChangeClass::Positive
        } else if change < 0.0 {
            ChangeClass::Negative
        } else {
            ChangeClass::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeClass::Positive => "positive",
            ChangeClass::Negative => "negative",
            ChangeClass::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for ChangeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction direction (Buy or Sell)
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Convert to display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    /// Past-tense verb used in the transaction feed
    pub fn verb(&self) -> &'static str {
        match self {
            Side::Buy => "Bought",
            Side::Sell => "Sold",
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Side::Buy)
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, Side::Sell)
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An executed trade against an instrument
///
/// Instruments are referenced by name only; a transaction may outlive the
/// instrument it names.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Transaction {
    pub side: Side,
    /// Name of the traded instrument
    pub instrument: String,
    /// Number of shares traded (at least 1)
    pub shares: u64,
    /// Unit price at execution
    pub price: f64,
    /// Acting user label
    pub user: String,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Total traded value (shares × price)
    pub fn value(&self) -> f64 {
        self.shares as f64 * self.price
    }
}
