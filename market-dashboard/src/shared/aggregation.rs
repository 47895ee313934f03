/// Aggregation utilities for the market overview
///
/// Derives summary metrics from a [`MarketSnapshot`] on demand. Nothing here
/// mutates state; empty inputs yield zero or empty results.
use crate::shared::store::MarketSnapshot;
use crate::shared::types::{Instrument, Transaction};
use itertools::Itertools;

/// Total market capitalization
///
/// Σ(market cap) over all instruments
pub fn total_market_cap(instruments: &[Instrument]) -> f64 {
    instruments.iter().map(|i| i.market_cap).sum()
}

/// Number of listed instruments
pub fn active_instruments(instruments: &[Instrument]) -> usize {
    instruments.len()
}

/// Total traded volume
///
/// Σ(shares × price) over every given transaction. Slice the log first to
/// restrict the window.
pub fn total_volume(transactions: &[Transaction]) -> f64 {
    transactions.iter().map(Transaction::value).sum()
}

/// The `n` most profitable instruments, most profitable first
///
/// The sort is stable: instruments with equal profit keep their input order.
pub fn top_businesses(instruments: &[Instrument], n: usize) -> Vec<&Instrument> {
    instruments
        .iter()
        .sorted_by(|a, b| b.profit.total_cmp(&a.profit))
        .take(n)
        .collect()
}

/// The first `n` entries of a newest-first log, order unchanged
pub fn recent_transactions(transactions: &[Transaction], n: usize) -> &[Transaction] {
    &transactions[..n.min(transactions.len())]
}

/// Overview metrics derived from one snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketSummary {
    pub total_market_cap: f64,
    pub active_instruments: usize,
    pub total_volume: f64,
}

impl MarketSummary {
    pub fn from_snapshot(snapshot: &MarketSnapshot) -> Self {
        Self {
            total_market_cap: total_market_cap(&snapshot.instruments),
            active_instruments: active_instruments(&snapshot.instruments),
            total_volume: total_volume(&snapshot.transactions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::DashboardConfig;
    use crate::shared::store::{sample_instruments, sample_transactions, MarketStore};
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn with_profit(name: &str, profit: f64) -> Instrument {
        Instrument {
            name: name.to_string(),
            profit,
            ..sample_instruments()[0].clone()
        }
    }

    #[test]
    fn test_total_market_cap_sample() {
        let total = total_market_cap(&sample_instruments());
        assert_eq!(total, 10_580_000.0);
    }

    #[test]
    fn test_total_market_cap_matches_share_formula_after_jitter() {
        let now = Utc::now();
        let mut store = MarketStore::with_sample_data(&DashboardConfig::default(), now);
        let mut rng = StdRng::seed_from_u64(21);

        for _ in 0..10 {
            store.apply_jitter(10.0, &mut rng, now).unwrap();
            let expected: f64 = store
                .instruments()
                .iter()
                .map(|i| i.price * (20_000 - i.available_shares) as f64)
                .sum();
            assert!((total_market_cap(store.instruments()) - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_total_volume_sample() {
        // 100×125 + 50×89 + 25×156 + 200×67 + 75×92
        let total = total_volume(&sample_transactions(Utc::now()));
        assert_eq!(total, 41_150.0);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(total_market_cap(&[]), 0.0);
        assert_eq!(active_instruments(&[]), 0);
        assert_eq!(total_volume(&[]), 0.0);
        assert!(top_businesses(&[], 6).is_empty());
        assert!(recent_transactions(&[], 10).is_empty());
    }

    #[test]
    fn test_top_businesses_order() {
        let instruments = sample_instruments();
        let names: Vec<&str> = top_businesses(&instruments, 6)
            .iter()
            .map(|i| i.name.as_str())
            .collect();

        assert_eq!(
            names,
            vec![
                "HealthTech Innovations",
                "TechCorp Industries",
                "Financial Services Ltd",
                "Green Energy Solutions",
                "Retail Empire",
            ]
        );
        assert_eq!(top_businesses(&instruments, 2).len(), 2);
    }

    #[test]
    fn test_top_businesses_is_stable() {
        let instruments = vec![
            with_profit("A", 10.0),
            with_profit("B", 30.0),
            with_profit("C", 10.0),
            with_profit("D", 30.0),
            with_profit("E", 10.0),
        ];

        let names: Vec<&str> = top_businesses(&instruments, 5)
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["B", "D", "A", "C", "E"]);
    }

    #[test]
    fn test_recent_transactions_slices_head() {
        let transactions = sample_transactions(Utc::now());
        let recent = recent_transactions(&transactions, 3);
        assert_eq!(recent, &transactions[..3]);
        assert_eq!(recent_transactions(&transactions, 10).len(), 5);
    }

    #[test]
    fn test_summary_from_snapshot() {
        let now = Utc::now();
        let store = MarketStore::with_sample_data(&DashboardConfig::default(), now);
        let summary = MarketSummary::from_snapshot(&store.snapshot(now));

        assert_eq!(summary.total_market_cap, 10_580_000.0);
        assert_eq!(summary.active_instruments, 5);
        assert_eq!(summary.total_volume, 41_150.0);
    }
}
