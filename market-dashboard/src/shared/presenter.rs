//! View rendering as data.
//!
//! Each `render_*` function maps a [`MarketSnapshot`] to the list of
//! [`ViewUpdate`]s that bring one view up to date. They never touch a surface
//! themselves, so the same snapshot always yields the same updates.

use crate::shared::aggregation::{recent_transactions, top_businesses, MarketSummary};
use crate::shared::config::DashboardConfig;
use crate::shared::format::{
    format_currency, format_index, format_number, format_percentage, format_signed_currency,
    format_time_ago,
};
use crate::shared::store::MarketSnapshot;
use crate::shared::types::{ChangeClass, Side};
use serde::Serialize;

const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

/// Named output slot of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ViewTarget {
    TotalMarketCap,
    ActiveStocks,
    TotalVolume,
    LastUpdate,
    GdpGrowth,
    InflationRate,
    ConsumerConfidence,
    InterestRate,
    TaxRate,
    StockTable,
    BusinessGrid,
    TransactionList,
    RefreshButton,
}

impl ViewTarget {
    pub const ALL: [ViewTarget; 13] = [
        ViewTarget::TotalMarketCap,
        ViewTarget::ActiveStocks,
        ViewTarget::TotalVolume,
        ViewTarget::LastUpdate,
        ViewTarget::GdpGrowth,
        ViewTarget::InflationRate,
        ViewTarget::ConsumerConfidence,
        ViewTarget::InterestRate,
        ViewTarget::TaxRate,
        ViewTarget::StockTable,
        ViewTarget::BusinessGrid,
        ViewTarget::TransactionList,
        ViewTarget::RefreshButton,
    ];

    /// Stable slot identifier
    pub fn id(&self) -> &'static str {
        match self {
            ViewTarget::TotalMarketCap => "total-market-cap",
            ViewTarget::ActiveStocks => "active-stocks",
            ViewTarget::TotalVolume => "total-volume",
            ViewTarget::LastUpdate => "last-update",
            ViewTarget::GdpGrowth => "gdp-growth",
            ViewTarget::InflationRate => "inflation-rate",
            ViewTarget::ConsumerConfidence => "consumer-confidence",
            ViewTarget::InterestRate => "interest-rate",
            ViewTarget::TaxRate => "tax-rate",
            ViewTarget::StockTable => "stock-table-body",
            ViewTarget::BusinessGrid => "business-grid",
            ViewTarget::TransactionList => "transaction-list",
            ViewTarget::RefreshButton => "refresh-btn",
        }
    }
}

impl std::fmt::Display for ViewTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// One row of the stock table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockRow {
    pub company: String,
    pub sector: String,
    pub price: String,
    pub change: String,
    pub change_class: ChangeClass,
    pub market_cap: String,
    pub available_shares: String,
    pub owner: String,
}

/// One card of the top businesses grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessCard {
    /// 1-based position
    pub rank: usize,
    /// Medal for the podium, `"<rank>."` otherwise
    pub badge: String,
    pub name: String,
    pub sector: String,
    pub profit: String,
    pub employees: String,
    pub price: String,
    pub owner: String,
}

/// One entry of the transaction feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub side: Side,
    /// e.g. "Bought 100 shares"
    pub headline: String,
    /// e.g. "TechCorp Industries @ $125/share by Alice Johnson"
    pub details: String,
    pub value: String,
    pub time_ago: String,
}

/// Rendered child of a list-like slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ViewNode {
    Row(StockRow),
    Card(BusinessCard),
    Feed(FeedItem),
}

/// Instruction to bring one slot up to date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ViewUpdate {
    SetText { target: ViewTarget, text: String },
    ReplaceChildren { target: ViewTarget, children: Vec<ViewNode> },
}

impl ViewUpdate {
    pub fn target(&self) -> ViewTarget {
        match self {
            ViewUpdate::SetText { target, .. } | ViewUpdate::ReplaceChildren { target, .. } => {
                *target
            }
        }
    }

    fn text(target: ViewTarget, text: impl Into<String>) -> Self {
        ViewUpdate::SetText {
            target,
            text: text.into(),
        }
    }
}

/// Overview fields: total market cap, active stocks, total volume, last update
pub fn render_market_overview(snapshot: &MarketSnapshot) -> Vec<ViewUpdate> {
    let summary = MarketSummary::from_snapshot(snapshot);

    vec![
        ViewUpdate::text(
            ViewTarget::TotalMarketCap,
            format_currency(summary.total_market_cap),
        ),
        ViewUpdate::text(
            ViewTarget::ActiveStocks,
            summary.active_instruments.to_string(),
        ),
        ViewUpdate::text(ViewTarget::TotalVolume, format_currency(summary.total_volume)),
        ViewUpdate::text(
            ViewTarget::LastUpdate,
            format_time_ago(snapshot.last_updated, snapshot.taken_at),
        ),
    ]
}

/// Macro indicator fields
pub fn render_economic_indicators(snapshot: &MarketSnapshot) -> Vec<ViewUpdate> {
    let indicators = &snapshot.indicators;

    vec![
        ViewUpdate::text(
            ViewTarget::GdpGrowth,
            format_percentage(indicators.growth_rate, true),
        ),
        ViewUpdate::text(
            ViewTarget::InflationRate,
            format_percentage(indicators.inflation_rate, true),
        ),
        ViewUpdate::text(
            ViewTarget::ConsumerConfidence,
            format_index(indicators.confidence_index, 100),
        ),
        ViewUpdate::text(
            ViewTarget::InterestRate,
            format_percentage(indicators.interest_rate, true),
        ),
        ViewUpdate::text(
            ViewTarget::TaxRate,
            format_percentage(indicators.tax_rate, true),
        ),
    ]
}

/// Stock table, one row per instrument in listing order
pub fn render_stock_table(snapshot: &MarketSnapshot) -> Vec<ViewUpdate> {
    let children = snapshot
        .instruments
        .iter()
        .map(|stock| {
            ViewNode::Row(StockRow {
                company: stock.name.clone(),
                sector: stock.sector.clone(),
                price: format_currency(stock.price),
                change: format_signed_currency(stock.change),
                change_class: stock.change_class(),
                market_cap: format_currency(stock.market_cap),
                available_shares: format_number(stock.available_shares as f64),
                owner: stock.owner.clone(),
            })
        })
        .collect();

    vec![ViewUpdate::ReplaceChildren {
        target: ViewTarget::StockTable,
        children,
    }]
}

/// Top `n` businesses by monthly profit
pub fn render_top_businesses(snapshot: &MarketSnapshot, n: usize) -> Vec<ViewUpdate> {
    let children = top_businesses(&snapshot.instruments, n)
        .into_iter()
        .enumerate()
        .map(|(index, business)| {
            let rank = index + 1;
            ViewNode::Card(BusinessCard {
                rank,
                badge: rank_badge(rank),
                name: business.name.clone(),
                sector: business.sector.clone(),
                profit: format_currency(business.profit),
                employees: business.employees.to_string(),
                price: format_currency(business.price),
                owner: business.owner.clone(),
            })
        })
        .collect();

    vec![ViewUpdate::ReplaceChildren {
        target: ViewTarget::BusinessGrid,
        children,
    }]
}

/// Latest `n` transactions, newest first
pub fn render_recent_transactions(snapshot: &MarketSnapshot, n: usize) -> Vec<ViewUpdate> {
    let children = recent_transactions(&snapshot.transactions, n)
        .iter()
        .map(|tx| {
            ViewNode::Feed(FeedItem {
                side: tx.side,
                headline: format!(
                    "{} {} shares",
                    tx.side.verb(),
                    format_number(tx.shares as f64)
                ),
                details: format!(
                    "{} @ {}/share by {}",
                    tx.instrument,
                    format_currency(tx.price),
                    tx.user
                ),
                value: format_currency(tx.value()),
                time_ago: format_time_ago(tx.created_at, snapshot.taken_at),
            })
        })
        .collect();

    vec![ViewUpdate::ReplaceChildren {
        target: ViewTarget::TransactionList,
        children,
    }]
}

/// Price-dependent views refreshed by the live price cycle
pub fn render_prices(snapshot: &MarketSnapshot) -> Vec<ViewUpdate> {
    let mut updates = render_stock_table(snapshot);
    updates.extend(render_market_overview(snapshot));
    updates
}

/// Every data view, in page order
pub fn render_all(snapshot: &MarketSnapshot, config: &DashboardConfig) -> Vec<ViewUpdate> {
    let mut updates = render_market_overview(snapshot);
    updates.extend(render_economic_indicators(snapshot));
    updates.extend(render_stock_table(snapshot));
    updates.extend(render_top_businesses(snapshot, config.top_businesses));
    updates.extend(render_recent_transactions(
        snapshot,
        config.recent_transactions,
    ));
    updates
}

/// Label of the manual refresh control
pub fn render_refresh_control(in_progress: bool) -> ViewUpdate {
    let label = if in_progress {
        "🔄 Refreshing..."
    } else {
        "🔄 Refresh"
    };
    ViewUpdate::text(ViewTarget::RefreshButton, label)
}

fn rank_badge(rank: usize) -> String {
    match rank {
        1..=3 => MEDALS[rank - 1].to_string(),
        _ => format!("{}.", rank),
    }
}
