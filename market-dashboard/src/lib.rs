/// Market Dashboard - Shared Library
///
/// This library backs the `market-dashboard` terminal binary:
/// - an in-memory market store that a simulated feed jitters and trades against
/// - pure formatting, aggregation and rendering of that state into view updates
/// - a controller that runs the manual refresh and the periodic refresh cycles
///
/// Views are produced as data ([`ViewUpdate`]) and applied to a [`RenderSurface`];
/// the terminal front end draws the resulting [`ViewBoard`] with ratatui.
pub mod shared;

// Re-export commonly used types for convenience
pub use shared::types::{ChangeClass, IndicatorSet, Instrument, Side, Transaction};

pub use shared::config::DashboardConfig;
pub use shared::error::DashboardError;
pub use shared::store::{MarketSnapshot, MarketStore};

pub use shared::aggregation::{
    active_instruments, recent_transactions, top_businesses, total_market_cap, total_volume,
    MarketSummary,
};
pub use shared::format::{
    format_currency, format_index, format_number, format_percentage, format_signed_currency,
    format_time_ago,
};
pub use shared::presenter::{ViewNode, ViewTarget, ViewUpdate};

// Rendering and orchestration
pub use shared::scheduler::{
    Controller, Cycle, CycleHandle, CycleHandles, RefreshOutcome, RefreshTrigger,
};
pub use shared::surface::{apply_updates, RenderSurface, SlotContent, ViewBoard};
pub use shared::widget::render_dashboard;
