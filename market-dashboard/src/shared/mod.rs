/// Shared modules for the market dashboard
pub mod aggregation;
pub mod config;
pub mod error;
pub mod format;
pub mod presenter;
pub mod scheduler;
pub mod store;
pub mod surface;
pub mod types;
pub mod widget;
