//! Dashboard module
//!
//! Shows the expenses and totals for a month or a custom date range, along
//! with a per-day breakdown.

mod handlers;
mod range;
mod summary;
mod tables;

pub use handlers::{get_dashboard_page, get_monthly_page};
