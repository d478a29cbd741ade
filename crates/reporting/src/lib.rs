//! Influencer ROI reporting — loads the four campaign tables, joins them,
//! applies dashboard filters, and derives ROAS leaderboards and KPIs.

pub mod export;
pub mod filter;
pub mod loader;
pub mod merge;
pub mod metrics;
pub mod pipeline;

pub use filter::{FilterOptions, FilterSpec};
pub use loader::load_tables;
pub use merge::merge_tables;
pub use metrics::ScoredRecord;
pub use pipeline::{DashboardReport, Pipeline};
