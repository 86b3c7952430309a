//! Data preparation and metrics behind the India EV market dashboard.
//!
//! Three CSV files (sales by maker/category/year, registrations by date and
//! vehicle class, maker locations) are loaded once, reshaped into long form,
//! cleaned, and then filtered and summarised per user selection.

pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod output;
pub mod registration;
pub mod reports;
pub mod reshape;
pub mod types;
pub mod util;

pub use cache::{DatasetCache, PreparedData};
pub use config::DashboardConfig;
pub use error::{ConfigError, DashboardError, DataLoadError, SchemaError};
pub use filter::{FilterSpec, FilteredData, YearRange};
pub use reports::{build_dashboard, Dashboard, ViewOptions};
