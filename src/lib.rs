//! Period-over-period KPI dashboards from sales and customer CSV extracts.
//!
//! The pipeline is: [`loader`] reads and cleans the CSVs into typed records,
//! [`period`] slices them into current/YoY/MoM sets, [`kpi`] and
//! [`dimension`] aggregate and compare, and [`reports`] renders the results
//! through [`html`] into self-contained pages written by [`output`].
pub mod assets;
pub mod config;
pub mod dimension;
pub mod error;
pub mod html;
pub mod kpi;
pub mod loader;
pub mod output;
pub mod period;
pub mod reports;
pub mod types;
pub mod util;

pub use config::DashboardConfig;
pub use error::{DashboardError, Result};
pub use period::Period;
