//! Run configuration.
//!
//! Everything the dashboards need from the outside world lives here: input
//! and output paths, the password-gate string and the period window. Every
//! key is optional in the JSON file; missing keys take the defaults below.
use crate::error::{DashboardError, Result};
use crate::loader::StockSource;
use crate::period::Period;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub sales_csv: PathBuf,
    pub new_customers_csv: PathBuf,
    pub stock_csv: Vec<StockSource>,
    pub targets_csv: Option<PathBuf>,
    pub sales_html: PathBuf,
    pub customer_flow_html: PathBuf,
    pub analysis_json: Option<PathBuf>,
    pub gate_secret: String,
    pub brand: String,
    pub period: Period,
    pub first_month: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            sales_csv: PathBuf::from("sales.csv"),
            new_customers_csv: PathBuf::from("new_customers.csv"),
            stock_csv: vec![
                StockSource {
                    year: 2024,
                    path: PathBuf::from("customer_stock_2024.csv"),
                },
                StockSource {
                    year: 2025,
                    path: PathBuf::from("customer_stock_2025.csv"),
                },
            ],
            targets_csv: Some(PathBuf::from("customer_targets.csv")),
            sales_html: PathBuf::from("sales_dashboard.html"),
            customer_flow_html: PathBuf::from("customer_flow_dashboard.html"),
            analysis_json: None,
            gate_secret: "changeme".to_string(),
            brand: "Fortnox".to_string(),
            period: Period {
                year: 2025,
                month: 10,
            },
            first_month: 1,
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file, or use the defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => {
                let text = std::fs::read_to_string(p).map_err(|source| DashboardError::Read {
                    path: p.to_path_buf(),
                    source,
                })?;
                debug!(path = %p.display(), "read configuration");
                serde_json::from_str(&text)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        Period::new(self.period.year, self.period.month)?;
        if !(1..=self.period.month).contains(&self.first_month) {
            return Err(DashboardError::Config(format!(
                "first_month must be between 1 and {}, got {}",
                self.period.month, self.first_month
            )));
        }
        if self.gate_secret.is_empty() {
            return Err(DashboardError::Config("gate_secret must not be empty".into()));
        }
        if self.stock_csv.is_empty() {
            return Err(DashboardError::Config("stock_csv lists no files".into()));
        }
        Ok(())
    }

    /// Make every relative path relative to `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.sales_csv);
        join(&mut self.new_customers_csv);
        for s in &mut self.stock_csv {
            join(&mut s.path);
        }
        if let Some(p) = self.targets_csv.as_mut() {
            join(p);
        }
        join(&mut self.sales_html);
        join(&mut self.customer_flow_html);
        if let Some(p) = self.analysis_json.as_mut() {
            join(p);
        }
        self
    }

    /// Months shown in the customer-flow dashboard, oldest first.
    pub fn flow_months(&self) -> Vec<Period> {
        (self.first_month..=self.period.month)
            .map(|month| Period {
                year: self.period.year,
                month,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{ "gate_secret": "s3cret", "period": { "year": 2026, "month": 3 } }"#)
                .unwrap();
        assert_eq!(config.gate_secret, "s3cret");
        assert_eq!(config.period, Period { year: 2026, month: 3 });
        assert_eq!(config.sales_csv, PathBuf::from("sales.csv"));
        assert!(config.validate().is_ok());
        assert_eq!(config.flow_months().len(), 3);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed: std::result::Result<DashboardConfig, _> =
            serde_json::from_str(r#"{ "password": "x" }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn validation() {
        let mut config = DashboardConfig::default();
        config.period.month = 13;
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.first_month = 11;
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.gate_secret.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let mut config = DashboardConfig::default();
        config.sales_html = PathBuf::from("/tmp/out.html");
        let config = config.resolve_paths(Path::new("/data"));
        assert_eq!(config.sales_csv, PathBuf::from("/data/sales.csv"));
        assert_eq!(config.stock_csv[0].path, PathBuf::from("/data/customer_stock_2024.csv"));
        assert_eq!(config.sales_html, PathBuf::from("/tmp/out.html"));
    }
}
