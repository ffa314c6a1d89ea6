use crate::error::{DashboardError, Result};
use crate::kpi::discount_pct;
use crate::period::Period;
use crate::types::{
    Channel, ChannelFilter, MonthlyTarget, NewCustomerRecord, RawNewCustomerRow, RawSalesRow,
    RawStockRow, RawTargetRow, SalesRecord, StockRecord,
};
use crate::util::{clean_label, parse_count, parse_measure, parse_year_month};
use csv::{Reader, ReaderBuilder, Trim};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Month names as written in the target sheet.
static TARGET_MONTHS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    HashMap::from([
        ("jan", 1),
        ("feb", 2),
        ("mars", 3),
        ("apr", 4),
        ("maj", 5),
        ("juni", 6),
        ("juli", 7),
        ("aug", 8),
        ("sep", 9),
        ("okt", 10),
        ("nov", 11),
        ("dec", 12),
    ])
});

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    /// Rows dropped because they could not be read or had no usable period.
    pub skipped_rows: usize,
    /// Non-empty numeric cells that could not be parsed and were read as zero.
    pub coerced_cells: usize,
}

impl LoadReport {
    fn merge(&mut self, other: &LoadReport) {
        self.total_rows += other.total_rows;
        self.loaded_rows += other.loaded_rows;
        self.skipped_rows += other.skipped_rows;
        self.coerced_cells += other.coerced_cells;
    }

    fn log(&self, path: &Path) {
        info!(
            path = %path.display(),
            rows = self.total_rows,
            loaded = self.loaded_rows,
            "loaded CSV"
        );
        if self.skipped_rows > 0 {
            warn!(path = %path.display(), skipped = self.skipped_rows, "rows skipped");
        }
        if self.coerced_cells > 0 {
            warn!(
                path = %path.display(),
                cells = self.coerced_cells,
                "unparseable numeric cells read as zero"
            );
        }
    }
}

/// One customer-stock extract and the year it describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSource {
    pub year: i32,
    pub path: PathBuf,
}

/// Open `path` and check that every column in `required` is present.
fn open_checked(path: &Path, required: &[&str]) -> Result<Reader<File>> {
    let file = File::open(path).map_err(|source| DashboardError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(file);
    let headers = rdr.headers().map_err(|source| csv_error(path, source))?;
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(DashboardError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }
    Ok(rdr)
}

fn csv_error(path: &Path, source: csv::Error) -> DashboardError {
    DashboardError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// Deserialize every row, counting rows that fail instead of aborting.
fn read_rows<T: DeserializeOwned>(
    path: &Path,
    required: &[&str],
    report: &mut LoadReport,
) -> Result<Vec<T>> {
    let mut rdr = open_checked(path, required)?;
    let mut rows = Vec::new();
    for (idx, result) in rdr.deserialize::<T>().enumerate() {
        report.total_rows += 1;
        match result {
            Ok(r) => rows.push(r),
            Err(e) => {
                debug!(path = %path.display(), row = idx + 1, error = %e, "unreadable row");
                report.skipped_rows += 1;
            }
        }
    }
    Ok(rows)
}

/// Numeric cell as a measure: empty is zero, garbage is zero and counted.
fn measure_or_zero(cell: Option<&str>, report: &mut LoadReport) -> f64 {
    match parse_measure(cell) {
        Some(v) => v,
        None => {
            if cell.is_some_and(|c| !c.trim().is_empty()) {
                report.coerced_cells += 1;
            }
            0.0
        }
    }
}

pub fn load_sales(path: &Path) -> Result<(Vec<SalesRecord>, LoadReport)> {
    let mut report = LoadReport::default();
    let raw: Vec<RawSalesRow> = read_rows(path, RawSalesRow::REQUIRED_COLUMNS, &mut report)?;
    let mut data = Vec::with_capacity(raw.len());

    for row in raw {
        let Some(period) = parse_year_month(row.year_month.as_deref()) else {
            report.skipped_rows += 1;
            continue;
        };
        let order_count = measure_or_zero(row.order_count.as_deref(), &mut report);
        let sales = measure_or_zero(row.sales.as_deref(), &mut report);
        let discount = measure_or_zero(row.discount.as_deref(), &mut report);
        let order_value = sales + discount;

        data.push(SalesRecord {
            period,
            order_count,
            sales,
            discount,
            order_value,
            discount_pct: discount_pct(discount, order_value),
            campaign_code: clean_label(row.campaign_code),
            sales_channel: clean_label(row.sales_channel),
            employees: clean_label(row.employees),
            contract_period: clean_label(row.contract_period),
            company_form: clean_label(row.company_form),
            customer_type: clean_label(row.customer_type),
            sni: clean_label(row.sni),
        });
    }

    report.loaded_rows = data.len();
    report.log(path);
    Ok((data, report))
}

pub fn load_new_customers(path: &Path) -> Result<(Vec<NewCustomerRecord>, LoadReport)> {
    let mut report = LoadReport::default();
    let raw: Vec<RawNewCustomerRow> =
        read_rows(path, RawNewCustomerRow::REQUIRED_COLUMNS, &mut report)?;
    let mut data = Vec::with_capacity(raw.len());

    for row in raw {
        let Some(period) = parse_year_month(row.year_month.as_deref()) else {
            report.skipped_rows += 1;
            continue;
        };
        data.push(NewCustomerRecord {
            period,
            new_customers: measure_or_zero(row.new_customers.as_deref(), &mut report).trunc(),
            channel: Channel::categorize(row.acquired_via.as_deref()),
            customer_type: clean_label(row.customer_type),
            employees: clean_label(row.employees),
            sni: clean_label(row.sni),
            company_form: clean_label(row.company_form),
            turnover_range: clean_label(row.turnover_range),
        });
    }

    report.loaded_rows = data.len();
    report.log(path);
    Ok((data, report))
}

/// Load and concatenate the per-year stock extracts. The year of each row is
/// the year of its source; only the month is taken from `ÅrMånad`.
pub fn load_customer_stock(sources: &[StockSource]) -> Result<(Vec<StockRecord>, LoadReport)> {
    let mut total = LoadReport::default();
    let mut data = Vec::new();

    for source in sources {
        let mut report = LoadReport::default();
        let raw: Vec<RawStockRow> =
            read_rows(&source.path, RawStockRow::REQUIRED_COLUMNS, &mut report)?;
        let before = data.len();
        for row in raw {
            let period = parse_year_month(row.year_month.as_deref())
                .and_then(|p| Period::new(source.year, p.month).ok());
            let Some(period) = period else {
                report.skipped_rows += 1;
                continue;
            };
            data.push(StockRecord {
                period,
                customers: measure_or_zero(row.customers.as_deref(), &mut report).trunc(),
                customer_type: clean_label(row.customer_type),
                employees: clean_label(row.employees),
                sni: clean_label(row.sni),
                company_form: clean_label(row.company_form),
                turnover_range: clean_label(row.turnover_range),
            });
        }
        report.loaded_rows = data.len() - before;
        report.log(&source.path);
        total.merge(&report);
    }

    Ok((data, total))
}

/// Load the monthly target sheet in long form: one target per month and
/// channel selection, with the `Totalt` column as the target for all channels.
pub fn load_targets(path: &Path) -> Result<Vec<MonthlyTarget>> {
    let mut report = LoadReport::default();
    let raw: Vec<RawTargetRow> = read_rows(path, RawTargetRow::REQUIRED_COLUMNS, &mut report)?;
    let mut targets = Vec::with_capacity(raw.len() * 6);

    for row in raw {
        let month = row
            .month
            .as_deref()
            .map(|m| m.trim().to_lowercase())
            .and_then(|m| TARGET_MONTHS.get(m.as_str()).copied());
        let Some(month) = month else {
            report.skipped_rows += 1;
            continue;
        };
        let cells = [
            (ChannelFilter::Only(Channel::Bureau), &row.bureau),
            (ChannelFilter::Only(Channel::Winback), &row.winback),
            (ChannelFilter::Only(Channel::SalesRep), &row.sales_reps),
            (ChannelFilter::Only(Channel::Web), &row.web),
            (ChannelFilter::Only(Channel::Other), &row.other),
            (ChannelFilter::All, &row.total),
        ];
        for (channel, cell) in cells {
            let target = parse_count(cell.as_deref()).unwrap_or(0.0).trunc();
            targets.push(MonthlyTarget {
                month,
                channel,
                target,
            });
        }
        report.loaded_rows += 1;
    }

    report.log(path);
    Ok(targets)
}

/// Target for `month` and `channel`, if one was set.
pub fn find_target(targets: &[MonthlyTarget], month: u32, channel: ChannelFilter) -> Option<f64> {
    targets
        .iter()
        .find(|t| t.month == month && t.channel == channel)
        .map(|t| t.target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn cleans_sales_numbers_and_derives_columns() {
        let f = csv_file(
            "ÅrMånad,Antal försäljningsordrar,Försäljning,Rabattvärde,KampanjKod,SäljKanal,Antal anställda,Avtalsperiod,Bolagsform,Kundtyp,SNI\n\
             202510,\"1 200\",\"9\u{a0}000\",1000,K1,Web, 1-4 ,12,AB,Ny,62\n\
             202510,x,abc,,K2,,,,,,\n\
             bad,1,1,1,K3,Web,,,,,\n",
        );
        let (data, report) = load_sales(f.path()).unwrap();

        assert_eq!(report.total_rows, 3);
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(report.skipped_rows, 1);
        assert_eq!(report.coerced_cells, 2);

        let first = &data[0];
        assert_eq!(first.period, Period { year: 2025, month: 10 });
        assert_eq!(first.order_count, 1200.0);
        assert_eq!(first.sales, 9000.0);
        assert_eq!(first.order_value, 10000.0);
        assert!((first.discount_pct - 10.0).abs() < 1e-9);
        assert_eq!(first.employees.as_deref(), Some("1-4"));

        let second = &data[1];
        assert_eq!(second.order_value, 0.0);
        assert_eq!(second.discount_pct, 0.0);
        assert_eq!(second.sales_channel, None);
    }

    #[test]
    fn missing_column_is_an_error() {
        let f = csv_file("ÅrMånad,Försäljning\n202510,1\n");
        let err = load_sales(f.path()).unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn { ref column, .. } if column == "Antal försäljningsordrar"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_sales(Path::new("/nonexistent/sales.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::Read { .. }));
    }

    #[test]
    fn stock_year_comes_from_source() {
        let a = csv_file("ÅrMånad,Antal kunder,KundTyp\n202410,100,Ny\n202411,50,Ny\n");
        let b = csv_file("ÅrMånad,Antal kunder,KundTyp\n10,120,Ny\n");
        let sources = vec![
            StockSource {
                year: 2024,
                path: a.path().to_path_buf(),
            },
            StockSource {
                year: 2025,
                path: b.path().to_path_buf(),
            },
        ];
        let (data, report) = load_customer_stock(&sources).unwrap();
        assert_eq!(report.loaded_rows, 3);
        assert_eq!(data[0].period, Period { year: 2024, month: 10 });
        assert_eq!(data[2].period, Period { year: 2025, month: 10 });
        assert_eq!(data[2].customers, 120.0);
    }

    #[test]
    fn targets_are_reshaped_per_channel() {
        let f = csv_file(
            "Månad,Byrå,Winback,säljare,fortnox.se,Cling/Boardeaser/Okänt,Totalt\n\
             Okt,\"1,200\",10,20,30,5,\"1\u{a0}265\"\n\
             Mars,1,1,1,1,1,5\n\
             Okänd,1,1,1,1,1,1\n",
        );
        let targets = load_targets(f.path()).unwrap();
        assert_eq!(targets.len(), 12);
        assert_eq!(
            find_target(&targets, 10, ChannelFilter::Only(Channel::Bureau)),
            Some(1200.0)
        );
        assert_eq!(find_target(&targets, 10, ChannelFilter::All), Some(1265.0));
        assert_eq!(find_target(&targets, 3, ChannelFilter::All), Some(5.0));
        assert_eq!(find_target(&targets, 4, ChannelFilter::All), None);
    }
}
