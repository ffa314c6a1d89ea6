// Calendar periods and the YoY/MoM arithmetic shared by every report.
use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Mars",
    "April",
    "Maj",
    "Juni",
    "Juli",
    "Augusti",
    "September",
    "Oktober",
    "November",
    "December",
];

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Maj", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dec",
];

/// A (year, month) pair used to slice records. Ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(DashboardError::InvalidPeriod { year, month });
        }
        Ok(Self { year, month })
    }

    /// Split a combined `YYYYMM` integer. Returns `None` when the month part is out of range.
    pub fn from_year_month(value: i64) -> Option<Self> {
        let year = i32::try_from(value / 100).ok()?;
        let month = u32::try_from(value % 100).ok()?;
        Self::new(year, month).ok()
    }

    /// Same month one year earlier.
    pub fn yoy(self) -> Self {
        Self {
            year: self.year - 1,
            month: self.month,
        }
    }

    /// Immediately preceding calendar month; January wraps to December of the previous year.
    pub fn mom(self) -> Self {
        if self.month <= 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Full Swedish month name, or `"?"` for a month outside 1..=12.
    pub fn month_name(self) -> &'static str {
        self.lookup(&MONTH_NAMES)
    }

    pub fn month_abbreviation(self) -> &'static str {
        self.lookup(&MONTH_ABBREVIATIONS)
    }

    fn lookup(self, table: &[&'static str; 12]) -> &'static str {
        self.month
            .checked_sub(1)
            .and_then(|i| table.get(i as usize))
            .copied()
            .unwrap_or("?")
    }

    /// Short label such as `Okt 2024`, used in "vs ..." comparison lines.
    pub fn short_label(self) -> String {
        format!("{} {}", self.month_abbreviation(), self.year)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

/// Anything that belongs to exactly one period.
pub trait Periodic {
    fn period(&self) -> Period;
}

/// Select the rows of `data` that fall in `period`.
pub fn filter_period<R: Periodic + Clone>(data: &[R], period: Period) -> Vec<R> {
    data.iter().filter(|r| r.period() == period).cloned().collect()
}

/// The three row sets every comparison works on.
#[derive(Debug, Clone)]
pub struct PeriodSlices<R> {
    pub current: Vec<R>,
    pub yoy: Vec<R>,
    pub mom: Vec<R>,
}

impl<R: Periodic + Clone> PeriodSlices<R> {
    pub fn select(data: &[R], period: Period) -> Self {
        Self {
            current: filter_period(data, period),
            yoy: filter_period(data, period.yoy()),
            mom: filter_period(data, period.mom()),
        }
    }

    /// Keep only rows accepted by `keep`, in all three slices.
    pub fn retain<F>(&self, keep: F) -> Self
    where
        F: Fn(&R) -> bool,
    {
        let pick = |rows: &[R]| rows.iter().filter(|r| keep(r)).cloned().collect::<Vec<_>>();
        Self {
            current: pick(&self.current),
            yoy: pick(&self.yoy),
            mom: pick(&self.mom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Row(Period);

    impl Periodic for Row {
        fn period(&self) -> Period {
            self.0
        }
    }

    #[test]
    fn splits_combined_year_month() {
        assert_eq!(Period::from_year_month(202510), Some(Period { year: 2025, month: 10 }));
        assert_eq!(Period::from_year_month(202513), None);
        assert_eq!(Period::from_year_month(202500), None);
    }

    #[test]
    fn mom_wraps_january() {
        let jan = Period::new(2025, 1).unwrap();
        assert_eq!(jan.mom(), Period { year: 2024, month: 12 });
        assert_eq!(jan.yoy(), Period { year: 2024, month: 1 });
        let oct = Period::new(2025, 10).unwrap();
        assert_eq!(oct.mom(), Period { year: 2025, month: 9 });
    }

    #[test]
    fn rejects_out_of_range_month() {
        assert!(Period::new(2025, 0).is_err());
        assert!(Period::new(2025, 13).is_err());
    }

    #[test]
    fn labels() {
        let p = Period::new(2024, 10).unwrap();
        assert_eq!(p.to_string(), "Oktober 2024");
        assert_eq!(p.short_label(), "Okt 2024");
    }

    #[test]
    fn unchecked_months_do_not_panic() {
        let zero = Period { year: 2025, month: 0 };
        assert_eq!(zero.month_name(), "?");
        assert_eq!(zero.short_label(), "? 2025");
        assert_eq!(zero.mom(), Period { year: 2024, month: 12 });
        let thirteen = Period { year: 2025, month: 13 };
        assert_eq!(thirteen.to_string(), "? 2025");
    }

    #[test]
    fn selects_three_slices() {
        let oct25 = Period::new(2025, 10).unwrap();
        let rows = vec![
            Row(oct25),
            Row(oct25),
            Row(oct25.yoy()),
            Row(oct25.mom()),
            Row(Period::new(2023, 10).unwrap()),
        ];
        let slices = PeriodSlices::select(&rows, oct25);
        assert_eq!(slices.current.len(), 2);
        assert_eq!(slices.yoy.len(), 1);
        assert_eq!(slices.mom.len(), 1);
    }
}
