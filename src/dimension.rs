//! Per-dimension breakdowns comparing a period against its YoY and MoM periods.
//!
//! All breakdowns go through [`DimensionAnalysis`]: pick a dimension and the
//! measures to sum, optionally exclude some dimension values, cap the result
//! and choose an ordering, then run it on three row sets.
use crate::kpi::percent_change;
use crate::period::PeriodSlices;
use crate::types::{Dimension, Measure, Record};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

/// Ordering applied before truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Largest current-period primary measure first.
    #[default]
    PrimaryDescending,
    /// Ordinal range buckets such as `"1 - 49 tkr"`, by their numeric lower bound.
    RangeLowerBound,
}

/// Sort key for range-bucket labels.
///
/// `"< 1 tkr"` sorts first, `"> 100000 tkr"` after every numbered bucket and
/// labels without a leading number last.
pub fn range_lower_bound(label: &str) -> u64 {
    let label = label.trim();
    if label.starts_with('<') {
        return 0;
    }
    if label.starts_with('>') {
        return 99_999_999;
    }
    let digits: String = label
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '\u{a0}'))
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(999_999_999)
}

/// One measure of one group in the three periods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureComparison {
    pub measure: Measure,
    pub current: f64,
    pub yoy: f64,
    pub mom: f64,
}

impl MeasureComparison {
    pub fn yoy_delta(&self) -> f64 {
        self.current - self.yoy
    }

    pub fn mom_delta(&self) -> f64 {
        self.current - self.mom
    }

    pub fn yoy_pct(&self) -> f64 {
        percent_change(self.current, self.yoy)
    }

    pub fn mom_pct(&self) -> f64 {
        percent_change(self.current, self.mom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub key: String,
    /// Same order as the analysis measures; the first one is the primary.
    pub values: Vec<MeasureComparison>,
}

impl BreakdownRow {
    pub fn primary(&self) -> &MeasureComparison {
        &self.values[0]
    }

    pub fn get(&self, measure: Measure) -> Option<&MeasureComparison> {
        self.values.iter().find(|v| v.measure == measure)
    }
}

/// Result of a breakdown. `rows` holds at most `top_n` groups.
///
/// Current-period totals of the groups cut by the cap are kept in `remainder`
/// and those of excluded rows in `excluded`, both indexed like `measures`, so
/// `rows + remainder + excluded` adds up to the whole current period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub dimension: Dimension,
    pub measures: Vec<Measure>,
    pub rows: Vec<BreakdownRow>,
    pub total_groups: usize,
    pub remainder: Vec<f64>,
    pub excluded: Vec<f64>,
}

impl Breakdown {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct DimensionAnalysis {
    dimension: Dimension,
    measures: Vec<Measure>,
    exclude: HashSet<String>,
    top_n: usize,
    order: SortOrder,
}

#[derive(Clone)]
struct GroupAcc {
    current: Vec<f64>,
    yoy: Vec<f64>,
    mom: Vec<f64>,
}

#[derive(Clone, Copy)]
enum Side {
    Current,
    Yoy,
    Mom,
}

impl DimensionAnalysis {
    /// Group by `dimension`, summing `primary` (also the default sort measure).
    pub fn new(dimension: Dimension, primary: Measure) -> Self {
        Self {
            dimension,
            measures: vec![primary],
            exclude: HashSet::new(),
            top_n: usize::MAX,
            order: SortOrder::default(),
        }
    }

    /// Sum an additional measure alongside the primary one.
    pub fn with_measure(mut self, measure: Measure) -> Self {
        if !self.measures.contains(&measure) {
            self.measures.push(measure);
        }
        self
    }

    /// Drop rows whose dimension value is one of `values`, in all three periods.
    pub fn excluding<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn top(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }

    pub fn sorted_by(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn run_slices<R: Record>(&self, slices: &PeriodSlices<R>) -> Breakdown {
        self.run(&slices.current, &slices.yoy, &slices.mom)
    }

    pub fn run<R: Record>(&self, current: &[R], yoy: &[R], mom: &[R]) -> Breakdown {
        let width = self.measures.len();
        let zero = GroupAcc {
            current: vec![0.0; width],
            yoy: vec![0.0; width],
            mom: vec![0.0; width],
        };
        let mut excluded = vec![0.0; width];
        let mut groups: BTreeMap<String, GroupAcc> = BTreeMap::new();

        for (rows, side) in [(current, Side::Current), (yoy, Side::Yoy), (mom, Side::Mom)] {
            for r in rows {
                let key = match r.dimension(self.dimension) {
                    Some(k) if !self.exclude.contains(k) => k,
                    _ => {
                        if let Side::Current = side {
                            for (slot, m) in excluded.iter_mut().zip(&self.measures) {
                                *slot += r.measure(*m);
                            }
                        }
                        continue;
                    }
                };
                let acc = groups
                    .entry(key.to_string())
                    .or_insert_with(|| zero.clone());
                let target = match side {
                    Side::Current => &mut acc.current,
                    Side::Yoy => &mut acc.yoy,
                    Side::Mom => &mut acc.mom,
                };
                for (slot, m) in target.iter_mut().zip(&self.measures) {
                    *slot += r.measure(*m);
                }
            }
        }

        let mut rows: Vec<BreakdownRow> = groups
            .into_iter()
            .map(|(key, acc)| BreakdownRow {
                key,
                values: self
                    .measures
                    .iter()
                    .enumerate()
                    .map(|(i, m)| MeasureComparison {
                        measure: *m,
                        current: acc.current[i],
                        yoy: acc.yoy[i],
                        mom: acc.mom[i],
                    })
                    .collect(),
            })
            .collect();

        // Both sorts are stable, so ties keep key order.
        match self.order {
            SortOrder::PrimaryDescending => rows.sort_by(|a, b| {
                b.primary()
                    .current
                    .partial_cmp(&a.primary().current)
                    .unwrap_or(Ordering::Equal)
            }),
            SortOrder::RangeLowerBound => rows.sort_by_key(|r| range_lower_bound(&r.key)),
        }

        let total_groups = rows.len();
        let mut remainder = vec![0.0; width];
        if rows.len() > self.top_n {
            for row in rows.drain(self.top_n..) {
                for (slot, v) in remainder.iter_mut().zip(&row.values) {
                    *slot += v.current;
                }
            }
        }

        Breakdown {
            dimension: self.dimension,
            measures: self.measures.clone(),
            rows,
            total_groups,
            remainder,
            excluded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::{Period, Periodic};

    #[derive(Clone)]
    struct Row {
        group: Option<&'static str>,
        orders: f64,
        value: f64,
    }

    impl Periodic for Row {
        fn period(&self) -> Period {
            Period { year: 2025, month: 10 }
        }
    }

    impl Record for Row {
        fn dimension(&self, _dim: Dimension) -> Option<&str> {
            self.group
        }

        fn measure(&self, measure: Measure) -> f64 {
            match measure {
                Measure::OrderValue => self.value,
                Measure::OrderCount => self.orders,
                _ => 0.0,
            }
        }
    }

    fn row(group: &'static str, orders: f64, value: f64) -> Row {
        Row {
            group: Some(group),
            orders,
            value,
        }
    }

    fn analysis() -> DimensionAnalysis {
        DimensionAnalysis::new(Dimension::SalesChannel, Measure::OrderValue)
            .with_measure(Measure::OrderCount)
    }

    #[test]
    fn outer_join_fills_missing_sides_with_zero() {
        let current = vec![row("web", 10.0, 1000.0), row("shop", 5.0, 500.0)];
        let yoy = vec![row("shop", 4.0, 400.0), row("phone", 2.0, 200.0)];
        let mom = vec![row("web", 20.0, 2000.0)];
        let b = analysis().run(&current, &yoy, &mom);

        let keys: Vec<&str> = b.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["web", "shop", "phone"]);

        let web = b.rows[0].primary();
        assert_eq!(web.yoy, 0.0);
        assert_eq!(web.yoy_pct(), 100.0);
        assert_eq!(web.mom_pct(), -50.0);

        let phone = b.rows[2].get(Measure::OrderCount).unwrap();
        assert_eq!(phone.current, 0.0);
        assert_eq!(phone.yoy_delta(), -2.0);
        assert_eq!(phone.yoy_pct(), -100.0);
        assert_eq!(phone.mom_pct(), 0.0);
    }

    #[test]
    fn exclusion_applies_to_every_period() {
        let current = vec![row("web", 1.0, 100.0), row("Kod saknas", 3.0, 300.0)];
        let yoy = vec![row("Kod saknas", 9.0, 900.0)];
        let mom = vec![row("Kod saknas", 9.0, 900.0), row("web", 1.0, 50.0)];
        let b = analysis().excluding(["Kod saknas"]).run(&current, &yoy, &mom);

        assert_eq!(b.rows.len(), 1);
        assert_eq!(b.rows[0].key, "web");
        assert_eq!(b.excluded, vec![300.0, 3.0]);
    }

    #[test]
    fn excluded_only_in_comparison_never_appears() {
        let current = vec![row("web", 1.0, 100.0)];
        let yoy = vec![row("-", 5.0, 500.0)];
        let b = analysis().excluding(["-"]).run(&current, &yoy, &[]);
        assert!(b.rows.iter().all(|r| r.key != "-"));
        assert_eq!(b.total_groups, 1);
    }

    #[test]
    fn truncation_conserves_totals() {
        let current = vec![
            row("a", 1.0, 10.0),
            row("b", 2.0, 20.0),
            row("c", 3.0, 30.0),
            row("d", 4.0, 40.0),
            Row {
                group: None,
                orders: 5.0,
                value: 50.0,
            },
        ];
        let b = analysis().top(2).run(&current, &[], &[]);

        assert_eq!(b.total_groups, 4);
        let keys: Vec<&str> = b.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["d", "c"]);

        let shown: f64 = b.rows.iter().map(|r| r.primary().current).sum();
        let total: f64 = current.iter().map(|r| r.value).sum();
        assert_eq!(shown + b.remainder[0] + b.excluded[0], total);
        assert_eq!(b.remainder, vec![30.0, 3.0]);
    }

    #[test]
    fn fewer_groups_than_cap() {
        let b = analysis().top(10).run(&[row("a", 1.0, 1.0)], &[], &[]);
        assert_eq!(b.rows.len(), 1);
        assert_eq!(b.remainder, vec![0.0, 0.0]);
    }

    #[test]
    fn ties_are_kept_in_key_order() {
        let current = vec![row("b", 1.0, 10.0), row("a", 1.0, 10.0), row("c", 1.0, 10.0)];
        let first = analysis().run(&current, &[], &[]);
        let reversed: Vec<Row> = current.iter().rev().cloned().collect();
        let second = analysis().run(&reversed, &[], &[]);
        let keys: Vec<&str> = first.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(first, second);
    }

    #[test]
    fn range_buckets_sort_numerically() {
        let current = vec![
            row("1000 - 2499 tkr", 1.0, 1.0),
            row("> 100 000 tkr", 1.0, 1.0),
            row("1 - 49 tkr", 9.0, 9.0),
            row("Ej angivet", 1.0, 1.0),
            row("< 1 tkr", 1.0, 1.0),
            row("250 - 499 tkr", 5.0, 5.0),
        ];
        let b = analysis()
            .sorted_by(SortOrder::RangeLowerBound)
            .run(&current, &[], &[]);
        let keys: Vec<&str> = b.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "< 1 tkr",
                "1 - 49 tkr",
                "250 - 499 tkr",
                "1000 - 2499 tkr",
                "> 100 000 tkr",
                "Ej angivet",
            ]
        );
    }

    #[test]
    fn range_lower_bound_parsing() {
        assert_eq!(range_lower_bound("< 1 tkr"), 0);
        assert_eq!(range_lower_bound("> 50 000 tkr"), 99_999_999);
        assert_eq!(range_lower_bound("1 000 - 2 499 tkr"), 1000);
        assert_eq!(range_lower_bound("10,000 - 49,999"), 10_000);
        assert_eq!(range_lower_bound("okänt"), 999_999_999);
    }
}
