//! KPI snapshots for a period and period-over-period comparison.
//!
//! A snapshot is a set of summed metrics for one slice of records. Two
//! snapshots are compared metric by metric: additive metrics get a
//! percentage change, ratio metrics a percentage-point difference.
use crate::types::{Measure, NewCustomerRecord, Record, SalesRecord, StockRecord};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Metric {
    OrderValue,
    Sales,
    Discount,
    OrderCount,
    DiscountPct,
    NewCustomers,
    CustomerStock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Sums and counts. Compared with percentage change.
    Additive,
    /// Already a percentage. Compared with a point difference.
    Ratio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

impl Polarity {
    pub fn judge(self, delta: f64) -> Verdict {
        if delta == 0.0 {
            return Verdict::Unchanged;
        }
        let improved = match self {
            Polarity::HigherIsBetter => delta > 0.0,
            Polarity::LowerIsBetter => delta < 0.0,
        };
        if improved {
            Verdict::Better
        } else {
            Verdict::Worse
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Better,
    Worse,
    Unchanged,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Better => "Bättre",
            Verdict::Worse => "Sämre",
            Verdict::Unchanged => "Oförändrat",
        }
    }
}

impl Metric {
    pub fn label(self) -> &'static str {
        match self {
            Metric::OrderValue => "Ordervärde",
            Metric::Sales => "Försäljning",
            Metric::Discount => "Rabattvärde",
            Metric::OrderCount => "Försäljningsantal",
            Metric::DiscountPct => "Rabatt%",
            Metric::NewCustomers => "Nya kunder",
            Metric::CustomerStock => "Total kundstock",
        }
    }

    pub fn kind(self) -> MetricKind {
        match self {
            Metric::DiscountPct => MetricKind::Ratio,
            _ => MetricKind::Additive,
        }
    }

    pub fn polarity(self) -> Polarity {
        match self {
            Metric::DiscountPct => Polarity::LowerIsBetter,
            _ => Polarity::HigherIsBetter,
        }
    }

    /// Whether the metric is an amount of money (rendered with a currency suffix).
    pub fn is_money(self) -> bool {
        matches!(self, Metric::OrderValue | Metric::Sales | Metric::Discount)
    }
}

/// Discount share of the gross order value, in percent. Zero when there is no order value.
pub fn discount_pct(discount: f64, order_value: f64) -> f64 {
    if order_value > 0.0 {
        discount / order_value * 100.0
    } else {
        0.0
    }
}

/// Percentage change from `comparison` to `current`.
///
/// When the comparison value is not positive the change is 0 if `current` is
/// also zero and exactly 100 otherwise. The result is always finite.
pub fn percent_change(current: f64, comparison: f64) -> f64 {
    if comparison > 0.0 {
        (current - comparison) / comparison * 100.0
    } else if current == 0.0 {
        0.0
    } else {
        100.0
    }
}

fn sum<R: Record>(rows: &[R], measure: Measure) -> f64 {
    rows.iter().map(|r| r.measure(measure)).sum()
}

/// Aggregated metrics for one slice of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KpiSnapshot {
    pub values: BTreeMap<Metric, f64>,
    pub rows: usize,
}

impl KpiSnapshot {
    pub fn sales(rows: &[SalesRecord]) -> Self {
        let order_value = sum(rows, Measure::OrderValue);
        let discount = sum(rows, Measure::Discount);
        let values = BTreeMap::from([
            (Metric::OrderValue, order_value),
            (Metric::Sales, sum(rows, Measure::Sales)),
            (Metric::Discount, discount),
            (Metric::OrderCount, sum(rows, Measure::OrderCount)),
            (Metric::DiscountPct, discount_pct(discount, order_value)),
        ]);
        Self {
            values,
            rows: rows.len(),
        }
    }

    pub fn new_customers(rows: &[NewCustomerRecord]) -> Self {
        Self {
            values: BTreeMap::from([(Metric::NewCustomers, sum(rows, Measure::NewCustomers))]),
            rows: rows.len(),
        }
    }

    pub fn customer_stock(rows: &[StockRecord]) -> Self {
        Self {
            values: BTreeMap::from([(Metric::CustomerStock, sum(rows, Measure::Customers))]),
            rows: rows.len(),
        }
    }

    /// Value of `metric`, or 0 if this snapshot does not carry it.
    pub fn get(&self, metric: Metric) -> f64 {
        self.values.get(&metric).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Change {
    Percent(f64),
    Points(f64),
}

impl Change {
    pub fn value(self) -> f64 {
        match self {
            Change::Percent(v) | Change::Points(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDelta {
    pub metric: Metric,
    pub current: f64,
    pub comparison: f64,
    pub delta: f64,
    pub change: Change,
}

impl MetricDelta {
    pub fn new(metric: Metric, current: f64, comparison: f64) -> Self {
        let delta = current - comparison;
        let change = match metric.kind() {
            MetricKind::Additive => Change::Percent(percent_change(current, comparison)),
            MetricKind::Ratio => Change::Points(delta),
        };
        Self {
            metric,
            current,
            comparison,
            delta,
            change,
        }
    }

    pub fn verdict(&self) -> Verdict {
        self.metric.polarity().judge(self.delta)
    }
}

/// Per-metric deltas between two snapshots, in metric order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Comparison {
    pub entries: Vec<MetricDelta>,
}

impl Comparison {
    pub fn get(&self, metric: Metric) -> Option<&MetricDelta> {
        self.entries.iter().find(|e| e.metric == metric)
    }
}

/// Compare every metric of `current` against the same metric of `comparison`.
/// Metrics missing from `comparison` are compared against zero.
pub fn compare(current: &KpiSnapshot, comparison: &KpiSnapshot) -> Comparison {
    let entries = current
        .values
        .iter()
        .map(|(&metric, &value)| MetricDelta::new(metric, value, comparison.get(metric)))
        .collect();
    Comparison { entries }
}
