//! HTML rendering for the dashboards.
//!
//! Everything here turns already computed numbers into self-contained HTML
//! fragments. Nothing is recomputed; the browser only shows and hides
//! sections that were rendered up front.
use crate::assets::{BASE_CSS, FILTER_CSS, GATE_CSS, GATE_JS};
use crate::dimension::Breakdown;
use crate::kpi::{Change, Metric, MetricDelta, Polarity, Verdict};
use crate::period::Period;
use crate::types::Measure;
use crate::util::{
    format_money, format_number, format_points, format_signed, format_signed_percent,
};
use chrono::{Datelike, NaiveDateTime};

/// Escape text for use in element content and quoted attributes.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// JavaScript string literal for `s`, safe to place inside a `<script>` block.
pub fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string())
        .to_string()
        .replace("</", "<\\/")
}

/// Arrow and CSS class for a verdict.
pub fn indicator(verdict: Verdict) -> (&'static str, &'static str) {
    match verdict {
        Verdict::Better => ("↑", "positive"),
        Verdict::Worse => ("↓", "negative"),
        Verdict::Unchanged => ("→", "neutral"),
    }
}

/// Display a metric value: money with a currency suffix, ratios with two
/// decimals and a percent sign, counts as whole numbers.
pub fn format_metric_value(metric: Metric, value: f64) -> String {
    if metric.is_money() {
        format_money(value)
    } else if metric == Metric::DiscountPct {
        format!("{:.2}%", value)
    } else {
        format_number(value, 0)
    }
}

fn format_change(change: Change) -> String {
    match change {
        Change::Percent(v) => format_signed_percent(v),
        Change::Points(v) => format_points(v),
    }
}

pub fn section_header(title: &str, subtitle: &str) -> String {
    format!(
        r#"
        <div class="section-header">
            <h2>{}</h2>
            <p class="subtitle">{}</p>
        </div>"#,
        escape(title),
        escape(subtitle)
    )
}

/// One "YoY:"/"MoM:"/"Mål:" line inside a KPI card.
#[derive(Debug, Clone)]
pub struct CardLine {
    pub label: String,
    pub reference: String,
    pub change: String,
    pub verdict: Verdict,
    /// Overrides the arrow, e.g. a check mark for targets.
    pub symbol: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct KpiCard {
    pub title: String,
    pub value: String,
    pub lines: Vec<CardLine>,
}

impl KpiCard {
    /// Card for a sales metric with its YoY and MoM deltas.
    pub fn for_metric(period: Period, yoy: &MetricDelta, mom: &MetricDelta) -> Self {
        let metric = yoy.metric;
        let line = |label: &str, delta: &MetricDelta, against: Period| CardLine {
            label: label.to_string(),
            reference: format!(
                "vs {}: {}",
                against.short_label(),
                format_metric_value(metric, delta.comparison)
            ),
            change: format_change(delta.change),
            verdict: delta.verdict(),
            symbol: None,
        };
        Self {
            title: metric.label().to_string(),
            value: format_metric_value(metric, yoy.current),
            lines: vec![
                line("YoY", yoy, period.yoy()),
                line("MoM", mom, period.mom()),
            ],
        }
    }

    /// Card for a count metric showing both percentage and absolute change.
    pub fn for_count(period: Period, yoy: &MetricDelta, mom: &MetricDelta) -> Self {
        let line = |label: &str, delta: &MetricDelta, against: Period| CardLine {
            label: label.to_string(),
            reference: format!(
                "vs {}: {}",
                against.short_label(),
                format_number(delta.comparison, 0)
            ),
            change: format!(
                "{} ({})",
                format_change(delta.change),
                format_signed(delta.delta, 0)
            ),
            verdict: delta.verdict(),
            symbol: None,
        };
        Self {
            title: yoy.metric.label().to_string(),
            value: format_number(yoy.current, 0),
            lines: vec![
                line("YoY", yoy, period.yoy()),
                line("MoM", mom, period.mom()),
            ],
        }
    }

    /// Add a target line. Targets of zero or less are not shown.
    pub fn with_target(mut self, current: f64, target: Option<f64>) -> Self {
        if let Some(target) = target.filter(|t| *t > 0.0) {
            let fulfilment = current / target * 100.0;
            let reached = fulfilment >= 100.0;
            self.lines.push(CardLine {
                label: "Mål".to_string(),
                reference: format_number(target, 0),
                change: format!(
                    "{}% ({})",
                    format_number(fulfilment, 1),
                    format_signed(current - target, 0)
                ),
                verdict: if reached { Verdict::Better } else { Verdict::Worse },
                symbol: Some(if reached { "✓" } else { "✗" }),
            });
        }
        self
    }

    pub fn render(&self) -> String {
        let mut lines = String::new();
        for line in &self.lines {
            let (arrow, class) = indicator(line.verdict);
            lines.push_str(&format!(
                r#"
                <div class="comparison-row">
                    <span class="comparison-label">{label}:</span>
                    <span class="comparison-value">{reference}</span>
                    <span class="kpi-change-inline {class}">
                        <span class="arrow-small">{arrow}</span>
                        {change}
                    </span>
                </div>"#,
                label = escape(&line.label),
                reference = escape(&line.reference),
                class = class,
                arrow = line.symbol.unwrap_or(arrow),
                change = escape(&line.change),
            ));
        }
        format!(
            r#"
        <div class="kpi-card">
            <div class="kpi-title">{}</div>
            <div class="kpi-value">{}</div>
            <div class="kpi-comparisons">{}
            </div>
        </div>"#,
            escape(&self.title),
            escape(&self.value),
            lines
        )
    }
}

pub fn kpi_grid(cards: &[KpiCard]) -> String {
    let body: String = cards.iter().map(KpiCard::render).collect();
    format!("\n        <div class=\"kpi-grid\">{}\n        </div>", body)
}

/// How the comparison columns of a breakdown table are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeColumns {
    /// Percentage change with an arrow.
    Percent,
    /// Signed absolute difference.
    Difference,
}

/// Table layout for a breakdown: which measure to show and how.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec<'a> {
    pub title: &'a str,
    pub measure: Measure,
    pub value_header: &'a str,
    pub columns: ChangeColumns,
}

pub fn breakdown_table(spec: &TableSpec<'_>, breakdown: &Breakdown) -> String {
    let title = escape(spec.title);
    if breakdown.is_empty() {
        return format!(
            r#"
        <div class="table-card">
            <h3>{}</h3>
            <p class="no-data">Ingen data tillgänglig</p>
        </div>"#,
            title
        );
    }

    let (yoy_header, mom_header) = match spec.columns {
        ChangeColumns::Percent => ("YoY %", "MoM %"),
        ChangeColumns::Difference => ("YoY diff", "MoM diff"),
    };

    let mut rows = String::new();
    for row in &breakdown.rows {
        let Some(values) = row.get(spec.measure) else {
            continue;
        };
        let cell = |delta: f64, pct: f64| {
            let (arrow, class) = indicator(Polarity::HigherIsBetter.judge(delta));
            let text = match spec.columns {
                ChangeColumns::Percent => format_signed_percent(pct),
                ChangeColumns::Difference => format_signed(delta, 0),
            };
            format!(
                r#"<td class="number {}"><span class="arrow-small">{}</span> {}</td>"#,
                class, arrow, text
            )
        };
        rows.push_str(&format!(
            r#"
                <tr>
                    <td class="dimension-name">{}</td>
                    <td class="number">{}</td>
                    {}
                    {}
                </tr>"#,
            escape(&row.key),
            format_number(values.current, 0),
            cell(values.yoy_delta(), values.yoy_pct()),
            cell(values.mom_delta(), values.mom_pct()),
        ));
    }

    format!(
        r#"
        <div class="table-card">
            <h3>{title}</h3>
            <table>
                <thead>
                    <tr>
                        <th>{dimension}</th>
                        <th class="number">{value_header}</th>
                        <th class="number">{yoy_header}</th>
                        <th class="number">{mom_header}</th>
                    </tr>
                </thead>
                <tbody>{rows}
                </tbody>
            </table>
        </div>"#,
        title = title,
        dimension = escape(breakdown.dimension.label()),
        value_header = escape(spec.value_header),
        yoy_header = yoy_header,
        mom_header = mom_header,
        rows = rows,
    )
}

pub fn tables_grid(tables: &[String]) -> String {
    format!(
        "\n        <div class=\"tables-grid\">{}\n        </div>",
        tables.concat()
    )
}

/// A selector button in a filter bar.
#[derive(Debug, Clone)]
pub struct FilterButton {
    pub handler: &'static str,
    pub attribute: &'static str,
    pub value: String,
    pub text: String,
    pub active: bool,
}

pub fn filter_bar(id: Option<&str>, label: &str, buttons: &[FilterButton]) -> String {
    let id_attr = id
        .map(|id| format!(r#" id="{}""#, escape(id)))
        .unwrap_or_default();
    let body: String = buttons
        .iter()
        .map(|b| {
            format!(
                r#"
                <button class="filter-button{active}" onclick="{handler}({arg})" data-{attr}="{value}">{text}</button>"#,
                active = if b.active { " active" } else { "" },
                handler = b.handler,
                arg = escape(&js_string(&b.value)),
                attr = b.attribute,
                value = escape(&b.value),
                text = escape(&b.text),
            )
        })
        .collect();
    format!(
        r#"
        <div class="filter-section"{id_attr}>
            <span class="filter-label">{label}</span>
            <div class="filter-buttons">{body}
            </div>
        </div>"#,
        id_attr = id_attr,
        label = escape(label),
        body = body,
    )
}

/// Everything needed to wrap content into a full HTML page.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    pub title: &'a str,
    pub heading: &'a str,
    pub period_label: &'a str,
    pub brand: &'a str,
    pub gate_secret: &'a str,
    pub generated_at: NaiveDateTime,
    pub nav: Option<(&'a str, &'a str)>,
    pub body: &'a str,
    /// Extra page script, placed after the content.
    pub script: Option<&'a str>,
    /// Include the filter-bar styles.
    pub filters: bool,
}

impl Document<'_> {
    pub fn render(&self) -> String {
        let nav = self
            .nav
            .map(|(href, text)| {
                format!(
                    r#"
            <a href="{}" class="nav-button">{}</a>"#,
                    escape(href),
                    escape(text)
                )
            })
            .unwrap_or_default();
        let script = self
            .script
            .map(|s| format!("\n    <script>\n{}\n    </script>", s))
            .unwrap_or_default();
        let filter_css = if self.filters { FILTER_CSS } else { "" };

        format!(
            r#"<!DOCTYPE html>
<html lang="sv">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="robots" content="noindex, nofollow, noarchive, nosnippet">
    <meta name="googlebot" content="noindex, nofollow, noarchive, nosnippet">
    <title>{title} - {brand}</title>
    <style>{base_css}{filter_css}{gate_css}
    </style>
    <script>
        const GATE_SECRET = {secret};
{gate_js}
    </script>
</head>
<body>
    <div id="loginOverlay" class="login-overlay">
        <div class="login-box">
            <h2>🔒 {heading}</h2>
            <p>Ange lösenord för att visa rapporten</p>
            <input type="password" id="passwordInput" class="login-input" placeholder="Ange lösenord" autocomplete="off">
            <button class="login-button" onclick="checkPassword()">Lås upp</button>
            <div id="loginError" class="login-error">❌ Felaktigt lösenord. Försök igen.</div>
        </div>
    </div>

    <div id="mainContent" class="content-hidden">
    <div class="container">
        <div class="header">
            <h1>{heading}</h1>
            <div class="header-meta">
                Genererad: {generated} | <span id="current-period">{period}</span>
            </div>{nav}
        </div>
{body}
        <div class="footer">
            <p>Rapport genererad med {brand} Analytics</p>
            <p>© {year} {brand}</p>
        </div>
    </div>{script}
    </div>
</body>
</html>
"#,
            title = escape(self.title),
            brand = escape(self.brand),
            base_css = BASE_CSS,
            filter_css = filter_css,
            gate_css = GATE_CSS,
            secret = js_string(self.gate_secret),
            gate_js = GATE_JS,
            heading = escape(self.heading),
            generated = self.generated_at.format("%Y-%m-%d %H:%M"),
            period = escape(self.period_label),
            nav = nav,
            body = self.body,
            year = self.generated_at.year(),
            script = script,
        )
    }
}
