use crate::assets::FLOW_JS;
use crate::config::DashboardConfig;
use crate::dimension::{Breakdown, DimensionAnalysis, SortOrder};
use crate::html::{
    breakdown_table, escape, filter_bar, kpi_grid, section_header, tables_grid, ChangeColumns,
    Document, FilterButton, KpiCard, TableSpec,
};
use crate::kpi::{compare, Change, Comparison, KpiSnapshot, Metric};
use crate::loader::find_target;
use crate::period::{Period, PeriodSlices};
use crate::types::{
    ChannelFilter, Dimension, DimensionComparisonRow, KpiComparisonRow, Measure, MonthlyTarget,
    NewCustomerRecord, SalesRecord, StockRecord,
};
use crate::util::{format_number, format_points, format_signed_percent};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Values treated as "unknown" in customer dimensions.
const UNKNOWN_VALUES: [&str; 2] = ["Okänd", "Okänt"];

/// A titled breakdown definition.
struct TableDef {
    title: &'static str,
    analysis: DimensionAnalysis,
}

fn table_def(title: &'static str, analysis: DimensionAnalysis) -> TableDef {
    TableDef { title, analysis }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Sales dashboard
// ---------------------------------------------------------------------------

fn sales_analysis(dimension: Dimension) -> DimensionAnalysis {
    DimensionAnalysis::new(dimension, Measure::OrderValue).with_measure(Measure::OrderCount)
}

fn sales_dashboard_tables() -> Vec<TableDef> {
    vec![
        table_def("Kundtyp", sales_analysis(Dimension::CustomerType).top(5)),
        table_def("Säljkanaler", sales_analysis(Dimension::SalesChannel).top(5)),
        table_def(
            "Top Kampanjkoder",
            sales_analysis(Dimension::CampaignCode)
                .excluding(["Kod saknas"])
                .top(8),
        ),
        table_def("Antal Anställda", sales_analysis(Dimension::Employees).top(8)),
        table_def("Bolagsform", sales_analysis(Dimension::CompanyForm).top(5)),
        table_def(
            "Top SNI-koder",
            sales_analysis(Dimension::Sni).excluding(["-"]).top(10),
        ),
    ]
}

/// Everything the sales dashboard shows, before rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SalesDashboard {
    pub period: Period,
    pub current: KpiSnapshot,
    pub yoy: Comparison,
    pub mom: Comparison,
    pub breakdowns: Vec<(String, Breakdown)>,
}

pub fn generate_sales_dashboard(data: &[SalesRecord], period: Period) -> SalesDashboard {
    let slices = PeriodSlices::select(data, period);
    debug!(
        current = slices.current.len(),
        yoy = slices.yoy.len(),
        mom = slices.mom.len(),
        "sales period slices"
    );
    let current = KpiSnapshot::sales(&slices.current);
    let yoy = compare(&current, &KpiSnapshot::sales(&slices.yoy));
    let mom = compare(&current, &KpiSnapshot::sales(&slices.mom));

    let breakdowns = sales_dashboard_tables()
        .into_iter()
        .map(|def| (def.title.to_string(), def.analysis.run_slices(&slices)))
        .collect();

    SalesDashboard {
        period,
        current,
        yoy,
        mom,
        breakdowns,
    }
}

impl SalesDashboard {
    pub fn render(&self, config: &DashboardConfig, generated_at: NaiveDateTime) -> String {
        let cards: Vec<KpiCard> = [
            Metric::OrderValue,
            Metric::Sales,
            Metric::OrderCount,
            Metric::DiscountPct,
        ]
        .into_iter()
        .filter_map(|m| {
            let yoy = self.yoy.get(m)?;
            let mom = self.mom.get(m)?;
            Some(KpiCard::for_metric(self.period, yoy, mom))
        })
        .collect();

        let tables: Vec<String> = self
            .breakdowns
            .iter()
            .map(|(title, b)| {
                let spec = TableSpec {
                    title,
                    measure: Measure::OrderCount,
                    value_header: "Antal",
                    columns: ChangeColumns::Percent,
                };
                breakdown_table(&spec, b)
            })
            .collect();

        let body = format!(
            r#"
        <div class="section">{}{}
        </div>
        <div class="section">{}{}
        </div>"#,
            section_header(
                &format!("Nyckeltal {}", self.period),
                "Jämförelser Year-over-Year & Month-over-Month"
            ),
            kpi_grid(&cards),
            section_header(
                "Detaljerad Analys",
                "Top-prestationer och trender per dimension"
            ),
            tables_grid(&tables),
        );

        let heading = format!("Försäljningsrapport {}", self.period);
        let period_label = self.period.to_string();
        let nav_href = file_name(&config.customer_flow_html);
        Document {
            title: &heading,
            heading: &heading,
            period_label: &period_label,
            brand: &config.brand,
            gate_secret: &config.gate_secret,
            generated_at,
            nav: Some((&nav_href, "👥 Gå till Kundflöde →")),
            body: &body,
            script: None,
            filters: false,
        }
        .render()
    }
}

// ---------------------------------------------------------------------------
// Customer-flow dashboard
// ---------------------------------------------------------------------------

fn customer_tables(measure: Measure, with_channel: bool) -> Vec<TableDef> {
    let analysis = |dimension| DimensionAnalysis::new(dimension, measure);
    let mut tables = Vec::new();
    if with_channel {
        tables.push(table_def(
            "Anskaffningskanal",
            analysis(Dimension::AcquisitionChannel).top(6),
        ));
    }
    tables.extend([
        table_def("Kundtyp", analysis(Dimension::CustomerType).top(8)),
        table_def(
            "Antal Anställda",
            analysis(Dimension::Employees)
                .excluding(UNKNOWN_VALUES)
                .top(8),
        ),
        table_def(
            "SNI-kod (Bransch)",
            analysis(Dimension::Sni).excluding(UNKNOWN_VALUES).top(10),
        ),
        table_def("Bolagsform", analysis(Dimension::CompanyForm).top(6)),
        table_def(
            "Omsättningsintervall",
            analysis(Dimension::TurnoverRange)
                .excluding(UNKNOWN_VALUES)
                .sorted_by(SortOrder::RangeLowerBound)
                .top(8),
        ),
    ]);
    tables
}

fn render_tables(
    defs: Vec<TableDef>,
    spec: TableSpec<'_>,
    run: impl Fn(&DimensionAnalysis) -> Breakdown,
) -> String {
    let tables: Vec<String> = defs
        .iter()
        .map(|def| {
            let spec = TableSpec {
                title: def.title,
                ..spec
            };
            breakdown_table(&spec, &run(&def.analysis))
        })
        .collect();
    tables_grid(&tables)
}

/// KPI card and tables for new customers in one month and channel selection.
fn new_customer_section(
    data: &[NewCustomerRecord],
    targets: &[MonthlyTarget],
    period: Period,
    channel: ChannelFilter,
) -> String {
    let slices = PeriodSlices::select(data, period).retain(|r| channel.accepts(r.channel));
    let current = KpiSnapshot::new_customers(&slices.current);
    let yoy = compare(&current, &KpiSnapshot::new_customers(&slices.yoy));
    let mom = compare(&current, &KpiSnapshot::new_customers(&slices.mom));

    let mut cards = Vec::new();
    if let (Some(y), Some(m)) = (yoy.get(Metric::NewCustomers), mom.get(Metric::NewCustomers)) {
        let target = find_target(targets, period.month, channel);
        cards.push(KpiCard::for_count(period, y, m).with_target(y.current, target));
    }

    let spec = TableSpec {
        title: "",
        measure: Measure::NewCustomers,
        value_header: "Antal",
        columns: ChangeColumns::Percent,
    };
    let tables = render_tables(
        customer_tables(Measure::NewCustomers, channel == ChannelFilter::All),
        spec,
        |a| a.run_slices(&slices),
    );

    format!("{}{}", kpi_grid(&cards), tables)
}

/// Customer-stock KPI card and tables for one month.
fn net_change_section(data: &[StockRecord], period: Period) -> String {
    let slices = PeriodSlices::select(data, period);
    let current = KpiSnapshot::customer_stock(&slices.current);
    let yoy = compare(&current, &KpiSnapshot::customer_stock(&slices.yoy));
    let mom = compare(&current, &KpiSnapshot::customer_stock(&slices.mom));

    let mut cards = Vec::new();
    if let (Some(y), Some(m)) = (yoy.get(Metric::CustomerStock), mom.get(Metric::CustomerStock)) {
        cards.push(KpiCard::for_count(period, y, m));
    }

    let spec = TableSpec {
        title: "",
        measure: Measure::Customers,
        value_header: "Kundstock",
        columns: ChangeColumns::Difference,
    };
    let tables = render_tables(customer_tables(Measure::Customers, false), spec, |a| {
        a.run_slices(&slices)
    });

    format!("{}{}", kpi_grid(&cards), tables)
}

fn display(visible: bool) -> &'static str {
    if visible {
        "block"
    } else {
        "none"
    }
}

pub fn generate_customer_flow_dashboard(
    new_customers: &[NewCustomerRecord],
    stock: &[StockRecord],
    targets: &[MonthlyTarget],
    config: &DashboardConfig,
    generated_at: NaiveDateTime,
) -> String {
    let months = config.flow_months();
    let current = config.period;
    let channels = ChannelFilter::options();
    let mut sections = String::new();

    for &period in &months {
        for &channel in &channels {
            let visible = period == current && channel == ChannelFilter::All;
            sections.push_str(&format!(
                r#"
        <div class="section" data-view="nya" data-month="{month}" data-channel="{channel}" style="display: {display};">{header}{content}
        </div>"#,
                month = period.month,
                channel = escape(channel.id()),
                display = display(visible),
                header = section_header(&format!("Nya kunder - {}", period), channel.label()),
                content = new_customer_section(new_customers, targets, period, channel),
            ));
        }
    }
    for &period in &months {
        sections.push_str(&format!(
            r#"
        <div class="section" data-view="netto" data-month="{month}" style="display: none;">{header}{content}
        </div>"#,
            month = period.month,
            header = section_header(
                &format!("Nettoförändring - {}", period),
                "Kundstocksutveckling"
            ),
            content = net_change_section(stock, period),
        ));
    }
    info!(
        months = months.len(),
        sections = months.len() * (channels.len() + 1),
        "rendered customer-flow sections"
    );

    let month_buttons: Vec<FilterButton> = months
        .iter()
        .map(|p| FilterButton {
            handler: "switchMonth",
            attribute: "month",
            value: p.month.to_string(),
            text: p.month_name().to_string(),
            active: *p == current,
        })
        .collect();
    let view_buttons = vec![
        FilterButton {
            handler: "switchView",
            attribute: "view",
            value: "nya".to_string(),
            text: "📈 Nya kunder".to_string(),
            active: true,
        },
        FilterButton {
            handler: "switchView",
            attribute: "view",
            value: "netto".to_string(),
            text: "📊 Nettoförändring".to_string(),
            active: false,
        },
    ];
    let channel_buttons: Vec<FilterButton> = channels
        .iter()
        .map(|c| FilterButton {
            handler: "switchChannel",
            attribute: "channel",
            value: c.id().to_string(),
            text: format!("{} {}", c.icon(), c.label()),
            active: *c == ChannelFilter::All,
        })
        .collect();

    let body = format!(
        "{}{}{}{}",
        filter_bar(None, "Välj månad:", &month_buttons),
        filter_bar(None, "Visa:", &view_buttons),
        filter_bar(
            Some("channel-filter"),
            "Filtrera på anskaffningskanal:",
            &channel_buttons
        ),
        sections
    );
    let script = format!(
        "        let currentMonth = \"{}\";\n        let currentView = 'nya';\n        let currentChannel = 'alla';\n        const REPORT_YEAR = {};\n{}",
        current.month, current.year, FLOW_JS
    );

    let heading = format!("👥 Kundflödesrapport {}", current.year);
    let title = format!("Kundflödesrapport {}", current.year);
    let period_label = current.to_string();
    let nav_href = file_name(&config.sales_html);
    Document {
        title: &title,
        heading: &heading,
        period_label: &period_label,
        brand: &config.brand,
        gate_secret: &config.gate_secret,
        generated_at,
        nav: Some((&nav_href, "📊 Gå till Nykundsförsäljning →")),
        body: &body,
        script: Some(&script),
        filters: true,
    }
    .render()
}

// ---------------------------------------------------------------------------
// Console analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DimensionSection {
    pub dimension: String,
    pub yoy: Vec<DimensionComparisonRow>,
    pub mom: Vec<DimensionComparisonRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesAnalysis {
    pub period: Period,
    pub rows_current: usize,
    pub rows_yoy: usize,
    pub rows_mom: usize,
    pub kpi_yoy: Vec<KpiComparisonRow>,
    pub kpi_mom: Vec<KpiComparisonRow>,
    pub dimensions: Vec<DimensionSection>,
    pub summary_yoy: Vec<String>,
    pub summary_mom: Vec<String>,
}

fn kpi_rows(cmp: &Comparison) -> Vec<KpiComparisonRow> {
    cmp.entries
        .iter()
        .map(|d| {
            let value = |v: f64| match d.change {
                Change::Points(_) => format!("{:.2}%", v),
                Change::Percent(_) => format_number(v, 0),
            };
            KpiComparisonRow {
                kpi: d.metric.label().to_string(),
                current: value(d.current),
                comparison: value(d.comparison),
                change: match d.change {
                    Change::Percent(p) => format_signed_percent(p),
                    Change::Points(p) => format_points(p),
                },
                status: d.verdict().label().to_string(),
            }
        })
        .collect()
}

fn summary_lines(cmp: &Comparison) -> Vec<String> {
    [Metric::OrderValue, Metric::OrderCount, Metric::DiscountPct]
        .into_iter()
        .filter_map(|m| cmp.get(m))
        .map(|d| {
            let change = match d.change {
                Change::Percent(p) => format_signed_percent(p),
                Change::Points(p) => format_points(p),
            };
            format!("{}: {} - {}", d.metric.label(), change, d.verdict().label())
        })
        .collect()
}

/// Rows of one comparison side. Groups with nothing in either period are skipped.
fn dimension_rows(breakdown: &Breakdown, use_yoy: bool) -> Vec<DimensionComparisonRow> {
    breakdown
        .rows
        .iter()
        .filter_map(|row| {
            let value = row.get(Measure::OrderValue)?;
            let count = row.get(Measure::OrderCount)?;
            let (value_base, count_base) = if use_yoy {
                (value.yoy, count.yoy)
            } else {
                (value.mom, count.mom)
            };
            let nothing = value.current == 0.0
                && count.current == 0.0
                && value_base == 0.0
                && count_base == 0.0;
            if nothing {
                return None;
            }
            let (value_pct, count_pct) = if use_yoy {
                (value.yoy_pct(), count.yoy_pct())
            } else {
                (value.mom_pct(), count.mom_pct())
            };
            Some(DimensionComparisonRow {
                group: row.key.clone(),
                order_value: format_number(value.current, 0),
                order_value_change: format_signed_percent(value_pct),
                order_count: format_number(count.current, 0),
                order_count_change: format_signed_percent(count_pct),
            })
        })
        .collect()
}

pub fn generate_sales_analysis(data: &[SalesRecord], period: Period) -> SalesAnalysis {
    let slices = PeriodSlices::select(data, period);
    let current = KpiSnapshot::sales(&slices.current);
    let yoy = compare(&current, &KpiSnapshot::sales(&slices.yoy));
    let mom = compare(&current, &KpiSnapshot::sales(&slices.mom));

    let defs = [
        (Dimension::CampaignCode, 10),
        (Dimension::SalesChannel, 20),
        (Dimension::Employees, 20),
        (Dimension::ContractPeriod, 20),
        (Dimension::CompanyForm, 20),
        (Dimension::CustomerType, 20),
        (Dimension::Sni, 15),
    ];
    let dimensions = defs
        .into_iter()
        .map(|(dimension, n)| {
            // Each side is capped on its own so groups from the other
            // comparison period cannot take its slots.
            let analysis = sales_analysis(dimension).top(n);
            let by_yoy = analysis.run(&slices.current, &slices.yoy, &[]);
            let by_mom = analysis.run(&slices.current, &[], &slices.mom);
            DimensionSection {
                dimension: dimension.label().to_string(),
                yoy: dimension_rows(&by_yoy, true),
                mom: dimension_rows(&by_mom, false),
            }
        })
        .collect();

    SalesAnalysis {
        period,
        rows_current: slices.current.len(),
        rows_yoy: slices.yoy.len(),
        rows_mom: slices.mom.len(),
        kpi_yoy: kpi_rows(&yoy),
        kpi_mom: kpi_rows(&mom),
        dimensions,
        summary_yoy: summary_lines(&yoy),
        summary_mom: summary_lines(&mom),
    }
}
