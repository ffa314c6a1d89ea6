use chrono::{NaiveDate, NaiveDateTime};
use kpi_dashboard::dimension::{Breakdown, DimensionAnalysis};
use kpi_dashboard::kpi::{Change, Metric};
use kpi_dashboard::loader;
use kpi_dashboard::output;
use kpi_dashboard::reports;
use kpi_dashboard::types::{Dimension, Measure};
use kpi_dashboard::{DashboardConfig, DashboardError, Period};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SALES_CSV: &str = "\
ÅrMånad,Antal försäljningsordrar,Försäljning,Rabattvärde,KampanjKod,SäljKanal,Antal anställda,Avtalsperiod,Bolagsform,Kundtyp,SNI
202510,10,\"9\u{a0}000\",1000,K1,Web,1-4,12,AB,Ny,62
202510,5,5000,0,Kod saknas,Butik,1-4,12,AB,Ny,-
202509,8,8000,0,K1,Web,1-4,12,AB,Ny,62
202410,4,4000,0,K2,Butik,5-9,1,EF,Befintlig,-
";

const NEW_CUSTOMERS_CSV: &str = "\
ÅrMånad,Nya kunder,Anskaffad via - Detalj,KundTyp,Antal anställda,SNI,Bolagform,Omsättningsintervall
202510,30,Fortnox.se organiskt,Företag,1-4,62,AB,1 - 49 tkr
202510,10,Byrå partner,Företag,Okänd,Okänt,AB,< 1 tkr
202509,20,Fortnox.se organiskt,Företag,1-4,62,AB,1 - 49 tkr
202410,15,Winback Q4,Företag,1-4,62,EF,50 - 99 tkr
";

const STOCK_2024_CSV: &str = "\
ÅrMånad,Antal kunder,KundTyp,Antal anställda,SNI,Bolagform,Omsättningsintervall
202410,400,Företag,1-4,62,AB,1 - 49 tkr
";

const STOCK_2025_CSV: &str = "\
ÅrMånad,Antal kunder,KundTyp,Antal anställda,SNI,Bolagform,Omsättningsintervall
202509,480,Företag,1-4,62,AB,1 - 49 tkr
202510,500,Företag,1-4,62,AB,1 - 49 tkr
";

const TARGETS_CSV: &str = "\
Månad,Byrå,Winback,säljare,fortnox.se,Cling/Boardeaser/Okänt,Totalt
sep,5,5,5,20,5,40
okt,10,5,5,25,5,50
";

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn fixture() -> (TempDir, DashboardConfig) {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "sales.csv", SALES_CSV);
    write(dir.path(), "new_customers.csv", NEW_CUSTOMERS_CSV);
    write(dir.path(), "customer_stock_2024.csv", STOCK_2024_CSV);
    write(dir.path(), "customer_stock_2025.csv", STOCK_2025_CSV);
    write(dir.path(), "customer_targets.csv", TARGETS_CSV);
    write(
        dir.path(),
        "config.json",
        r#"{ "gate_secret": "hemlis", "period": { "year": 2025, "month": 10 }, "first_month": 9 }"#,
    );

    let config = DashboardConfig::load(Some(&dir.path().join("config.json")))
        .unwrap()
        .resolve_paths(dir.path());
    (dir, config)
}

fn timestamp(minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 11, 2)
        .unwrap()
        .and_hms_opt(9, minute, 0)
        .unwrap()
}

fn breakdown<'a>(dashboard: &'a reports::SalesDashboard, title: &str) -> &'a Breakdown {
    &dashboard
        .breakdowns
        .iter()
        .find(|(t, _)| t == title)
        .unwrap()
        .1
}

#[test]
fn sales_dashboard_end_to_end() {
    let (_dir, config) = fixture();
    let (data, report) = loader::load_sales(&config.sales_csv).unwrap();
    assert_eq!(report.loaded_rows, 4);

    let dashboard = reports::generate_sales_dashboard(&data, config.period);
    assert_eq!(dashboard.current.get(Metric::OrderValue), 15_000.0);
    assert_eq!(dashboard.current.get(Metric::OrderCount), 15.0);

    let yoy = dashboard.yoy.get(Metric::OrderValue).unwrap();
    assert_eq!(yoy.comparison, 4_000.0);
    assert_eq!(yoy.change, Change::Percent(275.0));
    let mom = dashboard.mom.get(Metric::OrderValue).unwrap();
    assert_eq!(mom.comparison, 8_000.0);

    let campaigns = breakdown(&dashboard, "Top Kampanjkoder");
    let keys: Vec<&str> = campaigns.rows.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["K1", "K2"]);
    // K1 had nothing a year ago; K2 has nothing now.
    assert_eq!(campaigns.rows[0].primary().yoy_pct(), 100.0);
    assert_eq!(campaigns.rows[1].primary().yoy_pct(), -100.0);
    assert_eq!(campaigns.excluded[0], 5_000.0);

    let sni = breakdown(&dashboard, "Top SNI-koder");
    let keys: Vec<&str> = sni.rows.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["62"]);

    let html = dashboard.render(&config, timestamp(0));
    assert!(html.contains(r#"const GATE_SECRET = "hemlis";"#));
    assert!(html.contains("15,000 kr"));
    assert!(html.contains("customer_flow_dashboard.html"));
    assert!(!html.contains("Kod saknas"));
}

#[test]
fn every_group_adds_up_to_the_period_total() {
    let (_dir, config) = fixture();
    let (data, _) = loader::load_sales(&config.sales_csv).unwrap();
    let slices = kpi_dashboard::period::PeriodSlices::select(&data, config.period);

    for dimension in [Dimension::CampaignCode, Dimension::SalesChannel, Dimension::Sni] {
        let b = DimensionAnalysis::new(dimension, Measure::OrderValue)
            .excluding(["Kod saknas", "-"])
            .top(1)
            .run_slices(&slices);
        let shown: f64 = b.rows.iter().map(|r| r.primary().current).sum();
        assert_eq!(shown + b.remainder[0] + b.excluded[0], 15_000.0, "{dimension}");
    }
}

#[test]
fn customer_flow_dashboard_end_to_end() {
    let (_dir, config) = fixture();
    let (new_customers, _) = loader::load_new_customers(&config.new_customers_csv).unwrap();
    let (stock, stock_report) = loader::load_customer_stock(&config.stock_csv).unwrap();
    assert_eq!(stock_report.loaded_rows, 3);
    let targets = loader::load_targets(config.targets_csv.as_deref().unwrap()).unwrap();

    let html = reports::generate_customer_flow_dashboard(
        &new_customers,
        &stock,
        &targets,
        &config,
        timestamp(0),
    );

    // 2 months x 6 channel selections, plus 2 net-change sections.
    assert_eq!(html.matches(r#"<div class="section" data-view="nya""#).count(), 12);
    assert_eq!(html.matches(r#"<div class="section" data-view="netto""#).count(), 2);

    // October, all channels: 40 new customers against a target of 50.
    assert!(html.contains(r#"<div class="kpi-value">40</div>"#));
    assert!(html.contains("80.0% (-10)"));
    // Stock grew from 400 a year ago and 480 last month.
    assert!(html.contains(r#"<div class="kpi-value">500</div>"#));
    assert!(html.contains("+25.0% (+100)"));
    assert!(html.contains("+4.2% (+20)"));

    assert!(html.contains(r#"id="channel-filter""#));
    assert!(html.contains("const REPORT_YEAR = 2025;"));
    assert!(html.contains("sales_dashboard.html"));
}

#[test]
fn rendering_is_deterministic_apart_from_the_timestamp() {
    let (_dir, config) = fixture();
    let (data, _) = loader::load_sales(&config.sales_csv).unwrap();
    let (new_customers, _) = loader::load_new_customers(&config.new_customers_csv).unwrap();
    let (stock, _) = loader::load_customer_stock(&config.stock_csv).unwrap();

    let sales = |at| reports::generate_sales_dashboard(&data, config.period).render(&config, at);
    let flow = |at| reports::generate_customer_flow_dashboard(&new_customers, &stock, &[], &config, at);

    assert_eq!(sales(timestamp(0)), sales(timestamp(0)));
    assert_eq!(flow(timestamp(0)), flow(timestamp(0)));

    let a = sales(timestamp(0));
    let b = sales(timestamp(30));
    assert!(a != b);
    assert_eq!(
        a.replace("2025-11-02 09:00", ""),
        b.replace("2025-11-02 09:30", "")
    );
}

#[test]
fn written_files_match_rendered_output() {
    let (dir, config) = fixture();
    let (data, _) = loader::load_sales(&config.sales_csv).unwrap();
    let html = reports::generate_sales_dashboard(&data, config.period).render(&config, timestamp(0));
    output::write_pages(&[(config.sales_html.clone(), html.clone())]).unwrap();
    assert_eq!(fs::read_to_string(dir.path().join("sales_dashboard.html")).unwrap(), html);

    let analysis = reports::generate_sales_analysis(&data, config.period);
    let json_path = dir.path().join("analysis.json");
    output::write_json(&json_path, &analysis).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(json_path).unwrap()).unwrap();
    assert_eq!(value["period"]["month"], 10);
    assert_eq!(value["kpi_yoy"][0]["Status"], "Bättre");
}

#[test]
fn failed_write_leaves_no_dashboard_behind() {
    let (dir, mut config) = fixture();
    config.customer_flow_html = dir.path().join("no_such_dir").join("flow.html");
    let (data, _) = loader::load_sales(&config.sales_csv).unwrap();
    let (new_customers, _) = loader::load_new_customers(&config.new_customers_csv).unwrap();
    let (stock, _) = loader::load_customer_stock(&config.stock_csv).unwrap();
    let before = fs::read_dir(dir.path()).unwrap().count();

    let pages = vec![
        (
            config.sales_html.clone(),
            reports::generate_sales_dashboard(&data, config.period).render(&config, timestamp(0)),
        ),
        (
            config.customer_flow_html.clone(),
            reports::generate_customer_flow_dashboard(
                &new_customers,
                &stock,
                &[],
                &config,
                timestamp(0),
            ),
        ),
    ];
    let err = output::write_pages(&pages).unwrap_err();

    assert!(matches!(err, DashboardError::Write { .. }));
    assert!(err.to_string().contains("flow.html"));
    assert!(!config.sales_html.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), before);
}

#[test]
fn missing_input_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = loader::load_sales(&dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, DashboardError::Read { .. }));
    assert!(err.to_string().contains("nope.csv"));
}

#[test]
fn missing_column_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "sales.csv", "ÅrMånad,Försäljning\n202510,1\n");
    let err = loader::load_sales(&dir.path().join("sales.csv")).unwrap_err();
    match err {
        DashboardError::MissingColumn { column, .. } => {
            assert_eq!(column, "Antal försäljningsordrar")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn january_compares_against_december() {
    let period = Period::new(2025, 1).unwrap();
    assert_eq!(period.mom(), Period { year: 2024, month: 12 });
    assert_eq!(period.yoy(), Period { year: 2024, month: 1 });
}
