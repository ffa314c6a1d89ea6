// Entry point and high-level CLI flow.
//
// Each command loads the CSVs it needs, renders everything in memory and
// only then writes the output files.
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use kpi_dashboard::loader::{self, LoadReport};
use kpi_dashboard::types::{MonthlyTarget, SalesRecord};
use kpi_dashboard::util::format_int;
use kpi_dashboard::{output, reports, DashboardConfig};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "kpi_dashboard")]
#[command(about = "Year-over-year and month-over-month KPI dashboards from CSV extracts")]
struct Args {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory that relative input and output paths are resolved against
    #[arg(short, long, default_value = ".")]
    base_dir: PathBuf,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Render the sales dashboard
    Sales,
    /// Render the customer-flow dashboard
    CustomerFlow,
    /// Print the sales analysis tables to stdout
    Analysis,
    /// Render both dashboards (default)
    All,
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_sales(config: &DashboardConfig) -> Result<Vec<SalesRecord>> {
    let (data, report) = loader::load_sales(&config.sales_csv)
        .with_context(|| format!("loading sales data from {}", config.sales_csv.display()))?;
    print_load_report("sales", &report);
    Ok(data)
}

fn load_targets(config: &DashboardConfig) -> Result<Vec<MonthlyTarget>> {
    let Some(path) = &config.targets_csv else {
        return Ok(Vec::new());
    };
    if !path.exists() {
        warn!(path = %path.display(), "targets file not found, rendering without targets");
        return Ok(Vec::new());
    }
    loader::load_targets(path)
        .with_context(|| format!("loading targets from {}", path.display()))
}

fn print_load_report(name: &str, report: &LoadReport) {
    info!(
        "{}: {} rows loaded, {} skipped",
        name,
        format_int(report.loaded_rows as i64),
        format_int(report.skipped_rows as i64)
    );
}

/// Render the dashboards for `command` without touching the filesystem.
fn render(
    command: Command,
    config: &DashboardConfig,
    generated_at: NaiveDateTime,
) -> Result<Vec<(PathBuf, String)>> {
    let mut pages = Vec::new();

    if matches!(command, Command::Sales | Command::All) {
        let data = load_sales(config)?;
        let dashboard = reports::generate_sales_dashboard(&data, config.period);
        pages.push((
            config.sales_html.clone(),
            dashboard.render(config, generated_at),
        ));
    }

    if matches!(command, Command::CustomerFlow | Command::All) {
        let (new_customers, report) = loader::load_new_customers(&config.new_customers_csv)
            .with_context(|| {
                format!(
                    "loading new customers from {}",
                    config.new_customers_csv.display()
                )
            })?;
        print_load_report("new customers", &report);
        let (stock, report) = loader::load_customer_stock(&config.stock_csv)
            .context("loading customer stock")?;
        print_load_report("customer stock", &report);
        let targets = load_targets(config)?;

        let html = reports::generate_customer_flow_dashboard(
            &new_customers,
            &stock,
            &targets,
            config,
            generated_at,
        );
        pages.push((config.customer_flow_html.clone(), html));
    }

    Ok(pages)
}

fn run_analysis(config: &DashboardConfig) -> Result<()> {
    let data = load_sales(config)?;
    let analysis = reports::generate_sales_analysis(&data, config.period);
    output::print_analysis(&analysis);
    if let Some(path) = &config.analysis_json {
        output::write_json(path, &analysis)
            .with_context(|| format!("writing analysis summary to {}", path.display()))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = DashboardConfig::load(args.config.as_deref())
        .context("loading configuration")?
        .resolve_paths(&args.base_dir);
    let command = args.command.unwrap_or(Command::All);
    info!(period = %config.period, "starting");

    if command == Command::Analysis {
        return run_analysis(&config);
    }

    let generated_at = chrono::Local::now().naive_local();
    let pages = render(command, &config, generated_at)?;
    output::write_pages(&pages).context("writing dashboards")?;
    info!(files = pages.len(), "done");
    Ok(())
}
