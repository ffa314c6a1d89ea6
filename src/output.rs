use crate::error::{DashboardError, Result};
use crate::reports::SalesAnalysis;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tempfile::NamedTempFile;
use tracing::info;

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|source| write_error(path, source))
}

fn write_error(path: &Path, source: std::io::Error) -> DashboardError {
    DashboardError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Write `contents` to a temporary file next to `path`. Dropping the
/// returned handle removes the file.
fn stage(path: &Path, contents: &str) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(|e| write_error(path, e))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| write_error(path, e))?;
    file.flush().map_err(|e| write_error(path, e))?;
    Ok(file)
}

/// Write a set of rendered pages. Every page is staged before any target
/// is replaced, so a page that cannot be written leaves none behind.
pub fn write_pages(pages: &[(PathBuf, String)]) -> Result<()> {
    let staged = pages
        .iter()
        .map(|(path, html)| -> Result<_> { Ok((stage(path, html)?, path)) })
        .collect::<Result<Vec<_>>>()?;
    for (file, path) in staged {
        file.persist(path).map_err(|e| write_error(path, e.error))?;
        info!(path = %path.display(), "wrote dashboard");
    }
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    write_file(path, &s)?;
    info!(path = %path.display(), "wrote JSON summary");
    Ok(())
}

/// Render rows as a markdown table, or `(no rows)`.
pub fn markdown_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("\n{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    println!("{}\n", markdown_table(rows, max_rows));
}

/// Print the console analysis: KPI tables, per-dimension tables and the summary.
pub fn print_analysis(analysis: &SalesAnalysis) {
    let period = analysis.period;
    println!("Försäljningsanalys {}", period);
    println!(
        "Rader: {} ({}), {} ({}), {} ({})",
        analysis.rows_current,
        period.short_label(),
        analysis.rows_yoy,
        period.yoy().short_label(),
        analysis.rows_mom,
        period.mom().short_label()
    );

    preview_table(
        "KPI Year-over-Year",
        Some(&format!("{} vs {}", period.short_label(), period.yoy().short_label())),
        &analysis.kpi_yoy,
        usize::MAX,
    );
    preview_table(
        "KPI Month-over-Month",
        Some(&format!("{} vs {}", period.short_label(), period.mom().short_label())),
        &analysis.kpi_mom,
        usize::MAX,
    );

    for section in &analysis.dimensions {
        preview_table(
            &format!("{} - YoY", section.dimension),
            None,
            &section.yoy,
            usize::MAX,
        );
        preview_table(
            &format!("{} - MoM", section.dimension),
            None,
            &section.mom,
            usize::MAX,
        );
    }

    println!("Sammanfattning YoY:");
    for line in &analysis.summary_yoy {
        println!("  • {}", line);
    }
    println!("Sammanfattning MoM:");
    for line in &analysis.summary_mom {
        println!("  • {}", line);
    }
}
