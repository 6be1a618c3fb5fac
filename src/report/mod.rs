//! Console and file renderers for insight tables.
//!
//! Both sinks share one plain-text renderer: table name and description
//! lines, then a column-width-aligned grid with separator rules.

use std::fs;
use std::io;
use std::path::Path;

use tracing::info;

use crate::models::{InsightMap, InsightTable};

/// Render one table to aligned plain text.
pub fn render_table(table: &InsightTable) -> String {
    let mut widths: Vec<usize> = table.headers.iter().map(String::len).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let format_row = |row: &[String]| -> String {
        row.iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let header_row = format_row(&table.headers);
    let rule = "-".repeat(header_row.len());

    let mut out = String::new();
    out.push_str(&format!("Sheet Name: {}\n", table.name));
    out.push_str(&format!("Description: {}\n", table.description));
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&header_row);
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    for row in &table.rows {
        out.push_str(&format_row(row));
        out.push('\n');
    }
    out.push_str(&rule);
    out.push('\n');
    out
}

/// Print every table to stdout.
pub fn print_insights(insights: &InsightMap) {
    for table in insights.values() {
        println!("{}", render_table(table));
    }
}

/// Write every table to its own file under `dir`.
pub fn write_insights(insights: &InsightMap, dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    for table in insights.values() {
        let filename = format!("{}.txt", table.name.replace([' ', '/'], "_"));
        fs::write(dir.join(&filename), render_table(table))?;
    }
    info!("wrote {} insight tables to {:?}", insights.len(), dir);
    Ok(())
}
