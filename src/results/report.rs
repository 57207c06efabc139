//! Terminal rendering of results: summary table, box plots, bar charts and
//! the raw records.

use std::fmt::Write as _;

use prettytable::format::consts::FORMAT_BOX_CHARS;
use prettytable::{Cell, Row, Table};

use super::analyzer::{BoxStats, Coverage, Summary};
use super::table::{Metric, ResultsTable};
use crate::contract::ContractVariant;
use crate::experiment::MeasurementRecord;
use crate::Result;

/// Width of box plots and bars, in characters
pub const CHART_WIDTH: usize = 40;

/// Two-decimal rendering; undefined improvements show as `n/a`.
#[must_use]
pub fn format_improvement(pct: Option<f64>) -> String {
    pct.map_or_else(|| "n/a".to_string(), |p| format!("{p:.2}"))
}

/// Summary table: one row per metric with both means and the improvement.
#[must_use]
pub fn summary_table(summary: &Summary) -> String {
    let mut table = Table::new();
    table.set_format(*FORMAT_BOX_CHARS);
    table.set_titles(Row::new(vec![
        Cell::new("Operation"),
        Cell::new(ContractVariant::Basic.contract_name()),
        Cell::new(ContractVariant::Lightweight.contract_name()),
        Cell::new("Improvement (%)"),
    ]));
    for row in summary.rows() {
        table.add_row(Row::new(vec![
            Cell::new(row.metric.label()),
            Cell::new(&format!("{:.2}", row.basic_mean)),
            Cell::new(&format!("{:.2}", row.lightweight_mean)),
            Cell::new(&format_improvement(row.improvement_pct)),
        ]));
    }
    table.to_string()
}

/// Raw measurement records.
#[must_use]
pub fn raw_table(records: &[MeasurementRecord]) -> String {
    let mut table = Table::new();
    table.set_format(*FORMAT_BOX_CHARS);
    table.set_titles(Row::new(
        [
            "contract_name",
            "index",
            "add_gas_used",
            "add_time",
            "delete_gas_used",
            "delete_time",
        ]
        .into_iter()
        .map(Cell::new)
        .collect(),
    ));
    for record in records {
        table.add_row(Row::new(vec![
            Cell::new(record.contract_name()),
            Cell::new(&record.index().to_string()),
            Cell::new(&record.add_gas_used().to_string()),
            Cell::new(&format!("{:.4}", record.add_time_ms())),
            Cell::new(&record.delete_gas_used().to_string()),
            Cell::new(&format!("{:.4}", record.delete_time_ms())),
        ]));
    }
    table.to_string()
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn scale(value: f64, lo: f64, hi: f64, width: usize) -> usize {
    if hi <= lo {
        return 0;
    }
    let pos = ((value - lo) / (hi - lo) * (width - 1) as f64).round();
    (pos.max(0.0) as usize).min(width - 1)
}

/// One box-plot line: `|` whiskers at min/max, `=` box from q1 to q3, `#`
/// at the median, scaled to `[lo, hi]`.
#[must_use]
pub fn box_line(stats: &BoxStats, lo: f64, hi: f64, width: usize) -> String {
    let mut line = vec![' '; width];
    let min = scale(stats.min, lo, hi, width);
    let max = scale(stats.max, lo, hi, width);
    let q1 = scale(stats.q1, lo, hi, width);
    let q3 = scale(stats.q3, lo, hi, width);

    for c in &mut line[min..=max] {
        *c = '-';
    }
    for c in &mut line[q1..=q3] {
        *c = '=';
    }
    line[min] = '|';
    line[max] = '|';
    line[scale(stats.median, lo, hi, width)] = '#';
    line.into_iter().collect()
}

/// Box plots of every metric, both variants on a shared axis.
///
/// # Errors
///
/// Returns error if metric columns cannot be read.
pub fn box_plots(table: &ResultsTable) -> Result<String> {
    let mut out = String::new();
    for metric in Metric::ALL {
        let mut per_variant = Vec::with_capacity(2);
        for variant in ContractVariant::ALL {
            let values = table.partition(variant)?.metric_values(metric)?;
            per_variant.push((variant, BoxStats::from_values(&values)));
        }

        let present = per_variant.iter().filter_map(|(_, s)| s.as_ref());
        let lo = present.clone().map(|s| s.min).fold(f64::INFINITY, f64::min);
        let hi = present.map(|s| s.max).fold(f64::NEG_INFINITY, f64::max);

        let _ = writeln!(out, "{}", metric.label());
        for (variant, stats) in &per_variant {
            match stats {
                Some(stats) => {
                    let _ = writeln!(
                        out,
                        "  {:<20} {}  median {:.2} (q1 {:.2}, q3 {:.2})",
                        variant.contract_name(),
                        box_line(stats, lo, hi, CHART_WIDTH),
                        stats.median,
                        stats.q1,
                        stats.q3,
                    );
                }
                None => {
                    let _ = writeln!(out, "  {:<20} (no data)", variant.contract_name());
                }
            }
        }
        if lo.is_finite() && hi.is_finite() {
            let _ = writeln!(out, "  {:<20} {lo:<.2} .. {hi:.2}", "");
        }
        out.push('\n');
    }
    Ok(out)
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn bar(value: f64, max: f64) -> String {
    let len = if max > 0.0 {
        ((value / max) * CHART_WIDTH as f64).round().max(0.0) as usize
    } else {
        0
    };
    "█".repeat(len.min(CHART_WIDTH))
}

fn bar_chart(out: &mut String, title: &str, unit: &str, summary: &Summary, metrics: [Metric; 2]) {
    let rows: Vec<_> = metrics.iter().filter_map(|m| summary.row(*m)).collect();
    let max = rows
        .iter()
        .flat_map(|r| [r.basic_mean, r.lightweight_mean])
        .fold(0.0_f64, f64::max);

    let _ = writeln!(out, "{title} ({unit})");
    for (row, operation) in rows.iter().zip(["Add Operation", "Delete Operation"]) {
        let _ = writeln!(
            out,
            "  {operation}: {}% improvement",
            row.improvement_pct
                .map_or_else(|| "n/a".to_string(), |p| format!("{p:.1}"))
        );
        let _ = writeln!(
            out,
            "    {:<20} {:<width$} {:.2}",
            ContractVariant::Basic.contract_name(),
            bar(row.basic_mean, max),
            row.basic_mean,
            width = CHART_WIDTH
        );
        let _ = writeln!(
            out,
            "    {:<20} {:<width$} {:.2}",
            ContractVariant::Lightweight.contract_name(),
            bar(row.lightweight_mean, max),
            row.lightweight_mean,
            width = CHART_WIDTH
        );
    }
    out.push('\n');
}

/// Gas and time comparison bars with improvement annotations.
#[must_use]
pub fn bar_charts(summary: &Summary) -> String {
    let mut out = String::new();
    bar_chart(
        &mut out,
        "Gas Usage Comparison",
        "Gas Used",
        summary,
        [Metric::AddGasUsed, Metric::DeleteGasUsed],
    );
    bar_chart(
        &mut out,
        "Execution Time Comparison",
        "ms",
        summary,
        [Metric::AddTime, Metric::DeleteTime],
    );
    out
}

/// Human-readable coverage problems, empty when complete.
#[must_use]
pub fn coverage_warnings(coverage: &Coverage) -> Vec<String> {
    let mut warnings = Vec::new();
    for (index, variant) in &coverage.missing {
        warnings.push(format!("row {index}: no {variant} measurement"));
    }
    for (index, variant) in &coverage.duplicated {
        warnings.push(format!("row {index}: multiple {variant} measurements"));
    }
    for name in &coverage.unknown_contracts {
        warnings.push(format!("unexpected contract name {name:?}"));
    }
    warnings
}
