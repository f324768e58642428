//! Section report display
//!
//! This module renders section reports and single statistics as plain text
//! tables in a consistent layout.

use sleepwise_analysis::{
    engine::{CorrelationMatrix, Crosstab, GroupComparison, GroupSummary, Scatter},
    feature::Frequencies,
    result::StatValue,
    section::{ItemOutcome, ItemReport, SectionReport},
};
use sleepwise_stats::{
    correlation::Correlation, descriptive::DescriptiveStats, histogram::Histogram,
    regression::LinearFit,
};

use crate::util::{format_p, format_value};

/// Width of the label column in every table.
const LABEL_WIDTH: usize = 24;
/// Width of a numeric column.
const VALUE_WIDTH: usize = 10;
/// Longest histogram bar, in characters.
const BAR_WIDTH: usize = 40;

/// Print a whole section: heading, label frequencies and every item
pub(crate) fn print_section_report(report: &SectionReport) {
    let heading = format!("Section {}: {}", report.number, report.title);
    println!("{heading}");
    println!("{}", "=".repeat(heading.len()));
    println!("Records: {}", report.records);
    println!();

    println!("Sleep categories");
    print_frequencies(&report.sleep_frequencies);
    println!("Chronotype categories");
    print_frequencies(&report.chronotype_frequencies);
    println!();

    for item in &report.items {
        print_item(item);
        println!();
    }
}

/// Print one item of a report
///
/// Skipped items are shown as `unavailable: <reason>`.
pub(crate) fn print_item(item: &ItemReport) {
    println!("{}", item.title);
    match &item.outcome {
        ItemOutcome::Skipped { reason } => println!("  unavailable: {reason}"),
        ItemOutcome::Computed { result } => match &result.value {
            StatValue::Descriptive(stats) => print_descriptive_table(&[("all", stats)]),
            StatValue::Histogram(histogram) => print_histogram(histogram),
            StatValue::Frequencies(freq) => print_frequencies(freq),
            StatValue::Correlation(corr) => print_correlation(corr),
            StatValue::CorrelationMatrix(matrix) => print_matrix(matrix),
            StatValue::GroupComparison(comparison) => print_comparison(comparison),
            StatValue::GroupSummaries(summaries) => print_group_summaries(summaries),
            StatValue::LinearFit(fit) => print_fit(fit),
            StatValue::Crosstab(table) => print_crosstab(table),
            StatValue::Scatter(scatter) => print_scatter(scatter),
        },
    }
}

fn print_descriptive_header() {
    println!(
        "  {:<LABEL_WIDTH$} {:>6} {:>VALUE_WIDTH$} {:>VALUE_WIDTH$} {:>VALUE_WIDTH$} {:>VALUE_WIDTH$} {:>VALUE_WIDTH$} {:>VALUE_WIDTH$} {:>VALUE_WIDTH$}",
        "Group", "N", "Mean", "Median", "Min", "Max", "Q1", "Q3", "StdDev",
    );
    // label + count(6) + 7 values + spaces(8)
    println!("  {}", "-".repeat(LABEL_WIDTH + 6 + 7 * VALUE_WIDTH + 8));
}

/// Print a table with one row of descriptive statistics per label
fn print_descriptive_table(rows: &[(&str, &DescriptiveStats)]) {
    print_descriptive_header();
    for (label, stats) in rows {
        println!(
            "  {:<LABEL_WIDTH$} {:>6} {:>VALUE_WIDTH$.2} {:>VALUE_WIDTH$.2} {:>VALUE_WIDTH$.2} {:>VALUE_WIDTH$.2} {:>VALUE_WIDTH$.2} {:>VALUE_WIDTH$.2} {:>VALUE_WIDTH$.2}",
            label,
            stats.count,
            stats.mean,
            stats.median,
            stats.min,
            stats.max,
            stats.q1,
            stats.q3,
            stats.std_dev,
        );
    }
}

fn print_group_summaries(summaries: &[GroupSummary]) {
    let labels = summaries
        .iter()
        .map(|summary| summary.group.to_string())
        .collect::<Vec<_>>();
    let rows = labels
        .iter()
        .zip(summaries)
        .map(|(label, summary)| (label.as_str(), &summary.stats))
        .collect::<Vec<_>>();
    print_descriptive_table(&rows);
}

#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn print_histogram(histogram: &Histogram) {
    let max_count = histogram.bins.iter().map(|bin| bin.count).max().unwrap_or(0);
    for bin in &histogram.bins {
        let range = format!("[{:.1}, {:.1})", bin.range.start, bin.range.end);
        let bar_len = if max_count == 0 {
            0
        } else {
            (bin.count as f64 / max_count as f64 * BAR_WIDTH as f64).round() as usize
        };
        println!(
            "  {range:<LABEL_WIDTH$} {:>6} {}",
            bin.count,
            "#".repeat(bar_len)
        );
    }
}

fn print_frequencies(freq: &Frequencies) {
    println!("  {:<LABEL_WIDTH$} {:>6} {:>VALUE_WIDTH$}", "Label", "N", "Percent");
    println!("  {}", "-".repeat(LABEL_WIDTH + 6 + VALUE_WIDTH + 2));
    for entry in &freq.entries {
        println!(
            "  {:<LABEL_WIDTH$} {:>6} {:>9.1}%",
            entry.label, entry.count, entry.percent
        );
    }
    println!("  {:<LABEL_WIDTH$} {:>6}", "Total", freq.total);
}

fn print_correlation(corr: &Correlation) {
    println!(
        "  r = {:.3}, p = {}, n = {}",
        corr.r,
        format_p(corr.p_value),
        corr.n
    );
}

fn print_matrix(matrix: &CorrelationMatrix) {
    print!("  {:<LABEL_WIDTH$}", "");
    for i in 1..=matrix.columns.len() {
        print!(" {:>6}", format!("[{i}]"));
    }
    println!();
    for ((i, column), row) in matrix.columns.iter().enumerate().zip(&matrix.values) {
        print!("  {:<LABEL_WIDTH$}", format!("[{}] {column}", i + 1));
        for value in row {
            print!(" {:>6}", format_value(*value, 2));
        }
        println!();
    }
}

fn print_comparison(comparison: &GroupComparison) {
    let test = &comparison.test;
    let first = comparison.first.to_string();
    let second = comparison.second.to_string();
    print_descriptive_table(&[
        (first.as_str(), &test.first),
        (second.as_str(), &test.second),
    ]);
    println!(
        "  Welch t = {:.3}, df = {:.2}, p = {}",
        test.t,
        test.df,
        format_p(test.p_value)
    );
}

fn print_fit(fit: &LinearFit) {
    println!(
        "  slope = {:.4} (SE {:.4}), intercept = {:.4}",
        fit.slope, fit.slope_std_err, fit.intercept
    );
    println!(
        "  R² = {:.3}, p = {}, n = {}",
        fit.r_squared,
        format_p(fit.p_value),
        fit.n
    );
}

fn print_crosstab(table: &Crosstab) {
    print!("  {:<LABEL_WIDTH$}", "");
    for column in &table.columns {
        print!(" {:>VALUE_WIDTH$}", column.to_string());
    }
    println!();
    for (i, row) in table.rows.iter().enumerate() {
        print!("  {:<LABEL_WIDTH$}", row.to_string());
        match &table.row_percent {
            Some(percent) => {
                for value in &percent[i] {
                    print!(" {value:>9.1}%");
                }
            }
            None => {
                for count in &table.counts[i] {
                    print!(" {count:>VALUE_WIDTH$}");
                }
            }
        }
        println!();
    }
    println!("  n = {}", table.n);
}

fn print_scatter(scatter: &Scatter) {
    println!("  {} points", scatter.points.len());
    let mut groups = scatter
        .points
        .iter()
        .filter_map(|point| point.group.as_ref())
        .collect::<Vec<_>>();
    groups.sort();
    groups.dedup();
    for group in groups {
        let count = scatter
            .points
            .iter()
            .filter(|point| point.group.as_ref() == Some(group))
            .count();
        println!("  {:<LABEL_WIDTH$} {count:>6}", group.to_string());
    }
}
