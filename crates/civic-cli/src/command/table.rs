//! Survival table display
//!
//! Shared fixed-width layout for commands that print one
//! [`SurvivalSummary`] per group.

use civic_analysis::{complaint::Priority, counts::ByPriority, survival::SurvivalSummary};

use crate::util::fmt_opt;

/// A row in a survival table
pub(super) struct SurvivalTableRow<'a> {
    /// Label for this row (e.g., year, region, priority tier)
    pub label: String,
    pub stats: &'a SurvivalSummary,
}

impl<'a> SurvivalTableRow<'a> {
    pub(super) fn new(label: impl Into<String>, stats: &'a SurvivalSummary) -> Self {
        Self {
            label: label.into(),
            stats,
        }
    }
}

fn print_survival_table_header(label_col: &str) {
    println!(
        "  {:<20} {:>8} {:>8} {:>12} {:>12} {:>12} {:>12}",
        label_col, "Cases", "Open%", "Mean(Closed)", "Mean(All)", "Median(KM)", "Mean(KM)",
    );
}

fn print_survival_table_separator() {
    // label(20) + cases(8) + open%(8) + 4 * 12 + spaces(6)
    println!("  {}", "-".repeat(90));
}

fn print_survival_table_row(row: &SurvivalTableRow) {
    let stats = row.stats;
    println!(
        "  {:<20} {:>8} {:>7.1}% {:>12} {:>12.1} {:>12} {:>12.1}",
        row.label,
        stats.count,
        stats.censoring_rate(),
        fmt_opt(stats.mean_closed),
        stats.mean_all,
        fmt_opt(stats.median_km),
        stats.restricted_mean_km,
    );
}

pub(super) fn print_survival_table<'a, I>(label_col: &str, rows: I)
where
    I: IntoIterator<Item = SurvivalTableRow<'a>>,
{
    print_survival_table_header(label_col);
    print_survival_table_separator();

    for row in rows {
        print_survival_table_row(&row);
    }
}

/// Print legend explaining survival table columns
pub(super) fn print_legend() {
    println!("Legend:");
    println!("  Open%        : Share of complaints still open at the cutoff (censored)");
    println!("  Mean(Closed) : Mean days to response of closed complaints only");
    println!("  Mean(All)    : Naive mean days of all complaints, open ones aged to the cutoff");
    println!("  Median(KM)   : Kaplan-Meier median days to response (N/A below 50% closed)");
    println!("  Mean(KM)     : Kaplan-Meier mean days, restricted to the longest observed case");
}

/// Per-tier columns: `CSR1 CSR2 CSR3`.
pub(super) fn priority_header() -> String {
    Priority::ALL
        .map(|priority| format!("{:>8}", format!("CSR{}", priority.tier())))
        .join(" ")
}

pub(super) fn priority_counts(counts: &ByPriority<usize>) -> String {
    Priority::ALL
        .map(|priority| format!("{:>8}", counts.get(priority)))
        .join(" ")
}

pub(super) fn priority_days(days: &ByPriority<Option<f64>>) -> String {
    Priority::ALL
        .map(|priority| format!("{:>8}", fmt_opt(*days.get(priority))))
        .join(" ")
}

/// Print legend naming the priority tier columns
pub(super) fn print_priority_legend() {
    println!("Priority tiers:");
    for priority in Priority::ALL {
        println!("  CSR{}         : {}", priority.tier(), priority.label());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_columns_line_up() {
        let header = priority_header();
        assert_eq!(header, "    CSR1     CSR2     CSR3");

        let counts = priority_counts(&ByPriority {
            csr1: 4,
            csr2: 0,
            csr3: 12,
        });
        assert_eq!(counts, "       4        0       12");

        let days = priority_days(&ByPriority {
            csr1: Some(2.0),
            csr2: None,
            csr3: Some(10.3),
        });
        assert_eq!(days, "     2.0      N/A     10.3");
        assert_eq!(days.len(), header.len());
    }
}
