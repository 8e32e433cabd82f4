//! Citywide response-time report
//!
//! Prints complaint counts by status and priority tier, then the KM median
//! wait overall and per region.

use std::path::PathBuf;

use clap::Args;
use civic_analysis::report::{CountRow, OverallReport, Population};

use crate::{
    command::{CollectionArg, table},
    util::{self, fmt_opt},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalyzeArg {
    #[clap(flatten)]
    pub input: CollectionArg,

    /// Also write the report as JSON to this path
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let collection = arg.input.load()?;
    let population = Population::new(&collection);
    let report = OverallReport::build(&population)?;

    println!("Complaint Response Report (cutoff {})", report.cutoff);
    println!("==========================================\n");

    if report.excluded > 0 {
        println!(
            "  {} complaints dated after their closing date or the cutoff were excluded\n",
            report.excluded
        );
    }

    table::print_priority_legend();
    println!();

    print_counts(&report);
    println!();
    print_waits(&report);

    if let Some(path) = &arg.json {
        util::save_json(&report, Some(path.as_path()))?;
    }

    Ok(())
}

fn print_counts(report: &OverallReport) {
    fn print_row(label: &str, row: &CountRow) {
        println!(
            "  {:<24} {:>8} {}",
            label,
            row.total,
            table::priority_counts(&row.by_priority)
        );
    }

    println!("Complaints by Status");
    println!("  {:<24} {:>8} {}", "Status", "Total", table::priority_header());
    println!("  {}", "-".repeat(59));
    print_row("All", &report.total);
    print_row("Open", &report.open);
    print_row("Closed", &report.closed);
    print_row("Open > 1 year", &report.open_over_one_year);
    print_row("Closed after > 1 year", &report.closed_over_one_year);
}

fn print_waits(report: &OverallReport) {
    println!("Median Days to Response (Kaplan-Meier)");
    println!(
        "  {:<24} {:>8} {:>10} {:>10} {}",
        "Region",
        "Total",
        "Per Year",
        "Median",
        table::priority_header()
    );
    println!("  {}", "-".repeat(81));
    println!(
        "  {:<24} {:>8} {:>10} {:>10} {}",
        "Citywide",
        report.total.total,
        "",
        fmt_opt(report.median_wait),
        table::priority_days(&report.median_wait_by_priority)
    );
    for region in &report.regions {
        println!(
            "  {:<24} {:>8} {:>10} {:>10} {}",
            region.name,
            region.total,
            fmt_opt(region.avg_complaints_per_year),
            fmt_opt(region.median_wait),
            table::priority_days(&region.median_wait_by_priority)
        );
    }
    println!();
    for region in &report.regions {
        println!(
            "  {}: {} complaints open, or resolved, after more than a year",
            region.name, region.gt_year
        );
    }
}
