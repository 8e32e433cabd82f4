use std::{fmt::Write as _, path::PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use civic_analysis::report::{DistrictReport, Population};

use crate::{
    command::{CollectionArg, table},
    util::{self, fmt_opt},
};

const CSV_HEADER: &str = "district_number,complaints,csr1_complaints,csr2_complaints,\
csr3_complaints,median_wait,median_wait_csr1,median_wait_csr2,median_wait_csr3,mean_wait";

#[derive(Debug, Clone, Args)]
pub(crate) struct DistrictsArg {
    #[clap(flatten)]
    pub input: CollectionArg,

    /// Only count complaints received on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub received_since: Option<NaiveDate>,

    /// Export the table as CSV to this path
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

pub(crate) fn run(arg: &DistrictsArg) -> anyhow::Result<()> {
    let collection = arg.input.load()?;
    let population = Population::new(&collection);
    let reports = DistrictReport::build_all(&population, arg.received_since)?;

    table::print_priority_legend();
    println!();

    match arg.received_since {
        Some(since) => println!("Inspection Districts (received since {since})"),
        None => println!("Inspection Districts"),
    }
    println!(
        "  {:<10} {:>10} {} {:>10} {} {:>10}",
        "District",
        "Complaints",
        table::priority_header(),
        "Median",
        table::priority_header(),
        "Mean(KM)"
    );
    println!("  {}", "-".repeat(87));
    for report in &reports {
        println!(
            "  {:<10} {:>10} {} {:>10} {} {:>10}",
            report.district_number,
            report.complaints,
            table::priority_counts(&report.complaints_by_priority),
            fmt_opt(report.median_wait),
            table::priority_days(&report.median_wait_by_priority),
            fmt_opt(report.mean_wait),
        );
    }

    if let Some(path) = &arg.csv {
        let csv = to_csv(&reports)?;
        util::save_text(&csv, Some(path.as_path()))?;
    }

    Ok(())
}

/// Renders one line per district; undefined values are left empty.
fn to_csv(reports: &[DistrictReport]) -> anyhow::Result<String> {
    fn cell(value: Option<f64>) -> String {
        value.map(|v| v.to_string()).unwrap_or_default()
    }

    let mut csv = format!("{CSV_HEADER}\n");
    for report in reports {
        let counts = &report.complaints_by_priority;
        let waits = &report.median_wait_by_priority;
        writeln!(
            &mut csv,
            "{},{},{},{},{},{},{},{},{},{}",
            report.district_number,
            report.complaints,
            counts.csr1,
            counts.csr2,
            counts.csr3,
            cell(report.median_wait),
            cell(waits.csr1),
            cell(waits.csr2),
            cell(waits.csr3),
            cell(report.mean_wait),
        )
        .with_context(|| {
            format!(
                "Failed to write CSV row for district {}",
                report.district_number
            )
        })?;
    }
    Ok(csv)
}

#[cfg(test)]
mod tests {
    use civic_analysis::counts::ByPriority;

    use super::*;

    #[test]
    fn test_csv_leaves_undefined_medians_empty() {
        let report = DistrictReport {
            district_number: "1101".into(),
            complaints: 3,
            complaints_by_priority: ByPriority {
                csr1: 1,
                csr2: 0,
                csr3: 2,
            },
            median_wait: Some(12.0),
            median_wait_by_priority: ByPriority {
                csr1: Some(3.0),
                csr2: None,
                csr3: None,
            },
            mean_wait: Some(20.5),
        };
        let csv = to_csv(&[report]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(lines.next(), Some("1101,3,1,0,2,12,3,,,20.5"));
        assert_eq!(lines.next(), None);
    }
}
