use std::path::PathBuf;

use clap::Args;
use civic_analysis::report::{NeighborhoodReport, Population};

use crate::{
    command::CollectionArg,
    util::{self, fmt_opt, fmt_percent},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct NeighborhoodsArg {
    #[clap(flatten)]
    pub input: CollectionArg,

    /// Also write the rows as JSON to this path
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub(crate) fn run(arg: &NeighborhoodsArg) -> anyhow::Result<()> {
    let collection = arg.input.load()?;
    let population = Population::new(&collection);
    let reports = NeighborhoodReport::build_all(&population)?;

    println!("Neighborhoods");
    println!(
        "  {:<28} {:>8} {:>8} {:>8} {:>10} {:>10} {:>10} {:>10}",
        "Neighborhood", "Total", "Open", "Closed", ">1yr Open", ">1yr%", "Avg Days", "Median(KM)"
    );
    println!("  {}", "-".repeat(99));
    for report in &reports {
        let counts = &report.counts;
        println!(
            "  {:<28} {:>8} {:>8} {:>8} {:>10} {:>10} {:>10} {:>10}",
            report.name,
            counts.total_complaints,
            counts.open_complaints,
            counts.closed_complaints,
            counts.open_over_one_year,
            fmt_percent(counts.percent_over_one_year_to_response),
            fmt_opt(counts.avg_days_to_response),
            fmt_opt(report.kmf_median_days_to_response),
        );
    }

    if let Some(path) = &arg.json {
        util::save_json(&reports, Some(path.as_path()))?;
    }

    Ok(())
}
