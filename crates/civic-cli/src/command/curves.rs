//! Kaplan-Meier curve export
//!
//! Writes the fitted breakpoints of every group as one CSV table for
//! plotting.

use std::{fmt::Write as _, path::PathBuf};

use anyhow::Context;
use clap::Args;
use civic_analysis::{
    dimension::Dimension,
    report::{GroupReport, Population},
};

use crate::{command::CollectionArg, util};

#[derive(Debug, Clone, Args)]
pub(crate) struct CurvesArg {
    #[clap(flatten)]
    pub input: CollectionArg,

    /// Grouping: region, district, neighborhood, priority, year or problem
    #[arg(long, default_value = "region")]
    pub by: Dimension,

    /// Output CSV path (defaults to stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &CurvesArg) -> anyhow::Result<()> {
    let collection = arg.input.load()?;
    let population = Population::new(&collection);
    let reports = population.group_reports(arg.by)?;
    tracing::info!(dimension = %arg.by, groups = reports.len(), "fitted curves");

    let csv = to_csv(&reports)?;
    util::save_text(&csv, arg.output.as_deref())
}

fn to_csv(reports: &[GroupReport]) -> anyhow::Result<String> {
    let mut csv = String::from("group,time,survival,at_risk,events,censored\n");

    for report in reports {
        let group = quote(&report.key);
        for point in report.summary.km_curve.breakpoints() {
            writeln!(
                &mut csv,
                "{},{},{},{},{},{}",
                group, point.time, point.survival, point.at_risk, point.events, point.censored
            )
            .with_context(|| format!("Failed to write CSV data for group {}", report.key))?;
        }
    }

    Ok(csv)
}

/// Quotes a CSV field when it contains a delimiter or a quote.
fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}
