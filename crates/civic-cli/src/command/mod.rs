use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use civic_analysis::complaint::ComplaintCollection;

use self::{
    analyze::AnalyzeArg, annotate::AnnotateArg, breakdown::BreakdownArg, curves::CurvesArg,
    districts::DistrictsArg, due_dates::DueDatesArg, geojson::GeojsonArg,
    neighborhoods::NeighborhoodsArg, years::YearsArg,
};
use crate::util;

mod analyze;
mod annotate;
mod breakdown;
mod curves;
mod districts;
mod due_dates;
mod geojson;
mod neighborhoods;
mod table;
mod years;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// What to report
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Print complaints with their derived status as JSON
    Annotate(#[clap(flatten)] AnnotateArg),
    /// Citywide and regional response times
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Response times per inspection district
    Districts(#[clap(flatten)] DistrictsArg),
    /// Status roll-up per neighborhood
    Neighborhoods(#[clap(flatten)] NeighborhoodsArg),
    /// Response times per year of receipt
    Years(#[clap(flatten)] YearsArg),
    /// Most frequent problem types per region
    Breakdown(#[clap(flatten)] BreakdownArg),
    /// Export Kaplan-Meier curves as CSV
    Curves(#[clap(flatten)] CurvesArg),
    /// Export complaints unresolved after a year as GeoJSON
    Geojson(#[clap(flatten)] GeojsonArg),
    /// Summarize the interval between receipt and due date
    DueDates(#[clap(flatten)] DueDatesArg),
}

/// Input shared by every subcommand
#[derive(Debug, Clone, Args)]
pub(crate) struct CollectionArg {
    /// Path to the complaint collection JSON file
    pub complaints: PathBuf,

    /// Override the collection's cutoff date (YYYY-MM-DD)
    #[arg(long)]
    pub cutoff: Option<NaiveDate>,
}

impl CollectionArg {
    pub(crate) fn load(&self) -> anyhow::Result<ComplaintCollection> {
        util::read_complaints_file(&self.complaints, self.cutoff)
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    util::init_logging(args.verbose);

    match args.mode {
        Mode::Annotate(arg) => annotate::run(&arg)?,
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::Districts(arg) => districts::run(&arg)?,
        Mode::Neighborhoods(arg) => neighborhoods::run(&arg)?,
        Mode::Years(arg) => years::run(&arg)?,
        Mode::Breakdown(arg) => breakdown::run(&arg)?,
        Mode::Curves(arg) => curves::run(&arg)?,
        Mode::Geojson(arg) => geojson::run(&arg)?,
        Mode::DueDates(arg) => due_dates::run(&arg)?,
    }
    Ok(())
}
