use std::path::PathBuf;

use clap::Args;
use civic_analysis::{filter::CaseState, geojson::FeatureCollection, report::Population};

use crate::{command::CollectionArg, util};

#[derive(Debug, Clone, Args)]
pub(crate) struct GeojsonArg {
    #[clap(flatten)]
    pub input: CollectionArg,

    /// Which complaints to export: open or closed
    #[arg(long, default_value = "open")]
    pub status: CaseState,

    /// Output file path (defaults to stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &GeojsonArg) -> anyhow::Result<()> {
    let collection = arg.input.load()?;
    let population = Population::new(&collection);
    let features = FeatureCollection::older_than_one_year(&population, arg.status);
    util::save_json(&features, arg.output.as_deref())
}
