use std::path::PathBuf;

use clap::Args;
use civic_analysis::{report::Population, status::AnnotatedComplaint};

use crate::{command::CollectionArg, util};

#[derive(Debug, Clone, Args)]
pub(crate) struct AnnotateArg {
    #[clap(flatten)]
    pub input: CollectionArg,

    /// List other complaints filed at the same address
    #[arg(long)]
    pub related: bool,

    /// Output file path (defaults to stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &AnnotateArg) -> anyhow::Result<()> {
    let collection = arg.input.load()?;
    let population = arg.related.then(|| Population::new(&collection));

    let annotated = collection
        .complaints
        .iter()
        .map(|complaint| {
            let annotated = AnnotatedComplaint::new(complaint, collection.cutoff);
            match &population {
                Some(population) => annotated.with_related_complaints(
                    population
                        .related_complaints(complaint)
                        .map(|c| c.csr)
                        .collect(),
                ),
                None => annotated,
            }
        })
        .collect::<Vec<_>>();
    util::save_json(&annotated, arg.output.as_deref())
}
