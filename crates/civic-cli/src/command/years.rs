use clap::Args;
use civic_analysis::{dimension::Dimension, report::Population};

use crate::command::{
    CollectionArg,
    table::{self, SurvivalTableRow},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct YearsArg {
    #[clap(flatten)]
    pub input: CollectionArg,
}

pub(crate) fn run(arg: &YearsArg) -> anyhow::Result<()> {
    let collection = arg.input.load()?;
    let population = Population::new(&collection);
    let reports = population.group_reports(Dimension::Year)?;

    table::print_legend();
    println!();

    println!("Response Times by Year Received");
    table::print_survival_table(
        Dimension::Year.label(),
        reports
            .iter()
            .map(|report| SurvivalTableRow::new(&report.key, &report.summary)),
    );

    Ok(())
}
