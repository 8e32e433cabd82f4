use clap::Args;
use civic_analysis::report::{Population, ProblemTypeBreakdown};

use crate::command::CollectionArg;

#[derive(Debug, Clone, Args)]
pub(crate) struct BreakdownArg {
    #[clap(flatten)]
    pub input: CollectionArg,

    /// Number of problem types to list per region
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

pub(crate) fn run(arg: &BreakdownArg) -> anyhow::Result<()> {
    let collection = arg.input.load()?;
    let population = Population::new(&collection);

    for breakdown in ProblemTypeBreakdown::build_all(&population, arg.top) {
        println!("{}", breakdown.region);
        for entry in &breakdown.types {
            println!("  {:>6}  {}", entry.count, entry.problem_type);
        }
        println!();
    }

    Ok(())
}
