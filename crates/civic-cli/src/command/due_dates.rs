use clap::Args;
use civic_analysis::report::{DueDateSummary, Population};

use crate::command::CollectionArg;

#[derive(Debug, Clone, Args)]
pub(crate) struct DueDatesArg {
    #[clap(flatten)]
    pub input: CollectionArg,
}

pub(crate) fn run(arg: &DueDatesArg) -> anyhow::Result<()> {
    let collection = arg.input.load()?;
    let summary = DueDateSummary::build(&Population::new(&collection));

    println!("Days from Receipt to Due Date");
    let Some(stats) = &summary.stats else {
        println!("  No complaints with a due date");
        return Ok(());
    };
    println!("  Complaints: {}", stats.count);
    println!(
        "  Min: {:.0}  Max: {:.0}  Mean: {:.1}  Median: {:.1}  Std Dev: {:.1}",
        stats.min, stats.max, stats.mean, stats.median, stats.std_dev
    );
    println!();

    println!("  {:>8} {:>10}", "Days", "Complaints");
    println!("  {}", "-".repeat(19));
    for (days, count) in &summary.frequencies {
        println!("  {days:>8} {count:>10}");
    }

    Ok(())
}
