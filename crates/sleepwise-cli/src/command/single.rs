//! Single-statistic commands
//!
//! Each command runs one plan item outside of any section and prints it in the
//! same layout as `analyze`.

use clap::Args;
use sleepwise_analysis::{
    engine::GroupBy,
    schema::ColumnRole,
    section::{Analysis, ItemOutcome, ItemReport, PlanItem},
};

use super::analyze::table;

#[derive(Debug, Clone, Args)]
pub(crate) struct DescribeArg {
    /// Column to summarize (e.g. psqi, trait_anxiety, chronotype)
    pub column: ColumnRole,

    /// Also print a histogram of the column
    #[arg(long)]
    pub histogram: bool,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct CorrelateArg {
    pub first: ColumnRole,
    pub second: ColumnRole,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct CompareArg {
    /// Numeric column to compare
    pub value: ColumnRole,
    /// Grouping: sleep_quality, chronotype_category or a column with two values
    pub group: GroupBy,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct FitArg {
    pub predictor: ColumnRole,
    pub response: ColumnRole,
}

fn print_plan_item(analysis: &Analysis, item: &PlanItem) {
    let outcome = match item.execute(&analysis.engine(), analysis.config()) {
        Ok(result) => ItemOutcome::Computed { result },
        Err(reason) => ItemOutcome::Skipped { reason },
    };
    table::print_item(&ItemReport {
        title: item.title(),
        outcome,
    });
}

pub(crate) fn run_describe(arg: &DescribeArg, analysis: &Analysis) {
    print_plan_item(analysis, &PlanItem::Describe(arg.column));
    if arg.histogram {
        println!();
        print_plan_item(analysis, &PlanItem::Histogram(arg.column));
    }
}

pub(crate) fn run_correlate(arg: &CorrelateArg, analysis: &Analysis) {
    print_plan_item(analysis, &PlanItem::Correlate(arg.first, arg.second));
}

pub(crate) fn run_compare(arg: &CompareArg, analysis: &Analysis) {
    print_plan_item(
        analysis,
        &PlanItem::GroupSummaries {
            value: arg.value,
            by: arg.group,
        },
    );
    println!();
    print_plan_item(
        analysis,
        &PlanItem::CompareGroups {
            value: arg.value,
            by: arg.group,
        },
    );
}

pub(crate) fn run_fit(arg: &FitArg, analysis: &Analysis) {
    print_plan_item(
        analysis,
        &PlanItem::FitLinear {
            predictor: arg.predictor,
            response: arg.response,
        },
    );
}
