use clap::{Parser, Subcommand};

use self::{
    analyze::AnalyzeArg,
    session::SessionArg,
    single::{CompareArg, CorrelateArg, DescribeArg, FitArg},
};

mod analyze;
mod session;
mod single;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v: info, -vv: debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    session: SessionArg,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run the analytic sections and print or save their reports
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Summary statistics of one column
    Describe(#[clap(flatten)] DescribeArg),
    /// Pearson correlation between two columns
    Correlate(#[clap(flatten)] CorrelateArg),
    /// Welch's t-test of a column between two groups
    Compare(#[clap(flatten)] CompareArg),
    /// Least-squares fit of one column on another
    Fit(#[clap(flatten)] FitArg),
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logging(args.verbose);

    let analysis = args.session.open()?;
    match &args.mode {
        Mode::Analyze(arg) => analyze::run(arg, &args.session, &analysis)?,
        Mode::Describe(arg) => single::run_describe(arg, &analysis),
        Mode::Correlate(arg) => single::run_correlate(arg, &analysis),
        Mode::Compare(arg) => single::run_compare(arg, &analysis),
        Mode::Fit(arg) => single::run_fit(arg, &analysis),
    }
    Ok(())
}
