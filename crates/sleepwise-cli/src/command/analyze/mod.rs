//! Section analysis command
//!
//! Runs the fixed plan of one or all analytic sections and prints each report
//! as tables, or writes the reports as a single JSON document.

pub(super) mod table;

use std::{path::PathBuf, str::FromStr};

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use sleepwise_analysis::section::{
    Analysis, AnalysisConfig, Section, SectionReport, UnknownSectionError,
};

use super::session::SessionArg;
use crate::util::Output;

/// Which sections to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SectionSelector {
    All,
    One(Section),
}

impl SectionSelector {
    fn sections(self) -> Vec<Section> {
        match self {
            Self::All => Section::ALL.to_vec(),
            Self::One(section) => vec![section],
        }
    }
}

impl FromStr for SectionSelector {
    type Err = UnknownSectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::One)
    }
}

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalyzeArg {
    /// Section to run: all, 1, 2 or 3
    #[arg(long, default_value = "all")]
    pub section: SectionSelector,

    /// Write the JSON report to this file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Print the JSON report to stdout instead of tables
    #[arg(long)]
    pub json: bool,
}

/// JSON document written by `analyze`.
#[derive(Debug, Serialize)]
struct AnalysisOutput<'a> {
    generated_at: DateTime<Utc>,
    source: String,
    records: usize,
    config: &'a AnalysisConfig,
    sections: Vec<SectionReport>,
}

pub(crate) fn run(
    arg: &AnalyzeArg,
    session: &SessionArg,
    analysis: &Analysis,
) -> anyhow::Result<()> {
    let reports = arg
        .section
        .sections()
        .into_iter()
        .map(|section| analysis.run(section))
        .collect::<Vec<_>>();

    if arg.json || arg.output.is_some() {
        let output = AnalysisOutput {
            generated_at: Utc::now(),
            source: session.source.to_string(),
            records: analysis.dataset().len(),
            config: analysis.config(),
            sections: reports,
        };
        return Output::save_json(&output, arg.output.as_deref());
    }

    println!("Source: {}", session.source);
    println!();
    for report in &reports {
        table::print_section_report(report);
    }
    Ok(())
}
