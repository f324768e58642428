//! Options shared by every command: data source, scoring and loader settings

use std::time::Duration;

use anyhow::Context;
use clap::{Args, ValueEnum};
use sleepwise_analysis::{
    feature::SleepScoring,
    loader::{DEFAULT_SOURCE_URL, DataSource, DatasetLoader, LoaderConfig},
    section::{Analysis, AnalysisConfig},
};
use sleepwise_stats::histogram::DEFAULT_NUM_BINS;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ScoringPreset {
    /// Global PSQI score, good sleep at 5 or below
    Psqi,
    /// Pre-grouped psqi_2_groups code, good sleep at 1
    TwoGroup,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct SessionArg {
    /// CSV file path or http(s) URL of the survey data
    #[arg(long, global = true, default_value = DEFAULT_SOURCE_URL)]
    pub source: DataSource,

    /// Scoring used to split respondents into good and poor sleepers
    #[arg(long, global = true, value_enum, default_value_t = ScoringPreset::Psqi)]
    pub sleep_scoring: ScoringPreset,

    /// Highest score still counted as good sleep (overrides the preset)
    #[arg(long, global = true)]
    pub good_max: Option<f64>,

    /// Network timeout in seconds when the source is a URL
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Do not retry a fetch after a timeout or connection failure
    #[arg(long, global = true)]
    pub no_retry: bool,

    /// Number of main histogram bins
    #[arg(long, global = true, default_value_t = DEFAULT_NUM_BINS)]
    pub bins: usize,
}

impl SessionArg {
    pub(crate) fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            retry_transient: !self.no_retry,
        }
    }

    pub(crate) fn analysis_config(&self) -> AnalysisConfig {
        let mut scoring = match self.sleep_scoring {
            ScoringPreset::Psqi => SleepScoring::PSQI,
            ScoringPreset::TwoGroup => SleepScoring::TWO_GROUP,
        };
        if let Some(good_max) = self.good_max {
            scoring.good_max = good_max;
        }
        AnalysisConfig {
            scoring,
            histogram_bins: self.bins,
        }
    }

    /// Loads the source and derives labels.
    pub(crate) fn open(&self) -> anyhow::Result<Analysis> {
        let mut loader = DatasetLoader::new(self.loader_config());
        let dataset = loader
            .load(&self.source)
            .with_context(|| format!("Failed to load survey data from {}", self.source))?;
        Ok(Analysis::new(dataset, self.analysis_config()))
    }
}
