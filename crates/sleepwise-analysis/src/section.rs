//! Analytic sections and their fixed plans
//!
//! Each [`Section`] declares a list of [`PlanItem`]s. Running a section turns
//! every item into an [`ItemReport`]: either the computed [`StatResult`] or the
//! reason the item was skipped. One failing item never stops the others, and
//! sections share nothing but the dataset and its derived labels.
//!
//! # Sections
//!
//! 1. Distributions and correlation of sleep quality and trait anxiety
//! 2. Group comparisons by sleep category, and chronotype
//! 3. Preferred class start time, and the correlation matrix of all scores

use std::{fmt, str::FromStr, sync::Arc};

use serde::Serialize;
use sleepwise_stats::histogram::DEFAULT_NUM_BINS;

use crate::{
    dataset::Dataset,
    engine::{GroupBy, StatisticsEngine},
    error::AnalysisError,
    feature::{DerivedLabels, Frequencies, SleepScoring, derive_labels},
    result::StatResult,
    schema::ColumnRole,
};

/// Settings shared by every section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalysisConfig {
    pub scoring: SleepScoring,
    /// Main bins of each distribution histogram.
    pub histogram_bins: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            scoring: SleepScoring::default(),
            histogram_bins: DEFAULT_NUM_BINS,
        }
    }
}

/// One statistic of a section plan.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanItem {
    Describe(ColumnRole),
    Histogram(ColumnRole),
    SleepFrequencies,
    ChronotypeFrequencies,
    Correlate(ColumnRole, ColumnRole),
    FitLinear {
        predictor: ColumnRole,
        response: ColumnRole,
    },
    GroupSummaries {
        value: ColumnRole,
        by: GroupBy,
    },
    CompareGroups {
        value: ColumnRole,
        by: GroupBy,
    },
    Crosstab {
        rows: GroupBy,
        columns: GroupBy,
        normalize: bool,
    },
    Scatter {
        x: ColumnRole,
        y: ColumnRole,
        hue: Option<GroupBy>,
    },
    /// Matrix over these roles plus every unmapped numeric column of the file.
    ///
    /// Roles missing from the dataset are reported one by one and left out.
    CorrelationMatrix(Vec<ColumnRole>),
}

impl PlanItem {
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::Describe(role) => format!("Summary of {role}"),
            Self::Histogram(role) => format!("Histogram of {role}"),
            Self::SleepFrequencies => "Sleep category frequencies".to_owned(),
            Self::ChronotypeFrequencies => "Chronotype category frequencies".to_owned(),
            Self::Correlate(a, b) => format!("Correlation {a} vs {b}"),
            Self::FitLinear {
                predictor,
                response,
            } => format!("Linear fit {response} ~ {predictor}"),
            Self::GroupSummaries { value, by } => format!("{value} by {by}"),
            Self::CompareGroups { value, by } => format!("Welch test of {value} by {by}"),
            Self::Crosstab {
                rows,
                columns,
                normalize,
            } => {
                let unit = if *normalize { " (row %)" } else { "" };
                format!("{rows} x {columns}{unit}")
            }
            Self::Scatter { x, y, hue } => match hue {
                Some(hue) => format!("{y} vs {x} by {hue}"),
                None => format!("{y} vs {x}"),
            },
            Self::CorrelationMatrix(_) => "Correlation matrix".to_owned(),
        }
    }

    /// Computes the item.
    pub fn execute(
        &self,
        engine: &StatisticsEngine<'_>,
        config: &AnalysisConfig,
    ) -> Result<StatResult, AnalysisError> {
        let result = match self {
            Self::Describe(role) => StatResult::new([role], engine.describe(*role)?),
            Self::Histogram(role) => {
                StatResult::new([role], engine.histogram(*role, config.histogram_bins)?)
            }
            // Label counts are reported only when their source column exists
            Self::SleepFrequencies => {
                engine.require_column(GroupBy::SleepCategory)?;
                StatResult::new(
                    [GroupBy::SleepCategory],
                    engine.labels().sleep_frequencies(),
                )
            }
            Self::ChronotypeFrequencies => {
                engine.require_column(GroupBy::Chronotype)?;
                StatResult::new(
                    [GroupBy::Chronotype],
                    engine.labels().chronotype_frequencies(),
                )
            }
            Self::Correlate(a, b) => StatResult::new([a, b], engine.correlate(*a, *b)?),
            Self::FitLinear {
                predictor,
                response,
            } => StatResult::new(
                [predictor, response],
                engine.fit_linear(*predictor, *response)?,
            ),
            Self::GroupSummaries { value, by } => StatResult::new(
                [value.to_string(), by.to_string()],
                engine.group_summaries(*value, *by)?,
            ),
            Self::CompareGroups { value, by } => StatResult::new(
                [value.to_string(), by.to_string()],
                engine.compare_groups(*value, *by)?,
            ),
            Self::Crosstab {
                rows,
                columns,
                normalize,
            } => StatResult::new(
                [rows, columns],
                engine.crosstab(*rows, *columns, *normalize)?,
            ),
            Self::Scatter { x, y, hue } => {
                let columns = [Some(x.to_string()), Some(y.to_string()), hue.map(|h| h.to_string())];
                StatResult::new(columns.into_iter().flatten(), engine.scatter(*x, *y, *hue)?)
            }
            Self::CorrelationMatrix(roles) => {
                let matrix = engine.numeric_correlation_matrix(roles)?;
                StatResult::new(matrix.columns.clone(), matrix)
            }
        };
        Ok(result)
    }
}

/// Result of one plan item.
#[derive(Debug, Clone, PartialEq, Serialize, derive_more::IsVariant)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Computed { result: StatResult },
    Skipped { reason: AnalysisError },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemReport {
    pub title: String,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

impl ItemReport {
    #[must_use]
    pub fn result(&self) -> Option<&StatResult> {
        match &self.outcome {
            ItemOutcome::Computed { result } => Some(result),
            ItemOutcome::Skipped { .. } => None,
        }
    }

    #[must_use]
    pub fn skip_reason(&self) -> Option<&AnalysisError> {
        match &self.outcome {
            ItemOutcome::Computed { .. } => None,
            ItemOutcome::Skipped { reason } => Some(reason),
        }
    }
}

/// Everything a section computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionReport {
    pub section: Section,
    pub number: u8,
    pub title: &'static str,
    /// Records in the dataset, before any per-item exclusion.
    pub records: usize,
    pub sleep_frequencies: Frequencies,
    pub chronotype_frequencies: Frequencies,
    pub items: Vec<ItemReport>,
}

impl SectionReport {
    #[must_use]
    pub fn item(&self, title: &str) -> Option<&ItemReport> {
        self.items.iter().find(|item| item.title == title)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ItemReport> + '_ {
        self.items
            .iter()
            .filter(|item| item.outcome.is_skipped())
    }
}

/// The three analytic sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    DistributionsAndCorrelation,
    GroupComparisons,
    StartTimeAndMatrix,
}

impl Section {
    pub const ALL: [Self; 3] = [
        Self::DistributionsAndCorrelation,
        Self::GroupComparisons,
        Self::StartTimeAndMatrix,
    ];

    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::DistributionsAndCorrelation => 1,
            Self::GroupComparisons => 2,
            Self::StartTimeAndMatrix => 3,
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::DistributionsAndCorrelation => "Distributions and Correlation",
            Self::GroupComparisons => "Group Comparisons and Chronotype",
            Self::StartTimeAndMatrix => "Preferred Start Time & Correlation Matrix",
        }
    }

    #[must_use]
    pub fn plan(self) -> Vec<PlanItem> {
        use ColumnRole::{
            Chronotype, DaytimeDozing, Psqi, PsqiTwoGroups, StartTime, TraitAnxiety,
        };

        match self {
            Self::DistributionsAndCorrelation => vec![
                PlanItem::Describe(Psqi),
                PlanItem::Histogram(Psqi),
                PlanItem::Describe(TraitAnxiety),
                PlanItem::Histogram(TraitAnxiety),
                PlanItem::Describe(PsqiTwoGroups),
                PlanItem::Histogram(PsqiTwoGroups),
                PlanItem::SleepFrequencies,
                PlanItem::Correlate(Psqi, TraitAnxiety),
                PlanItem::FitLinear {
                    predictor: Psqi,
                    response: TraitAnxiety,
                },
            ],
            Self::GroupComparisons => vec![
                PlanItem::GroupSummaries {
                    value: TraitAnxiety,
                    by: GroupBy::SleepCategory,
                },
                PlanItem::CompareGroups {
                    value: TraitAnxiety,
                    by: GroupBy::SleepCategory,
                },
                PlanItem::Crosstab {
                    rows: GroupBy::SleepCategory,
                    columns: GroupBy::Column(DaytimeDozing),
                    normalize: true,
                },
                PlanItem::GroupSummaries {
                    value: Chronotype,
                    by: GroupBy::SleepCategory,
                },
                PlanItem::CompareGroups {
                    value: Chronotype,
                    by: GroupBy::SleepCategory,
                },
                PlanItem::ChronotypeFrequencies,
            ],
            Self::StartTimeAndMatrix => vec![
                PlanItem::Crosstab {
                    rows: GroupBy::Column(StartTime),
                    columns: GroupBy::Chronotype,
                    normalize: false,
                },
                PlanItem::Scatter {
                    x: Psqi,
                    y: TraitAnxiety,
                    hue: Some(GroupBy::Column(StartTime)),
                },
                PlanItem::Correlate(StartTime, Psqi),
                PlanItem::Correlate(StartTime, TraitAnxiety),
                PlanItem::Correlate(Psqi, DaytimeDozing),
                PlanItem::CorrelationMatrix(ColumnRole::NUMERIC.to_vec()),
            ],
        }
    }

    /// Executes the plan against one dataset.
    #[must_use]
    pub fn run(self, engine: &StatisticsEngine<'_>, config: &AnalysisConfig) -> SectionReport {
        log::info!("running section {}: {}", self.number(), self.title());

        let mut items = vec![];
        for item in self.plan() {
            let item = match item {
                PlanItem::CorrelationMatrix(columns) => {
                    let (present, absent): (Vec<_>, Vec<_>) = columns
                        .into_iter()
                        .partition(|&role| engine.dataset().has_column(role));
                    for role in absent {
                        items.push(skipped(
                            format!("Correlation matrix: {role}"),
                            AnalysisError::column_not_found(role),
                        ));
                    }
                    PlanItem::CorrelationMatrix(present)
                }
                item => item,
            };

            let title = item.title();
            let report = match item.execute(engine, config) {
                Ok(result) => ItemReport {
                    title,
                    outcome: ItemOutcome::Computed { result },
                },
                Err(reason) => skipped(title, reason),
            };
            items.push(report);
        }

        let labels = engine.labels();
        SectionReport {
            section: self,
            number: self.number(),
            title: self.title(),
            records: engine.dataset().len(),
            sleep_frequencies: labels.sleep_frequencies(),
            chronotype_frequencies: labels.chronotype_frequencies(),
            items,
        }
    }
}

fn skipped(title: String, reason: AnalysisError) -> ItemReport {
    log::debug!("{title}: skipped ({reason})");
    ItemReport {
        title,
        outcome: ItemOutcome::Skipped { reason },
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown section '{input}' (expected 1, 2 or 3)")]
pub struct UnknownSectionError {
    pub input: String,
}

impl FromStr for Section {
    type Err = UnknownSectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| s.trim() == section.number().to_string())
            .ok_or_else(|| UnknownSectionError {
                input: s.to_owned(),
            })
    }
}

/// A loaded dataset with its derived labels, ready to run sections.
#[derive(Debug, Clone)]
pub struct Analysis {
    dataset: Arc<Dataset>,
    labels: DerivedLabels,
    config: AnalysisConfig,
}

impl Analysis {
    /// Derives the labels once for all sections.
    #[must_use]
    pub fn new(dataset: Arc<Dataset>, config: AnalysisConfig) -> Self {
        let labels = derive_labels(&dataset, config.scoring);
        Self {
            dataset,
            labels,
            config,
        }
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[must_use]
    pub fn labels(&self) -> &DerivedLabels {
        &self.labels
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    #[must_use]
    pub fn engine(&self) -> StatisticsEngine<'_> {
        StatisticsEngine::new(&self.dataset, &self.labels)
    }

    #[must_use]
    pub fn run(&self, section: Section) -> SectionReport {
        section.run(&self.engine(), &self.config)
    }

    #[must_use]
    pub fn run_all(&self) -> Vec<SectionReport> {
        Section::ALL
            .into_iter()
            .map(|section| self.run(section))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::SleepCategory;

    const CSV: &str = "\
Sex,Year,Age,Weekly_Sleep_Duration,psqi_2_groups,MEQ,Trait_Anxiety,Notes,PSQI_Score,Sleep_Category
F,1,19,50,1,62,38,,3,Good Sleep
M,2,20,45,2,45,55,,9,Poor Sleep
F,1,18,52,1,58,44,,4,Good Sleep
F,3,21,40,2,35,60,,12,Poor Sleep
M,2,19,48,1,40,42,,5,Good Sleep
F,1,20,38,2,30,58,,11,Poor Sleep
";

    fn analysis() -> Analysis {
        let dataset = Dataset::from_csv_reader("inline", CSV.as_bytes()).unwrap();
        Analysis::new(Arc::new(dataset), AnalysisConfig::default())
    }

    #[test]
    fn test_parse_section() {
        assert_eq!("2".parse::<Section>().unwrap(), Section::GroupComparisons);
        assert!("4".parse::<Section>().is_err());
    }

    #[test]
    fn test_section_one_computes_every_item() {
        let report = analysis().run(Section::DistributionsAndCorrelation);
        assert_eq!(report.items.len(), Section::DistributionsAndCorrelation.plan().len());
        assert_eq!(report.skipped().count(), 0);
        let freq = &report.sleep_frequencies;
        assert_eq!(
            freq.get(&SleepCategory::Poor.to_string()).unwrap().count,
            3
        );
    }

    #[test]
    fn test_absent_optional_columns_are_skipped() {
        let report = analysis().run(Section::StartTimeAndMatrix);

        let start_by_chronotype = report
            .item("start_time x chronotype_category")
            .unwrap();
        assert_eq!(
            start_by_chronotype.skip_reason(),
            Some(&AnalysisError::column_not_found(ColumnRole::StartTime))
        );
        assert!(report.item("Correlation matrix: start_time").unwrap().outcome.is_skipped());
        assert!(
            report
                .item("Correlation matrix: daytime_dozing")
                .unwrap()
                .outcome
                .is_skipped()
        );

        let matrix = report.item("Correlation matrix").unwrap().result().unwrap();
        assert_eq!(matrix.columns.len(), ColumnRole::NUMERIC.len() - 2);
    }

    #[test]
    fn test_matrix_covers_unmapped_numeric_columns() {
        let csv = "\
PSQI_Score,Trait_Anxiety,MEQ,Caffeine,Comment
3,38,62,1,tired
9,55,45,4,
4,44,58,2,fine
12,60,35,5,
";
        let dataset = Dataset::from_csv_reader("inline", csv.as_bytes()).unwrap();
        let analysis = Analysis::new(Arc::new(dataset), AnalysisConfig::default());
        let report = analysis.run(Section::StartTimeAndMatrix);
        let matrix = report.item("Correlation matrix").unwrap().result().unwrap();
        assert_eq!(matrix.columns, ["chronotype", "trait_anxiety", "psqi", "Caffeine"]);
        assert!(report.item("Correlation matrix: Comment").is_none());
    }

    #[test]
    fn test_frequencies_skipped_without_scored_column() {
        let dataset = Dataset::from_csv_reader("inline", CSV.as_bytes()).unwrap();
        let csv = "PSQI_Score,Trait_Anxiety,MEQ\n3,38,62\n9,55,45\n";
        let without_code = Dataset::from_csv_reader("inline", csv.as_bytes()).unwrap();
        let config = AnalysisConfig {
            scoring: SleepScoring::TWO_GROUP,
            ..AnalysisConfig::default()
        };

        let report = Analysis::new(Arc::new(without_code), config)
            .run(Section::DistributionsAndCorrelation);
        let item = report.item("Sleep category frequencies").unwrap();
        assert_eq!(
            item.skip_reason(),
            Some(&AnalysisError::column_not_found(ColumnRole::PsqiTwoGroups))
        );

        let report =
            Analysis::new(Arc::new(dataset), config).run(Section::DistributionsAndCorrelation);
        let item = report.item("Sleep category frequencies").unwrap();
        assert!(item.result().is_some());
    }

    #[test]
    fn test_dozing_crosstab_skipped_in_section_two() {
        let report = analysis().run(Section::GroupComparisons);
        let skipped = report
            .skipped()
            .map(|item| item.title.as_str())
            .collect::<Vec<_>>();
        assert_eq!(skipped, ["sleep_quality x daytime_dozing (row %)"]);
    }
}
