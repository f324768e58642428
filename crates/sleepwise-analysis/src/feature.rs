//! Derived categorical labels
//!
//! Labels are computed from numeric scores with fixed thresholds. They are
//! derived once per load into [`DerivedLabels`] and used as grouping variables
//! by the statistics engine.
//!
//! # Categorizers
//!
//! - **Sleep category**: `score <= good_max` is good sleep, anything above is
//!   poor sleep. The scored column and the cut-off come from [`SleepScoring`].
//! - **Chronotype category** (MEQ score): `>= 60` morning, `[40, 60)`
//!   intermediate, `< 40` evening.
//!
//! Missing input stays missing. Text in a score column is an
//! [`InvalidFeatureInput`](FeatureError::InvalidFeatureInput); whole-dataset
//! derivation recovers from it by labelling that record `Unknown`.

use std::fmt;

use serde::Serialize;

use crate::{
    dataset::{Cell, Dataset},
    error::FeatureError,
    schema::ColumnRole,
};

/// Lowest MEQ score classified as morning type.
pub const MORNING_MIN_SCORE: f64 = 60.0;
/// Lowest MEQ score classified as intermediate type.
pub const INTERMEDIATE_MIN_SCORE: f64 = 40.0;

/// A categorical value computed from a numeric field.
pub trait DerivedLabel: Copy + Ord + fmt::Display + 'static {
    /// Every label in presentation order, `Unknown` last.
    const CATEGORIES: &'static [Self];
    /// Label of a record whose input could not be interpreted.
    const UNKNOWN: Self;

    fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }
}

/// Sleep-quality category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    derive_more::Display,
)]
pub enum SleepCategory {
    #[display("Good Sleep")]
    Good,
    #[display("Poor Sleep")]
    Poor,
    #[display("Unknown")]
    Unknown,
}

impl DerivedLabel for SleepCategory {
    const CATEGORIES: &'static [Self] = &[Self::Good, Self::Poor, Self::Unknown];
    const UNKNOWN: Self = Self::Unknown;
}

/// Chronotype category derived from the MEQ score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    derive_more::Display,
)]
pub enum ChronotypeCategory {
    #[display("Morning Type")]
    Morning,
    #[display("Intermediate Type")]
    Intermediate,
    #[display("Evening Type")]
    Evening,
    #[display("Unknown")]
    Unknown,
}

impl DerivedLabel for ChronotypeCategory {
    const CATEGORIES: &'static [Self] = &[
        Self::Morning,
        Self::Intermediate,
        Self::Evening,
        Self::Unknown,
    ];
    const UNKNOWN: Self = Self::Unknown;
}

impl ChronotypeCategory {
    /// Classifies a MEQ score.
    ///
    /// # Examples
    ///
    /// ```
    /// use sleepwise_analysis::feature::ChronotypeCategory;
    ///
    /// assert_eq!(ChronotypeCategory::from_score(60.0), ChronotypeCategory::Morning);
    /// assert_eq!(ChronotypeCategory::from_score(59.9), ChronotypeCategory::Intermediate);
    /// assert_eq!(ChronotypeCategory::from_score(40.0), ChronotypeCategory::Intermediate);
    /// assert_eq!(ChronotypeCategory::from_score(39.0), ChronotypeCategory::Evening);
    /// ```
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if !score.is_finite() {
            Self::Unknown
        } else if score >= MORNING_MIN_SCORE {
            Self::Morning
        } else if score >= INTERMEDIATE_MIN_SCORE {
            Self::Intermediate
        } else {
            Self::Evening
        }
    }
}

/// How sleep quality is scored into [`SleepCategory`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SleepScoring {
    /// Column holding the score.
    pub column: ColumnRole,
    /// Highest score still counted as good sleep.
    pub good_max: f64,
    /// Valid score range; values outside map to `Unknown`.
    pub valid_min: f64,
    pub valid_max: f64,
}

impl SleepScoring {
    /// Global PSQI score (0–21), clinical cut-off of 5.
    pub const PSQI: Self = Self {
        column: ColumnRole::Psqi,
        good_max: 5.0,
        valid_min: 0.0,
        valid_max: 21.0,
    };

    /// Pre-grouped PSQI code of the published dataset.
    pub const TWO_GROUP: Self = Self {
        column: ColumnRole::PsqiTwoGroups,
        good_max: 1.0,
        valid_min: 0.0,
        valid_max: 2.0,
    };

    #[must_use]
    pub fn categorize(&self, score: f64) -> SleepCategory {
        if !score.is_finite() || score < self.valid_min || score > self.valid_max {
            SleepCategory::Unknown
        } else if score <= self.good_max {
            SleepCategory::Good
        } else {
            SleepCategory::Poor
        }
    }
}

impl Default for SleepScoring {
    fn default() -> Self {
        Self::PSQI
    }
}

fn cell_score(cell: &Cell) -> Result<Option<f64>, FeatureError> {
    match cell {
        Cell::Number(value) => Ok(Some(*value)),
        Cell::Missing => Ok(None),
        Cell::Text(value) => Err(FeatureError::InvalidFeatureInput {
            value: value.clone(),
        }),
    }
}

/// Sleep category of a single answer.
pub fn categorize_sleep(
    cell: &Cell,
    scoring: &SleepScoring,
) -> Result<Option<SleepCategory>, FeatureError> {
    Ok(cell_score(cell)?.map(|score| scoring.categorize(score)))
}

/// Chronotype category of a single answer.
pub fn categorize_chronotype(cell: &Cell) -> Result<Option<ChronotypeCategory>, FeatureError> {
    Ok(cell_score(cell)?.map(ChronotypeCategory::from_score))
}

/// Labels derived for every record of a dataset, in record order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedLabels {
    pub scoring: SleepScoring,
    pub sleep: Vec<Option<SleepCategory>>,
    pub chronotype: Vec<Option<ChronotypeCategory>>,
}

impl DerivedLabels {
    #[must_use]
    pub fn sleep_frequencies(&self) -> Frequencies {
        frequencies(&self.sleep)
    }

    #[must_use]
    pub fn chronotype_frequencies(&self) -> Frequencies {
        frequencies(&self.chronotype)
    }
}

fn derive_column<L, F>(dataset: &Dataset, role: ColumnRole, categorize: F) -> Vec<Option<L>>
where
    L: DerivedLabel,
    F: Fn(&Cell) -> Result<Option<L>, FeatureError>,
{
    let Ok(cells) = dataset.cells(role) else {
        log::warn!("column '{role}' not present; derived labels are missing");
        return vec![None; dataset.len()];
    };
    cells
        .enumerate()
        .map(|(row, cell)| {
            categorize(cell).unwrap_or_else(|e| {
                log::debug!("row {row}: {e}; labelled {}", L::UNKNOWN);
                Some(L::UNKNOWN)
            })
        })
        .collect()
}

/// Computes sleep and chronotype labels for the whole dataset.
#[must_use]
pub fn derive_labels(dataset: &Dataset, scoring: SleepScoring) -> DerivedLabels {
    let sleep = derive_column(dataset, scoring.column, |cell| {
        categorize_sleep(cell, &scoring)
    });
    let chronotype = derive_column(dataset, ColumnRole::Chronotype, categorize_chronotype);
    DerivedLabels {
        scoring,
        sleep,
        chronotype,
    }
}

/// Count of one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyEntry {
    pub label: String,
    pub count: usize,
    /// Share of all non-missing labels, in percent.
    pub percent: f64,
}

/// Label counts over the non-missing labels of a column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frequencies {
    pub total: usize,
    pub entries: Vec<FrequencyEntry>,
}

impl Frequencies {
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&FrequencyEntry> {
        self.entries.iter().find(|entry| entry.label == label)
    }
}

/// Counts labels in category order.
///
/// `Unknown` is listed only when it occurs.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn frequencies<L>(labels: &[Option<L>]) -> Frequencies
where
    L: DerivedLabel,
{
    let present = labels.iter().flatten().copied().collect::<Vec<_>>();
    let total = present.len();
    let entries = L::CATEGORIES
        .iter()
        .filter_map(|&category| {
            let count = present.iter().filter(|&&label| label == category).count();
            if category.is_unknown() && count == 0 {
                return None;
            }
            let percent = if total == 0 {
                0.0
            } else {
                100.0 * count as f64 / total as f64
            };
            Some(FrequencyEntry {
                label: category.to_string(),
                count,
                percent,
            })
        })
        .collect();
    Frequencies { total, entries }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn assert_unknown_last<L>()
    where
        L: DerivedLabel + fmt::Debug,
    {
        assert_eq!(L::CATEGORIES.last(), Some(&L::UNKNOWN));
        assert_eq!(L::CATEGORIES.iter().filter(|l| l.is_unknown()).count(), 1);
    }

    #[test]
    fn test_categories_end_with_unknown() {
        assert_unknown_last::<SleepCategory>();
        assert_unknown_last::<ChronotypeCategory>();
    }

    #[test]
    fn test_sleep_threshold() {
        let scoring = SleepScoring::PSQI;
        assert_eq!(scoring.categorize(0.0), SleepCategory::Good);
        assert_eq!(scoring.categorize(5.0), SleepCategory::Good);
        assert_eq!(scoring.categorize(5.5), SleepCategory::Poor);
        assert_eq!(scoring.categorize(21.0), SleepCategory::Poor);
        assert_eq!(scoring.categorize(22.0), SleepCategory::Unknown);
        assert_eq!(scoring.categorize(-1.0), SleepCategory::Unknown);
        assert_eq!(scoring.categorize(f64::NAN), SleepCategory::Unknown);
    }

    #[test]
    fn test_two_group_scoring() {
        let scoring = SleepScoring::TWO_GROUP;
        assert_eq!(scoring.categorize(1.0), SleepCategory::Good);
        assert_eq!(scoring.categorize(2.0), SleepCategory::Poor);
    }

    #[test]
    fn test_chronotype_boundaries() {
        assert_eq!(
            ChronotypeCategory::from_score(40.0),
            ChronotypeCategory::Intermediate
        );
        assert_eq!(
            ChronotypeCategory::from_score(59.9),
            ChronotypeCategory::Intermediate
        );
        assert_eq!(
            ChronotypeCategory::from_score(60.0),
            ChronotypeCategory::Morning
        );
        assert_eq!(
            ChronotypeCategory::from_score(39.99),
            ChronotypeCategory::Evening
        );
        assert_eq!(
            ChronotypeCategory::from_score(f64::INFINITY),
            ChronotypeCategory::Unknown
        );
    }

    #[test]
    fn test_missing_and_text_input() {
        assert_eq!(categorize_chronotype(&Cell::Missing), Ok(None));
        assert_eq!(
            categorize_sleep(&Cell::Missing, &SleepScoring::PSQI),
            Ok(None)
        );
        assert_eq!(
            categorize_sleep(&Cell::Text("bad".to_owned()), &SleepScoring::PSQI),
            Err(FeatureError::InvalidFeatureInput {
                value: "bad".to_owned()
            })
        );
    }

    #[test]
    fn test_derive_labels_recovers_per_record() {
        let csv = "PSQI_Score,Trait_Anxiety,MEQ\n3,40,65\n9,50,abc\n,45,38\n";
        let dataset = Dataset::from_csv_reader("inline", csv.as_bytes()).unwrap();
        let labels = derive_labels(&dataset, SleepScoring::default());
        assert_eq!(
            labels.sleep,
            vec![Some(SleepCategory::Good), Some(SleepCategory::Poor), None]
        );
        assert_eq!(
            labels.chronotype,
            vec![
                Some(ChronotypeCategory::Morning),
                Some(ChronotypeCategory::Unknown),
                Some(ChronotypeCategory::Evening),
            ]
        );
    }

    #[test]
    fn test_frequencies() {
        let labels = [
            Some(SleepCategory::Poor),
            Some(SleepCategory::Good),
            Some(SleepCategory::Poor),
            None,
            Some(SleepCategory::Poor),
        ];
        let freq = frequencies(&labels);
        assert_eq!(freq.total, 4);
        assert_eq!(freq.entries.len(), 2);
        assert_eq!(freq.entries[0].label, "Good Sleep");
        let poor = freq.get("Poor Sleep").unwrap();
        assert_eq!(poor.count, 3);
        assert_relative_eq!(poor.percent, 75.0);
    }
}
