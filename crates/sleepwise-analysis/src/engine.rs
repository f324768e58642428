//! Statistics over dataset columns
//!
//! [`StatisticsEngine`] selects columns from a [`Dataset`], drops incomplete
//! rows and hands plain `f64` samples to the kernels in `sleepwise_stats`.
//!
//! # Missing values
//!
//! Exclusion is pairwise complete-case: a row is dropped from a statistic only
//! when one of the columns *that statistic uses* has no numeric value. Other
//! columns never filter rows, so two statistics on the same dataset may be
//! computed over different numbers of respondents.
//!
//! # Grouping
//!
//! Group comparisons take a [`GroupBy`]: either a raw column (numeric codes or
//! text answers) or one of the derived labels. `Unknown` labels and missing
//! answers are not a group. Groups are ordered by category declaration order,
//! then numeric codes ascending, then text.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    fmt,
    str::FromStr,
};

use serde::{Serialize, Serializer};
use sleepwise_stats::{
    StatsError,
    correlation::{self, Correlation},
    descriptive::DescriptiveStats,
    histogram::{Histogram, HistogramSpec},
    regression::LinearFit,
    ttest::WelchTest,
};

use crate::{
    dataset::{Cell, Dataset},
    error::AnalysisError,
    feature::{DerivedLabel, DerivedLabels},
    schema::{ColumnRole, UnknownColumnError},
};

/// Grouping variable of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupBy {
    /// Distinct values of a raw column.
    Column(ColumnRole),
    /// Derived sleep-quality label.
    SleepCategory,
    /// Derived chronotype label.
    Chronotype,
}

impl GroupBy {
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Column(role) => role.id(),
            Self::SleepCategory => "sleep_quality",
            Self::Chronotype => "chronotype_category",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for GroupBy {
    type Err = UnknownColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(Self::SleepCategory.id()) {
            Ok(Self::SleepCategory)
        } else if s.eq_ignore_ascii_case(Self::Chronotype.id()) {
            Ok(Self::Chronotype)
        } else {
            s.parse().map(Self::Column)
        }
    }
}

impl Serialize for GroupBy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.id())
    }
}

/// One group of a grouping variable.
#[derive(Debug, Clone)]
pub enum GroupKey {
    /// Derived label; `rank` is its position in the category list.
    Category { rank: usize, label: String },
    /// Numeric code of a raw column.
    Code(f64),
    /// Text answer of a raw column.
    Text(String),
}

impl GroupKey {
    fn category<L>(label: L) -> Self
    where
        L: DerivedLabel,
    {
        let rank = L::CATEGORIES
            .iter()
            .position(|&category| category == label)
            .unwrap_or(L::CATEGORIES.len());
        Self::Category {
            rank,
            label: label.to_string(),
        }
    }

    fn variant_rank(&self) -> u8 {
        match self {
            Self::Category { .. } => 0,
            Self::Code(_) => 1,
            Self::Text(_) => 2,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category { label, .. } => f.write_str(label),
            Self::Code(code) => write!(f, "{code}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Category { rank: a, label: la }, Self::Category { rank: b, label: lb }) => {
                a.cmp(b).then_with(|| la.cmp(lb))
            }
            (Self::Code(a), Self::Code(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.variant_rank().cmp(&other.variant_rank()),
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GroupKey {}

impl Serialize for GroupKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Welch test between the two groups of a grouping variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupComparison {
    pub first: GroupKey,
    pub second: GroupKey,
    /// `t` is first minus second.
    pub test: WelchTest,
}

/// Descriptive statistics of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub group: GroupKey,
    pub stats: DescriptiveStats,
}

/// Symmetric matrix of Pearson coefficients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    /// Role ids, followed by the header text of unmapped columns.
    pub columns: Vec<String>,
    /// Row-major; `NaN` where a coefficient is undefined.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// The diagonal is 1.0 for every column with at least one value. A pair with
    /// fewer than three complete rows or without variance is `NaN`.
    fn from_columns(data: Vec<(String, Vec<Option<f64>>)>) -> Self {
        let size = data.len();
        let mut values = vec![vec![f64::NAN; size]; size];
        for (i, (_, xs)) in data.iter().enumerate() {
            if xs.iter().any(Option::is_some) {
                values[i][i] = 1.0;
            }
            for (j, (_, ys)) in data.iter().enumerate().skip(i + 1) {
                let pairs = xs
                    .iter()
                    .zip(ys)
                    .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
                    .collect::<Vec<_>>();
                let r = if pairs.len() < correlation::MIN_PAIRS {
                    f64::NAN
                } else {
                    correlation::coefficient(&pairs).unwrap_or(f64::NAN)
                };
                values[i][j] = r;
                values[j][i] = r;
            }
        }
        Self {
            columns: data.into_iter().map(|(name, _)| name).collect(),
            values,
        }
    }

    #[must_use]
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row)?;
        let j = self.columns.iter().position(|c| c == column)?;
        Some(self.values[i][j])
    }
}

/// Contingency table of two grouping variables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Crosstab {
    pub rows: Vec<GroupKey>,
    pub columns: Vec<GroupKey>,
    pub counts: Vec<Vec<u64>>,
    /// Each row as percentages of its total, when requested.
    pub row_percent: Option<Vec<Vec<f64>>>,
    /// Rows with both groups present.
    pub n: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub group: Option<GroupKey>,
}

/// Complete-case points of two columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter {
    pub points: Vec<ScatterPoint>,
}

fn no_values() -> AnalysisError {
    StatsError::InsufficientData {
        required: 1,
        actual: 0,
    }
    .into()
}

/// Statistics over the columns of one dataset and its derived labels.
#[derive(Debug, Clone, Copy)]
pub struct StatisticsEngine<'a> {
    dataset: &'a Dataset,
    labels: &'a DerivedLabels,
}

impl<'a> StatisticsEngine<'a> {
    #[must_use]
    pub fn new(dataset: &'a Dataset, labels: &'a DerivedLabels) -> Self {
        Self { dataset, labels }
    }

    #[must_use]
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    #[must_use]
    pub fn labels(&self) -> &'a DerivedLabels {
        self.labels
    }

    /// Non-missing numeric values of a column.
    pub fn values(&self, role: ColumnRole) -> Result<Vec<f64>, AnalysisError> {
        Ok(self.dataset.numeric(role)?.into_iter().flatten().collect())
    }

    /// Rows where both columns are numeric.
    pub fn pairs(&self, x: ColumnRole, y: ColumnRole) -> Result<Vec<(f64, f64)>, AnalysisError> {
        let xs = self.dataset.numeric(x)?;
        let ys = self.dataset.numeric(y)?;
        Ok(xs
            .into_iter()
            .zip(ys)
            .filter_map(|(x, y)| Some((x?, y?)))
            .collect())
    }

    /// Fails with [`AnalysisError::ColumnNotFound`] when the column behind a
    /// grouping is absent from the dataset.
    pub fn require_column(&self, by: GroupBy) -> Result<(), AnalysisError> {
        let role = match by {
            GroupBy::Column(role) => role,
            GroupBy::SleepCategory => self.labels.scoring.column,
            GroupBy::Chronotype => ColumnRole::Chronotype,
        };
        if !self.dataset.has_column(role) {
            return Err(AnalysisError::column_not_found(role));
        }
        Ok(())
    }

    /// Group of each record; `None` for records outside every group.
    pub fn group_keys(&self, by: GroupBy) -> Result<Vec<Option<GroupKey>>, AnalysisError> {
        fn labelled<L: DerivedLabel>(labels: &[Option<L>]) -> Vec<Option<GroupKey>> {
            labels
                .iter()
                .map(|label| {
                    label
                        .filter(|label| !label.is_unknown())
                        .map(GroupKey::category)
                })
                .collect()
        }

        match by {
            GroupBy::Column(role) => Ok(self
                .dataset
                .cells(role)?
                .map(|cell| match cell {
                    Cell::Number(code) => Some(GroupKey::Code(*code)),
                    Cell::Text(text) => Some(GroupKey::Text(text.clone())),
                    Cell::Missing => None,
                })
                .collect()),
            GroupBy::SleepCategory => {
                self.require_column(by)?;
                Ok(labelled(&self.labels.sleep))
            }
            GroupBy::Chronotype => {
                self.require_column(by)?;
                Ok(labelled(&self.labels.chronotype))
            }
        }
    }

    fn grouped_values(
        &self,
        value: ColumnRole,
        by: GroupBy,
    ) -> Result<BTreeMap<GroupKey, Vec<f64>>, AnalysisError> {
        let values = self.dataset.numeric(value)?;
        let keys = self.group_keys(by)?;
        let mut groups = BTreeMap::<GroupKey, Vec<f64>>::new();
        for (value, key) in values.into_iter().zip(keys) {
            if let (Some(value), Some(key)) = (value, key) {
                groups.entry(key).or_default().push(value);
            }
        }
        Ok(groups)
    }

    /// Summary statistics of one column.
    pub fn describe(&self, role: ColumnRole) -> Result<DescriptiveStats, AnalysisError> {
        DescriptiveStats::new(self.values(role)?).ok_or_else(no_values)
    }

    /// Percentile-clipped histogram of one column.
    ///
    /// Columns holding only whole numbers get whole-number bin widths.
    pub fn histogram(&self, role: ColumnRole, num_bins: usize) -> Result<Histogram, AnalysisError> {
        let values = self.values(role)?;
        if values.is_empty() {
            return Err(no_values());
        }
        let integral = values.iter().all(|value| value.fract() == 0.0);
        let spec = HistogramSpec {
            num_bins,
            bin_width_unit: integral.then_some(1.0),
            ..HistogramSpec::default()
        };
        Ok(Histogram::new(values, spec))
    }

    /// Pearson correlation between two columns.
    pub fn correlate(&self, a: ColumnRole, b: ColumnRole) -> Result<Correlation, AnalysisError> {
        Ok(Correlation::pearson(&self.pairs(a, b)?)?)
    }

    fn named_columns(
        &self,
        roles: &[ColumnRole],
    ) -> Result<Vec<(String, Vec<Option<f64>>)>, AnalysisError> {
        roles
            .iter()
            .map(|&role| Ok((role.to_string(), self.dataset.numeric(role)?)))
            .collect()
    }

    /// Pearson coefficients between every pair of `roles`.
    ///
    /// See [`CorrelationMatrix`] for undefined entries.
    pub fn correlation_matrix(
        &self,
        roles: &[ColumnRole],
    ) -> Result<CorrelationMatrix, AnalysisError> {
        Ok(CorrelationMatrix::from_columns(self.named_columns(roles)?))
    }

    /// Like [`correlation_matrix`](Self::correlation_matrix), extended with
    /// every unmapped column of the file that holds only numbers.
    pub fn numeric_correlation_matrix(
        &self,
        roles: &[ColumnRole],
    ) -> Result<CorrelationMatrix, AnalysisError> {
        let mut data = self.named_columns(roles)?;
        data.extend(
            self.dataset
                .extra_columns()
                .iter()
                .filter(|column| column.is_numeric())
                .map(|column| (column.header.clone(), column.numeric())),
        );
        Ok(CorrelationMatrix::from_columns(data))
    }

    /// Welch's t-test of `value` between exactly two groups.
    pub fn compare_groups(
        &self,
        value: ColumnRole,
        by: GroupBy,
    ) -> Result<GroupComparison, AnalysisError> {
        let groups = self.grouped_values(value, by)?.into_iter().collect::<Vec<_>>();
        let [(first, first_values), (second, second_values)]: [_; 2] = groups
            .try_into()
            .map_err(|groups: Vec<_>| StatsError::InvalidGrouping {
                groups: groups.len(),
            })?;
        let test = WelchTest::new(&first_values, &second_values)?;
        Ok(GroupComparison {
            first,
            second,
            test,
        })
    }

    /// Summary statistics of `value` within each group.
    pub fn group_summaries(
        &self,
        value: ColumnRole,
        by: GroupBy,
    ) -> Result<Vec<GroupSummary>, AnalysisError> {
        let summaries = self
            .grouped_values(value, by)?
            .into_iter()
            .filter_map(|(group, values)| {
                DescriptiveStats::new(values).map(|stats| GroupSummary { group, stats })
            })
            .collect::<Vec<_>>();
        if summaries.is_empty() {
            return Err(no_values());
        }
        Ok(summaries)
    }

    /// Least-squares fit of `response` on `predictor`.
    pub fn fit_linear(
        &self,
        predictor: ColumnRole,
        response: ColumnRole,
    ) -> Result<LinearFit, AnalysisError> {
        Ok(LinearFit::ols(&self.pairs(predictor, response)?)?)
    }

    /// Counts of each (row group, column group) combination.
    #[expect(clippy::cast_precision_loss)]
    pub fn crosstab(
        &self,
        rows: GroupBy,
        columns: GroupBy,
        normalize: bool,
    ) -> Result<Crosstab, AnalysisError> {
        let row_keys = self.group_keys(rows)?;
        let column_keys = self.group_keys(columns)?;

        let mut table = BTreeMap::<GroupKey, BTreeMap<GroupKey, u64>>::new();
        let mut all_columns = BTreeSet::new();
        let mut n = 0;
        for (row, column) in row_keys.into_iter().zip(column_keys) {
            if let (Some(row), Some(column)) = (row, column) {
                *table.entry(row).or_default().entry(column.clone()).or_default() += 1;
                all_columns.insert(column);
                n += 1;
            }
        }
        if n == 0 {
            return Err(no_values());
        }

        let column_keys = all_columns.into_iter().collect::<Vec<_>>();
        let counts = table
            .values()
            .map(|row| {
                column_keys
                    .iter()
                    .map(|column| row.get(column).copied().unwrap_or(0))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        let row_percent = normalize.then(|| {
            counts
                .iter()
                .map(|row| {
                    let total = row.iter().sum::<u64>() as f64;
                    row.iter()
                        .map(|&count| 100.0 * count as f64 / total)
                        .collect()
                })
                .collect()
        });

        Ok(Crosstab {
            rows: table.into_keys().collect(),
            columns: column_keys,
            counts,
            row_percent,
            n,
        })
    }

    /// Complete-case points of `x` against `y`, optionally tagged with a group.
    pub fn scatter(
        &self,
        x: ColumnRole,
        y: ColumnRole,
        hue: Option<GroupBy>,
    ) -> Result<Scatter, AnalysisError> {
        let xs = self.dataset.numeric(x)?;
        let ys = self.dataset.numeric(y)?;
        let groups = match hue {
            Some(by) => self.group_keys(by)?,
            None => vec![None; xs.len()],
        };
        let points = xs
            .into_iter()
            .zip(ys)
            .zip(groups)
            .filter_map(|((x, y), group)| Some(ScatterPoint { x: x?, y: y?, group }))
            .collect::<Vec<_>>();
        if points.is_empty() {
            return Err(no_values());
        }
        Ok(Scatter { points })
    }
}
