//! Serializable results handed to presentation

use serde::Serialize;
use sleepwise_stats::{
    correlation::Correlation, descriptive::DescriptiveStats, histogram::Histogram,
    regression::LinearFit,
};

use crate::{
    engine::{CorrelationMatrix, Crosstab, GroupComparison, GroupSummary, Scatter},
    feature::Frequencies,
};

/// Computed value of a statistic.
#[derive(Debug, Clone, PartialEq, Serialize, derive_more::From)]
#[serde(tag = "statistic", content = "value", rename_all = "snake_case")]
pub enum StatValue {
    Descriptive(DescriptiveStats),
    Histogram(Histogram),
    Frequencies(Frequencies),
    Correlation(Correlation),
    CorrelationMatrix(CorrelationMatrix),
    GroupComparison(GroupComparison),
    GroupSummaries(Vec<GroupSummary>),
    LinearFit(LinearFit),
    Crosstab(Crosstab),
    Scatter(Scatter),
}

impl StatValue {
    /// Name of the statistic, as used in serialized output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Descriptive(_) => "descriptive",
            Self::Histogram(_) => "histogram",
            Self::Frequencies(_) => "frequencies",
            Self::Correlation(_) => "correlation",
            Self::CorrelationMatrix(_) => "correlation_matrix",
            Self::GroupComparison(_) => "group_comparison",
            Self::GroupSummaries(_) => "group_summaries",
            Self::LinearFit(_) => "linear_fit",
            Self::Crosstab(_) => "crosstab",
            Self::Scatter(_) => "scatter",
        }
    }
}

/// A statistic together with the columns it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatResult {
    /// Input columns, in argument order.
    pub columns: Vec<String>,
    #[serde(flatten)]
    pub value: StatValue,
}

impl StatResult {
    pub fn new<I, S, V>(columns: I, value: V) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
        V: Into<StatValue>,
    {
        Self {
            columns: columns.into_iter().map(|c| c.to_string()).collect(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.value.name()
    }
}
