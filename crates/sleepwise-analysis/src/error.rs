//! Error taxonomy of the analysis pipeline
//!
//! Errors fall into two tiers:
//!
//! - **Structural** ([`LoadError`]): the dataset could not be obtained or does
//!   not carry the required columns. The whole analysis is unavailable.
//! - **Per item** ([`AnalysisError`], [`FeatureError`]): a single statistic or a
//!   single record cannot be processed. The caller records it and carries on.

use serde::Serialize;
use sleepwise_stats::StatsError;

/// Failure to produce a [`Dataset`](crate::dataset::Dataset).
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum LoadError {
    #[display("data unavailable from {location}: {reason}")]
    DataUnavailable { location: String, reason: String },
    #[display("schema mismatch: required columns not found: {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },
}

impl LoadError {
    pub(crate) fn unavailable(location: impl Into<String>, reason: impl ToString) -> Self {
        Self::DataUnavailable {
            location: location.into(),
            reason: reason.to_string(),
        }
    }
}

/// A categorizer received a value it cannot interpret as a number.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum FeatureError {
    #[display("invalid feature input: {value:?} is not numeric")]
    InvalidFeatureInput { value: String },
}

/// A single statistic could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize, derive_more::Display, derive_more::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisError {
    #[display("column not found: {column}")]
    ColumnNotFound { column: String },
    #[display("{source}")]
    Stats { source: StatsError },
}

impl AnalysisError {
    pub(crate) fn column_not_found(column: impl ToString) -> Self {
        Self::ColumnNotFound {
            column: column.to_string(),
        }
    }
}

impl From<StatsError> for AnalysisError {
    fn from(source: StatsError) -> Self {
        Self::Stats { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_lists_columns() {
        let err = LoadError::SchemaMismatch {
            missing: vec!["PSQI_Score".to_owned(), "MEQ".to_owned()],
        };
        assert_eq!(
            err.to_string(),
            "schema mismatch: required columns not found: PSQI_Score, MEQ"
        );
    }

    #[test]
    fn test_stats_error_passes_through() {
        let err = AnalysisError::from(StatsError::InvalidGrouping { groups: 3 });
        assert_eq!(
            err.to_string(),
            "invalid grouping: expected exactly 2 groups, found 3"
        );
    }
}
