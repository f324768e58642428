use serde::Serialize;

/// Reasons a statistic cannot be computed from the values it was given.
#[derive(Debug, Clone, PartialEq, Serialize, derive_more::Display, derive_more::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatsError {
    #[display("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[display("invalid grouping: expected exactly 2 groups, found {groups}")]
    InvalidGrouping { groups: usize },
    #[display("zero variance in input values")]
    ZeroVariance,
    #[display("degenerate t distribution (df = {df})")]
    DegenerateDistribution { df: f64 },
}

impl StatsError {
    pub(crate) fn require(required: usize, actual: usize) -> Result<(), Self> {
        if actual < required {
            return Err(Self::InsufficientData { required, actual });
        }
        Ok(())
    }
}
