//! Column roles and their resolution against a CSV header
//!
//! The survey file is identified by column role rather than by raw header text.
//! Each role declares the header names it answers to and, for the columns the
//! analysis cannot do without, a positional fallback used when the header was
//! renamed.
//!
//! # Resolution policy
//!
//! Evaluated once per load, in order:
//!
//! 1. Header match against the canonical name or an alias (case-insensitive,
//!    surrounding whitespace and a UTF-8 BOM ignored)
//! 2. Positional fallback, when the role declares a position that exists in
//!    the file and that no other role matched by name. Logged at `warn` level
//! 3. Otherwise the role is unresolved. Unresolved **required** roles fail the
//!    load with [`LoadError::SchemaMismatch`]; unresolved optional roles only
//!    make the statistics that need them unavailable
//!
//! ```text
//! Role                 Canonical header         Position  Required
//! -------------------  -----------------------  --------  --------
//! chronotype           MEQ                      5         yes
//! trait_anxiety        Trait_Anxiety            6         yes
//! psqi                 PSQI_Score               8         yes
//! sleep_category       Sleep_Category           9         no
//! start_time           Start_time_code          10        no
//! daytime_dozing       Daytime_Dozing           11        no
//! ```

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::Serialize;

use crate::error::LoadError;

/// A semantic column of the survey dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Sex,
    YearOfStudy,
    Age,
    WeeklySleepDuration,
    Chronotype,
    TraitAnxiety,
    PsqiTwoGroups,
    Psqi,
    SleepCategory,
    StartTime,
    DaytimeDozing,
}

impl ColumnRole {
    pub const ALL: [Self; 11] = [
        Self::Sex,
        Self::YearOfStudy,
        Self::Age,
        Self::WeeklySleepDuration,
        Self::Chronotype,
        Self::TraitAnxiety,
        Self::PsqiTwoGroups,
        Self::Psqi,
        Self::SleepCategory,
        Self::StartTime,
        Self::DaytimeDozing,
    ];

    /// Roles holding numeric scores or ordinal codes.
    pub const NUMERIC: [Self; 9] = [
        Self::YearOfStudy,
        Self::Age,
        Self::WeeklySleepDuration,
        Self::Chronotype,
        Self::TraitAnxiety,
        Self::PsqiTwoGroups,
        Self::Psqi,
        Self::StartTime,
        Self::DaytimeDozing,
    ];

    /// Identifier used in reports and on the command line.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Sex => "sex",
            Self::YearOfStudy => "year_of_study",
            Self::Age => "age",
            Self::WeeklySleepDuration => "weekly_sleep_duration",
            Self::Chronotype => "chronotype",
            Self::TraitAnxiety => "trait_anxiety",
            Self::PsqiTwoGroups => "psqi_2_groups",
            Self::Psqi => "psqi",
            Self::SleepCategory => "sleep_category",
            Self::StartTime => "start_time",
            Self::DaytimeDozing => "daytime_dozing",
        }
    }

    /// Header name in the published dataset.
    #[must_use]
    pub const fn canonical_name(self) -> &'static str {
        match self {
            Self::Sex => "Sex",
            Self::YearOfStudy => "Year",
            Self::Age => "Age",
            Self::WeeklySleepDuration => "Weekly_Sleep_Duration",
            Self::Chronotype => "MEQ",
            Self::TraitAnxiety => "Trait_Anxiety",
            Self::PsqiTwoGroups => "psqi_2_groups",
            Self::Psqi => "PSQI_Score",
            Self::SleepCategory => "Sleep_Category",
            Self::StartTime => "Start_time_code",
            Self::DaytimeDozing => "Daytime_Dozing",
        }
    }

    /// Other header names accepted for the role.
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Sex => &["Gender"],
            Self::YearOfStudy => &["Year_of_study"],
            Self::Age | Self::PsqiTwoGroups | Self::SleepCategory | Self::StartTime => &[],
            Self::WeeklySleepDuration => &["Sleep_Duration"],
            Self::Chronotype => &["rMEQ", "Chronotype"],
            Self::TraitAnxiety => &["STAI_Trait", "Anxiety"],
            Self::Psqi => &["PSQI"],
            Self::DaytimeDozing => &["Dozing"],
        }
    }

    /// Zero-based column index assumed when no header matches.
    #[must_use]
    pub const fn position(self) -> Option<usize> {
        match self {
            Self::Chronotype => Some(5),
            Self::TraitAnxiety => Some(6),
            Self::Psqi => Some(8),
            Self::SleepCategory => Some(9),
            Self::StartTime => Some(10),
            Self::DaytimeDozing => Some(11),
            _ => None,
        }
    }

    /// Whether the dataset is unusable without this role.
    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Self::Chronotype | Self::TraitAnxiety | Self::Psqi)
    }

    fn matches_header(self, header: &str) -> bool {
        let header = header.trim_start_matches('\u{feff}').trim();
        header.eq_ignore_ascii_case(self.canonical_name())
            || self
                .aliases()
                .iter()
                .any(|alias| header.eq_ignore_ascii_case(alias))
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown column '{name}' (expected one of: {})", ColumnRole::ALL.map(ColumnRole::id).join(", "))]
pub struct UnknownColumnError {
    pub name: String,
}

impl FromStr for ColumnRole {
    type Err = UnknownColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.id().eq_ignore_ascii_case(s) || role.matches_header(s))
            .ok_or_else(|| UnknownColumnError { name: s.to_owned() })
    }
}

/// How a role was located in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    ByName,
    ByPosition,
}

/// A role bound to a physical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumn {
    /// Zero-based index in each CSV row.
    pub index: usize,
    /// Header text found at that index.
    pub header: String,
    pub resolution: Resolution,
}

impl ResolvedColumn {
    fn new<S>(headers: &[S], index: usize, resolution: Resolution) -> Self
    where
        S: AsRef<str>,
    {
        Self {
            index,
            header: headers[index].as_ref().trim().to_owned(),
            resolution,
        }
    }
}

/// Stable role → column mapping computed once per load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    columns: BTreeMap<ColumnRole, ResolvedColumn>,
}

impl ColumnMapping {
    /// Resolves every role against a header row.
    ///
    /// Fails with [`LoadError::SchemaMismatch`] naming every required role that
    /// could be found neither by name nor by position.
    pub fn resolve<S>(headers: &[S]) -> Result<Self, LoadError>
    where
        S: AsRef<str>,
    {
        let mut columns = BTreeMap::new();
        for role in ColumnRole::ALL {
            if let Some(index) = headers
                .iter()
                .position(|header| role.matches_header(header.as_ref()))
            {
                columns.insert(role, ResolvedColumn::new(headers, index, Resolution::ByName));
            }
        }

        // Positions already claimed by a header match are never reused
        let mut missing = vec![];
        for role in ColumnRole::ALL {
            if columns.contains_key(&role) {
                continue;
            }
            match role.position() {
                Some(index)
                    if index < headers.len()
                        && !columns.values().any(|column| column.index == index) =>
                {
                    let column = ResolvedColumn::new(headers, index, Resolution::ByPosition);
                    log::warn!(
                        "column '{}' not found by name; using column {index} ('{}') by position",
                        role.canonical_name(),
                        column.header
                    );
                    columns.insert(role, column);
                }
                _ if role.is_required() => missing.push(role.canonical_name().to_owned()),
                _ => log::info!("optional column '{}' not present", role.canonical_name()),
            }
        }

        if !missing.is_empty() {
            return Err(LoadError::SchemaMismatch { missing });
        }
        Ok(Self { columns })
    }

    #[must_use]
    pub fn get(&self, role: ColumnRole) -> Option<&ResolvedColumn> {
        self.columns.get(&role)
    }

    #[must_use]
    pub fn contains(&self, role: ColumnRole) -> bool {
        self.columns.contains_key(&role)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColumnRole, &ResolvedColumn)> + '_ {
        self.columns.iter().map(|(role, column)| (*role, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBLISHED_HEADER: [&str; 12] = [
        "Sex",
        "Year",
        "Age",
        "Weekly_Sleep_Duration",
        "psqi_2_groups",
        "MEQ",
        "Trait_Anxiety",
        "Notes",
        "PSQI_Score",
        "Sleep_Category",
        "Start_time_code",
        "Daytime_Dozing",
    ];

    #[test]
    fn test_all_roles_by_name() {
        let mapping = ColumnMapping::resolve(&PUBLISHED_HEADER).unwrap();
        for role in ColumnRole::ALL {
            let column = mapping.get(role).unwrap();
            assert!(column.resolution.is_by_name(), "{role}");
        }
        assert_eq!(mapping.get(ColumnRole::Psqi).unwrap().index, 8);
    }

    #[test]
    fn test_case_insensitive_and_alias() {
        let headers = [" psqi ", "stai_trait", "rmeq"];
        let mapping = ColumnMapping::resolve(&headers).unwrap();
        assert_eq!(mapping.get(ColumnRole::Psqi).unwrap().index, 0);
        assert_eq!(mapping.get(ColumnRole::TraitAnxiety).unwrap().index, 1);
        assert_eq!(mapping.get(ColumnRole::Chronotype).unwrap().index, 2);
        assert!(!mapping.contains(ColumnRole::StartTime));
    }

    #[test]
    fn test_positional_fallback() {
        let mut headers = PUBLISHED_HEADER.map(str::to_owned);
        headers[6] = "STAI score".to_owned();
        let mapping = ColumnMapping::resolve(&headers).unwrap();
        let anxiety = mapping.get(ColumnRole::TraitAnxiety).unwrap();
        assert_eq!(anxiety.index, 6);
        assert!(anxiety.resolution.is_by_position());
        assert_eq!(anxiety.header, "STAI score");
    }

    #[test]
    fn test_position_taken_by_named_column() {
        let headers = [
            "Sex",
            "Year",
            "Age",
            "x",
            "y",
            "MEQ",
            "Trait_Anxiety",
            "z",
            "PSQI_Score",
            "Sleep_Category",
            "Daytime_Dozing",
        ];
        let mapping = ColumnMapping::resolve(&headers).unwrap();
        assert_eq!(mapping.get(ColumnRole::DaytimeDozing).unwrap().index, 10);
        assert!(!mapping.contains(ColumnRole::StartTime));
    }

    #[test]
    fn test_missing_required_columns() {
        let headers = ["a", "b", "c", "d", "e", "MEQ"];
        let err = ColumnMapping::resolve(&headers).unwrap_err();
        assert_eq!(
            err,
            LoadError::SchemaMismatch {
                missing: vec!["Trait_Anxiety".to_owned(), "PSQI_Score".to_owned()]
            }
        );
    }

    #[test]
    fn test_parse_role() {
        assert_eq!("psqi".parse::<ColumnRole>().unwrap(), ColumnRole::Psqi);
        assert_eq!("Trait_Anxiety".parse::<ColumnRole>().unwrap(), ColumnRole::TraitAnxiety);
        assert!("bedtime".parse::<ColumnRole>().is_err());
    }
}
