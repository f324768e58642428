//! In-memory survey table
//!
//! A [`Dataset`] is an ordered list of [`Record`]s plus the [`ColumnMapping`]
//! that was used to read them. Records are immutable once parsed; every field
//! is a [`Cell`] so that missing and malformed answers stay distinguishable
//! from real numbers.
//!
//! # Structure
//!
//! ```text
//! Dataset
//! ├─ location (source identifier the data came from)
//! ├─ mapping: ColumnMapping (role → column index, by name or position)
//! ├─ records: Vec<Record>
//! │   └─ one Cell per ColumnRole (Number / Text / Missing)
//! └─ extra: Vec<ExtraColumn>
//!     └─ header columns no role claimed, one Cell per record
//! ```

use std::io;

use serde::Serialize;

use crate::{
    error::{AnalysisError, LoadError},
    schema::{ColumnMapping, ColumnRole},
};

/// Cell contents treated as "no answer".
const MISSING_MARKERS: [&str; 6] = ["", "na", "n/a", "nan", "null", "none"];

/// One answer in the survey table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, derive_more::IsVariant)]
#[serde(untagged)]
pub enum Cell {
    /// A finite numeric answer.
    Number(f64),
    /// An answer that is present but not a usable number.
    Text(String),
    #[default]
    Missing,
}

impl Cell {
    /// Parses raw CSV field text.
    ///
    /// # Examples
    ///
    /// ```
    /// use sleepwise_analysis::dataset::Cell;
    ///
    /// assert_eq!(Cell::parse(" 7 "), Cell::Number(7.0));
    /// assert_eq!(Cell::parse("NA"), Cell::Missing);
    /// assert_eq!(Cell::parse("Female"), Cell::Text("Female".to_owned()));
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if MISSING_MARKERS
            .iter()
            .any(|marker| raw.eq_ignore_ascii_case(marker))
        {
            return Self::Missing;
        }
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Number(value),
            _ => Self::Text(raw.to_owned()),
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(_) | Self::Missing => None,
        }
    }
}

/// One respondent's answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    pub sex: Cell,
    pub year_of_study: Cell,
    pub age: Cell,
    pub weekly_sleep_duration: Cell,
    pub chronotype: Cell,
    pub trait_anxiety: Cell,
    pub psqi_two_groups: Cell,
    pub psqi: Cell,
    /// Sleep category as recorded in the file (not derived).
    pub sleep_category: Cell,
    pub start_time: Cell,
    pub daytime_dozing: Cell,
}

impl Record {
    fn from_row(mapping: &ColumnMapping, row: &csv::StringRecord) -> Self {
        let cell = |role| {
            mapping
                .get(role)
                .and_then(|column| row.get(column.index))
                .map_or(Cell::Missing, Cell::parse)
        };
        Self {
            sex: cell(ColumnRole::Sex),
            year_of_study: cell(ColumnRole::YearOfStudy),
            age: cell(ColumnRole::Age),
            weekly_sleep_duration: cell(ColumnRole::WeeklySleepDuration),
            chronotype: cell(ColumnRole::Chronotype),
            trait_anxiety: cell(ColumnRole::TraitAnxiety),
            psqi_two_groups: cell(ColumnRole::PsqiTwoGroups),
            psqi: cell(ColumnRole::Psqi),
            sleep_category: cell(ColumnRole::SleepCategory),
            start_time: cell(ColumnRole::StartTime),
            daytime_dozing: cell(ColumnRole::DaytimeDozing),
        }
    }

    #[must_use]
    pub fn cell(&self, role: ColumnRole) -> &Cell {
        match role {
            ColumnRole::Sex => &self.sex,
            ColumnRole::YearOfStudy => &self.year_of_study,
            ColumnRole::Age => &self.age,
            ColumnRole::WeeklySleepDuration => &self.weekly_sleep_duration,
            ColumnRole::Chronotype => &self.chronotype,
            ColumnRole::TraitAnxiety => &self.trait_anxiety,
            ColumnRole::PsqiTwoGroups => &self.psqi_two_groups,
            ColumnRole::Psqi => &self.psqi,
            ColumnRole::SleepCategory => &self.sleep_category,
            ColumnRole::StartTime => &self.start_time,
            ColumnRole::DaytimeDozing => &self.daytime_dozing,
        }
    }
}

/// A header column that no [`ColumnRole`] resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtraColumn {
    pub header: String,
    /// One cell per record, in record order.
    pub cells: Vec<Cell>,
}

impl ExtraColumn {
    /// Whether the column holds at least one number and no text answers.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.cells.iter().any(Cell::is_number) && !self.cells.iter().any(Cell::is_text)
    }

    #[must_use]
    pub fn numeric(&self) -> Vec<Option<f64>> {
        self.cells.iter().map(Cell::as_number).collect()
    }
}

/// The survey table loaded for one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    location: String,
    mapping: ColumnMapping,
    records: Vec<Record>,
    extra: Vec<ExtraColumn>,
}

impl Dataset {
    /// Parses CSV text with a header row.
    ///
    /// The whole input is validated before a dataset is returned: malformed
    /// rows (including rows with a different field count) and inputs without
    /// any data row fail with [`LoadError::DataUnavailable`]; header problems
    /// fail with [`LoadError::SchemaMismatch`].
    pub fn from_csv_reader<R>(location: impl Into<String>, reader: R) -> Result<Self, LoadError>
    where
        R: io::Read,
    {
        let location = location.into();
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| LoadError::unavailable(&location, format!("malformed CSV header: {e}")))?
            .iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        let mapping = ColumnMapping::resolve(&headers)?;
        let extra_indices = (0..headers.len())
            .filter(|&index| !mapping.iter().any(|(_, column)| column.index == index))
            .collect::<Vec<_>>();
        let mut extra = extra_indices
            .iter()
            .map(|&index| ExtraColumn {
                header: match headers[index].as_str() {
                    "" => format!("column_{index}"),
                    header => header.to_owned(),
                },
                cells: vec![],
            })
            .collect::<Vec<_>>();

        let mut records = vec![];
        for row in reader.records() {
            let row =
                row.map_err(|e| LoadError::unavailable(&location, format!("malformed CSV: {e}")))?;
            for (column, &index) in extra.iter_mut().zip(&extra_indices) {
                column.cells.push(row.get(index).map_or(Cell::Missing, Cell::parse));
            }
            records.push(Record::from_row(&mapping, &row));
        }
        if records.is_empty() {
            return Err(LoadError::unavailable(&location, "no data rows"));
        }

        log::info!(
            "loaded {} records from {location} ({} unmapped columns)",
            records.len(),
            extra.len()
        );
        Ok(Self {
            location,
            mapping,
            records,
            extra,
        })
    }

    /// Source identifier the data was read from.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Columns of the file that no role resolved to, in file order.
    #[must_use]
    pub fn extra_columns(&self) -> &[ExtraColumn] {
        &self.extra
    }

    #[must_use]
    pub fn has_column(&self, role: ColumnRole) -> bool {
        self.mapping.contains(role)
    }

    /// Cells of one column, in record order.
    pub fn cells(
        &self,
        role: ColumnRole,
    ) -> Result<impl Iterator<Item = &Cell> + '_, AnalysisError> {
        if !self.has_column(role) {
            return Err(AnalysisError::column_not_found(role));
        }
        Ok(self.records.iter().map(move |record| record.cell(role)))
    }

    /// Numeric view of one column; `None` marks missing or non-numeric answers.
    pub fn numeric(&self, role: ColumnRole) -> Result<Vec<Option<f64>>, AnalysisError> {
        Ok(self.cells(role)?.map(Cell::as_number).collect())
    }
}
