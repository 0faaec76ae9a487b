//! Input records.

use serde::Deserialize;

use crate::error::{LineageError, RowField};

/// One fact linking a source system to a table within a domain.
///
/// Fields missing from serialized input deserialize to empty strings so that
/// [`Row::validate`] can report them together with the row's position.
///
/// # Examples
///
/// ```
/// use lineage::Row;
///
/// let row: Row = serde_json::from_str(
///     r#"{ "domain": "Domain1", "sourceSystem": "SystemA", "table": "Table1" }"#,
/// ).unwrap();
/// assert_eq!(row.source_system, "SystemA");
/// assert!(row.validate(0).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub domain: String,

    #[serde(default, rename = "sourceSystem", alias = "source_system")]
    pub source_system: String,

    #[serde(default)]
    pub table: String,
}

impl Row {
    pub fn new(
        domain: impl Into<String>,
        source_system: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            source_system: source_system.into(),
            table: table.into(),
        }
    }

    /// Checks that every field carries a non-blank value.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::Validation`] naming `row_index` and the first
    /// blank field.
    pub fn validate(&self, row_index: usize) -> Result<(), LineageError> {
        let fields = [
            (RowField::Domain, &self.domain),
            (RowField::SourceSystem, &self.source_system),
            (RowField::Table, &self.table),
        ];

        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(LineageError::Validation {
                row_index,
                field: *field,
            }),
            None => Ok(()),
        }
    }
}

impl<D, S, T> From<(D, S, T)> for Row
where
    D: Into<String>,
    S: Into<String>,
    T: Into<String>,
{
    fn from((domain, source_system, table): (D, S, T)) -> Self {
        Self::new(domain, source_system, table)
    }
}

/// Validates a whole batch, failing on the first offending row.
pub(crate) fn validate_all(rows: &[Row]) -> Result<(), LineageError> {
    rows.iter()
        .enumerate()
        .try_for_each(|(index, row)| row.validate(index))
}
