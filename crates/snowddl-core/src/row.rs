//! Result rows and typed row decoding.
//!
//! Drivers hand back [`Row`]s: ordered `(column, cell)` pairs. Typed row
//! structs implement [`ScanRow`] (usually through `#[derive(ScanRow)]`) and
//! pull their fields out by column name, case-insensitively. Nullable
//! columns decode into `Option<T>`.

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

/// A single value in a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Timestamp value.
    Timestamp(DateTime<Utc>),
}

impl Cell {
    /// Returns a short name of the cell type, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "BOOLEAN",
            Self::Int(_) => "INTEGER",
            Self::Float(_) => "FLOAT",
            Self::Text(_) => "TEXT",
            Self::Timestamp(_) => "TIMESTAMP",
        }
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for Cell {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One result row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Cell)>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// Appends a column.
    pub fn push(&mut self, column: impl Into<String>, cell: impl Into<Cell>) {
        self.cells.push((column.into(), cell.into()));
    }

    /// Appends a column, builder style.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, cell: impl Into<Cell>) -> Self {
        self.push(column, cell);
        self
    }

    /// Returns the cell of `column`, matched case-insensitively.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, cell)| cell)
    }

    /// Decodes `column` into `T`.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] if the column is missing or holds an
    /// incompatible value.
    pub fn decode<T: FromCell>(&self, column: &str) -> Result<T, ScanError> {
        T::from_cell(column, self.get(column))
    }

    /// Returns the column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates over `(column, cell)` pairs in result order.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(name, cell)| (name.as_str(), cell))
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns whether the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Errors raised while decoding rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The column is not in the result set.
    #[error("column `{column}` is missing from the result set")]
    MissingColumn {
        /// Column name.
        column: String,
    },

    /// The column is NULL but the field is not optional.
    #[error("column `{column}` is NULL but the field is not nullable")]
    UnexpectedNull {
        /// Column name.
        column: String,
    },

    /// The column value cannot be converted.
    #[error("column `{column}` holds {found}, expected {expected}")]
    TypeMismatch {
        /// Column name.
        column: String,
        /// Expected type.
        expected: &'static str,
        /// Found cell type.
        found: &'static str,
    },
}

/// Trait for field types that can be decoded from a cell.
pub trait FromCell: Sized {
    /// Decodes a cell. `cell` is `None` when the column is absent.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] if the cell cannot be converted.
    fn from_cell(column: &str, cell: Option<&Cell>) -> Result<Self, ScanError>;
}

fn present<'a>(column: &str, cell: Option<&'a Cell>) -> Result<&'a Cell, ScanError> {
    match cell {
        None => Err(ScanError::MissingColumn {
            column: column.to_string(),
        }),
        Some(Cell::Null) => Err(ScanError::UnexpectedNull {
            column: column.to_string(),
        }),
        Some(cell) => Ok(cell),
    }
}

fn mismatch(column: &str, expected: &'static str, cell: &Cell) -> ScanError {
    ScanError::TypeMismatch {
        column: column.to_string(),
        expected,
        found: cell.type_name(),
    }
}

impl FromCell for String {
    fn from_cell(column: &str, cell: Option<&Cell>) -> Result<Self, ScanError> {
        match present(column, cell)? {
            Cell::Text(s) => Ok(s.clone()),
            Cell::Int(n) => Ok(n.to_string()),
            Cell::Float(f) => Ok(f.to_string()),
            Cell::Bool(b) => Ok(b.to_string()),
            Cell::Timestamp(ts) => Ok(ts.to_rfc3339()),
            other => Err(mismatch(column, "TEXT", other)),
        }
    }
}

impl FromCell for i64 {
    fn from_cell(column: &str, cell: Option<&Cell>) -> Result<Self, ScanError> {
        let cell = present(column, cell)?;
        match cell {
            Cell::Int(n) => Ok(*n),
            Cell::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| mismatch(column, "INTEGER", cell)),
            other => Err(mismatch(column, "INTEGER", other)),
        }
    }
}

impl FromCell for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from_cell(column: &str, cell: Option<&Cell>) -> Result<Self, ScanError> {
        let cell = present(column, cell)?;
        match cell {
            Cell::Float(f) => Ok(*f),
            Cell::Int(n) => Ok(*n as Self),
            Cell::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| mismatch(column, "FLOAT", cell)),
            other => Err(mismatch(column, "FLOAT", other)),
        }
    }
}

impl FromCell for bool {
    fn from_cell(column: &str, cell: Option<&Cell>) -> Result<Self, ScanError> {
        let cell = present(column, cell)?;
        match cell {
            Cell::Bool(b) => Ok(*b),
            Cell::Int(n) => Ok(*n != 0),
            // SHOW output spells booleans as true/false or Y/N.
            Cell::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "y" | "yes" | "on" | "1" => Ok(true),
                "false" | "n" | "no" | "off" | "0" => Ok(false),
                _ => Err(mismatch(column, "BOOLEAN", cell)),
            },
            other => Err(mismatch(column, "BOOLEAN", other)),
        }
    }
}

impl FromCell for DateTime<Utc> {
    fn from_cell(column: &str, cell: Option<&Cell>) -> Result<Self, ScanError> {
        let cell = present(column, cell)?;
        match cell {
            Cell::Timestamp(ts) => Ok(*ts),
            Cell::Text(s) => parse_timestamp(s).ok_or_else(|| mismatch(column, "TIMESTAMP", cell)),
            other => Err(mismatch(column, "TIMESTAMP", other)),
        }
    }
}

impl<T: FromCell> FromCell for Option<T> {
    fn from_cell(column: &str, cell: Option<&Cell>) -> Result<Self, ScanError> {
        match cell {
            None | Some(Cell::Null) => Ok(None),
            Some(_) => T::from_cell(column, cell).map(Some),
        }
    }
}

/// Parses the timestamp spellings returned by the warehouse and by drivers.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(ts) = DateTime::parse_from_str(text, format) {
            return Some(ts.with_timezone(&Utc));
        }
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Trait for typed row structs.
pub trait ScanRow: Sized {
    /// Decodes one row.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] if a column is missing or mistyped.
    fn scan(row: &Row) -> Result<Self, ScanError>;
}

/// Decodes every row.
///
/// # Errors
///
/// Returns the first [`ScanError`].
pub fn scan_all<R: ScanRow>(rows: &[Row]) -> Result<Vec<R>, ScanError> {
    rows.iter().map(R::scan).collect()
}
