use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single scalar value inside a result row. The remote service serializes
/// rows as JSON objects, so the variant set mirrors JSON scalars; integers
/// are tried before floats so `3` stays an integer on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Cell {
    pub fn as_display(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Bool(b) => b.to_string(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Str(s) => s.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// One result row: an insertion-ordered column-to-value mapping. Every row
/// of a given result set carries the same column set.
pub type Row = IndexMap<String, Cell>;

/// Column names of a row sequence, taken from the first row. Empty input
/// yields an empty header set.
pub fn row_columns(rows: &[Row]) -> Vec<String> {
    rows.first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default()
}

/// Flattens rows into display cells following `columns` order, for table
/// rendering. Missing cells render empty.
pub fn rows_to_display(columns: &[String], rows: &[Row]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| row.get(col).map(Cell::as_display).unwrap_or_default())
                .collect()
        })
        .collect()
}
