//! Schema model and reconciliation between detected and expected structure.
//!
//! Two schema instances coexist in a session: the *detected* schema is
//! authoritative and comes back from the profiling service; the *expected*
//! schema is user-authored (typed, imported from a JSON file, or reset to a
//! copy of the detected one). [`SchemaReconciler`] owns both plus the JSON
//! editor text, computes local mismatch hints, and stores the verdicts the
//! remote schema-check returns.
//!
//! Type tags form a closed set. Unknown tags are rejected when a document is
//! parsed, not silently carried into downstream comparisons.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorkflowError};

/// Closed set of column type tags understood by the checking service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Int,
    Float,
    Str,
    Bool,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Int => "int",
            ColumnKind::Float => "float",
            ColumnKind::Str => "str",
            ColumnKind::Bool => "bool",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnKind {
    type Err = WorkflowError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "int" => Ok(ColumnKind::Int),
            "float" => Ok(ColumnKind::Float),
            "str" => Ok(ColumnKind::Str),
            "bool" => Ok(ColumnKind::Bool),
            other => Err(WorkflowError::InvalidJson(format!(
                "unknown type tag '{other}' (expected int, float, str, or bool)"
            ))),
        }
    }
}

/// Column-name to type-tag mapping. `BTreeMap` keeps exports stable under
/// key ordering, which is all the round-trip law asks for.
pub type SchemaMap = BTreeMap<String, ColumnKind>;

/// Per-column verdict returned by the remote schema-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationEntry {
    pub column: String,
    pub exists: bool,
    pub type_ok: bool,
}

/// Locally computed diagnostic for one expected column, rendered on every
/// editor change without a server round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchHint {
    NotFound,
    TypeMismatch {
        expected: ColumnKind,
        detected: ColumnKind,
    },
}

impl fmt::Display for MismatchHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchHint::NotFound => f.write_str("column not found"),
            MismatchHint::TypeMismatch { expected, detected } => {
                write!(f, "type mismatch, expected {expected} but detected {detected}")
            }
        }
    }
}

/// Parses a schema document, rejecting malformed JSON and unknown type tags.
pub fn parse_schema_text(text: &str) -> Result<SchemaMap> {
    serde_json::from_str(text).map_err(|err| WorkflowError::InvalidJson(err.to_string()))
}

/// Serializes a schema map as the pretty-printed JSON document the editor
/// and the export artifact both use.
pub fn render_schema_json(schema: &SchemaMap) -> String {
    serde_json::to_string_pretty(schema).unwrap_or_default()
}

/// Owns the expected-schema definition and its diff against the detected
/// schema.
#[derive(Debug, Default)]
pub struct SchemaReconciler {
    detected: SchemaMap,
    expected: SchemaMap,
    editor_text: String,
    validation: Vec<ValidationEntry>,
    validated: bool,
}

impl SchemaReconciler {
    pub fn detected(&self) -> &SchemaMap {
        &self.detected
    }

    pub fn expected(&self) -> &SchemaMap {
        &self.expected
    }

    pub fn editor_text(&self) -> &str {
        &self.editor_text
    }

    pub fn validation(&self) -> &[ValidationEntry] {
        &self.validation
    }

    pub fn has_validated(&self) -> bool {
        self.validated
    }

    /// Installs a freshly detected schema. The expected schema is reseeded
    /// as a copy and the editor text resynchronized, so the user edits from
    /// the detected structure by default. Stale verdicts are discarded.
    pub fn seed_detected(&mut self, detected: SchemaMap) {
        self.expected = detected.clone();
        self.detected = detected;
        self.editor_text = render_schema_json(&self.expected);
        self.validation.clear();
        self.validated = false;
    }

    /// Replaces the expected schema from editor text. Invalid input leaves
    /// the held schema untouched; valid input is kept verbatim as the new
    /// editor text.
    pub fn load_from_text(&mut self, text: &str) -> Result<&SchemaMap> {
        let parsed = parse_schema_text(text)?;
        self.expected = parsed;
        self.editor_text = text.to_string();
        Ok(&self.expected)
    }

    /// Replaces the expected schema from an imported JSON file.
    pub fn load_from_file(&mut self, bytes: &[u8]) -> Result<&SchemaMap> {
        let text = std::str::from_utf8(bytes)
            .map_err(|err| WorkflowError::InvalidJson(err.to_string()))?;
        let parsed = parse_schema_text(text)?;
        self.expected = parsed;
        self.editor_text = render_schema_json(&self.expected);
        Ok(&self.expected)
    }

    pub fn reset_to_detected(&mut self) -> &SchemaMap {
        self.expected = self.detected.clone();
        self.editor_text = render_schema_json(&self.expected);
        &self.expected
    }

    /// The exportable expected-schema document, importable byte-for-byte via
    /// [`SchemaReconciler::load_from_file`].
    pub fn export_json(&self) -> String {
        render_schema_json(&self.expected)
    }

    pub fn set_validation(&mut self, entries: Vec<ValidationEntry>) {
        self.validation = entries;
        self.validated = true;
    }

    /// Diagnostic for one expected column. Absence from the detected schema
    /// takes precedence over any type comparison; a diverging tag reports
    /// both sides. Columns only present in detected are never reported.
    pub fn mismatch_hint(&self, column: &str) -> Option<MismatchHint> {
        let expected = *self.expected.get(column)?;
        match self.detected.get(column) {
            None => Some(MismatchHint::NotFound),
            Some(&detected) if detected != expected => Some(MismatchHint::TypeMismatch {
                expected,
                detected,
            }),
            Some(_) => None,
        }
    }

    /// Hints for every expected column, in key order, skipping clean ones.
    pub fn mismatch_hints(&self) -> Vec<(String, MismatchHint)> {
        self.expected
            .keys()
            .filter_map(|col| self.mismatch_hint(col).map(|hint| (col.clone(), hint)))
            .collect()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
