use crate::utils::error::{CertificateError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Appended to the participant name to form each certificate's file name.
pub const CERTIFICATE_SUFFIX: &str = "_certificado.pdf";

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Blank cells and whitespace-only text count as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            CellValue::Number(value) => value.is_nan(),
            CellValue::Bool(_) => false,
        }
    }

    /// Display string, or `None` when the cell is missing.
    pub fn as_text(&self) -> Option<String> {
        if self.is_missing() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(value) => write!(f, "{}", value),
            CellValue::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                write!(f, "{}", *value as i64)
            }
            CellValue::Number(value) => write!(f, "{}", value),
            CellValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub header: String,
    pub cells: Vec<CellValue>,
}

/// Flat table of named columns. All columns have the same length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Builds a table from a header row and data rows. Short rows are padded
    /// with `Empty`, cells past the header width are dropped. Repeated
    /// headers are renamed `Nome.1`, `Nome.2`, ...
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let row_count = rows.len();
        let mut columns: Vec<Column> = unique_headers(headers)
            .into_iter()
            .map(|header| Column {
                header,
                cells: Vec::with_capacity(row_count),
            })
            .collect();

        for row in rows {
            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.cells.push(cells.next().unwrap_or_default());
            }
        }

        Self { columns, row_count }
    }

    pub fn from_columns(mut columns: Vec<Column>) -> Result<Self> {
        let headers = unique_headers(columns.iter().map(|c| c.header.clone()).collect());
        for (column, header) in columns.iter_mut().zip(headers) {
            column.header = header;
        }
        let row_count = columns.first().map(|c| c.cells.len()).unwrap_or(0);
        if let Some(column) = columns.iter().find(|c| c.cells.len() != row_count) {
            return Err(CertificateError::unreadable(
                "table",
                format!(
                    "column '{}' has {} cells, expected {}",
                    column.header,
                    column.cells.len(),
                    row_count
                ),
            ));
        }
        Ok(Self { columns, row_count })
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header.as_str()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.columns
            .get(column)
            .and_then(|c| c.cells.get(row))
            .unwrap_or(&EMPTY)
    }
}

fn unique_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    headers
        .into_iter()
        .map(|header| {
            let unique = if seen.contains(&header) {
                (1..)
                    .map(|n| format!("{}.{}", header, n))
                    .find(|candidate| !seen.contains(candidate))
                    .unwrap_or_else(|| header.clone())
            } else {
                header
            };
            seen.insert(unique.clone());
            unique
        })
        .collect()
}

/// Reference to a column by position, keeping its header for messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub index: usize,
    pub header: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRoles {
    pub name: ColumnRef,
    pub email: Option<ColumnRef>,
    pub activity: Option<ColumnRef>,
}

/// How a role was bound to its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleSource {
    Explicit,
    Keyword,
    Positional,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnResolution {
    pub roles: ColumnRoles,
    pub name_source: RoleSource,
    pub email_source: Option<RoleSource>,
    pub activity_source: Option<RoleSource>,
}

impl ColumnResolution {
    pub fn used_fallback(&self) -> bool {
        self.name_source == RoleSource::Positional
            || self.email_source == Some(RoleSource::Positional)
            || self.activity_source == Some(RoleSource::Positional)
    }
}

/// Aggregated attendance for one uniquely-named participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantSummary {
    pub name: String,
    pub total_hours: f64,
    pub email: Option<String>,
    pub activities: BTreeSet<String>,
    pub records: usize,
}

impl ParticipantSummary {
    pub fn activities_text(&self) -> String {
        self.activities
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn whole_hours(&self) -> i64 {
        self.total_hours.trunc() as i64
    }
}

/// One row of a custom-text batch.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomEntry {
    pub name: String,
    pub override_text: Option<String>,
}

/// Composed text fields of one certificate, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateText {
    pub name: String,
    pub title: String,
    pub salutation: String,
    pub body_lines: Vec<String>,
    pub footer: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CertificateDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveEntry {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// In-memory archive. Entry names are unique: a colliding name gets a
/// numeric suffix before its extension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Archive {
    entries: Vec<ArchiveEntry>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a document and returns the name it was stored under.
    pub fn insert(&mut self, document: CertificateDocument) -> String {
        let file_name = self.unique_name(&document.file_name);
        if file_name != document.file_name {
            tracing::warn!(
                "⚠️ Duplicate certificate name '{}', stored as '{}'",
                document.file_name,
                file_name
            );
        }
        self.entries.push(ArchiveEntry {
            file_name: file_name.clone(),
            bytes: document.bytes,
        });
        file_name
    }

    fn unique_name(&self, wanted: &str) -> String {
        if !self.contains(wanted) {
            return wanted.to_string();
        }
        let (stem, suffix) = match wanted.strip_suffix(CERTIFICATE_SUFFIX) {
            Some(stem) => (stem, CERTIFICATE_SUFFIX),
            None => match wanted.rfind('.') {
                Some(dot) => (&wanted[..dot], &wanted[dot..]),
                None => (wanted, ""),
            },
        };
        (2..)
            .map(|n| format!("{}_{}{}", stem, n, suffix))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| wanted.to_string())
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.entries.iter().any(|e| e.file_name == file_name)
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A participant left out of the batch under the skip policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFailureReport {
    pub participant: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub archive: Archive,
    pub failures: Vec<RenderFailureReport>,
    pub participants: usize,
    pub total_hours: f64,
}

/// What a finished run reports back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub output_path: String,
    pub certificates: usize,
    pub participants: usize,
    pub total_hours: f64,
    pub mean_hours: f64,
    pub skipped: Vec<RenderFailureReport>,
}
