// Table model: what the core needs to know about a dataset.
//
// Loading and typing tables belongs to the provider; the core only sees
// named columns, a role per column, and the raw string cells.

pub mod csv_store;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AlignResult;

/// Whether a column is vectorized (categorical) or ignored (numeric).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    Numeric,
    Categorical,
}

impl ColumnRole {
    /// Classify a column by its cells.
    ///
    /// Numeric when at least one cell is non-empty and every non-empty cell
    /// parses as a number. Everything else, including all-empty columns, is
    /// categorical.
    pub fn infer<S: AsRef<str>>(values: &[S]) -> Self {
        let mut saw_value = false;
        for value in values {
            let trimmed = value.as_ref().trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.parse::<f64>().is_err() {
                return ColumnRole::Categorical;
            }
            saw_value = true;
        }
        if saw_value {
            ColumnRole::Numeric
        } else {
            ColumnRole::Categorical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::Numeric => "numeric",
            ColumnRole::Categorical => "categorical",
        }
    }
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named column with its role and raw cells, in row order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub role: ColumnRole,
    pub values: Vec<String>,
}

impl Column {
    /// Build a column and infer its role from the cells.
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        let role = ColumnRole::infer(&values);
        Self {
            name: name.into(),
            role,
            values,
        }
    }

    pub fn categorical(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            role: ColumnRole::Categorical,
            values,
        }
    }

    pub fn numeric(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            role: ColumnRole::Numeric,
            values,
        }
    }

    pub fn is_categorical(&self) -> bool {
        self.role == ColumnRole::Categorical
    }

    /// The first `n` cells, used for report samples.
    pub fn sample(&self, n: usize) -> &[String] {
        &self.values[..self.values.len().min(n)]
    }
}

/// An ordered sequence of columns.
///
/// `id` names the table for reports. Tables read from disk also carry the
/// canonical path of their file in `source`, and that path is what decides
/// whether two tables are the same one (see [`Table::is_same_table`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(id: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            id: id.into(),
            source: None,
            columns,
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Same file when both tables know their file, otherwise same id.
    pub fn is_same_table(&self, other: &Table) -> bool {
        match (&self.source, &other.source) {
            (Some(a), Some(b)) => a == b,
            _ => self.id == other.id,
        }
    }

    /// Number of rows (the longest column; ragged columns read as empty cells).
    pub fn num_rows(&self) -> usize {
        self.columns.iter().map(|c| c.values.len()).max().unwrap_or(0)
    }

    /// Categorical columns with their position in the table, in table order.
    pub fn categorical_columns(&self) -> impl Iterator<Item = (usize, &Column)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_categorical())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Cell at (row, column), empty for cells past the end of a short column.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.columns
            .get(column)
            .and_then(|c| c.values.get(row))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Source of tables by identifier.
pub trait TableProvider {
    fn get_table(&self, id: &str) -> AlignResult<Table>;

    /// Canonical location of the table behind `id`, if the provider has one
    /// and it exists.
    fn locate(&self, _id: &str) -> Option<PathBuf> {
        None
    }

    /// Whether `id` resolves to `table`, without loading it.
    fn refers_to(&self, id: &str, table: &Table) -> bool {
        if id == table.id {
            return true;
        }
        match (&table.source, self.locate(id)) {
            (Some(source), Some(located)) => *source == located,
            _ => false,
        }
    }
}
