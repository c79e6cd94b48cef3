// CSV-backed table provider.
//
// Each table is one CSV file with a header row. Table IDs are paths relative
// to the store's root directory, so a candidate ID returned by the retrieval
// service can be resolved directly. Every loaded table records the canonical
// path of its file, which is what identifies it across IDs and command-line
// paths.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::debug;

use super::{Column, Table, TableProvider};
use crate::error::{AlignError, AlignResult};

/// Directory of CSV tables.
pub struct CsvTableStore {
    root: PathBuf,
}

impl CsvTableStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn table_path(&self, id: &str) -> PathBuf {
        self.root.join(id.trim_start_matches('/'))
    }
}

impl TableProvider for CsvTableStore {
    fn get_table(&self, id: &str) -> AlignResult<Table> {
        let path = self.table_path(id);
        let file = File::open(&path).map_err(|e| AlignError::Table {
            id: id.to_string(),
            reason: format!("{}: {e}", path.display()),
        })?;
        let table = read_csv(id, file)?;
        Ok(match fs::canonicalize(&path) {
            Ok(source) => table.with_source(source),
            Err(_) => table,
        })
    }

    fn locate(&self, id: &str) -> Option<PathBuf> {
        fs::canonicalize(self.table_path(id)).ok()
    }
}

/// Load a CSV file from disk. The path as given becomes the table's id.
pub fn load_csv(path: &Path) -> AlignResult<Table> {
    let id = path.display().to_string();
    let table_err = |e: std::io::Error| AlignError::Table {
        id: id.clone(),
        reason: e.to_string(),
    };
    let file = File::open(path).map_err(table_err)?;
    let source = fs::canonicalize(path).map_err(table_err)?;
    Ok(read_csv(&id, file)?.with_source(source))
}

/// Parse CSV text into a table, inferring each column's role.
///
/// Rows shorter than the header leave their missing cells empty; extra cells
/// beyond the header are ignored.
pub fn read_csv<R: Read>(id: &str, reader: R) -> AlignResult<Table> {
    let table_err = |reason: String| AlignError::Table {
        id: id.to_string(),
        reason,
    };

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| table_err(format!("failed to read CSV headers: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() {
        return Err(table_err("empty table".to_string()));
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for result in rdr.records() {
        let record = result.map_err(|e| table_err(format!("failed to read CSV record: {e}")))?;
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(record.get(idx).unwrap_or("").to_string());
        }
    }

    let columns: Vec<Column> = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name, values))
        .collect();

    debug!(
        table = id,
        columns = columns.len(),
        rows = columns.first().map(|c| c.values.len()).unwrap_or(0),
        "Loaded CSV table"
    );

    Ok(Table::new(id, columns))
}
