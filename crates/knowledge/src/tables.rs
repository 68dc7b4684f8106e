//! CSV table readers for the three knowledge sources.
//!
//! Each reader turns raw bytes into one lookup map. Errors are returned to the
//! caller, which decides how to degrade (see `KnowledgeStore::load`).

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::store::DiseaseInfo;
use crate::symptom::Symptom;

pub const DISEASE_COLUMN: &str = "Disease";
pub const SYMPTOM_COLUMN_PREFIX: &str = "Symptom_";
pub const PRECAUTION_COLUMN_PREFIX: &str = "Precaution";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("table file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// Header row plus data rows, all cells trimmed.
pub(crate) struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    fn disease_index(&self) -> Result<usize, LoadError> {
        self.headers
            .iter()
            .position(|h| h == DISEASE_COLUMN)
            .ok_or(LoadError::MissingColumn(DISEASE_COLUMN))
    }

    /// Rows with a non-empty disease name, paired with that name.
    fn disease_rows(&self) -> Result<impl Iterator<Item = (&str, &[String])>, LoadError> {
        let idx = self.disease_index()?;
        Ok(self.rows.iter().filter_map(move |row| {
            let name = row.get(idx).map(|s| s.as_str()).unwrap_or("");
            if is_blank(name) {
                None
            } else {
                Some((name, row.as_slice()))
            }
        }))
    }

    fn columns_with_prefix(&self, prefix: &str) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.starts_with(prefix))
            .map(|(i, _)| i)
            .collect()
    }
}

pub(crate) fn read_source(path: &Path) -> Result<Vec<u8>, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn read_table(bytes: &[u8]) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    let table = Table { headers, rows };
    table.disease_index()?;
    Ok(table)
}

/// Disease -> symptom set. Rows repeated for one disease are merged.
pub(crate) fn symptom_map(table: &Table) -> Result<HashMap<String, BTreeSet<Symptom>>, LoadError> {
    let columns = table.columns_with_prefix(SYMPTOM_COLUMN_PREFIX);
    let mut map: HashMap<String, BTreeSet<Symptom>> = HashMap::new();

    for (name, row) in table.disease_rows()? {
        let entry = map.entry(name.to_string()).or_default();
        entry.extend(
            columns
                .iter()
                .filter_map(|&i| row.get(i))
                .filter_map(|cell| Symptom::parse(cell)),
        );
    }

    Ok(map)
}

/// Disease -> knowledge row. A later row for the same disease replaces an earlier one.
pub(crate) fn info_map(table: &Table) -> Result<HashMap<String, DiseaseInfo>, LoadError> {
    let disease_idx = table.disease_index()?;
    let mut map = HashMap::new();

    for (name, row) in table.disease_rows()? {
        let fields = table
            .headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != disease_idx)
            .filter_map(|(i, header)| {
                let value = row.get(i)?;
                (!is_blank(value)).then(|| (header.clone(), value.clone()))
            })
            .collect();
        map.insert(name.to_string(), DiseaseInfo::new(fields));
    }

    Ok(map)
}

/// Disease -> ordered precautions. A later row for the same disease replaces an earlier one.
pub(crate) fn precaution_map(table: &Table) -> Result<HashMap<String, Vec<String>>, LoadError> {
    let columns = table.columns_with_prefix(PRECAUTION_COLUMN_PREFIX);
    let mut map = HashMap::new();

    for (name, row) in table.disease_rows()? {
        let precautions = columns
            .iter()
            .filter_map(|&i| row.get(i))
            .filter(|cell| !is_blank(cell))
            .cloned()
            .collect();
        map.insert(name.to_string(), precautions);
    }

    Ok(map)
}

fn is_blank(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || cell.eq_ignore_ascii_case("nan")
}
