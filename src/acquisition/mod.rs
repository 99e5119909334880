//! CSV Dataset Loader
//!
//! Reads a recorder export into a [`Dataset`]. The first row is the header;
//! every later row is one sample instant.
//!
//! - Column names are normalized: trimmed, lower-cased, spaces → `_`
//!   (`" Sensor 1 "` becomes `sensor_1`).
//! - Quoted fields (`"1,5"`, `"a ""b"""`) are honoured.
//! - Rows with no content are dropped.
//! - A column is kept only if every non-empty cell parses as `f64`. Empty
//!   cells in a kept column become NaN so all channels stay index-aligned.
//!
//! Sensor channels are then picked with [`Dataset::sensor_names`].

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::types::Dataset;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("read error at line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("input has no header row")]
    Empty,

    #[error("no numeric columns found")]
    NoNumericData,

    #[error("column '{0}' appears more than once after normalization")]
    DuplicateColumn(String),
}

/// Load a CSV file from disk.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Dataset, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let dataset = parse_csv(file)?;
    info!(
        file = %path.display(),
        channels = dataset.len(),
        sensors = dataset.sensor_names().len(),
        "Dataset loaded"
    );
    Ok(dataset)
}

/// Parse CSV text from any reader.
pub fn parse_csv<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut lines = BufReader::new(reader).lines();

    let header_line = lines
        .next()
        .ok_or(LoadError::Empty)?
        .map_err(|source| LoadError::Read { line: 1, source })?;
    let header: Vec<String> = csv_split(header_line.trim_start_matches('\u{feff}'))
        .iter()
        .map(|h| normalize_column_name(h))
        .collect();
    if header.iter().all(String::is_empty) {
        return Err(LoadError::Empty);
    }
    for (i, name) in header.iter().enumerate() {
        if !name.is_empty() && header[..i].contains(name) {
            return Err(LoadError::DuplicateColumn(name.clone()));
        }
    }

    let mut columns: Vec<Column> = header.iter().map(|_| Column::default()).collect();
    let mut rows = 0usize;
    let mut line_num = 1usize;

    for line in lines {
        line_num += 1;
        let line = line.map_err(|source| LoadError::Read {
            line: line_num,
            source,
        })?;

        let fields = csv_split(&line);
        if fields.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        if fields.len() > columns.len() {
            warn!(
                line = line_num,
                fields = fields.len(),
                columns = columns.len(),
                "Row has more fields than header, extra fields ignored"
            );
        }

        for (i, column) in columns.iter_mut().enumerate() {
            column.push(fields.get(i).map_or("", |f| f.trim()));
        }
        rows += 1;
    }

    let mut dataset = Dataset::new();
    for (name, column) in header.into_iter().zip(columns) {
        if name.is_empty() {
            continue;
        }
        match column.into_numeric() {
            Some(samples) => dataset.insert(name, samples),
            None => debug!(column = %name, "Skipping non-numeric column"),
        }
    }

    if dataset.is_empty() {
        return Err(LoadError::NoNumericData);
    }

    debug!(rows, channels = dataset.len(), "CSV parsed");
    Ok(dataset)
}

/// Trim, lower-case and replace spaces with underscores.
pub fn normalize_column_name(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

#[derive(Debug, Default)]
struct Column {
    values: Vec<f64>,
    non_empty: usize,
    seen_invalid: bool,
}

impl Column {
    fn push(&mut self, cell: &str) {
        if cell.is_empty() {
            self.values.push(f64::NAN);
            return;
        }
        self.non_empty += 1;
        match cell.parse::<f64>() {
            Ok(v) => self.values.push(v),
            Err(_) => {
                self.seen_invalid = true;
                self.values.push(f64::NAN);
            }
        }
    }

    fn into_numeric(self) -> Option<Vec<f64>> {
        (self.non_empty > 0 && !self.seen_invalid).then_some(self.values)
    }
}

/// Split one CSV line on commas, honouring double quotes and `""` escapes.
fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match (ch, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            ('"', _) => quoted = !quoted,
            (',', false) => fields.push(std::mem::take(&mut field)),
            _ => field.push(ch),
        }
    }
    fields.push(field);
    fields
}
