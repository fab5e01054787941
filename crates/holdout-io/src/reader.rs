//! CSV dataset reader with column type inference.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::domain::{Column, Dataset};
use crate::IoError;

/// Reads a headered CSV file into a typed [`Dataset`].
///
/// Every column is numeric when each non-missing cell parses as a finite
/// `f64`; otherwise it becomes categorical with levels in first-seen order.
/// Empty cells and `NA` / `NaN` / `null` (any case) are missing values.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::NoColumns`] | Header row is empty |
/// | [`IoError::DuplicateColumn`] | Two header cells share a name |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
pub struct DatasetReader {
    path: PathBuf,
}

impl DatasetReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so that InconsistentRowLength fires instead of a CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.parse_error(e))?.clone();
        if header.is_empty() || (header.len() == 1 && header.get(0) == Some("")) {
            return Err(IoError::NoColumns {
                path: self.path.clone(),
            });
        }
        let names: Vec<String> = header.iter().map(String::from).collect();
        let mut seen = HashSet::new();
        if let Some(dup) = names.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(IoError::DuplicateColumn { name: dup.clone() });
        }
        debug!(n_columns = names.len(), "read CSV header");

        let mut raw: Vec<Vec<String>> = vec![Vec::new(); names.len()];
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.parse_error(e))?;
            if record.len() != names.len() {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: names.len(),
                    got: record.len(),
                });
            }
            for (cells, value) in raw.iter_mut().zip(record.iter()) {
                cells.push(value.to_string());
            }
        }

        if raw[0].is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let columns: Vec<Column> = raw.iter().map(|cells| infer_column(cells)).collect();
        let n_categorical = columns.iter().filter(|c| !c.is_numeric()).count();
        let dataset = Dataset::new(names, columns)?;

        info!(
            n_rows = dataset.n_rows(),
            n_columns = dataset.n_columns(),
            n_categorical,
            "dataset loaded"
        );

        Ok(dataset)
    }

    fn parse_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty()
        || cell.eq_ignore_ascii_case("na")
        || cell.eq_ignore_ascii_case("nan")
        || cell.eq_ignore_ascii_case("null")
}

fn infer_column(cells: &[String]) -> Column {
    let parsed: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| {
            if is_missing(cell) {
                Some(None)
            } else {
                cell.parse::<f64>().ok().filter(|v| v.is_finite()).map(Some)
            }
        })
        .collect();

    if let Some(values) = parsed {
        return Column::Numeric(values);
    }

    let mut levels: Vec<String> = Vec::new();
    let codes = cells
        .iter()
        .map(|cell| {
            if is_missing(cell) {
                return None;
            }
            match levels.iter().position(|l| l == cell) {
                Some(code) => Some(code),
                None => {
                    levels.push(cell.clone());
                    Some(levels.len() - 1)
                }
            }
        })
        .collect();
    Column::Categorical { levels, codes }
}
