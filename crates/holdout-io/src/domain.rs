//! Domain types for holdout-io.

use std::collections::HashSet;
use std::fmt;

use crate::IoError;

/// Two-level class label produced by binarizing a continuous target.
///
/// Level order is alphabetical, so `Above` has class index 0 and `Below`
/// has class index 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryLabel {
    /// The target value lies strictly above the threshold.
    Above,
    /// The target value lies at or below the threshold.
    Below,
}

impl BinaryLabel {
    /// Both levels in class-index order.
    pub const LEVELS: [BinaryLabel; 2] = [BinaryLabel::Above, BinaryLabel::Below];

    /// Return the zero-based class index.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            BinaryLabel::Above => 0,
            BinaryLabel::Below => 1,
        }
    }

    /// Map a zero-based class index back to a label.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(BinaryLabel::Above),
            1 => Some(BinaryLabel::Below),
            _ => None,
        }
    }

    /// Return the level name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryLabel::Above => "above",
            BinaryLabel::Below => "below",
        }
    }
}

impl fmt::Display for BinaryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single typed column. `None` cells are missing values.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Finite floating-point values.
    Numeric(Vec<Option<f64>>),
    /// Level codes into `levels`, in first-seen order.
    Categorical {
        /// Distinct level names.
        levels: Vec<String>,
        /// Per-row index into `levels`.
        codes: Vec<Option<usize>>,
    },
}

impl Column {
    /// Return the number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Categorical { codes, .. } => codes.len(),
        }
    }

    /// Return `true` if the column has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return `true` if the cell at `row` is missing.
    #[must_use]
    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            Column::Numeric(values) => values[row].is_none(),
            Column::Categorical { codes, .. } => codes[row].is_none(),
        }
    }

    /// Count the missing cells.
    #[must_use]
    pub fn n_missing(&self) -> usize {
        (0..self.len()).filter(|&row| self.is_missing(row)).count()
    }

    /// Return `true` for numeric columns.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    /// Borrow the numeric cells, or `None` for a categorical column.
    #[must_use]
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match self {
            Column::Numeric(values) => Some(values),
            Column::Categorical { .. } => None,
        }
    }

    /// Return a value usable as a frequency key for the cell at `row`.
    ///
    /// Numeric cells map to their IEEE bit pattern, categorical cells to the
    /// level code. Missing cells map to `None`.
    #[must_use]
    pub fn key(&self, row: usize) -> Option<u64> {
        match self {
            Column::Numeric(values) => values[row].map(|v| {
                // -0.0 and 0.0 are the same value.
                if v == 0.0 { 0 } else { v.to_bits() }
            }),
            Column::Categorical { codes, .. } => codes[row].map(|c| c as u64),
        }
    }

    fn subset(&self, indices: &[usize]) -> Column {
        match self {
            Column::Numeric(values) => Column::Numeric(indices.iter().map(|&i| values[i]).collect()),
            Column::Categorical { levels, codes } => Column::Categorical {
                levels: levels.clone(),
                codes: indices.iter().map(|&i| codes[i]).collect(),
            },
        }
    }
}

/// Row-major numeric matrix with named columns, ready for model fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    /// Feature names, one per matrix column.
    pub feature_names: Vec<String>,
    /// `rows[sample_index][feature_index]`.
    pub rows: Vec<Vec<f64>>,
}

/// An in-memory table of named, equally long columns.
#[derive(Debug, Clone)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Dataset {
    /// Build a dataset from parallel name and column vectors.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::DuplicateColumn`] | Two columns share a name |
    /// | [`IoError::ColumnLengthMismatch`] | Columns differ in length |
    pub fn new(names: Vec<String>, columns: Vec<Column>) -> Result<Self, IoError> {
        let n_rows = columns.first().map_or(0, Column::len);
        let mut seen = HashSet::new();
        for (name, column) in names.iter().zip(&columns) {
            if !seen.insert(name.as_str()) {
                return Err(IoError::DuplicateColumn { name: name.clone() });
            }
            if column.len() != n_rows {
                return Err(IoError::ColumnLengthMismatch {
                    name: name.clone(),
                    expected: n_rows,
                    got: column.len(),
                });
            }
        }
        Ok(Self { names, columns, n_rows })
    }

    /// Return the number of rows (observations).
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Return the number of columns.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Return the column names in file order.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Iterate over `(name, column)` pairs in file order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(&self.columns)
    }

    /// Look up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    /// Look up a column by name, failing when it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnknownColumn`] if no column has that name.
    pub fn require_column(&self, name: &str) -> Result<&Column, IoError> {
        self.column(name).ok_or_else(|| IoError::UnknownColumn {
            name: name.to_string(),
        })
    }

    /// Borrow a numeric column by name.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::UnknownColumn`] | No column has that name |
    /// | [`IoError::NotNumeric`] | The column is categorical |
    pub fn numeric_column(&self, name: &str) -> Result<&[Option<f64>], IoError> {
        self.require_column(name)?
            .as_numeric()
            .ok_or_else(|| IoError::NotNumeric {
                name: name.to_string(),
            })
    }

    /// Return a new dataset holding the rows at `indices`, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::RowOutOfBounds`] if any index is `>= n_rows`.
    pub fn subset(&self, indices: &[usize]) -> Result<Self, IoError> {
        if let Some(&index) = indices.iter().find(|&&i| i >= self.n_rows) {
            return Err(IoError::RowOutOfBounds {
                index,
                n_rows: self.n_rows,
            });
        }
        Ok(Self {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.subset(indices)).collect(),
            n_rows: indices.len(),
        })
    }

    /// Return a new dataset with only the named columns, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnknownColumn`] if a name is absent.
    pub fn select(&self, names: &[String]) -> Result<Self, IoError> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            columns.push(self.require_column(name)?.clone());
        }
        Self::new(names.to_vec(), columns)
    }

    /// Return a new dataset without the named columns.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnknownColumn`] if a name is absent.
    pub fn drop_columns(&self, names: &[String]) -> Result<Self, IoError> {
        for name in names {
            self.require_column(name)?;
        }
        let keep: Vec<String> = self
            .names
            .iter()
            .filter(|n| !names.contains(n))
            .cloned()
            .collect();
        self.select(&keep)
    }

    /// Return the indices of rows with no missing cell in the named columns.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnknownColumn`] if a name is absent.
    pub fn complete_rows(&self, names: &[String]) -> Result<Vec<usize>, IoError> {
        let columns: Vec<&Column> = names
            .iter()
            .map(|n| self.require_column(n))
            .collect::<Result<_, _>>()?;
        Ok((0..self.n_rows)
            .filter(|&row| columns.iter().all(|c| !c.is_missing(row)))
            .collect())
    }

    /// Build a numeric design matrix over the named columns.
    ///
    /// Numeric columns are copied as-is. Categorical columns are expanded
    /// into treatment-coded dummies: one indicator per non-reference level,
    /// named `<column><level>`, with the first level as reference.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::UnknownColumn`] | A name is absent |
    /// | [`IoError::MissingValue`] | A selected cell is missing |
    pub fn design_matrix(&self, names: &[String]) -> Result<DesignMatrix, IoError> {
        let mut feature_names = Vec::new();
        let mut rows = vec![Vec::new(); self.n_rows];

        for name in names {
            match self.require_column(name)? {
                Column::Numeric(values) => {
                    feature_names.push(name.clone());
                    for (row_index, (row, value)) in rows.iter_mut().zip(values).enumerate() {
                        let v = value.ok_or_else(|| IoError::MissingValue {
                            column: name.clone(),
                            row_index,
                        })?;
                        row.push(v);
                    }
                }
                Column::Categorical { levels, codes } => {
                    feature_names.extend(levels.iter().skip(1).map(|l| format!("{name}{l}")));
                    for (row_index, (row, code)) in rows.iter_mut().zip(codes).enumerate() {
                        let code = code.ok_or_else(|| IoError::MissingValue {
                            column: name.clone(),
                            row_index,
                        })?;
                        row.extend((1..levels.len()).map(|l| if l == code { 1.0 } else { 0.0 }));
                    }
                }
            }
        }

        Ok(DesignMatrix { feature_names, rows })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
