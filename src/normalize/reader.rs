//! Loads raw CSV files as all-string polars frames and exposes typed field access.

use crate::normalize::error::{SchemaError, SourceError};
use crate::types::source::SourceKind;
use log::{debug, warn};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Reads a raw source file into a `DataFrame` whose columns are all strings.
///
/// Schema inference is disabled so that typing happens row by row in the
/// normalizers, where a bad value only costs its own row. Ragged lines are
/// truncated or padded with nulls instead of failing the whole file.
pub(crate) fn read_raw_frame(kind: SourceKind, path: &Path) -> Result<DataFrame, SourceError> {
    let read_error = |e| SourceError::Read {
        kind,
        path: path.to_path_buf(),
        source: e,
    };

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_ignore_errors(true)
        .map_parse_options(|opts| {
            opts.with_separator(kind.separator())
                .with_truncate_ragged_lines(true)
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(read_error)?
        .finish()
        .map_err(read_error)?;

    debug!(
        "Read {} rows x {} columns from {} file {:?}",
        df.height(),
        df.width(),
        kind,
        path
    );
    Ok(df)
}

/// String view over the required columns of a raw frame.
pub(crate) struct RawTable<'a> {
    columns: HashMap<&'static str, &'a StringChunked>,
    height: usize,
}

impl<'a> RawTable<'a> {
    /// Binds every column the source layout requires.
    ///
    /// A missing column means the file does not follow its documented layout at
    /// all, which is reported as a fatal [`SourceError::MissingColumn`].
    pub fn bind(df: &'a DataFrame, kind: SourceKind, path: &Path) -> Result<Self, SourceError> {
        let mut columns = HashMap::new();
        for name in kind.required_columns() {
            let column = df
                .column(name)
                .and_then(|c| c.str())
                .map_err(|e| {
                    warn!("{} file {:?} lacks column '{}'", kind, path, name);
                    SourceError::MissingColumn {
                        kind,
                        path: PathBuf::from(path),
                        column: name,
                        source: e,
                    }
                })?;
            columns.insert(name, column);
        }
        Ok(Self {
            columns,
            height: df.height(),
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Trimmed field value; empty strings count as missing.
    pub fn field(&self, column: &'static str, row: usize) -> Option<&'a str> {
        self.columns
            .get(column)
            .copied()
            .and_then(|c| c.get(row))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn required(&self, column: &'static str, row: usize) -> Result<&'a str, SchemaError> {
        self.field(column, row)
            .ok_or(SchemaError::MissingField { column })
    }

    pub fn required_number(&self, column: &'static str, row: usize) -> Result<f64, SchemaError> {
        parse_number(column, self.required(column, row)?)
    }

    /// Parses an optional numeric field, treating unparseable values as absent.
    pub fn lenient_number(&self, column: &'static str, row: usize) -> Option<f64> {
        self.field(column, row)
            .and_then(|raw| parse_number(column, raw).ok())
    }
}

/// Parses a finite float, accepting a decimal comma ("0,12").
pub(crate) fn parse_number(column: &'static str, raw: &str) -> Result<f64, SchemaError> {
    let invalid = || SchemaError::InvalidNumber {
        column,
        value: raw.to_string(),
    };
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_comma_and_whitespace() {
        assert_eq!(parse_number("x", " 0,125 "), Ok(0.125));
        assert_eq!(parse_number("x", "-3.5"), Ok(-3.5));
    }

    #[test]
    fn rejects_garbage_and_non_finite() {
        assert!(matches!(
            parse_number("x", "< 0.5"),
            Err(SchemaError::InvalidNumber { column: "x", .. })
        ));
        assert!(parse_number("x", "inf").is_err());
        assert!(parse_number("x", "NaN").is_err());
    }
}
