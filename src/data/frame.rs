use polars::prelude::*;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{PlotError, Result};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Shared read-only handle to a produced DataFrame
///
/// Two handles are equal only when they point at the same produced frame.
/// Re-running a pipeline that yields identical data still gives a new handle,
/// so downstream memo cells recompute against the fresh frame.
#[derive(Clone)]
pub struct DfHandle {
    generation: u64,
    df: Arc<DataFrame>,
}

impl DfHandle {
    pub fn new(df: DataFrame) -> Self {
        Self {
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            df: Arc::new(df),
        }
    }

    /// Get a reference to the underlying DataFrame
    pub fn get(&self) -> &DataFrame {
        &self.df
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Get all column names
    pub fn column_names(&self) -> Vec<String> {
        column_names(&self.df)
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }
}

impl PartialEq for DfHandle {
    fn eq(&self, other: &Self) -> bool {
        self.generation == other.generation && Arc::ptr_eq(&self.df, &other.df)
    }
}

impl Eq for DfHandle {}

impl fmt::Debug for DfHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DfHandle")
            .field("generation", &self.generation)
            .field("shape", &self.df.shape())
            .finish()
    }
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn series(df: &DataFrame, name: &str) -> Result<Series> {
    df.column(name)
        .map(|c| c.as_materialized_series().clone())
        .map_err(|_| PlotError::ColumnNotFound {
            column: name.to_string(),
        })
}

/// Check if a column holds numbers or timestamps (plottable on a value axis)
pub fn is_numeric_column(df: &DataFrame, name: &str) -> bool {
    series(df, name)
        .map(|s| is_number(s.dtype()) || is_temporal(s.dtype()))
        .unwrap_or(false)
}

/// Check if a column is a datetime or date type
pub fn is_datetime_column(df: &DataFrame, name: &str) -> bool {
    series(df, name)
        .map(|s| is_temporal(s.dtype()))
        .unwrap_or(false)
}

fn is_number(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn is_temporal(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Get a column's numeric values as Vec<f64>
/// Nulls and unparseable values become NaN.
/// Datetime/Date columns are converted to Unix timestamps (seconds since epoch).
pub fn column_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = series(df, name)?;

    match series.dtype() {
        DataType::Datetime(unit, _) => {
            let per_second = match unit {
                TimeUnit::Nanoseconds => 1_000_000_000.0,
                TimeUnit::Microseconds => 1_000_000.0,
                TimeUnit::Milliseconds => 1_000.0,
            };
            return Ok(series
                .datetime()?
                .into_iter()
                .map(|opt| opt.map(|ts| ts as f64 / per_second).unwrap_or(f64::NAN))
                .collect());
        }
        DataType::Date => {
            return Ok(series
                .date()?
                .into_iter()
                .map(|opt| opt.map(|days| days as f64 * 86400.0).unwrap_or(f64::NAN))
                .collect());
        }
        DataType::String => {
            return Ok(series
                .str()?
                .into_iter()
                .map(|opt| opt.and_then(|s| s.trim().parse::<f64>().ok()).unwrap_or(f64::NAN))
                .collect());
        }
        _ => {}
    }

    match series.cast(&DataType::Float64) {
        Ok(s) => Ok(s
            .f64()?
            .into_iter()
            .map(|opt| opt.unwrap_or(f64::NAN))
            .collect()),
        // Last resort: NaN for all values
        Err(_) => Ok(vec![f64::NAN; series.len()]),
    }
}

/// Get a column's values as display strings (nulls become empty strings)
pub fn column_labels(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let series = series(df, name)?;

    if let Ok(str_series) = series.str() {
        return Ok(str_series
            .into_iter()
            .map(|opt| opt.unwrap_or("").to_string())
            .collect());
    }

    let as_string = series.cast(&DataType::String)?;
    Ok(as_string
        .str()?
        .into_iter()
        .map(|opt| opt.unwrap_or("").to_string())
        .collect())
}

/// First `rows` rows of every column rendered as strings, row-major
pub fn preview_rows(df: &DataFrame, rows: usize) -> Vec<Vec<String>> {
    let head = df.head(Some(rows));
    let columns: Vec<Vec<String>> = column_names(&head)
        .iter()
        .map(|name| column_labels(&head, name).unwrap_or_else(|_| vec![String::new(); head.height()]))
        .collect();

    (0..head.height())
        .map(|row_idx| {
            columns
                .iter()
                .map(|col| col.get(row_idx).cloned().unwrap_or_default())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales() -> DataFrame {
        df!(
            "region" => ["north", "south", "north"],
            "amount" => [10.0, 20.5, 5.0],
            "units" => [1i64, 2, 3]
        )
        .unwrap()
    }

    #[test]
    fn test_handle_identity() {
        let a = DfHandle::new(sales());
        let b = a.clone();
        let c = DfHandle::new(sales());

        assert_eq!(a, b);
        assert_ne!(a, c, "Equal data from a new run is a new handle");
        assert!(c.generation() > a.generation());
        assert_eq!(a.height(), 3);
        assert_eq!(a.column_names(), vec!["region", "amount", "units"]);
    }

    #[test]
    fn test_column_extraction() {
        let df = sales();
        assert_eq!(column_f64(&df, "amount").unwrap(), vec![10.0, 20.5, 5.0]);
        assert_eq!(column_f64(&df, "units").unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(column_labels(&df, "region").unwrap(), vec!["north", "south", "north"]);
        assert_eq!(column_labels(&df, "units").unwrap(), vec!["1", "2", "3"]);

        assert!(is_numeric_column(&df, "amount"));
        assert!(!is_numeric_column(&df, "region"));
        assert!(!is_datetime_column(&df, "amount"));
    }

    #[test]
    fn test_string_numbers_parse() {
        let df = df!("v" => ["1.5", "x", " 2 "]).unwrap();
        let values = column_f64(&df, "v").unwrap();
        assert_eq!(values[0], 1.5);
        assert!(values[1].is_nan());
        assert_eq!(values[2], 2.0);
    }

    #[test]
    fn test_missing_column() {
        let err = column_f64(&sales(), "nope").unwrap_err();
        assert!(matches!(err, PlotError::ColumnNotFound { column } if column == "nope"));
    }

    #[test]
    fn test_preview_rows() {
        let rows = preview_rows(&sales(), 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["south", "20.5", "2"]);
    }
}
