//! Data pipeline description and execution
//!
//! An [`ActionsState`] names a source file and an ordered list of transforms.
//! Execution is a single lazy polars query collected at the end.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::data::CSV_INFER_SCHEMA_ROWS;
use crate::error::{PlotError, Result};

/// Persisted description of how the viewer's DataFrame is produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionsState {
    /// CSV or Parquet file the pipeline starts from
    #[serde(default)]
    pub source: Option<PathBuf>,

    /// Transforms applied in order
    #[serde(default)]
    pub actions: Vec<DataAction>,
}

impl ActionsState {
    pub fn from_source(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Some(path.into()),
            actions: Vec::new(),
        }
    }
}

/// Comparison used by [`DataAction::Filter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Number(f64),
    Text(String),
}

impl FilterValue {
    fn to_expr(&self) -> Expr {
        match self {
            FilterValue::Number(n) => lit(*n),
            FilterValue::Text(t) => lit(t.clone()),
        }
    }
}

/// One step of the data pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataAction {
    Filter {
        column: String,
        op: CompareOp,
        value: FilterValue,
    },
    DropNulls {
        column: String,
    },
    Select {
        columns: Vec<String>,
    },
    Sort {
        column: String,
        #[serde(default)]
        descending: bool,
    },
    Head {
        rows: usize,
    },
}

impl DataAction {
    fn apply(&self, lf: LazyFrame) -> LazyFrame {
        match self {
            DataAction::Filter { column, op, value } => {
                let lhs = col(column.as_str());
                let rhs = value.to_expr();
                let predicate = match op {
                    CompareOp::Eq => lhs.eq(rhs),
                    CompareOp::NotEq => lhs.neq(rhs),
                    CompareOp::Gt => lhs.gt(rhs),
                    CompareOp::GtEq => lhs.gt_eq(rhs),
                    CompareOp::Lt => lhs.lt(rhs),
                    CompareOp::LtEq => lhs.lt_eq(rhs),
                };
                lf.filter(predicate)
            }
            DataAction::DropNulls { column } => lf.filter(col(column.as_str()).is_not_null()),
            DataAction::Select { columns } => {
                lf.select(columns.iter().map(|c| col(c.as_str())).collect::<Vec<_>>())
            }
            DataAction::Sort { column, descending } => lf.sort_by_exprs(
                vec![col(column.as_str())],
                SortMultipleOptions::default().with_order_descending(*descending),
            ),
            DataAction::Head { rows } => lf.limit(*rows as IdxSize),
        }
    }
}

/// Open a CSV or Parquet file as a lazy frame
pub fn scan_source(path: &Path) -> Result<LazyFrame> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| PlotError::UnsupportedFormat {
            extension: String::new(),
        })?;

    let lf = match extension.to_lowercase().as_str() {
        "parquet" => LazyFrame::scan_parquet(path, Default::default())?,
        "csv" => LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(CSV_INFER_SCHEMA_ROWS))
            .with_try_parse_dates(true)
            .finish()?,
        ext => {
            return Err(PlotError::UnsupportedFormat {
                extension: ext.to_string(),
            });
        }
    };
    Ok(lf)
}

/// Apply every transform to `lf` and collect
pub fn run_actions(lf: LazyFrame, actions: &[DataAction]) -> Result<DataFrame> {
    let lf = actions.iter().fold(lf, |lf, action| action.apply(lf));
    Ok(lf.collect()?)
}

/// Run the whole pipeline described by `state`
pub fn execute(state: &ActionsState) -> Result<DataFrame> {
    profiling::scope!("execute_pipeline");

    let source = state
        .source
        .as_deref()
        .ok_or_else(|| PlotError::Custom("No data source configured".to_string()))?;
    tracing::debug!(source = %source.display(), steps = state.actions.len(), "executing pipeline");

    let df = run_actions(scan_source(source)?, &state.actions)?;
    if df.width() == 0 {
        return Err(PlotError::EmptyDataset);
    }
    Ok(df)
}
