//! Figure builders: DataFrame + column arguments -> drawable figure
//!
//! Each builder resolves the columns it needs, converts them to `f64` and
//! groups rows by the optional `color` column. Rendering happens elsewhere;
//! a `Figure` is plain data.

use polars::prelude::*;
use std::collections::HashMap;

use super::options::{HistFunc, PlotOptions, log_scale};
use crate::constants::plot::BAR_WIDTH;
use crate::data::frame::{column_f64, column_labels, is_datetime_column, is_numeric_column};
use crate::error::{PlotError, Result};
use crate::state::ColArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureKind {
    Scatter,
    Line,
    Area,
    Bar,
    Histogram,
}

/// One named series of points
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub kind: FigureKind,
    pub x_label: String,
    pub y_label: String,
    /// Tick labels when the x column is categorical (position = index)
    pub categories: Vec<String>,
    /// X values are Unix timestamps in seconds
    pub x_is_timestamp: bool,
    /// Bar width in x units (bar and histogram figures)
    pub bar_width: f64,
    /// Axis values are log10 of the data
    pub log_x: bool,
    pub log_y: bool,
    /// Bars are drawn along the horizontal axis; `x_label` still names the
    /// category column
    pub horizontal: bool,
    pub traces: Vec<Trace>,
}

impl Figure {
    fn new(title: &str, kind: FigureKind) -> Self {
        Self {
            title: title.to_string(),
            kind,
            x_label: String::new(),
            y_label: String::new(),
            categories: Vec::new(),
            x_is_timestamp: false,
            bar_width: BAR_WIDTH,
            log_x: false,
            log_y: false,
            horizontal: false,
            traces: Vec::new(),
        }
    }
}

fn required<'a>(args: &'a ColArgs, plot_type: &str, arg: &str) -> Result<&'a str> {
    args.get(arg)
        .map(String::as_str)
        .ok_or_else(|| PlotError::MissingArgument {
            plot_type: plot_type.to_string(),
            arg: arg.to_string(),
        })
}

/// X axis positions: numeric values, or category indices in first-seen order
struct XAxis {
    positions: Vec<f64>,
    categories: Vec<String>,
    is_timestamp: bool,
}

fn x_axis(df: &DataFrame, column: &str) -> Result<XAxis> {
    if is_numeric_column(df, column) {
        return Ok(XAxis {
            positions: column_f64(df, column)?,
            categories: Vec::new(),
            is_timestamp: is_datetime_column(df, column),
        });
    }

    let labels = column_labels(df, column)?;
    let mut categories: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let positions = labels
        .into_iter()
        .map(|label| {
            let next = categories.len();
            let idx = *index.entry(label.clone()).or_insert_with(|| {
                categories.push(label);
                next
            });
            idx as f64
        })
        .collect();

    Ok(XAxis {
        positions,
        categories,
        is_timestamp: false,
    })
}

fn y_values(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let values = column_f64(df, column)?;
    if !values.is_empty() && values.iter().all(|v| v.is_nan()) {
        return Err(PlotError::Custom(format!(
            "Column '{}' has no numeric values",
            column
        )));
    }
    Ok(values)
}

/// Row groups keyed by the color column, in first-seen order
fn groups(df: &DataFrame, color: Option<&str>, default_name: &str) -> Result<Vec<(String, Vec<usize>)>> {
    let Some(color) = color else {
        return Ok(vec![(default_name.to_string(), (0..df.height()).collect())]);
    };

    let labels = column_labels(df, color)?;
    let mut order: Vec<(String, Vec<usize>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (row, label) in labels.into_iter().enumerate() {
        match index.get(&label) {
            Some(&slot) => order[slot].1.push(row),
            None => {
                index.insert(label.clone(), order.len());
                order.push((label, vec![row]));
            }
        }
    }
    Ok(order)
}

fn xy_figure(df: &DataFrame, title: &str, args: &ColArgs, kind: FigureKind, plot_type: &str) -> Result<Figure> {
    let opts = PlotOptions::from_args(args)?;
    let x_col = required(args, plot_type, "x")?;
    let y_col = required(args, plot_type, "y")?;

    let x = x_axis(df, x_col)?;
    let y = y_values(df, y_col)?;

    let mut figure = Figure::new(title, kind);
    figure.x_label = x_col.to_string();
    figure.y_label = y_col.to_string();
    figure.x_is_timestamp = x.is_timestamp;
    // Category indices and timestamps stay linear
    figure.log_x = opts.log_x && x.categories.is_empty() && !x.is_timestamp;
    figure.log_y = opts.log_y;

    for (name, rows) in groups(df, args.get("color").map(String::as_str), y_col)? {
        let points: Vec<[f64; 2]> = rows
            .into_iter()
            .map(|row| [x.positions[row], y[row]])
            .filter(|p| !p[0].is_nan() && !p[1].is_nan())
            .collect();
        let mut points = log_scale(points, figure.log_x, figure.log_y);
        if kind != FigureKind::Scatter {
            points.sort_by(|a, b| a[0].total_cmp(&b[0]));
        }
        figure.traces.push(Trace { name, points });
    }
    figure.categories = x.categories;
    Ok(figure)
}

pub fn scatter(df: &DataFrame, title: &str, args: &ColArgs) -> Result<Figure> {
    xy_figure(df, title, args, FigureKind::Scatter, "scatter")
}

pub fn line(df: &DataFrame, title: &str, args: &ColArgs) -> Result<Figure> {
    xy_figure(df, title, args, FigureKind::Line, "line")
}

pub fn area(df: &DataFrame, title: &str, args: &ColArgs) -> Result<Figure> {
    xy_figure(df, title, args, FigureKind::Area, "area")
}

/// Bars at each x position. Rows sharing an x value (and color group) are
/// summed; without a `y` argument each row counts as one.
pub fn bar(df: &DataFrame, title: &str, args: &ColArgs) -> Result<Figure> {
    let opts = PlotOptions::from_args(args)?;
    let x_col = required(args, "bar", "x")?;
    let y_col = args.get("y").map(String::as_str);

    let x = x_axis(df, x_col)?;
    let y = match y_col {
        Some(col) => y_values(df, col)?,
        None => vec![1.0; df.height()],
    };

    let mut figure = Figure::new(title, FigureKind::Bar);
    figure.x_label = x_col.to_string();
    figure.y_label = y_col.unwrap_or("count").to_string();
    figure.x_is_timestamp = x.is_timestamp;
    figure.horizontal = opts.horizontal;
    figure.log_y = opts.log_y;

    let groups = groups(df, args.get("color").map(String::as_str), &figure.y_label)?;
    let group_count = groups.len().max(1) as f64;
    figure.bar_width = BAR_WIDTH / group_count;

    for (g, (name, rows)) in groups.into_iter().enumerate() {
        // Side-by-side bars within a category when grouped by color
        let offset = (g as f64 - (group_count - 1.0) / 2.0) * figure.bar_width;
        let mut sums: Vec<[f64; 2]> = Vec::new();
        let mut slots: HashMap<u64, usize> = HashMap::new();
        for row in rows {
            let (xv, yv) = (x.positions[row], y[row]);
            if xv.is_nan() || yv.is_nan() {
                continue;
            }
            match slots.get(&xv.to_bits()) {
                Some(&slot) => sums[slot][1] += yv,
                None => {
                    slots.insert(xv.to_bits(), sums.len());
                    sums.push([xv, yv]);
                }
            }
        }
        let mut points = log_scale(sums, false, figure.log_y);
        for p in points.iter_mut() {
            p[0] += offset;
        }
        figure.traces.push(Trace { name, points });
    }
    figure.categories = x.categories;
    Ok(figure)
}

/// Equal-width bins over the x column, one trace per color group
///
/// Bin heights count rows, or aggregate the `y` column with `histfunc`
/// (sum by default once `y` is bound).
pub fn histogram_with_bins(df: &DataFrame, title: &str, args: &ColArgs, bins: usize) -> Result<Figure> {
    let opts = PlotOptions::from_args(args)?;
    let x_col = required(args, "histogram", "x")?;
    let y_col = args.get("y").map(String::as_str);
    let func = match (opts.histfunc, y_col) {
        (Some(func), _) => func,
        (None, Some(_)) => HistFunc::Sum,
        (None, None) => HistFunc::Count,
    };
    if func != HistFunc::Count && y_col.is_none() {
        return Err(PlotError::MissingArgument {
            plot_type: format!("{} histogram", func.name()),
            arg: "y".to_string(),
        });
    }

    let mut values = y_values(df, x_col)?;
    if opts.log_x {
        for v in values.iter_mut() {
            *v = if *v > 0.0 { v.log10() } else { f64::NAN };
        }
    }
    let weights = match y_col {
        Some(col) => Some(y_values(df, col)?),
        None => None,
    };

    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Err(PlotError::EmptyDataset);
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let bins = bins.max(1);
    let width = if max > min { (max - min) / bins as f64 } else { 1.0 };

    let mut figure = Figure::new(title, FigureKind::Histogram);
    figure.x_label = x_col.to_string();
    figure.y_label = match y_col {
        Some(col) if func != HistFunc::Count => format!("{} of {}", func.name(), col),
        _ => "count".to_string(),
    };
    figure.bar_width = width;
    figure.x_is_timestamp = is_datetime_column(df, x_col) && !opts.log_x;
    figure.log_x = opts.log_x;
    figure.log_y = opts.log_y;
    figure.horizontal = opts.horizontal;

    for (name, rows) in groups(df, args.get("color").map(String::as_str), x_col)? {
        let mut binned: Vec<Vec<f64>> = vec![Vec::new(); bins];
        for row in rows {
            let v = values[row];
            let weight = weights.as_ref().map_or(1.0, |w| w[row]);
            if !v.is_finite() || weight.is_nan() {
                continue;
            }
            let bin = (((v - min) / width) as usize).min(bins - 1);
            binned[bin].push(weight);
        }
        let points = binned
            .iter()
            .enumerate()
            .filter_map(|(i, bin)| func.apply(bin).map(|h| [min + (i as f64 + 0.5) * width, h]))
            .collect();
        let points = log_scale(points, false, figure.log_y);
        figure.traces.push(Trace { name, points });
    }
    Ok(figure)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, &str)]) -> ColArgs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sales() -> DataFrame {
        df!(
            "region" => ["north", "south", "north", "east"],
            "amount" => [10.0, 20.0, 5.0, 7.5],
            "day" => [3.0, 1.0, 2.0, 4.0],
            "channel" => ["web", "web", "store", "store"]
        )
        .unwrap()
    }

    #[test]
    fn test_scatter_single_trace() {
        let fig = scatter(&sales(), "Spend", &args(&[("x", "day"), ("y", "amount")])).unwrap();
        assert_eq!(fig.title, "Spend");
        assert_eq!(fig.traces.len(), 1);
        assert_eq!(fig.traces[0].name, "amount");
        assert_eq!(fig.traces[0].points[0], [3.0, 10.0]);
        assert!(fig.categories.is_empty());
    }

    #[test]
    fn test_line_sorted_by_x_and_colored() {
        let fig = line(
            &sales(),
            "t",
            &args(&[("x", "day"), ("y", "amount"), ("color", "channel")]),
        )
        .unwrap();
        let names: Vec<&str> = fig.traces.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["web", "store"]);
        assert_eq!(fig.traces[0].points, vec![[1.0, 20.0], [3.0, 10.0]]);
    }

    #[test]
    fn test_bar_aggregates_categories() {
        let fig = bar(&sales(), "Sales", &args(&[("x", "region"), ("y", "amount")])).unwrap();
        assert_eq!(fig.categories, vec!["north", "south", "east"]);
        assert_eq!(fig.traces[0].points, vec![[0.0, 15.0], [1.0, 20.0], [2.0, 7.5]]);
        assert_eq!(fig.y_label, "amount");
    }

    #[test]
    fn test_bar_counts_without_y() {
        let fig = bar(&sales(), "n", &args(&[("x", "region")])).unwrap();
        assert_eq!(fig.y_label, "count");
        assert_eq!(fig.traces[0].points[0], [0.0, 2.0]);
    }

    #[test]
    fn test_histogram_bins() {
        let df = df!("v" => [0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        let fig = histogram_with_bins(&df, "h", &args(&[("x", "v")]), 2).unwrap();
        let counts: Vec<f64> = fig.traces[0].points.iter().map(|p| p[1]).collect();
        assert_eq!(counts, vec![2.0, 3.0]);
        assert_eq!(fig.bar_width, 2.0);
        assert_eq!(fig.traces[0].points[0][0], 1.0);
    }

    #[test]
    fn test_histogram_aggregates_y() {
        let df = df!(
            "v" => [0.0, 1.0, 3.0, 4.0],
            "w" => [2.0, 6.0, 1.0, 3.0]
        )
        .unwrap();

        let fig = histogram_with_bins(&df, "h", &args(&[("x", "v"), ("y", "w")]), 2).unwrap();
        assert_eq!(fig.y_label, "sum of w");
        assert_eq!(fig.traces[0].points, vec![[1.0, 8.0], [3.0, 4.0]]);

        let fig = histogram_with_bins(&df, "h", &args(&[("x", "v"), ("y", "w"), ("histfunc", "max")]), 2).unwrap();
        assert_eq!(fig.y_label, "max of w");
        assert_eq!(fig.traces[0].points, vec![[1.0, 6.0], [3.0, 3.0]]);

        let err = histogram_with_bins(&df, "h", &args(&[("x", "v"), ("histfunc", "avg")]), 2).unwrap_err();
        assert!(matches!(err, PlotError::MissingArgument { ref arg, .. } if arg == "y"));
    }

    #[test]
    fn test_log_axes() {
        let df = df!(
            "x" => [1.0, 10.0, 100.0, -5.0],
            "y" => [100.0, 10.0, 0.0, 1.0]
        )
        .unwrap();
        let fig = scatter(&df, "log", &args(&[("x", "x"), ("y", "y"), ("log_x", "true"), ("log_y", "true")])).unwrap();
        assert!(fig.log_x && fig.log_y);
        assert_eq!(fig.traces[0].points, vec![[0.0, 2.0], [1.0, 1.0]]);

        // Categorical x positions are never log scaled
        let fig = line(&sales(), "t", &args(&[("x", "region"), ("y", "amount"), ("log_x", "true")])).unwrap();
        assert!(!fig.log_x);
        assert_eq!(fig.traces[0].points.len(), 4);
    }

    #[test]
    fn test_bar_orientation_and_log() {
        let fig = bar(
            &sales(),
            "Sales",
            &args(&[("x", "region"), ("y", "amount"), ("orientation", "h"), ("log_y", "true")]),
        )
        .unwrap();
        assert!(fig.horizontal && fig.log_y);
        assert_eq!(fig.x_label, "region");
        let heights: Vec<f64> = fig.traces[0].points.iter().map(|p| p[1]).collect();
        assert_eq!(heights, vec![15f64.log10(), 20f64.log10(), 7.5f64.log10()]);

        let err = bar(&sales(), "Sales", &args(&[("x", "region"), ("orientation", "sideways")])).unwrap_err();
        assert!(matches!(err, PlotError::InvalidOption { ref option, .. } if option == "orientation"));
    }

    #[test]
    fn test_builder_errors() {
        let err = scatter(&sales(), "t", &args(&[("x", "day")])).unwrap_err();
        assert!(matches!(err, PlotError::MissingArgument { ref arg, .. } if arg == "y"));

        let err = scatter(&sales(), "t", &args(&[("x", "day"), ("y", "missing")])).unwrap_err();
        assert_eq!(err.to_string(), "Column 'missing' not found in dataset");

        let err = line(&sales(), "t", &args(&[("x", "day"), ("y", "region")])).unwrap_err();
        assert_eq!(err.to_string(), "Column 'region' has no numeric values");
    }
}
